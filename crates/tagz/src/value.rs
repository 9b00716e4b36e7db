//! Child and attribute values, and their resolution for one render pass.
//!
//! Both [`Child`] and [`AttrValue`] are closed sets of alternatives. Lazy
//! entries hold a callable that is invoked once per render, so two renders
//! of the same tree may differ if the callable has state.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use crate::error::{BoxError, Error, Location, Result};
use crate::fragment::Fragment;
use crate::style::{Style, StyleSheet};
use crate::tag::Tag;

/// Marker meaning "render nothing here".
///
/// As an attribute value the attribute is omitted; as a child nothing is
/// written, not even whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Absent;

/// The absence marker.
pub const ABSENT: Absent = Absent;

/// Text that is written verbatim, without escaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raw(pub String);

impl Raw {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

/// A zero-argument callable evaluated at render time.
pub struct Lazy<T>(Rc<dyn Fn() -> Result<T, BoxError>>);

impl<T: 'static> Lazy<T> {
    /// Wrap an infallible callable.
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn() -> R + 'static,
        R: Into<T>,
    {
        Self(Rc::new(move || Ok(f().into())))
    }

    /// Wrap a fallible callable. Its error aborts the render and is kept as
    /// the source of [`Error::Callable`].
    pub fn fallible<F, R, E>(f: F) -> Self
    where
        F: Fn() -> std::result::Result<R, E> + 'static,
        R: Into<T>,
        E: Into<BoxError>,
    {
        Self(Rc::new(move || f().map(Into::into).map_err(Into::into)))
    }

    fn call(&self) -> Result<T, BoxError> {
        (self.0)()
    }
}

impl<T> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Lazy(..)")
    }
}

/// One entry in a tag's child list.
#[derive(Debug, Clone)]
pub enum Child {
    /// Text, escaped unless the parent is a raw-content tag.
    Text(String),
    /// Text that is never escaped.
    Raw(String),
    /// A nested tag, shared by reference.
    Tag(Tag),
    /// Children without a wrapping tag.
    Fragment(Fragment),
    /// A boolean has no text form; rendering it fails.
    Bool(bool),
    /// Renders nothing.
    Absent,
    /// Resolved at render time.
    Lazy(Lazy<Child>),
}

impl Child {
    /// Child produced by `f` at render time.
    pub fn lazy<F, R>(f: F) -> Self
    where
        F: Fn() -> R + 'static,
        R: Into<Child>,
    {
        Self::Lazy(Lazy::new(f))
    }

    /// Child produced by the fallible `f` at render time.
    pub fn try_lazy<F, R, E>(f: F) -> Self
    where
        F: Fn() -> std::result::Result<R, E> + 'static,
        R: Into<Child>,
        E: Into<BoxError>,
    {
        Self::Lazy(Lazy::fallible(f))
    }

    /// Copy the entry, deep-copying nested tags and fragments.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        match self {
            Self::Tag(tag) => Self::Tag(tag.deep_copy()),
            Self::Fragment(fragment) => Self::Fragment(fragment.deep_copy()),
            other => other.clone(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Raw(_) => "raw text",
            Self::Tag(_) => "tag",
            Self::Fragment(_) => "fragment",
            Self::Bool(_) => "boolean",
            Self::Absent => "absence marker",
            Self::Lazy(_) => "callable",
        }
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for Child {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

impl From<Cow<'_, str>> for Child {
    fn from(text: Cow<'_, str>) -> Self {
        Self::Text(text.into_owned())
    }
}

impl From<Raw> for Child {
    fn from(raw: Raw) -> Self {
        Self::Raw(raw.0)
    }
}

impl From<Tag> for Child {
    fn from(tag: Tag) -> Self {
        Self::Tag(tag)
    }
}

impl From<&Tag> for Child {
    fn from(tag: &Tag) -> Self {
        Self::Tag(tag.clone())
    }
}

impl From<Fragment> for Child {
    fn from(fragment: Fragment) -> Self {
        Self::Fragment(fragment)
    }
}

impl From<bool> for Child {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Absent> for Child {
    fn from(_: Absent) -> Self {
        Self::Absent
    }
}

impl From<Style> for Child {
    fn from(style: Style) -> Self {
        Self::Text(style.to_string())
    }
}

impl From<StyleSheet> for Child {
    fn from(sheet: StyleSheet) -> Self {
        Self::Text(sheet.to_string())
    }
}

impl From<Lazy<Child>> for Child {
    fn from(lazy: Lazy<Child>) -> Self {
        Self::Lazy(lazy)
    }
}

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

/// A value stored under an attribute key.
#[derive(Debug, Clone)]
pub enum AttrValue {
    /// Rendered as `key="escaped value"`.
    Text(String),
    /// `true` renders the bare key, `false` omits the attribute.
    Bool(bool),
    /// Omits the attribute.
    Absent,
    /// Inline CSS, rendered through its own serialization.
    Style(Style),
    /// Resolved at render time.
    Lazy(Lazy<AttrValue>),
}

impl AttrValue {
    /// Attribute value produced by `f` at render time.
    pub fn lazy<F, R>(f: F) -> Self
    where
        F: Fn() -> R + 'static,
        R: Into<AttrValue>,
    {
        Self::Lazy(Lazy::new(f))
    }

    /// Attribute value produced by the fallible `f` at render time.
    pub fn try_lazy<F, R, E>(f: F) -> Self
    where
        F: Fn() -> std::result::Result<R, E> + 'static,
        R: Into<AttrValue>,
        E: Into<BoxError>,
    {
        Self::Lazy(Lazy::fallible(f))
    }

    /// The text of a static value, if it has one.
    #[must_use]
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Text(text) => Some(Cow::Borrowed(text)),
            Self::Style(style) => Some(Cow::Owned(style.to_string())),
            Self::Bool(_) | Self::Absent | Self::Lazy(_) => None,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bool(_) => "boolean",
            Self::Absent => "absence marker",
            Self::Style(_) => "style",
            Self::Lazy(_) => "callable",
        }
    }
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Absent, Self::Absent) => true,
            (Self::Style(a), Self::Style(b)) => a == b,
            (Self::Lazy(a), Self::Lazy(b)) => Rc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for AttrValue {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Absent> for AttrValue {
    fn from(_: Absent) -> Self {
        Self::Absent
    }
}

impl From<Style> for AttrValue {
    fn from(style: Style) -> Self {
        Self::Style(style)
    }
}

impl From<Lazy<AttrValue>> for AttrValue {
    fn from(lazy: Lazy<AttrValue>) -> Self {
        Self::Lazy(lazy)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

macro_rules! display_conversions {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Child {
                fn from(value: $ty) -> Self {
                    Self::Text(value.to_string())
                }
            }

            impl From<$ty> for AttrValue {
                fn from(value: $ty) -> Self {
                    Self::Text(value.to_string())
                }
            }
        )*
    };
}

display_conversions!(char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// A child entry after resolution.
#[derive(Debug)]
pub(crate) enum Resolved {
    Text(String),
    Raw(String),
    Tag(Tag),
    Fragment(Fragment),
    Skip,
}

/// An attribute after resolution.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ResolvedAttr {
    Bare,
    Value(String),
    Omit,
}

/// Resolve a child entry, invoking it if it is lazy.
///
/// `location` is only evaluated when an error is reported.
pub(crate) fn resolve_child(child: Child, location: impl Fn() -> Location) -> Result<Resolved> {
    let child = match child {
        Child::Lazy(lazy) => {
            let value = lazy.call().map_err(|source| Error::Callable {
                location: location(),
                source,
            })?;
            if matches!(value, Child::Lazy(_)) {
                return Err(Error::UnrenderableChildType {
                    location: location(),
                    found: "callable returned by a callable",
                });
            }
            value
        }
        other => other,
    };

    match child {
        Child::Text(text) => Ok(Resolved::Text(text)),
        Child::Raw(text) => Ok(Resolved::Raw(text)),
        Child::Tag(tag) => Ok(Resolved::Tag(tag)),
        Child::Fragment(fragment) => Ok(Resolved::Fragment(fragment)),
        Child::Absent => Ok(Resolved::Skip),
        other @ (Child::Bool(_) | Child::Lazy(_)) => Err(Error::UnrenderableChildType {
            location: location(),
            found: other.kind(),
        }),
    }
}

/// Resolve an attribute value, invoking it if it is lazy.
pub(crate) fn resolve_attr(value: AttrValue, tag: &str, key: &str) -> Result<ResolvedAttr> {
    let value = match value {
        AttrValue::Lazy(lazy) => lazy.call().map_err(|source| Error::Callable {
            location: Location::Attribute {
                tag: tag.to_owned(),
                key: key.to_owned(),
            },
            source,
        })?,
        other => other,
    };

    match value {
        AttrValue::Text(text) => Ok(ResolvedAttr::Value(text)),
        AttrValue::Style(style) => Ok(ResolvedAttr::Value(style.to_string())),
        AttrValue::Bool(true) => Ok(ResolvedAttr::Bare),
        AttrValue::Bool(false) | AttrValue::Absent => Ok(ResolvedAttr::Omit),
        AttrValue::Lazy(_) => Err(Error::InvalidAttributeType {
            tag: tag.to_owned(),
            key: key.to_owned(),
            found: "callable returned by a callable",
        }),
    }
}
