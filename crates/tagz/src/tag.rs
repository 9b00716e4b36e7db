//! The tag tree node.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::escape::escape_attr;
use crate::value::{AttrValue, Child};

/// Tags whose text children are written without escaping.
const RAW_CONTENT_TAGS: &[&str] = &["script", "style"];

/// Void elements: self-closed when they have no children.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Whether `name` is a void element (`<br/>`, `<meta/>`, ...).
#[must_use]
pub fn is_void_element(name: &str) -> bool {
    VOID_TAGS.contains(&name)
}

/// Whether `name` is a raw-content element (`script`, `style`).
#[must_use]
pub fn is_raw_content_element(name: &str) -> bool {
    RAW_CONTENT_TAGS.contains(&name)
}

/// Whether `key` addresses the class-set.
fn is_class_key(key: &str) -> bool {
    key == "class" || key == "classes"
}

/// Whether `name` can be written as a tag or attribute name without
/// changing the structure of the markup.
///
/// Rejects the empty string, whitespace, control characters and any of
/// `" ' < > / = &`.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace()
                || c.is_control()
                || matches!(c, '"' | '\'' | '<' | '>' | '/' | '=' | '&')
        })
}

/// Normalize a construction-time attribute key.
///
/// One trailing underscore is dropped (`class_` → `class`, `for_` → `for`)
/// and the remaining underscores become hyphens (`data_id` → `data-id`).
#[must_use]
pub fn normalize_attr_key(key: &str) -> String {
    let key = match key.strip_suffix('_') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => key,
    };
    key.replace('_', "-")
}

/// Values accepted as a whole class-set.
///
/// Strings are split on whitespace; sequences and sets contribute each of
/// their items (also split on whitespace). Duplicates collapse.
pub trait IntoClasses {
    fn into_classes(self) -> BTreeSet<String>;
}

fn split_classes<I, S>(items: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .flat_map(|item| {
            item.as_ref()
                .split_whitespace()
                .map(ToOwned::to_owned)
                .collect::<Vec<_>>()
        })
        .collect()
}

impl IntoClasses for &str {
    fn into_classes(self) -> BTreeSet<String> {
        split_classes([self])
    }
}

impl IntoClasses for String {
    fn into_classes(self) -> BTreeSet<String> {
        split_classes([self])
    }
}

impl IntoClasses for &String {
    fn into_classes(self) -> BTreeSet<String> {
        split_classes([self])
    }
}

impl<S: AsRef<str>, const N: usize> IntoClasses for [S; N] {
    fn into_classes(self) -> BTreeSet<String> {
        split_classes(self)
    }
}

impl<S: AsRef<str>> IntoClasses for &[S] {
    fn into_classes(self) -> BTreeSet<String> {
        split_classes(self)
    }
}

impl<S: AsRef<str>> IntoClasses for Vec<S> {
    fn into_classes(self) -> BTreeSet<String> {
        split_classes(self)
    }
}

impl<S: AsRef<str>> IntoClasses for BTreeSet<S> {
    fn into_classes(self) -> BTreeSet<String> {
        split_classes(self)
    }
}

impl<S: AsRef<str>, H> IntoClasses for HashSet<S, H> {
    fn into_classes(self) -> BTreeSet<String> {
        split_classes(self)
    }
}

#[derive(Clone)]
struct TagInner {
    name: String,
    classes: BTreeSet<String>,
    attributes: BTreeMap<String, AttrValue>,
    children: Vec<Child>,
    raw_content: bool,
}

/// Everything the renderer needs to write an opening tag.
pub(crate) struct OpenTag {
    pub name: String,
    pub attributes: Vec<(String, AttrValue)>,
    pub raw_content: bool,
}

/// A mutable HTML tag: name, attributes, class-set and ordered children.
///
/// `Tag` is a handle. Cloning it shares the node, so a tag appended to a
/// parent and modified afterwards shows the modification at the next
/// render. Use [`deep_copy`](Self::deep_copy) for an independent tree.
///
/// Appending a tag to its own descendant creates a cycle; rendering such a
/// tree does not terminate unless [`RenderOptions::max_depth`] is set.
///
/// [`RenderOptions::max_depth`]: crate::RenderOptions::max_depth
///
/// # Example
///
/// ```
/// use tagz::{Render, Tag};
///
/// let list = Tag::new("ul").class("menu");
/// let item = Tag::new("li").child("one");
/// list.append(&item);
/// item.append("!");
///
/// assert_eq!(
///     list.render().unwrap(),
///     r#"<ul class="menu"><li>one!</li></ul>"#
/// );
/// ```
#[derive(Clone)]
pub struct Tag {
    inner: Rc<RefCell<TagInner>>,
}

impl Tag {
    /// Create an empty tag. Underscores in `name` become hyphens.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty or fails [`is_valid_name`].
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into().replace('_', "-");
        assert!(!name.is_empty(), "tag name cannot be empty");
        assert!(is_valid_name(&name), "invalid tag name: {name:?}");
        let raw_content = is_raw_content_element(&name);
        Self {
            inner: Rc::new(RefCell::new(TagInner {
                name,
                classes: BTreeSet::new(),
                attributes: BTreeMap::new(),
                children: Vec::new(),
                raw_content,
            })),
        }
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    #[must_use]
    pub fn is_raw_content(&self) -> bool {
        self.inner.borrow().raw_content
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        is_void_element(&self.inner.borrow().name)
    }

    /// Append a child in builder style.
    #[must_use]
    pub fn child(self, child: impl Into<Child>) -> Self {
        self.append(child);
        self
    }

    /// Append several children in builder style.
    #[must_use]
    pub fn with_children<I>(self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Child>,
    {
        self.extend(children);
        self
    }

    /// Set an attribute in builder style.
    ///
    /// The key is normalized with [`normalize_attr_key`]. `class` and
    /// `classes` replace the class-set from a text value, and clear it for
    /// `false` or the absence marker; other values are ignored with a
    /// warning (use [`set_attribute`](Self::set_attribute) to get the
    /// error instead).
    #[must_use]
    pub fn attr(self, key: &str, value: impl Into<AttrValue>) -> Self {
        let key = normalize_attr_key(key);
        if let Err(err) = self.set_attribute(&key, value) {
            tracing::warn!(error = %err, "Ignoring attribute value");
        }
        self
    }

    /// Add one or more whitespace-separated classes in builder style.
    #[must_use]
    pub fn class(self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    /// Replace the class-set in builder style.
    #[must_use]
    pub fn with_classes(self, classes: impl IntoClasses) -> Self {
        self.set_classes(classes);
        self
    }

    /// Add a child at the end of the child list.
    pub fn append(&self, child: impl Into<Child>) {
        self.inner.borrow_mut().children.push(child.into());
    }

    pub fn extend<I>(&self, children: I)
    where
        I: IntoIterator,
        I::Item: Into<Child>,
    {
        self.inner
            .borrow_mut()
            .children
            .extend(children.into_iter().map(Into::into));
    }

    /// Snapshot of the current children.
    #[must_use]
    pub fn children(&self) -> Vec<Child> {
        self.inner.borrow().children.clone()
    }

    /// Number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().children.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().children.is_empty()
    }

    /// Set an attribute. The key is used as given, except that `class` and
    /// `classes` address the class-set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAttributeName`] when `key` fails
    /// [`is_valid_name`], and [`Error::InvalidAttributeType`] when the
    /// class-set is given anything other than text, `false` or the absence
    /// marker.
    pub fn set_attribute(&self, key: &str, value: impl Into<AttrValue>) -> Result<()> {
        if !is_valid_name(key) {
            return Err(Error::InvalidAttributeName {
                tag: self.name(),
                key: key.to_owned(),
            });
        }
        let value = value.into();
        if !is_class_key(key) {
            self.inner
                .borrow_mut()
                .attributes
                .insert(key.to_owned(), value);
            return Ok(());
        }

        match value {
            AttrValue::Text(text) => self.set_classes(text),
            AttrValue::Bool(false) | AttrValue::Absent => self.inner.borrow_mut().classes.clear(),
            other => {
                return Err(Error::InvalidAttributeType {
                    tag: self.name(),
                    key: key.to_owned(),
                    found: other.kind(),
                });
            }
        }
        Ok(())
    }

    /// Get an attribute. The class-set reads back as space-joined text, or
    /// `None` when it is empty.
    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<AttrValue> {
        let inner = self.inner.borrow();
        if is_class_key(key) {
            return class_value(&inner.classes);
        }
        inner.attributes.get(key).cloned()
    }

    /// Remove an attribute, returning its previous value.
    pub fn delete_attribute(&self, key: &str) -> Option<AttrValue> {
        let mut inner = self.inner.borrow_mut();
        if is_class_key(key) {
            let previous = class_value(&inner.classes);
            inner.classes.clear();
            return previous;
        }
        inner.attributes.remove(key)
    }

    #[must_use]
    pub fn has_attribute(&self, key: &str) -> bool {
        let inner = self.inner.borrow();
        if is_class_key(key) {
            return !inner.classes.is_empty();
        }
        inner.attributes.contains_key(key)
    }

    /// Snapshot of the attributes, without the class-set.
    #[must_use]
    pub fn attributes(&self) -> BTreeMap<String, AttrValue> {
        self.inner.borrow().attributes.clone()
    }

    /// The current class-set.
    #[must_use]
    pub fn classes(&self) -> BTreeSet<String> {
        self.inner.borrow().classes.clone()
    }

    /// Replace the class-set.
    pub fn set_classes(&self, classes: impl IntoClasses) {
        self.inner.borrow_mut().classes = classes.into_classes();
    }

    /// Add whitespace-separated classes to the class-set.
    pub fn add_class(&self, class: &str) {
        self.inner
            .borrow_mut()
            .classes
            .extend(class.into_classes());
    }

    /// Remove a class, returning whether it was present.
    pub fn remove_class(&self, class: &str) -> bool {
        self.inner.borrow_mut().classes.remove(class)
    }

    /// Copy this tag and everything below it into an independent tree.
    ///
    /// Lazy values are shared with the original since callables cannot be
    /// copied.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        let inner = self.inner.borrow();
        let copy = TagInner {
            name: inner.name.clone(),
            classes: inner.classes.clone(),
            attributes: inner.attributes.clone(),
            children: inner.children.iter().map(Child::deep_copy).collect(),
            raw_content: inner.raw_content,
        };
        Self {
            inner: Rc::new(RefCell::new(copy)),
        }
    }

    /// Whether both handles point at the same tag.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Snapshot for writing the opening tag; the class-set is merged into
    /// the sorted attribute list under `class`.
    pub(crate) fn open_tag(&self) -> OpenTag {
        let inner = self.inner.borrow();
        let mut attributes: Vec<(String, AttrValue)> = inner
            .attributes
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if let Some(classes) = class_value(&inner.classes) {
            let at = attributes.partition_point(|(key, _)| key.as_str() < "class");
            attributes.insert(at, ("class".to_owned(), classes));
        }
        OpenTag {
            name: inner.name.clone(),
            attributes,
            raw_content: inner.raw_content,
        }
    }

    pub(crate) fn child_at(&self, index: usize) -> Option<Child> {
        self.inner.borrow().children.get(index).cloned()
    }
}

fn class_value(classes: &BTreeSet<String>) -> Option<AttrValue> {
    if classes.is_empty() {
        return None;
    }
    let joined = classes.iter().map(String::as_str).collect::<Vec<_>>().join(" ");
    Some(AttrValue::Text(joined))
}

/// Short form: `<div id="x">...</div>` with children, `<div/>` without.
/// Lazy attributes show as `<lazy>` and are not invoked.
impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(children) = self.inner.try_borrow().map(|inner| inner.children.len()) else {
            return f.write_str("<borrowed tag>");
        };

        let open = self.open_tag();
        write!(f, "<{}", open.name)?;
        for (key, value) in &open.attributes {
            match value {
                AttrValue::Bool(true) => write!(f, " {key}")?,
                AttrValue::Bool(false) | AttrValue::Absent => {}
                AttrValue::Lazy(_) => write!(f, " {key}=<lazy>")?,
                AttrValue::Text(_) | AttrValue::Style(_) => {
                    let text = value.as_text().unwrap_or_default();
                    write!(f, " {key}=\"{}\"", escape_attr(&text))?;
                }
            }
        }
        if children == 0 {
            f.write_str("/>")
        } else {
            write!(f, ">...</{}>", open.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ABSENT;

    #[test]
    fn test_new_maps_underscores() {
        assert_eq!(Tag::new("my_custom_tag").name(), "my-custom-tag");
    }

    #[test]
    #[should_panic(expected = "tag name cannot be empty")]
    fn test_new_rejects_empty_name() {
        let _ = Tag::new("");
    }

    #[test]
    fn test_raw_content_and_void_flags() {
        assert!(Tag::new("script").is_raw_content());
        assert!(Tag::new("style").is_raw_content());
        assert!(!Tag::new("div").is_raw_content());
        assert!(Tag::new("meta").is_void());
        assert!(!Tag::new("p").is_void());
    }

    #[test]
    fn test_normalize_attr_key() {
        assert_eq!(normalize_attr_key("class_"), "class");
        assert_eq!(normalize_attr_key("for_"), "for");
        assert_eq!(normalize_attr_key("data_id"), "data-id");
        assert_eq!(normalize_attr_key("aria_label_"), "aria-label");
        assert_eq!(normalize_attr_key("_"), "-");
        assert_eq!(normalize_attr_key("id"), "id");
    }

    #[test]
    fn test_attribute_round_trip() {
        let tag = Tag::new("div").attr("id", "main");
        assert_eq!(tag.get_attribute("id"), Some(AttrValue::from("main")));
        assert!(tag.has_attribute("id"));

        tag.set_attribute("custom_attr", " custom value ").unwrap();
        assert_eq!(
            tag.get_attribute("custom_attr"),
            Some(AttrValue::from(" custom value "))
        );

        assert_eq!(tag.delete_attribute("id"), Some(AttrValue::from("main")));
        assert_eq!(tag.get_attribute("id"), None);
    }

    #[test]
    fn test_class_alias_shares_class_set() {
        let tag = Tag::new("div");
        tag.set_attribute("classes", "foo bar foo").unwrap();

        let expected: BTreeSet<String> = ["bar", "foo"].iter().map(|s| (*s).to_owned()).collect();
        assert_eq!(tag.classes(), expected);
        assert_eq!(tag.get_attribute("class"), Some(AttrValue::from("bar foo")));

        tag.set_attribute("class", false).unwrap();
        assert!(tag.classes().is_empty());
        assert_eq!(tag.get_attribute("classes"), None);
    }

    #[test]
    fn test_class_alias_rejects_other_values() {
        let tag = Tag::new("div");
        let err = tag.set_attribute("class", true).unwrap_err();
        assert!(
            matches!(&err, Error::InvalidAttributeType { key, found: "boolean", .. } if key == "class"),
            "unexpected error: {err:?}"
        );

        let err = tag.set_attribute("classes", AttrValue::lazy(|| "x")).unwrap_err();
        assert!(matches!(err, Error::InvalidAttributeType { found: "callable", .. }));
    }

    #[test]
    fn test_set_classes_inputs() {
        let tag = Tag::new("div");

        tag.set_classes("foo bar");
        assert_eq!(tag.classes().len(), 2);

        tag.set_classes(["a", "b", "a"]);
        assert_eq!(tag.classes().into_iter().collect::<Vec<_>>(), ["a", "b"]);

        tag.set_classes(vec!["x".to_owned()]);
        assert_eq!(tag.classes().into_iter().collect::<Vec<_>>(), ["x"]);

        let set: HashSet<&str> = ["m", "n"].into_iter().collect();
        tag.set_classes(set);
        assert_eq!(tag.classes().into_iter().collect::<Vec<_>>(), ["m", "n"]);
    }

    #[test]
    fn test_add_and_remove_class() {
        let tag = Tag::new("div").class("one two");
        tag.add_class("three");
        assert!(tag.remove_class("two"));
        assert!(!tag.remove_class("missing"));
        assert_eq!(
            tag.classes().into_iter().collect::<Vec<_>>(),
            ["one", "three"]
        );
    }

    #[test]
    fn test_builder_attr_normalizes_class_key() {
        let tag = Tag::new("label").attr("class_", "field").attr("for_", "name");
        assert!(tag.classes().contains("field"));
        assert_eq!(tag.get_attribute("for"), Some(AttrValue::from("name")));
    }

    #[test]
    fn test_builder_attr_ignores_invalid_class_value() {
        let tag = Tag::new("div").class("keep").attr("class", true);
        assert!(tag.classes().contains("keep"));
    }

    #[test]
    fn test_open_tag_merges_class_in_sorted_position() {
        let tag = Tag::new("a")
            .attr("href", "/")
            .attr("alt", "x")
            .attr("title", ABSENT)
            .class("link");
        let open = tag.open_tag();
        let keys: Vec<_> = open.attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["alt", "class", "href", "title"]);
    }

    #[test]
    fn test_clone_shares_node() {
        let tag = Tag::new("p");
        let handle = tag.clone();
        handle.append("text");
        assert_eq!(tag.len(), 1);
        assert!(tag.ptr_eq(&handle));
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let original = Tag::new("div")
            .attr("name", "foo")
            .child("text")
            .child(Tag::new("p").child("paragraph"));
        let copy = original.deep_copy();

        copy.set_attribute("name", "bar").unwrap();
        copy.append(Tag::new("span"));
        if let Some(Child::Tag(inner)) = copy.children().get(1) {
            inner.append("changed");
        }

        assert!(!original.ptr_eq(&copy));
        assert_eq!(original.get_attribute("name"), Some(AttrValue::from("foo")));
        assert_eq!(original.len(), 2);
        assert_eq!(copy.len(), 3);
        match original.children().get(1) {
            Some(Child::Tag(inner)) => assert_eq!(inner.len(), 1),
            other => panic!("unexpected child: {other:?}"),
        }
    }

    #[test]
    fn test_debug_repr() {
        assert_eq!(format!("{:?}", Tag::new("div")), "<div/>");
        assert_eq!(format!("{:?}", Tag::new("div").child("Hello")), "<div>...</div>");
        assert_eq!(
            format!("{:?}", Tag::new("input").attr("disabled", true).class("x")),
            r#"<input class="x" disabled/>"#
        );
    }

    #[test]
    fn test_debug_repr_uses_render_attribute_order() {
        let tag = Tag::new("a").attr("href", "/").attr("alt", "x").class("link");
        assert_eq!(
            format!("{tag:?}"),
            r#"<a alt="x" class="link" href="/"/>"#
        );
    }

    #[test]
    fn test_is_valid_name() {
        for name in ["div", "my-widget", "data-id", "aria-label", "x:y", "@click", "v.model"] {
            assert!(is_valid_name(name), "{name}");
        }
        for name in ["", "a b", "a\tb", "x\"", "x'", "a<", "a>", "a/b", "a=b", "a&b", "a\u{7}"] {
            assert!(!is_valid_name(name), "{name:?}");
        }
    }

    #[test]
    #[should_panic(expected = "invalid tag name")]
    fn test_new_rejects_markup_in_name() {
        let _ = Tag::new("a><img src=x onerror=alert(1)");
    }

    #[test]
    fn test_set_attribute_rejects_markup_in_key() {
        let tag = Tag::new("div");
        let err = tag
            .set_attribute("x\"><script>alert(1)</script><b y", "v")
            .unwrap_err();
        assert!(
            matches!(&err, Error::InvalidAttributeName { tag, .. } if tag == "div"),
            "unexpected error: {err:?}"
        );
        assert!(tag.attributes().is_empty());

        let tag = Tag::new("div").attr("on click", "x").attr("title", "kept");
        assert_eq!(tag.attributes().len(), 1);
        assert!(tag.has_attribute("title"));
    }
}
