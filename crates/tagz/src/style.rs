//! Inline CSS declarations and style sheets.
//!
//! [`Style`] is a flat property map used as a `style` attribute value or as
//! the body of a [`StyleSheet`] rule. Neither type parses CSS; values are
//! stored as given.

use std::collections::BTreeMap;
use std::fmt;

/// CSS declarations, rendered as `prop: value;` pairs sorted by property.
///
/// Underscores in property names become hyphens, so `text_align` and
/// `text-align` name the same property.
///
/// # Example
///
/// ```
/// use tagz::Style;
///
/// let style = Style::new().with("text_align", "center").with("padding", 0);
/// assert_eq!(style.to_string(), "padding: 0; text-align: center;");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    properties: BTreeMap<String, String>,
}

impl Style {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property in builder style.
    #[must_use]
    pub fn with(mut self, property: &str, value: impl fmt::Display) -> Self {
        self.set(property, value);
        self
    }

    /// Set a property, replacing any previous value.
    pub fn set(&mut self, property: &str, value: impl fmt::Display) {
        self.properties
            .insert(normalize_property(property), value.to_string());
    }

    #[must_use]
    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties
            .get(&normalize_property(property))
            .map(String::as_str)
    }

    /// Remove a property, returning its value.
    pub fn remove(&mut self, property: &str) -> Option<String> {
        self.properties.remove(&normalize_property(property))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (property, value)) in self.properties.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{property}: {value};")?;
        }
        Ok(())
    }
}

impl<K: AsRef<str>, V: fmt::Display> FromIterator<(K, V)> for Style {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut style = Self::new();
        for (property, value) in iter {
            style.set(property.as_ref(), value);
        }
        style
    }
}

fn normalize_property(property: &str) -> String {
    property.replace('_', "-")
}

/// A selector group such as `body` or `div, a, table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector(Vec<String>);

impl Selector {
    /// The individual selectors of the group.
    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

impl From<&str> for Selector {
    fn from(selector: &str) -> Self {
        Self(vec![selector.to_owned()])
    }
}

impl From<String> for Selector {
    fn from(selector: String) -> Self {
        Self(vec![selector])
    }
}

impl<const N: usize> From<[&str; N]> for Selector {
    fn from(selectors: [&str; N]) -> Self {
        Self(selectors.iter().map(|s| (*s).to_owned()).collect())
    }
}

impl From<&[&str]> for Selector {
    fn from(selectors: &[&str]) -> Self {
        Self(selectors.iter().map(|s| (*s).to_owned()).collect())
    }
}

impl From<Vec<String>> for Selector {
    fn from(selectors: Vec<String>) -> Self {
        Self(selectors)
    }
}

/// Rule blocks keyed by selector group, kept in insertion order.
///
/// # Example
///
/// ```
/// use tagz::{Style, StyleSheet};
///
/// let mut sheet = StyleSheet::new();
/// sheet.insert("body", Style::new().with("color", "#fff"));
/// sheet.insert(["div", "a"], Style::new().with("margin", 0));
/// assert_eq!(sheet.to_string(), "body {color: #fff;}\ndiv, a {margin: 0;}");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    rules: Vec<(Selector, Style)>,
}

impl StyleSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule. An existing rule for the same selector group is replaced
    /// in place and its old style returned.
    pub fn insert(&mut self, selector: impl Into<Selector>, style: Style) -> Option<Style> {
        let selector = selector.into();
        if let Some((_, existing)) = self.rules.iter_mut().find(|(s, _)| *s == selector) {
            return Some(std::mem::replace(existing, style));
        }
        self.rules.push((selector, style));
        None
    }

    #[must_use]
    pub fn get(&self, selector: impl Into<Selector>) -> Option<&Style> {
        let selector = selector.into();
        self.rules
            .iter()
            .find(|(s, _)| *s == selector)
            .map(|(_, style)| style)
    }

    #[must_use]
    pub fn get_mut(&mut self, selector: impl Into<Selector>) -> Option<&mut Style> {
        let selector = selector.into();
        self.rules
            .iter_mut()
            .find(|(s, _)| *s == selector)
            .map(|(_, style)| style)
    }

    pub fn remove(&mut self, selector: impl Into<Selector>) -> Option<Style> {
        let selector = selector.into();
        let index = self.rules.iter().position(|(s, _)| *s == selector)?;
        Some(self.rules.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Selector, &Style)> {
        self.rules.iter().map(|(selector, style)| (selector, style))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

impl fmt::Display for StyleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (selector, style)) in self.rules.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{selector} {{{style}}}")?;
        }
        Ok(())
    }
}
