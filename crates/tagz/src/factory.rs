//! Tag creation by name, with per-tag defaults.

use std::collections::HashMap;

use crate::tag::Tag;
use crate::value::{AttrValue, Child};

/// Children and attributes given to every tag of one name.
#[derive(Debug, Clone, Default)]
pub struct TagDefaults {
    children: Vec<Child>,
    attributes: Vec<(String, AttrValue)>,
}

impl TagDefaults {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a default child. Tags and fragments are deep-copied into each
    /// new tag.
    #[must_use]
    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Add a default attribute. The key is normalized like [`Tag::attr`].
    #[must_use]
    pub fn attr(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.attributes.push((key.to_owned(), value.into()));
        self
    }

    fn apply(&self, tag: Tag) -> Tag {
        let tag = tag.with_children(self.children.iter().map(Child::deep_copy));
        self.attributes
            .iter()
            .fold(tag, |tag, (key, value)| tag.attr(key, value.clone()))
    }
}

/// Creates tags by name, applying registered defaults.
///
/// # Example
///
/// ```
/// use tagz::{Html, Render, TagDefaults};
///
/// let html = Html::new().with_defaults("custom_tag", TagDefaults::new().child("Hello"));
/// let tag = html.tag("custom_tag");
/// assert_eq!(tag.render().unwrap(), "<custom-tag>Hello</custom-tag>");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Html {
    defaults: HashMap<String, TagDefaults>,
}

impl Html {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register defaults for tags named `name`, replacing earlier ones.
    #[must_use]
    pub fn with_defaults(mut self, name: &str, defaults: TagDefaults) -> Self {
        self.defaults.insert(normalize_tag_name(name), defaults);
        self
    }

    /// Defaults registered for `name`.
    #[must_use]
    pub fn defaults(&self, name: &str) -> Option<&TagDefaults> {
        self.defaults.get(&normalize_tag_name(name))
    }

    /// Create a tag. The name is lower-cased and underscores become hyphens.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty or not a valid tag name.
    #[must_use]
    pub fn tag(&self, name: &str) -> Tag {
        let name = normalize_tag_name(name);
        let tag = Tag::new(name.as_str());
        match self.defaults.get(&name) {
            Some(defaults) => defaults.apply(tag),
            None => tag,
        }
    }
}

/// Create a tag without defaults; the name is normalized like [`Html::tag`].
///
/// # Panics
///
/// Panics if `name` is empty or not a valid tag name.
#[must_use]
pub fn tag(name: &str) -> Tag {
    Tag::new(normalize_tag_name(name))
}

fn normalize_tag_name(name: &str) -> String {
    name.to_lowercase().replace('_', "-")
}
