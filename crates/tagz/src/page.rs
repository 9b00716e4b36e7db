//! HTML5 document wrapper.

use crate::error::Result;
use crate::render::{Fragments, Render, RenderOptions};
use crate::tag::Tag;
use crate::value::{AttrValue, Child};

/// An HTML5 document: `<html>` with a `<head>` and a `<body>`, rendered
/// after the doctype line.
///
/// The three tags are shared handles, so changes made through
/// [`head`](Self::head) or [`body`](Self::body) show up in the next render.
///
/// # Example
///
/// ```
/// use tagz::{Page, Tag};
///
/// let page = Page::new(Tag::new("body").child(Tag::new("h1").child("Hi")))
///     .with_lang("en")
///     .push_head(Tag::new("title").child("Demo"));
///
/// assert_eq!(
///     page.to_html5(false).unwrap(),
///     "<!doctype html>\n<html lang=\"en\"><head><title>Demo</title></head>\
///      <body><h1>Hi</h1></body></html>"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Page {
    html: Tag,
    head: Tag,
    body: Tag,
}

impl Page {
    /// Line written before the `<html>` element.
    pub const PREAMBLE: &'static str = "<!doctype html>\n";

    /// Page around `body`, which should be a `<body>` tag.
    #[must_use]
    pub fn new(body: Tag) -> Self {
        let head = Tag::new("head");
        let html = Tag::new("html").child(&head).child(&body);
        Self { html, head, body }
    }

    /// Set the `lang` attribute of `<html>`.
    #[must_use]
    pub fn with_lang(self, lang: &str) -> Self {
        self.set_html_attribute("lang", lang);
        self
    }

    /// Set another attribute of `<html>`.
    #[must_use]
    pub fn with_html_attr(self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.set_html_attribute(key, value);
        self
    }

    /// Append elements to `<head>`.
    #[must_use]
    pub fn with_head<I>(self, elements: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Child>,
    {
        self.head.extend(elements);
        self
    }

    /// Append one element to `<head>`.
    #[must_use]
    pub fn push_head(self, element: impl Into<Child>) -> Self {
        self.head.append(element);
        self
    }

    #[must_use]
    pub fn head(&self) -> &Tag {
        &self.head
    }

    #[must_use]
    pub fn body(&self) -> &Tag {
        &self.body
    }

    /// The `<html>` element, without the doctype line.
    #[must_use]
    pub fn html(&self) -> &Tag {
        &self.html
    }

    /// The `lang` attribute of `<html>`, if set to text.
    #[must_use]
    pub fn lang(&self) -> Option<String> {
        match self.html.get_attribute("lang") {
            Some(AttrValue::Text(lang)) => Some(lang),
            _ => None,
        }
    }

    /// Render the whole document.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while resolving the tree.
    pub fn to_html5(&self, pretty: bool) -> Result<String> {
        let options = if pretty {
            RenderOptions::pretty()
        } else {
            RenderOptions::dense()
        };
        self.to_html(&options)
    }

    fn set_html_attribute(&self, key: &str, value: impl Into<AttrValue>) {
        // Fails for malformed keys and non-text class values.
        if let Err(err) = self.html.set_attribute(key, value) {
            tracing::warn!(error = %err, "Ignoring <html> attribute");
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Tag::new("body"))
    }
}

impl Render for Page {
    fn iter_string(&self, options: &RenderOptions) -> Fragments {
        Fragments::new(Child::Tag(self.html.clone()), options).with_preamble(Self::PREAMBLE)
    }
}
