//! Build HTML in code and serialize it.
//!
//! A document is a tree of [`Tag`] handles. Tags are shared and mutable:
//! a tag can be appended to several parents, and changes made after
//! appending show up in the next render. Children and attribute values may
//! be lazy callables that run once per render.
//!
//! Rendering goes through the [`Render`] trait, either buffered
//! ([`Render::to_html`]) or incrementally by fragment, line or chunk. All
//! modes produce the same markup.
//!
//! # Example
//!
//! ```
//! use tagz::html::{a, body, p};
//! use tagz::{Child, Page, Render, Style};
//!
//! let counter = std::cell::Cell::new(0);
//! let greeting = Child::lazy(move || {
//!     counter.set(counter.get() + 1);
//!     format!("render #{}", counter.get())
//! });
//!
//! let page = Page::new(
//!     body()
//!         .child(p().attr("style", Style::new().with("color", "red")).child(greeting))
//!         .child(a().attr("href", "/").child("home")),
//! )
//! .with_lang("en");
//!
//! assert_eq!(
//!     page.to_html5(false).unwrap(),
//!     "<!doctype html>\n<html lang=\"en\"><head></head><body>\
//!      <p style=\"color: red;\">render #1</p><a href=\"/\">home</a></body></html>"
//! );
//! ```

mod data_uri;
mod error;
mod escape;
mod factory;
mod fragment;
pub mod html;
mod page;
mod render;
mod style;
mod tag;
mod value;

pub use data_uri::{data_uri, guess_media_type, open_data_uri, read_data_uri};
pub use error::{BoxError, Error, Location, Result};
pub use escape::{escape_attr, escape_text};
pub use factory::{Html, TagDefaults, tag};
pub use fragment::Fragment;
pub use page::Page;
pub use render::{Chunks, Fragments, Lines, Render, RenderOptions};
pub use style::{Selector, Style, StyleSheet};
pub use tag::{
    IntoClasses, Tag, is_raw_content_element, is_valid_name, is_void_element, normalize_attr_key,
};
pub use value::{ABSENT, Absent, AttrValue, Child, Lazy, Raw};
