//! Error types for building and rendering tag trees.

use std::fmt;

/// Error returned by a lazy child or attribute callable.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Where in the tree a value was being resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Attribute `key` of the tag named `tag`.
    Attribute { tag: String, key: String },
    /// Child number `index` of `parent` (a tag name, or `#fragment`).
    Child { parent: String, index: usize },
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute { tag, key } => write!(f, "attribute `{key}` of <{tag}>"),
            Self::Child { parent, index } if parent.starts_with('#') => {
                write!(f, "child #{index} of {parent}")
            }
            Self::Child { parent, index } => write!(f, "child #{index} of <{parent}>"),
        }
    }
}

/// Tag tree error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An attribute (or the class-set) was given a value it cannot hold.
    #[error("invalid value for attribute `{key}` of <{tag}>: {found}")]
    InvalidAttributeType {
        tag: String,
        key: String,
        found: &'static str,
    },
    /// An attribute key that cannot be written as an HTML attribute name.
    #[error("invalid attribute name {key:?} for <{tag}>")]
    InvalidAttributeName { tag: String, key: String },
    /// A lazy child or attribute failed; `source` is the callable's own error.
    #[error("callable for {location} failed: {source}")]
    Callable {
        location: Location,
        #[source]
        source: BoxError,
    },
    /// A child resolved to a value with no text form.
    #[error("{location} cannot be rendered: {found}")]
    UnrenderableChildType { location: Location, found: &'static str },
    /// Nesting went past the configured depth limit.
    #[error("render depth exceeded {limit} at <{tag}>, cycle suspected")]
    CycleSuspected { tag: String, limit: usize },
    /// I/O error from a writer sink or a data URI source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
