//! CLI command implementations.

pub(crate) mod data_uri;
pub(crate) mod page;

pub(crate) use data_uri::DataUriArgs;
pub(crate) use page::PageArgs;
