//! Base64 `data:` URIs for embedding files in markup.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;

use crate::error::Result;

/// Build `data:{media_type};base64,{payload}` from raw bytes.
///
/// ```
/// assert_eq!(
///     tagz::data_uri(b"hello world", "text/plain"),
///     "data:text/plain;base64,aGVsbG8gd29ybGQ="
/// );
/// ```
#[must_use]
pub fn data_uri(data: &[u8], media_type: &str) -> String {
    let base64 = BASE64_STANDARD.encode(data);
    format!("data:{media_type};base64,{base64}")
}

/// Read `reader` to the end and encode it as a data URI.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) if reading fails.
pub fn read_data_uri(mut reader: impl Read, media_type: &str) -> Result<String> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    tracing::debug!(bytes = data.len(), media_type, "Encoding data URI");
    Ok(data_uri(&data, media_type))
}

/// Encode a file as a data URI.
///
/// Without an explicit `media_type` it is guessed from the file extension,
/// falling back to `application/octet-stream`.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) if the file cannot be read.
pub fn open_data_uri(path: impl AsRef<Path>, media_type: Option<&str>) -> Result<String> {
    let path = path.as_ref();
    let media_type = media_type.map_or_else(|| guess_media_type(path), str::to_owned);
    let file = File::open(path)?;
    read_data_uri(BufReader::new(file), &media_type)
}

/// Media type for a path, from its extension.
#[must_use]
pub fn guess_media_type(path: impl AsRef<Path>) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_owned()
}
