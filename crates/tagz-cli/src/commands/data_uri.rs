//! `tagz data-uri` command implementation.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;

use crate::error::CliError;

/// Arguments for the data-uri command.
#[derive(Args)]
pub(crate) struct DataUriArgs {
    /// File to encode.
    file: PathBuf,

    /// Media type (default: guessed from the file extension).
    #[arg(short, long)]
    media_type: Option<String>,
}

impl DataUriArgs {
    /// Execute the data-uri command.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or stdout is closed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let uri = tagz::open_data_uri(&self.file, self.media_type.as_deref())?;
        tracing::info!(
            path = %self.file.display(),
            length = uri.len(),
            "Encoded data URI"
        );
        writeln!(io::stdout().lock(), "{uri}")?;
        Ok(())
    }
}
