//! CLI error types.

use tagz_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Render(#[from] tagz::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
