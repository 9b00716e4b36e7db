//! Configuration management for tagz.
//!
//! Parses `tagz.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [render]
//! pretty = true
//! indent = "  "
//! chunk_size = 8192
//! max_depth = 256
//!
//! [page]
//! lang = "en"
//! ```
//!
//! CLI settings can be applied during load via [`CliSettings`].

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tagz::RenderOptions;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override pretty output.
    pub pretty: Option<bool>,
    /// Override indentation unit.
    pub indent: Option<String>,
    /// Override chunk size for streamed output.
    pub chunk_size: Option<usize>,
    /// Override page language.
    pub lang: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "tagz.toml";

/// Default chunk size for streamed output, in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serializer configuration.
    pub render: RenderConfig,
    /// Page wrapper configuration.
    pub page: PageConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Serializer configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// `pretty`, `indent` and `max_depth`.
    #[serde(flatten)]
    pub options: RenderOptions,
    /// Characters per chunk when streaming.
    pub chunk_size: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            options: RenderOptions::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Page wrapper configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Value of the `lang` attribute on `<html>`.
    pub lang: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `tagz.toml` in current directory and parents,
    /// falling back to defaults.
    ///
    /// CLI settings are applied after loading, so CLI arguments take
    /// precedence over config file values. The result is validated.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails
    /// or a value is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let discovered = std::env::current_dir()
            .ok()
            .and_then(|cwd| discover_config(&cwd));
        Self::load_with(config_path, discovered.as_deref(), cli_settings)
    }

    fn load_with(
        config_path: Option<&Path>,
        discovered: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = discovered {
            Self::load_from_file(discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(pretty) = settings.pretty {
            self.render.options.pretty = pretty;
        }
        if let Some(indent) = &settings.indent {
            self.render.options.indent.clone_from(indent);
        }
        if let Some(chunk_size) = settings.chunk_size {
            self.render.chunk_size = chunk_size;
        }
        if let Some(lang) = &settings.lang {
            self.page.lang = Some(lang.clone());
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_render()?;
        self.validate_page()?;
        Ok(())
    }

    fn validate_render(&self) -> Result<(), ConfigError> {
        if self.render.chunk_size == 0 {
            return Err(ConfigError::Validation(
                "render.chunk_size must be greater than 0".to_owned(),
            ));
        }
        if !self.render.options.indent.chars().all(char::is_whitespace) {
            return Err(ConfigError::Validation(
                "render.indent must contain only whitespace".to_owned(),
            ));
        }
        if self.render.options.max_depth == Some(0) {
            return Err(ConfigError::Validation(
                "render.max_depth must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_page(&self) -> Result<(), ConfigError> {
        if let Some(lang) = &self.page.lang
            && lang.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "page.lang cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Search for `tagz.toml` in `start` and its parents.
#[must_use]
pub fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}
