//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading `pipeline.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read pipeline config '{}': {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Pipeline config '{}' is not valid TOML: {source}", path.display())]
    TomlError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A setting parsed but holds an unusable value.
    #[error("Invalid `{key}` in '{}': {message}", path.display())]
    ValidationError {
        path: PathBuf,
        /// Offending TOML key.
        key: &'static str,
        message: String,
    },

    /// `--config` points to a file that does not exist.
    #[error("Pipeline config '{}' not found", path.display())]
    MissingFile { path: PathBuf },
}
