//! Runner error types.

use crate::config::ConfigError;
use crate::dataset::DatasetError;
use crate::github::FetchError;
use crate::measurement::MeasureError;
use thiserror::Error;

/// Errors that abort a stage.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Configuration loading errors.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A required input is missing or an output cannot be written.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// GitHub client initialization errors.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Measurement errors that abort the stage.
    #[error(transparent)]
    Measure(#[from] MeasureError),
}
