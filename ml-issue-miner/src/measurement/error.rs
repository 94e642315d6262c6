//! Measurement error types.

use crate::dataset::DatasetError;
use thiserror::Error;

/// Errors that can occur while measuring a fix.
#[derive(Debug, Error)]
pub enum MeasureError {
    /// Reading or writing an artifact failed.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// `gh` could not be run or exited with an error.
    #[error("gh pr view failed for {repository}#{pull}: {message}")]
    GhCliFailed {
        repository: String,
        pull: u64,
        message: String,
    },

    /// `gh` printed something other than the requested JSON fields.
    #[error("Unexpected gh output for {repository}#{pull}: {source}")]
    GhCliOutput {
        repository: String,
        pull: u64,
        #[source]
        source: serde_json::Error,
    },

    /// The saved pull request document carries no line counts.
    #[error("Pull request {repository}#{pull} has no line counts")]
    MissingLineCounts { repository: String, pull: u64 },
}
