//! GitHub access error types.

use crate::dataset::DatasetError;
use thiserror::Error;

/// Errors raised while talking to the GitHub API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHubError(#[from] octocrab::Error),

    /// A downloaded document could not be saved or reloaded.
    #[error(transparent)]
    Store(#[from] DatasetError),

    /// The API answered with a document of an unexpected shape.
    #[error("Unexpected response from '{route}': {message}")]
    UnexpectedShape { route: String, message: String },
}
