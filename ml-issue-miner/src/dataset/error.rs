//! Dataset I/O error types.

use thiserror::Error;

/// Errors that can occur while reading or writing pipeline artifacts.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Failed to read or write a file.
    #[error("Failed to access '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read or write CSV content.
    #[error("Invalid CSV in '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// Failed to parse or serialize a JSON document.
    #[error("Invalid JSON in '{path}': {source}")]
    JsonError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Content was readable but did not have the expected shape.
    #[error("Malformed content in '{path}': {message}")]
    Malformed { path: String, message: String },

    /// A required input artifact does not exist.
    #[error("Missing required file: {path}")]
    MissingFile { path: String },
}

impl DatasetError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn csv(path: &std::path::Path, source: csv::Error) -> Self {
        Self::CsvError {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn json(path: &std::path::Path, source: serde_json::Error) -> Self {
        Self::JsonError {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn malformed(path: &std::path::Path, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.display().to_string(),
            message: message.into(),
        }
    }
}
