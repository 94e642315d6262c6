//! Per-record outcome types.

/// Result of processing a single record (repository, issue, or pull request).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// An output row or artifact was produced.
    Written,

    /// The record was dropped by a filter or its artifact already existed.
    Skipped {
        /// Reason for skipping.
        reason: String,
    },

    /// Processing failed; the stage continued with the next record.
    Failed {
        /// Error message.
        error: String,
    },
}

impl RecordOutcome {
    /// Shorthand for [`RecordOutcome::Skipped`].
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`RecordOutcome::Failed`].
    pub fn failed(error: impl ToString) -> Self {
        Self::Failed {
            error: error.to_string(),
        }
    }
}
