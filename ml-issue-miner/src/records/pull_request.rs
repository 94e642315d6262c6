//! Pull request record.

use crate::dataset::{read_json, DatasetError};
use crate::layout::{DataLayout, RepoSlug};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A downloaded pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRecord {
    /// Repository the pull request belongs to.
    pub repository: RepoSlug,
    pub number: u64,
    /// `open` or `closed`.
    pub state: String,
    pub merged_at: Option<DateTime<Utc>>,
    pub merge_commit_sha: Option<String>,
    pub changed_files: Option<u64>,
    pub additions: Option<u64>,
    pub deletions: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PullRequestDocument {
    number: u64,
    state: String,
    merged_at: Option<DateTime<Utc>>,
    merge_commit_sha: Option<String>,
    changed_files: Option<u64>,
    additions: Option<u64>,
    deletions: Option<u64>,
}

impl PullRequestRecord {
    /// Loads the saved pull request document of `repository#number`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the document is missing or malformed.
    pub fn load(
        layout: &DataLayout,
        repository: &RepoSlug,
        number: u64,
    ) -> Result<Self, DatasetError> {
        let doc: PullRequestDocument = read_json(&layout.pull_file(repository, number))?;
        Ok(Self {
            repository: repository.clone(),
            number: doc.number,
            state: doc.state,
            merged_at: doc.merged_at,
            merge_commit_sha: doc.merge_commit_sha,
            changed_files: doc.changed_files,
            additions: doc.additions,
            deletions: doc.deletions,
        })
    }

    /// Returns true if the pull request is closed and carries a merge timestamp.
    #[must_use]
    pub fn is_merged(&self) -> bool {
        self.state == "closed" && self.merged_at.is_some()
    }
}
