//! Repository metadata record.

use crate::layout::RepoSlug;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repository metadata as tabulated in the repository CSVs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    /// Repository in `owner/name` form.
    pub name: RepoSlug,
    /// Web URL of the repository.
    pub url: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Stargazer count.
    pub stars: u64,
    /// Last push; absent for repositories that never received a push.
    pub pushed_at: Option<DateTime<Utc>>,
    /// Last update of the repository object.
    pub updated_at: DateTime<Utc>,
}

/// Subset of the `GET /repos/{owner}/{repo}` response used by the pipeline.
#[derive(Debug, Deserialize)]
struct RepositoryDocument {
    full_name: String,
    html_url: String,
    created_at: DateTime<Utc>,
    stargazers_count: u64,
    pushed_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl RepositoryRecord {
    /// Builds a record from a repository metadata document.
    ///
    /// # Errors
    ///
    /// Returns a message describing the problem if the document lacks a
    /// required field or carries a malformed `full_name`.
    pub fn from_document(document: &serde_json::Value) -> Result<Self, String> {
        let doc = RepositoryDocument::deserialize(document).map_err(|e| e.to_string())?;
        let name = doc.full_name.parse::<RepoSlug>().map_err(|e| e.to_string())?;
        Ok(Self {
            name,
            url: doc.html_url,
            created_at: doc.created_at,
            stars: doc.stargazers_count,
            pushed_at: doc.pushed_at,
            updated_at: doc.updated_at,
        })
    }
}
