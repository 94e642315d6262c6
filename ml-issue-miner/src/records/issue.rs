//! Issue record.

use crate::dataset::{read_json, DatasetError};
use crate::layout::{DataLayout, RepoSlug};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A downloaded issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRecord {
    /// Repository the issue belongs to.
    pub repository: RepoSlug,
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    /// `open` or `closed`.
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Label names.
    pub labels: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct IssueDocument {
    number: u64,
    title: String,
    body: Option<String>,
    state: String,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    labels: Vec<LabelDocument>,
}

#[derive(Debug, Deserialize)]
struct LabelDocument {
    name: String,
}

impl IssueRecord {
    /// Loads the saved issue document of `repository#number`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the document is missing or malformed.
    pub fn load(
        layout: &DataLayout,
        repository: &RepoSlug,
        number: u64,
    ) -> Result<Self, DatasetError> {
        let doc: IssueDocument = read_json(&layout.issue_file(repository, number))?;
        Ok(Self {
            repository: repository.clone(),
            number: doc.number,
            title: doc.title,
            body: doc.body,
            state: doc.state,
            created_at: doc.created_at,
            closed_at: doc.closed_at,
            labels: doc.labels.into_iter().map(|label| label.name).collect(),
        })
    }

    /// Returns true if the issue has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state == "closed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::write_json;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn loads_saved_issue() {
        let temp = TempDir::new().unwrap();
        let layout = DataLayout::new(temp.path());
        let slug = RepoSlug::new("a", "b").unwrap();
        write_json(
            &layout.issue_file(&slug, 7),
            &json!({
                "number": 7,
                "title": "GPU memory leak",
                "body": null,
                "state": "closed",
                "created_at": "2022-01-01T00:00:00Z",
                "closed_at": "2022-01-05T00:00:00Z",
                "labels": [{"name": "bug"}],
                "user": {"login": "someone"}
            }),
        )
        .unwrap();

        let issue = IssueRecord::load(&layout, &slug, 7).unwrap();

        assert!(issue.is_closed());
        assert_eq!(issue.labels, vec!["bug".to_string()]);
        assert_eq!(issue.repository, slug);
    }
}
