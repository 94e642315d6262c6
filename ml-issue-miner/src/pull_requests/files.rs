//! Changed files of pull request commits.

use serde::Deserialize;
use serde_json::Value;

/// A file entry of `GET /repos/{owner}/{repo}/commits/{sha}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitFile {
    /// Repository-relative path.
    pub filename: String,
    /// `added`, `modified`, `removed`, `renamed`, ...
    #[serde(default)]
    pub status: String,
}

impl CommitFile {
    /// Whether the file exists after the commit and has the given extension
    /// (compared case-insensitively).
    #[must_use]
    pub fn is_wanted(&self, extension: &str) -> bool {
        if self.status == "removed" {
            return false;
        }
        self.filename
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(extension))
    }

    /// File name with `/` replaced by `*`, so the file can be stored flat
    /// under its commit directory.
    #[must_use]
    pub fn flat_name(&self) -> String {
        self.filename.replace('/', "*")
    }
}

/// Files listed by a commit document. A document without `files` yields none.
#[must_use]
pub fn commit_files(commit: &Value) -> Vec<CommitFile> {
    commit
        .get("files")
        .cloned()
        .and_then(|files| serde_json::from_value(files).ok())
        .unwrap_or_default()
}

/// SHAs of the items of `GET /repos/{owner}/{repo}/pulls/{n}/commits`.
#[must_use]
pub fn commit_shas(commits: &[Value]) -> Vec<String> {
    commits
        .iter()
        .filter_map(|commit| commit.get("sha").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}
