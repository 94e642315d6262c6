//! Row types of the numbered CSV artifacts.

use crate::layout::RepoSlug;
use crate::records::IssueKind;
use serde::{Deserialize, Serialize};

/// An issue together with the same-repository pull requests that reference it.
///
/// Used by the linkage, closed-PR, import and keyword stages, which all keep
/// the same columns and only drop rows (or pull requests).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuePrRow {
    /// Repository the issue belongs to.
    pub project: RepoSlug,
    /// Web URL of the issue.
    pub issue_url: String,
    /// Issue number.
    pub issue_number: u64,
    /// Pull request numbers, space-separated in the CSV.
    #[serde(with = "pull_list")]
    pub pull_requests: Vec<u64>,
    /// Issue title.
    pub title: String,
}

/// An issue of the balanced sample, tagged ML or non-ML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedIssueRow {
    pub project: RepoSlug,
    pub issue_url: String,
    pub issue_number: u64,
    #[serde(with = "pull_list")]
    pub pull_requests: Vec<u64>,
    pub category: IssueKind,
}

/// An issue with the line counts of its closing pull request and its fix duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasuredIssueRow {
    pub project: RepoSlug,
    pub issue_url: String,
    pub issue_number: u64,
    /// The pull request the line counts were taken from.
    pub pull_request: u64,
    pub lines_added: u64,
    pub lines_deleted: u64,
    /// Whole days between issue creation and closure.
    pub fix_duration_days: i64,
    /// Present once the issue is part of the balanced sample.
    pub category: Option<IssueKind>,
}

/// A row of the final analysis table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalRow {
    pub project: RepoSlug,
    pub issue_url: String,
    pub issue_number: u64,
    pub pr_url: String,
    /// Size of fix: absolute difference between added and deleted lines.
    pub line_change: u64,
    pub fix_duration_days: i64,
    pub category: IssueKind,
}

/// Merge commit of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeCommitRow {
    pub project: RepoSlug,
    pub pull_request: u64,
    pub merge_commit_sha: String,
}

/// Number of genuine issues (pull requests removed) in a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCountRow {
    pub project: RepoSlug,
    pub issues: usize,
}

/// Serde adapter for space-separated pull request numbers.
pub(crate) mod pull_list {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(numbers: &[u64], serializer: S) -> Result<S::Ok, S::Error> {
        let joined = numbers
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        serializer.serialize_str(&joined)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u64>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.split_whitespace()
            .map(|part| part.parse::<u64>().map_err(de::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{read_csv, write_csv};
    use tempfile::TempDir;

    #[test]
    fn pull_requests_are_space_separated() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("issue_pr.csv");
        let rows = vec![IssuePrRow {
            project: "sktime/sktime".parse().unwrap(),
            issue_url: "https://github.com/sktime/sktime/issues/10".to_string(),
            issue_number: 10,
            pull_requests: vec![198, 253],
            title: "Fix forecaster, again".to_string(),
        }];

        write_csv(&path, &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(",198 253,"));
        assert_eq!(read_csv::<IssuePrRow>(&path).unwrap(), rows);
    }

    #[test]
    fn missing_category_reads_as_none() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("measured.csv");
        std::fs::write(
            &path,
            "project,issue_url,issue_number,pull_request,\
             lines_added,lines_deleted,fix_duration_days,category\n\
             a/b,https://github.com/a/b/issues/1,1,2,120,45,4,\n\
             a/b,https://github.com/a/b/issues/3,3,4,1,1,0,non-ml\n",
        )
        .unwrap();

        let rows: Vec<MeasuredIssueRow> = read_csv(&path).unwrap();

        assert_eq!(rows[0].category, None);
        assert_eq!(rows[1].category, Some(IssueKind::NonMl));
    }
}
