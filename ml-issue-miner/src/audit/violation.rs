//! Problems reported by the dataset audit.

use crate::layout::RepoSlug;
use crate::records::IssueKind;
use std::fmt;

/// A property the final dataset fails to satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The same issue appears more than once.
    DuplicateIssue { project: RepoSlug, issue_number: u64 },

    /// ML and non-ML row counts differ.
    Unbalanced { ml: usize, non_ml: usize },

    /// A class does not have the expected number of rows.
    ClassSize {
        kind: IssueKind,
        expected: usize,
        actual: usize,
    },

    /// Closing time before creation time.
    NegativeDuration { issue_url: String, days: i64 },

    /// The tabulated line change is not |added - deleted|.
    LineChangeMismatch {
        issue_url: String,
        expected: u64,
        actual: u64,
    },

    /// A tabulated row has no measured counterpart.
    MissingMeasurement { issue_url: String },

    /// A project contributes ML issues but no non-ML issue.
    ProjectWithoutNonMl { project: RepoSlug },

    /// The labeling sheet disagrees with the dataset category.
    LabelMismatch {
        issue_url: String,
        labeled: IssueKind,
        dataset: IssueKind,
    },

    /// A dataset issue is missing from the labeling sheet.
    Unlabeled { issue_url: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateIssue {
                project,
                issue_number,
            } => write!(f, "duplicate issue {project}#{issue_number}"),
            Self::Unbalanced { ml, non_ml } => {
                write!(f, "unbalanced classes: {ml} ml vs {non_ml} non-ml")
            }
            Self::ClassSize {
                kind,
                expected,
                actual,
            } => write!(f, "expected {expected} {kind} issues, found {actual}"),
            Self::NegativeDuration { issue_url, days } => {
                write!(f, "negative fix duration {days} for {issue_url}")
            }
            Self::LineChangeMismatch {
                issue_url,
                expected,
                actual,
            } => write!(
                f,
                "line change of {issue_url} is {actual}, expected {expected}"
            ),
            Self::MissingMeasurement { issue_url } => {
                write!(f, "no measured row for {issue_url}")
            }
            Self::ProjectWithoutNonMl { project } => {
                write!(f, "project {project} has ML issues but no non-ML issue")
            }
            Self::LabelMismatch {
                issue_url,
                labeled,
                dataset,
            } => write!(f, "{issue_url} labeled {labeled} but sampled as {dataset}"),
            Self::Unlabeled { issue_url } => write!(f, "{issue_url} is not labeled"),
        }
    }
}
