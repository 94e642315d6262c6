//! Records read from GitHub API documents and labeling sheets.

mod issue;
mod labeled;
mod pull_request;
mod repository;
mod timeline;

pub use issue::IssueRecord;
pub use labeled::{BugCategory, IssueKind, LabeledIssue};
pub use pull_request::PullRequestRecord;
pub use repository::RepositoryRecord;
pub use timeline::{EventSource, PullRequestLink, SourceIssue, TimelineEvent};
