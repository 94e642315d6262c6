//! Issue timeline events.

use serde::Deserialize;

/// A single event of an issue timeline.
///
/// Only the fields needed to follow cross-references are kept; every other
/// event kind deserializes with the optional parts left empty.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineEvent {
    /// Event kind, e.g. `cross-referenced`, `labeled`, `closed`.
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub source: Option<EventSource>,
}

/// Origin of a cross-reference.
#[derive(Debug, Clone, Deserialize)]
pub struct EventSource {
    #[serde(default)]
    pub issue: Option<SourceIssue>,
}

/// The issue (or pull request) that made a cross-reference.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceIssue {
    /// Present only when the referencing issue is a pull request.
    #[serde(default)]
    pub pull_request: Option<PullRequestLink>,
}

/// API link to a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestLink {
    /// e.g. `https://api.github.com/repos/{owner}/{repo}/pulls/{n}`.
    pub url: String,
}

impl TimelineEvent {
    /// Returns the API URL of the referencing pull request, if this event is
    /// a cross-reference made by a pull request.
    #[must_use]
    pub fn cross_referencing_pull(&self) -> Option<&str> {
        if self.event != "cross-referenced" {
            return None;
        }
        self.source
            .as_ref()?
            .issue
            .as_ref()?
            .pull_request
            .as_ref()
            .map(|link| link.url.as_str())
    }
}
