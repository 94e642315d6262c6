//! GitHub REST access.
//!
//! Responses are kept as raw JSON [`serde_json::Value`]s so they can be
//! persisted verbatim and parsed later by the offline stages.

mod client;
mod error;

pub use client::{GitHubClient, PER_PAGE};
pub use error::FetchError;

use crate::layout::RepoSlug;

/// `/repos/{owner}/{repo}`
pub fn repository_route(slug: &RepoSlug) -> String {
    format!("/repos/{}", slug.full_name())
}

/// `/repos/{owner}/{repo}/issues`
pub fn issues_route(slug: &RepoSlug) -> String {
    format!("/repos/{}/issues", slug.full_name())
}

/// `/repos/{owner}/{repo}/issues/{n}`
pub fn issue_route(slug: &RepoSlug, number: u64) -> String {
    format!("/repos/{}/issues/{number}", slug.full_name())
}

/// `/repos/{owner}/{repo}/issues/{n}/timeline`
pub fn timeline_route(slug: &RepoSlug, number: u64) -> String {
    format!("/repos/{}/issues/{number}/timeline", slug.full_name())
}

/// `/repos/{owner}/{repo}/pulls`
pub fn pulls_route(slug: &RepoSlug) -> String {
    format!("/repos/{}/pulls", slug.full_name())
}

/// `/repos/{owner}/{repo}/pulls/{n}`
pub fn pull_route(slug: &RepoSlug, number: u64) -> String {
    format!("/repos/{}/pulls/{number}", slug.full_name())
}

/// `/repos/{owner}/{repo}/pulls/{n}/commits`
pub fn pull_commits_route(slug: &RepoSlug, number: u64) -> String {
    format!("/repos/{}/pulls/{number}/commits", slug.full_name())
}

/// `/repos/{owner}/{repo}/commits/{sha}`
pub fn commit_route(slug: &RepoSlug, sha: &str) -> String {
    format!("/repos/{}/commits/{sha}", slug.full_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_routes() {
        let slug = RepoSlug::new("sktime", "sktime").unwrap();
        assert_eq!(repository_route(&slug), "/repos/sktime/sktime");
        assert_eq!(timeline_route(&slug, 7), "/repos/sktime/sktime/issues/7/timeline");
        assert_eq!(commit_route(&slug, "abc"), "/repos/sktime/sktime/commits/abc");
    }
}
