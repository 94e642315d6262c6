//! Issue to pull request linkage over timeline cross-references.

use crate::layout::RepoSlug;
use crate::records::TimelineEvent;
use url::Url;

/// Parses `https://api.github.com/repos/{owner}/{repo}/pulls/{n}`.
#[must_use]
pub fn parse_pull_url(api_url: &str) -> Option<(RepoSlug, u64)> {
    let url = Url::parse(api_url).ok()?;
    let segments: Vec<&str> = url.path_segments()?.collect();
    match segments.as_slice() {
        ["repos", owner, repo, "pulls", number] => {
            let slug = RepoSlug::new(owner, repo).ok()?;
            Some((slug, number.parse().ok()?))
        }
        _ => None,
    }
}

/// Pull requests of `repository` that cross-referenced the issue, in
/// timeline order without duplicates.
///
/// References made from forks or other repositories are dropped.
#[must_use]
pub fn same_repository_pulls(repository: &RepoSlug, events: &[TimelineEvent]) -> Vec<u64> {
    let mut pulls = Vec::new();
    for url in events.iter().filter_map(TimelineEvent::cross_referencing_pull) {
        let Some((source, number)) = parse_pull_url(url) else {
            continue;
        };
        if &source == repository && !pulls.contains(&number) {
            pulls.push(number);
        }
    }
    pulls
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cross_reference(url: &str) -> serde_json::Value {
        json!({
            "event": "cross-referenced",
            "source": {"type": "issue", "issue": {"pull_request": {"url": url}}}
        })
    }

    #[test]
    fn parses_api_pull_url() {
        let (slug, number) =
            parse_pull_url("https://api.github.com/repos/sktime/sktime/pulls/198").unwrap();
        assert_eq!(slug.full_name(), "sktime/sktime");
        assert_eq!(number, 198);

        assert!(parse_pull_url("https://api.github.com/repos/sktime/sktime/issues/198").is_none());
        assert!(parse_pull_url("not a url").is_none());
    }

    #[test]
    fn keeps_same_repository_references_once() {
        let events: Vec<TimelineEvent> = serde_json::from_value(json!([
            cross_reference("https://api.github.com/repos/a/b/pulls/5"),
            cross_reference("https://api.github.com/repos/fork/b/pulls/6"),
            {"event": "referenced", "commit_id": "abc"},
            cross_reference("https://api.github.com/repos/a/b/pulls/9"),
            cross_reference("https://api.github.com/repos/a/b/pulls/5")
        ]))
        .unwrap();

        let repository = RepoSlug::new("a", "b").unwrap();
        assert_eq!(same_repository_pulls(&repository, &events), vec![5, 9]);
    }
}
