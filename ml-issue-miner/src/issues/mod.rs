//! Issue listing, download and linkage stages.

mod linkage;

pub use linkage::{parse_pull_url, same_repository_pulls};

use crate::dataset::{
    list_dir, read_json, write_csv, write_json, DatasetError, IssueCountRow, IssuePrRow,
};
use crate::github::{
    issue_route, issues_route, pulls_route, timeline_route, FetchError, GitHubClient,
};
use crate::layout::{Artifact, DataLayout, RepoSlug};
use crate::records::{IssueRecord, TimelineEvent};
use crate::repositories::filtered_repositories;
use crate::summary::{RecordOutcome, StageSummary};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, info_span, warn, Instrument};

/// Lists every issue and pull request number of each filtered repository.
///
/// The issues endpoint also returns pull requests; [`clean_issues`] removes
/// them afterwards.
///
/// # Errors
///
/// Returns [`DatasetError`] if the filtered repository table is missing.
pub async fn list_items(
    client: &GitHubClient,
    layout: &DataLayout,
) -> Result<StageSummary, DatasetError> {
    let repositories = filtered_repositories(layout)?;
    let mut summary = StageSummary::new("list-items");

    for slug in &repositories {
        let span = info_span!("list_items", repo = %slug);
        let outcome = async {
            match list_repository_items(client, layout, slug).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(error = %e, "Failed to list items");
                    RecordOutcome::failed(e)
                }
            }
        }
        .instrument(span)
        .await;
        summary.record(&outcome);
    }

    info!(%summary, "Listed issues and pull requests");
    Ok(summary)
}

async fn list_repository_items(
    client: &GitHubClient,
    layout: &DataLayout,
    slug: &RepoSlug,
) -> Result<RecordOutcome, FetchError> {
    let issues_path = layout.issues_list_file(slug);
    let pulls_path = layout.pulls_list_file(slug);
    if issues_path.exists() && pulls_path.exists() {
        debug!("Item lists already saved");
        return Ok(RecordOutcome::skipped("already listed"));
    }

    let Some(issues) = client.fetch_all_pages(&issues_route(slug), Some("all")).await? else {
        warn!("Repository not found, skipping");
        return Ok(RecordOutcome::skipped("repository not found"));
    };
    let Some(pulls) = client.fetch_all_pages(&pulls_route(slug), Some("all")).await? else {
        warn!("Repository not found, skipping");
        return Ok(RecordOutcome::skipped("repository not found"));
    };

    let issues = item_numbers(&issues);
    let pulls = item_numbers(&pulls);
    info!(issues = issues.len(), pulls = pulls.len(), "Listed items");

    write_json(&issues_path, &issues)?;
    write_json(&pulls_path, &pulls)?;
    Ok(RecordOutcome::Written)
}

/// Extracts the `number` field of every listed item.
fn item_numbers(items: &[Value]) -> Vec<u64> {
    items
        .iter()
        .filter_map(|item| item.get("number").and_then(Value::as_u64))
        .collect()
}

/// Removes pull request numbers from each repository's issue list and
/// tabulates the remaining issue counts, largest first.
///
/// # Errors
///
/// Returns [`DatasetError`] if the filtered repository table is missing or
/// an output cannot be written.
pub fn clean_issues(layout: &DataLayout) -> Result<StageSummary, DatasetError> {
    let _span = info_span!("clean_issues").entered();
    let repositories = filtered_repositories(layout)?;
    let mut summary = StageSummary::new("clean-issues");
    let mut counts = Vec::new();

    for slug in &repositories {
        let issues_path = layout.issues_list_file(slug);
        let pulls_path = layout.pulls_list_file(slug);
        if !issues_path.exists() || !pulls_path.exists() {
            debug!(repo = %slug, "No item lists, skipping");
            summary.record(&RecordOutcome::skipped("not listed"));
            continue;
        }

        let lists = read_json::<Vec<u64>>(&issues_path)
            .and_then(|issues| Ok((issues, read_json::<Vec<u64>>(&pulls_path)?)));
        let (issues, pulls) = match lists {
            Ok(lists) => lists,
            Err(e) => {
                warn!(repo = %slug, error = %e, "Unreadable item list");
                summary.record(&RecordOutcome::failed(e));
                continue;
            }
        };

        let cleaned = remove_pulls(&issues, &pulls);
        debug!(
            repo = %slug,
            issues = cleaned.len(),
            removed = issues.len() - cleaned.len(),
            "Cleaned issues"
        );
        write_json(&layout.cleaned_issues_file(slug), &cleaned)?;
        counts.push(IssueCountRow {
            project: slug.clone(),
            issues: cleaned.len(),
        });
        summary.record(&RecordOutcome::Written);
    }

    counts.sort_by(|a, b| b.issues.cmp(&a.issues).then_with(|| a.project.cmp(&b.project)));
    let total: usize = counts.iter().map(|row| row.issues).sum();
    write_csv(&layout.artifact(Artifact::IssueCounts), &counts)?;

    info!(%summary, total_issues = total, "Cleaned issue lists");
    Ok(summary)
}

/// Issue numbers that are not also pull request numbers, in input order.
#[must_use]
pub fn remove_pulls(issues: &[u64], pulls: &[u64]) -> Vec<u64> {
    let pulls: HashSet<u64> = pulls.iter().copied().collect();
    issues
        .iter()
        .copied()
        .filter(|number| !pulls.contains(number))
        .collect()
}

/// Downloads every cleaned issue and its full timeline.
///
/// Issues whose documents are already saved are not downloaded again.
///
/// # Errors
///
/// Returns [`DatasetError`] if the filtered repository table is missing.
pub async fn download_issues(
    client: &GitHubClient,
    layout: &DataLayout,
) -> Result<StageSummary, DatasetError> {
    let repositories = filtered_repositories(layout)?;
    let mut summary = StageSummary::new("download-issues");

    for slug in &repositories {
        let cleaned_path = layout.cleaned_issues_file(slug);
        if !cleaned_path.exists() {
            debug!(repo = %slug, "No cleaned issue list, skipping");
            continue;
        }
        let numbers: Vec<u64> = match read_json(&cleaned_path) {
            Ok(numbers) => numbers,
            Err(e) => {
                warn!(repo = %slug, error = %e, "Unreadable cleaned issue list");
                summary.record(&RecordOutcome::failed(e));
                continue;
            }
        };
        if numbers.is_empty() {
            info!(repo = %slug, "Repository has no issues");
            continue;
        }

        let span = info_span!("download_issues", repo = %slug, issues = numbers.len());
        async {
            for number in &numbers {
                let outcome = match download_issue(client, layout, slug, *number).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(issue = number, error = %e, "Failed to download issue");
                        RecordOutcome::failed(e)
                    }
                };
                summary.record(&outcome);
            }
        }
        .instrument(span)
        .await;
    }

    info!(%summary, "Downloaded issues");
    Ok(summary)
}

async fn download_issue(
    client: &GitHubClient,
    layout: &DataLayout,
    slug: &RepoSlug,
    number: u64,
) -> Result<RecordOutcome, FetchError> {
    let issue_path = layout.issue_file(slug, number);
    let timeline_path = layout.timeline_file(slug, number);
    if issue_path.exists() && timeline_path.exists() {
        return Ok(RecordOutcome::skipped("already downloaded"));
    }

    let Some(issue) = client
        .fetch_json::<()>(&issue_route(slug, number), None)
        .await?
    else {
        warn!(issue = number, "Issue not found, skipping");
        return Ok(RecordOutcome::skipped("issue not found"));
    };
    let timeline = client
        .fetch_all_pages(&timeline_route(slug, number), None)
        .await?
        .unwrap_or_default();

    write_json(&issue_path, &issue)?;
    write_json(&timeline_path, &timeline)?;
    debug!(issue = number, events = timeline.len(), "Saved issue");
    Ok(RecordOutcome::Written)
}

/// Links every downloaded issue to the same-repository pull requests that
/// cross-referenced it.
///
/// Issues without such references are left out of the table.
///
/// # Errors
///
/// Returns [`DatasetError`] if the issue directory cannot be listed or the
/// table cannot be written.
pub fn link_issues(layout: &DataLayout) -> Result<StageSummary, DatasetError> {
    let _span = info_span!("link_issues").entered();
    let mut summary = StageSummary::new("link-issues");
    let mut rows = Vec::new();

    for repository_dir in list_dir(&layout.issues_dir())? {
        let Some(stem) = repository_dir.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let slug = match RepoSlug::from_file_stem(stem) {
            Ok(slug) => slug,
            Err(e) => {
                warn!(error = %e, "Unexpected directory in issues, skipping");
                continue;
            }
        };

        for number in saved_issue_numbers(&layout.issue_dir(&slug))? {
            let outcome = match link_issue(layout, &slug, number) {
                Ok(Some(row)) => {
                    rows.push(row);
                    RecordOutcome::Written
                }
                Ok(None) => RecordOutcome::skipped("no same-repository pull request"),
                Err(e) => {
                    warn!(repo = %slug, issue = number, error = %e, "Failed to link issue");
                    RecordOutcome::failed(e)
                }
            };
            summary.record(&outcome);
        }
    }

    write_csv(&layout.artifact(Artifact::IssuePullRequests), &rows)?;
    info!(%summary, "Linked issues to pull requests");
    Ok(summary)
}

fn link_issue(
    layout: &DataLayout,
    slug: &RepoSlug,
    number: u64,
) -> Result<Option<IssuePrRow>, DatasetError> {
    let issue = IssueRecord::load(layout, slug, number)?;
    let events: Vec<TimelineEvent> = read_json(&layout.timeline_file(slug, number))?;

    let pulls = same_repository_pulls(slug, &events);
    if pulls.is_empty() {
        return Ok(None);
    }

    Ok(Some(IssuePrRow {
        project: slug.clone(),
        issue_url: slug.issue_url(number),
        issue_number: number,
        pull_requests: pulls,
        title: issue.title,
    }))
}

/// Numbers of the `<n>.json` documents in a directory, ascending.
pub(crate) fn saved_issue_numbers(dir: &Path) -> Result<Vec<u64>, DatasetError> {
    let mut numbers: Vec<u64> = list_dir(dir)?
        .iter()
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
        .filter_map(|path| path.file_stem()?.to_str()?.parse().ok())
        .collect();
    numbers.sort_unstable();
    Ok(numbers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::read_csv;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn removes_pull_numbers_from_issue_list() {
        assert_eq!(remove_pulls(&[5, 4, 3, 2, 1], &[4, 2, 9]), vec![5, 3, 1]);
        assert!(remove_pulls(&[], &[1]).is_empty());
    }

    #[test]
    fn item_numbers_ignore_entries_without_number() {
        let items = vec![json!({"number": 3}), json!({"title": "x"}), json!({"number": 1})];
        assert_eq!(item_numbers(&items), vec![3, 1]);
    }

    #[test]
    fn clean_issues_writes_counts_sorted_descending() {
        let temp = TempDir::new().unwrap();
        let layout = DataLayout::new(temp.path());
        let small = RepoSlug::new("a", "small").unwrap();
        let large = RepoSlug::new("a", "large").unwrap();
        write_filtered(&layout, &[&small, &large]);
        write_json(&layout.issues_list_file(&small), &[3u64, 2, 1]).unwrap();
        write_json(&layout.pulls_list_file(&small), &[2u64]).unwrap();
        write_json(&layout.issues_list_file(&large), &[6u64, 5, 4, 3, 2, 1]).unwrap();
        write_json(&layout.pulls_list_file(&large), &[6u64]).unwrap();

        let summary = clean_issues(&layout).unwrap();

        assert_eq!(summary.written, 2);
        let cleaned: Vec<u64> = read_json(&layout.cleaned_issues_file(&small)).unwrap();
        assert_eq!(cleaned, vec![3, 1]);
        let counts: Vec<IssueCountRow> = read_csv(&layout.artifact(Artifact::IssueCounts)).unwrap();
        assert_eq!(counts[0].project, large);
        assert_eq!(counts[0].issues, 5);
        assert_eq!(counts[1].issues, 2);
    }

    #[test]
    fn link_issues_keeps_issues_with_same_repository_pulls() {
        let temp = TempDir::new().unwrap();
        let layout = DataLayout::new(temp.path());
        let slug = RepoSlug::new("a", "b").unwrap();

        for (number, pull_owner) in [(1u64, "a"), (2, "fork")] {
            write_json(
                &layout.issue_file(&slug, number),
                &json!({
                    "number": number,
                    "title": format!("Issue {number}"),
                    "state": "closed",
                    "created_at": "2022-01-01T00:00:00Z",
                    "closed_at": "2022-01-02T00:00:00Z"
                }),
            )
            .unwrap();
            write_json(
                &layout.timeline_file(&slug, number),
                &json!([{
                    "event": "cross-referenced",
                    "source": {"issue": {"pull_request": {
                        "url": format!("https://api.github.com/repos/{pull_owner}/b/pulls/10")
                    }}}
                }]),
            )
            .unwrap();
        }

        let summary = link_issues(&layout).unwrap();

        assert_eq!(summary.written, 1);
        assert_eq!(summary.skipped, 1);
        let rows: Vec<IssuePrRow> =
            read_csv(&layout.artifact(Artifact::IssuePullRequests)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].issue_url, "https://github.com/a/b/issues/1");
        assert_eq!(rows[0].pull_requests, vec![10]);
        assert_eq!(rows[0].title, "Issue 1");
    }

    #[tokio::test]
    async fn corrupt_cleaned_list_fails_only_its_repository() {
        let temp = TempDir::new().unwrap();
        let layout = DataLayout::new(temp.path());
        let broken = RepoSlug::new("a", "broken").unwrap();
        let empty = RepoSlug::new("a", "empty").unwrap();
        write_filtered(&layout, &[&broken, &empty]);
        crate::dataset::write_text(&layout.cleaned_issues_file(&broken), "[1, 2,").unwrap();
        write_json(&layout.cleaned_issues_file(&empty), &Vec::<u64>::new()).unwrap();
        let client = GitHubClient::new(None).unwrap();

        let summary = download_issues(&client, &layout).await.unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.written, 0);
    }

    fn write_filtered(layout: &DataLayout, slugs: &[&RepoSlug]) {
        let records: Vec<_> = slugs
            .iter()
            .map(|slug| crate::records::RepositoryRecord {
                name: (*slug).clone(),
                url: format!("https://github.com/{slug}"),
                created_at: "2019-01-01T00:00:00Z".parse().unwrap(),
                stars: 500,
                pushed_at: Some("2022-01-01T00:00:00Z".parse().unwrap()),
                updated_at: "2022-01-01T00:00:00Z".parse().unwrap(),
            })
            .collect();
        write_csv(&layout.artifact(Artifact::FilteredRepositories), &records).unwrap();
    }
}
