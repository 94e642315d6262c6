//! Pull request download and filtering stages.
//!
//! These stages work from the issue/pull request tables: they fetch the
//! referenced pull requests, keep merged ones, download the source files
//! their commits touched and read their merge commits.

mod files;

pub use files::{commit_files, commit_shas, CommitFile};

use crate::dataset::{
    read_csv, write_csv, write_json, write_text, DatasetError, IssuePrRow, MergeCommitRow,
};
use crate::github::{commit_route, pull_commits_route, pull_route, FetchError, GitHubClient};
use crate::layout::{Artifact, DataLayout, RepoSlug};
use crate::records::{IssueRecord, PullRequestRecord};
use crate::summary::{RecordOutcome, StageSummary};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn, Instrument};

/// Downloads every pull request referenced by the linkage table.
///
/// Saved documents are not downloaded again; 404s are skipped.
///
/// # Errors
///
/// Returns [`DatasetError`] if the linkage table is missing.
pub async fn download_pulls(
    client: &GitHubClient,
    layout: &DataLayout,
) -> Result<StageSummary, DatasetError> {
    let rows: Vec<IssuePrRow> = read_csv(&layout.artifact(Artifact::IssuePullRequests))?;
    let mut summary = StageSummary::new("download-pulls");
    let span = info_span!("download_pulls", issues = rows.len());

    async {
        for row in &rows {
            for &number in &row.pull_requests {
                let outcome = match download_pull(client, layout, &row.project, number).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(
                            repo = %row.project,
                            pull = number,
                            error = %e,
                            "Failed to download pull request"
                        );
                        RecordOutcome::failed(e)
                    }
                };
                summary.record(&outcome);
            }
        }
    }
    .instrument(span)
    .await;

    info!(%summary, "Downloaded pull requests");
    Ok(summary)
}

async fn download_pull(
    client: &GitHubClient,
    layout: &DataLayout,
    slug: &RepoSlug,
    number: u64,
) -> Result<RecordOutcome, FetchError> {
    let path = layout.pull_file(slug, number);
    if path.exists() {
        return Ok(RecordOutcome::skipped("already downloaded"));
    }

    match client.fetch_json::<()>(&pull_route(slug, number), None).await? {
        Some(document) => {
            write_json(&path, &document)?;
            debug!(repo = %slug, pull = number, "Saved pull request");
            Ok(RecordOutcome::Written)
        }
        None => {
            warn!(repo = %slug, pull = number, "Pull request not found, skipping");
            Ok(RecordOutcome::skipped("pull request not found"))
        }
    }
}

/// Keeps closed issues together with their merged pull requests.
///
/// A pull request counts as merged when its state is `closed` and it has a
/// merge timestamp. Issues left without any merged pull request are dropped.
///
/// # Errors
///
/// Returns [`DatasetError`] if the linkage table is missing or the output
/// cannot be written.
pub fn filter_closed(layout: &DataLayout) -> Result<StageSummary, DatasetError> {
    let _span = info_span!("filter_closed").entered();
    let rows: Vec<IssuePrRow> = read_csv(&layout.artifact(Artifact::IssuePullRequests))?;
    let mut summary = StageSummary::new("filter-closed");
    let mut kept = Vec::new();

    for row in rows {
        let outcome = match closed_with_merged_pulls(layout, &row) {
            Ok(Some(merged)) => {
                kept.push(IssuePrRow {
                    pull_requests: merged,
                    ..row
                });
                RecordOutcome::Written
            }
            Ok(None) => RecordOutcome::skipped("open issue or no merged pull request"),
            Err(e) => {
                warn!(issue = %row.issue_url, error = %e, "Failed to check issue");
                RecordOutcome::failed(e)
            }
        };
        summary.record(&outcome);
    }

    write_csv(&layout.artifact(Artifact::ClosedIssuePullRequests), &kept)?;
    info!(%summary, "Filtered closed issues");
    Ok(summary)
}

/// Merged pull requests of a closed issue, or `None` if the issue is open
/// or none of its pull requests was merged.
fn closed_with_merged_pulls(
    layout: &DataLayout,
    row: &IssuePrRow,
) -> Result<Option<Vec<u64>>, DatasetError> {
    let issue = IssueRecord::load(layout, &row.project, row.issue_number)?;
    if !issue.is_closed() {
        return Ok(None);
    }

    let mut merged = Vec::new();
    for &number in &row.pull_requests {
        match PullRequestRecord::load(layout, &row.project, number) {
            Ok(pull) if pull.is_merged() => merged.push(number),
            Ok(_) => {}
            Err(DatasetError::MissingFile { .. }) => {
                debug!(repo = %row.project, pull = number, "Pull request not downloaded");
            }
            Err(e) => return Err(e),
        }
    }

    Ok((!merged.is_empty()).then_some(merged))
}

/// Downloads the source files touched by each merged pull request, one
/// directory per commit.
///
/// Pull requests with an existing file directory are skipped. A pull
/// request touching no matching file leaves no directory behind.
///
/// # Errors
///
/// Returns [`DatasetError`] if the closed issue table is missing.
pub async fn download_pr_files(
    client: &GitHubClient,
    layout: &DataLayout,
    extension: &str,
) -> Result<StageSummary, DatasetError> {
    let rows: Vec<IssuePrRow> = read_csv(&layout.artifact(Artifact::ClosedIssuePullRequests))?;
    let mut summary = StageSummary::new("download-pr-files");

    for row in &rows {
        for &number in &row.pull_requests {
            let span = info_span!("download_pr_files", repo = %row.project, pull = number);
            let outcome = async {
                match download_pull_files(client, layout, &row.project, number, extension).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(error = %e, "Failed to download pull request files");
                        RecordOutcome::failed(e)
                    }
                }
            }
            .instrument(span)
            .await;
            summary.record(&outcome);
        }
    }

    info!(%summary, "Downloaded pull request files");
    Ok(summary)
}

async fn download_pull_files(
    client: &GitHubClient,
    layout: &DataLayout,
    slug: &RepoSlug,
    number: u64,
    extension: &str,
) -> Result<RecordOutcome, FetchError> {
    let pull_dir = layout.pr_files_dir(slug, number);
    let Some(staging) = begin_staging(layout, slug, number)? else {
        return Ok(RecordOutcome::skipped("already downloaded"));
    };

    let Some(commits) = client
        .fetch_all_pages(&pull_commits_route(slug, number), None)
        .await?
    else {
        warn!("Pull request not found, skipping");
        return Ok(RecordOutcome::skipped("pull request not found"));
    };

    let mut saved = 0usize;
    for sha in commit_shas(&commits) {
        let Some(commit) = client.fetch_json::<()>(&commit_route(slug, &sha), None).await? else {
            warn!(commit = %sha, "Commit not found, skipping");
            continue;
        };

        for file in commit_files(&commit).iter().filter(|file| file.is_wanted(extension)) {
            match client.fetch_file_content(slug, &file.filename, &sha).await? {
                Some(content) => {
                    write_text(&staging.join(&sha).join(file.flat_name()), &content)?;
                    saved += 1;
                }
                None => {
                    debug!(
                        commit = %sha,
                        file = %file.filename,
                        "No inline content, skipping file"
                    );
                }
            }
        }
    }

    if saved == 0 {
        remove_dir(&staging)?;
        info!(commits = commits.len(), "No matching source files changed");
        return Ok(RecordOutcome::skipped("no matching source files"));
    }

    fs::rename(&staging, &pull_dir).map_err(|e| DatasetError::io(&pull_dir, e))?;
    debug!(commits = commits.len(), files = saved, "Saved pull request files");
    Ok(RecordOutcome::Written)
}

/// Clears the staging directory of a pull request left by an interrupted
/// download and returns it, or `None` once the pull request is complete.
fn begin_staging(
    layout: &DataLayout,
    slug: &RepoSlug,
    number: u64,
) -> Result<Option<PathBuf>, DatasetError> {
    if layout.pr_files_dir(slug, number).is_dir() {
        return Ok(None);
    }
    let staging = layout.pr_files_staging_dir(slug, number);
    if staging.exists() {
        debug!(dir = %staging.display(), "Discarding interrupted download");
        remove_dir(&staging)?;
    }
    Ok(Some(staging))
}

fn remove_dir(dir: &Path) -> Result<(), DatasetError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DatasetError::io(dir, e)),
    }
}

/// Reads the merge commit of every pull request of the ML issue table.
///
/// # Errors
///
/// Returns [`DatasetError`] if the ML issue table is missing or the output
/// cannot be written.
pub fn collect_merge_commits(layout: &DataLayout) -> Result<StageSummary, DatasetError> {
    let _span = info_span!("merge_commits").entered();
    let rows: Vec<IssuePrRow> = read_csv(&layout.artifact(Artifact::KeywordMlIssues))?;
    let mut summary = StageSummary::new("merge-commits");
    let mut commits = Vec::new();

    for row in &rows {
        for &number in &row.pull_requests {
            let outcome = match PullRequestRecord::load(layout, &row.project, number) {
                Ok(PullRequestRecord {
                    merge_commit_sha: Some(sha),
                    ..
                }) => {
                    commits.push(MergeCommitRow {
                        project: row.project.clone(),
                        pull_request: number,
                        merge_commit_sha: sha,
                    });
                    RecordOutcome::Written
                }
                Ok(_) => RecordOutcome::skipped("no merge commit"),
                Err(e) => {
                    warn!(
                        repo = %row.project,
                        pull = number,
                        error = %e,
                        "Unreadable pull request"
                    );
                    RecordOutcome::failed(e)
                }
            };
            summary.record(&outcome);
        }
    }

    write_csv(&layout.artifact(Artifact::MergeCommits), &commits)?;
    info!(%summary, "Collected merge commits");
    Ok(summary)
}
