//! Size-of-fix and resolution duration measurement.
//!
//! `measure` takes the first pull request of every issue row, reads its
//! added/deleted line counts and the issue's open duration. `tabulate`
//! turns the measured balanced sample into the final analysis table.

mod error;
mod gh_cli;
mod size;

pub use error::MeasureError;
pub use gh_cli::pr_line_counts;
pub use size::{resolution_days, size_of_fix, LineCounts};

use crate::config::LineSource;
use crate::dataset::{
    read_csv, write_csv, CategorizedIssueRow, DatasetError, FinalRow, IssuePrRow, MeasuredIssueRow,
};
use crate::layout::{Artifact, DataLayout, RepoSlug};
use crate::records::{IssueKind, IssueRecord, PullRequestRecord};
use crate::summary::{RecordOutcome, StageSummary};
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn, Instrument};

/// Which issue table to measure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureTarget {
    /// Read the balanced sample (with categories) instead of the ML table.
    pub combined: bool,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl MeasureTarget {
    /// Default input and output of the ML table, or of the balanced sample
    /// when `combined` is set. Explicit paths override either.
    pub fn resolve(
        layout: &DataLayout,
        combined: bool,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
    ) -> Self {
        let (default_input, default_output) = if combined {
            (Artifact::CombinedDataset, Artifact::MeasuredDataset)
        } else {
            (Artifact::KeywordMlIssues, Artifact::MeasuredMlIssues)
        };
        Self {
            combined,
            input: input.unwrap_or_else(|| layout.artifact(default_input)),
            output: output.unwrap_or_else(|| layout.artifact(default_output)),
        }
    }
}

/// An issue row to be measured.
#[derive(Debug, Clone)]
struct PendingIssue {
    project: RepoSlug,
    issue_url: String,
    issue_number: u64,
    pull_requests: Vec<u64>,
    category: Option<IssueKind>,
}

impl From<IssuePrRow> for PendingIssue {
    fn from(row: IssuePrRow) -> Self {
        Self {
            project: row.project,
            issue_url: row.issue_url,
            issue_number: row.issue_number,
            pull_requests: row.pull_requests,
            category: None,
        }
    }
}

impl From<CategorizedIssueRow> for PendingIssue {
    fn from(row: CategorizedIssueRow) -> Self {
        Self {
            project: row.project,
            issue_url: row.issue_url,
            issue_number: row.issue_number,
            pull_requests: row.pull_requests,
            category: Some(row.category),
        }
    }
}

fn read_pending(target: &MeasureTarget) -> Result<Vec<PendingIssue>, DatasetError> {
    if target.combined {
        let rows: Vec<CategorizedIssueRow> = read_csv(&target.input)?;
        Ok(rows.into_iter().map(PendingIssue::from).collect())
    } else {
        let rows: Vec<IssuePrRow> = read_csv(&target.input)?;
        Ok(rows.into_iter().map(PendingIssue::from).collect())
    }
}

/// Measures line changes and fix duration of every issue of the target table.
///
/// Issues whose pull request changed no file, or that are still open, are
/// left out. Failures of single issues are logged and counted.
///
/// # Errors
///
/// Returns [`MeasureError`] if the input table is missing or the output
/// cannot be written.
pub async fn measure(
    layout: &DataLayout,
    line_source: LineSource,
    target: &MeasureTarget,
) -> Result<StageSummary, MeasureError> {
    let span = info_span!("measure", input = %target.input.display(), source = ?line_source);

    async {
        let pending = read_pending(target)?;
        let mut summary = StageSummary::new("measure");
        let mut measured = Vec::new();

        for issue in pending {
            let outcome = match measure_issue(layout, line_source, &issue).await {
                Ok(Some(row)) => {
                    measured.push(row);
                    RecordOutcome::Written
                }
                Ok(None) => RecordOutcome::skipped("empty diff or open issue"),
                Err(e) => {
                    warn!(issue = %issue.issue_url, error = %e, "Failed to measure issue");
                    RecordOutcome::failed(e)
                }
            };
            summary.record(&outcome);
        }

        write_csv(&target.output, &measured)?;
        info!(%summary, output = %target.output.display(), "Measured issues");
        Ok(summary)
    }
    .instrument(span)
    .await
}

async fn measure_issue(
    layout: &DataLayout,
    line_source: LineSource,
    issue: &PendingIssue,
) -> Result<Option<MeasuredIssueRow>, MeasureError> {
    let Some(&pull) = issue.pull_requests.first() else {
        warn!(issue = %issue.issue_url, "Issue lists no pull request");
        return Ok(None);
    };
    if issue.pull_requests.len() > 1 {
        warn!(
            issue = %issue.issue_url,
            pulls = issue.pull_requests.len(),
            pull,
            "Several pull requests listed, measuring the first"
        );
    }

    let counts = line_counts(layout, line_source, &issue.project, pull).await?;
    if counts.is_empty_diff() {
        debug!(issue = %issue.issue_url, pull, "Pull request changed no file");
        return Ok(None);
    }

    let record = IssueRecord::load(layout, &issue.project, issue.issue_number)?;
    let Some(days) = resolution_days(record.created_at, record.closed_at) else {
        debug!(issue = %issue.issue_url, "Issue has no closing time");
        return Ok(None);
    };

    Ok(Some(MeasuredIssueRow {
        project: issue.project.clone(),
        issue_url: issue.issue_url.clone(),
        issue_number: issue.issue_number,
        pull_request: pull,
        lines_added: counts.added,
        lines_deleted: counts.deleted,
        fix_duration_days: days,
        category: issue.category,
    }))
}

/// Line counts of a pull request from the configured source.
///
/// # Errors
///
/// Returns [`MeasureError`] if the source cannot provide them.
pub async fn line_counts(
    layout: &DataLayout,
    line_source: LineSource,
    slug: &RepoSlug,
    number: u64,
) -> Result<LineCounts, MeasureError> {
    match line_source {
        LineSource::GhCli => pr_line_counts(slug, number).await,
        LineSource::Api => {
            let pull = PullRequestRecord::load(layout, slug, number)?;
            match (pull.additions, pull.deletions) {
                (Some(added), Some(deleted)) => Ok(LineCounts {
                    added,
                    deleted,
                    changed_files: pull.changed_files,
                }),
                _ => Err(MeasureError::MissingLineCounts {
                    repository: slug.full_name(),
                    pull: number,
                }),
            }
        }
    }
}

/// Builds the final analysis table from the measured balanced sample.
///
/// # Errors
///
/// Returns [`DatasetError`] if the measured table is missing or the output
/// cannot be written.
pub fn tabulate(layout: &DataLayout) -> Result<StageSummary, DatasetError> {
    tabulate_file(
        &layout.artifact(Artifact::MeasuredDataset),
        &layout.artifact(Artifact::FinalDataset),
    )
}

fn tabulate_file(input: &Path, output: &Path) -> Result<StageSummary, DatasetError> {
    let _span = info_span!("tabulate", input = %input.display()).entered();
    let rows: Vec<MeasuredIssueRow> = read_csv(input)?;
    let mut summary = StageSummary::new("tabulate");
    let mut table = Vec::new();

    for row in rows {
        let Some(category) = row.category else {
            warn!(issue = %row.issue_url, "Measured row has no category");
            summary.record(&RecordOutcome::failed("missing category"));
            continue;
        };
        table.push(FinalRow {
            pr_url: row.project.pull_url(row.pull_request),
            line_change: size_of_fix(row.lines_added, row.lines_deleted),
            fix_duration_days: row.fix_duration_days,
            category,
            issue_url: row.issue_url,
            issue_number: row.issue_number,
            project: row.project,
        });
        summary.record(&RecordOutcome::Written);
    }

    write_csv(output, &table)?;
    info!(%summary, "Tabulated final dataset");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::write_json;
    use serde_json::json;
    use tempfile::TempDir;

    fn fixture(layout: &DataLayout, slug: &RepoSlug) {
        write_json(
            &layout.issue_file(slug, 1),
            &json!({
                "number": 1,
                "title": "Loss is NaN",
                "state": "closed",
                "created_at": "2022-01-01T00:00:00Z",
                "closed_at": "2022-01-05T00:00:00Z"
            }),
        )
        .unwrap();
        for (number, changed) in [(10u64, 3u64), (11, 0)] {
            write_json(
                &layout.pull_file(slug, number),
                &json!({
                    "number": number,
                    "state": "closed",
                    "merged_at": "2022-01-04T00:00:00Z",
                    "changed_files": changed,
                    "additions": 120,
                    "deletions": 45
                }),
            )
            .unwrap();
        }
    }

    #[test]
    fn resolves_default_targets() {
        let layout = DataLayout::new("data");
        let target = MeasureTarget::resolve(&layout, true, None, None);
        assert_eq!(target.input, PathBuf::from("data/19_combined_dataset.csv"));
        assert_eq!(target.output, PathBuf::from("data/22_all_issues.csv"));

        let custom = MeasureTarget::resolve(&layout, false, Some("picked.csv".into()), None);
        assert_eq!(custom.input, PathBuf::from("picked.csv"));
        assert_eq!(custom.output, PathBuf::from("data/18_line_change_and_duration.csv"));
    }

    #[tokio::test]
    async fn measures_first_pull_from_saved_documents() {
        let temp = TempDir::new().unwrap();
        let layout = DataLayout::new(temp.path());
        let slug = RepoSlug::new("a", "b").unwrap();
        fixture(&layout, &slug);

        let rows = vec![
            IssuePrRow {
                project: slug.clone(),
                issue_url: slug.issue_url(1),
                issue_number: 1,
                pull_requests: vec![10, 11],
                title: "Loss is NaN".to_string(),
            },
            IssuePrRow {
                project: slug.clone(),
                issue_url: slug.issue_url(1),
                issue_number: 1,
                pull_requests: vec![11],
                title: "Loss is NaN".to_string(),
            },
        ];
        write_csv(&layout.artifact(Artifact::KeywordMlIssues), &rows).unwrap();

        let target = MeasureTarget::resolve(&layout, false, None, None);
        let summary = measure(&layout, LineSource::Api, &target).await.unwrap();

        assert_eq!(summary.written, 1);
        assert_eq!(summary.skipped, 1);
        let measured: Vec<MeasuredIssueRow> = read_csv(&target.output).unwrap();
        assert_eq!(measured[0].pull_request, 10);
        assert_eq!(measured[0].lines_added, 120);
        assert_eq!(measured[0].fix_duration_days, 4);
        assert_eq!(measured[0].category, None);
    }

    #[test]
    fn tabulate_computes_absolute_line_change() {
        let temp = TempDir::new().unwrap();
        let layout = DataLayout::new(temp.path());
        let slug = RepoSlug::new("a", "b").unwrap();
        let rows = vec![MeasuredIssueRow {
            project: slug.clone(),
            issue_url: slug.issue_url(1),
            issue_number: 1,
            pull_request: 10,
            lines_added: 45,
            lines_deleted: 120,
            fix_duration_days: 4,
            category: Some(IssueKind::Ml),
        }];
        write_csv(&layout.artifact(Artifact::MeasuredDataset), &rows).unwrap();

        tabulate(&layout).unwrap();

        let table: Vec<FinalRow> = read_csv(&layout.artifact(Artifact::FinalDataset)).unwrap();
        assert_eq!(table[0].line_change, 75);
        assert_eq!(table[0].pr_url, "https://github.com/a/b/pull/10");
    }
}
