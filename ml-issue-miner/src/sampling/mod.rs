//! Balanced non-ML sampling.
//!
//! For every project contributing `k` ML issues, `k` non-ML issues with a
//! merged pull request are drawn from the same project. Projects without
//! enough candidates are excluded together with their ML issues, so the
//! sample always holds as many non-ML as ML issues.

use crate::dataset::{
    read_csv, write_csv, CategorizedIssueRow, DatasetError, IssuePrRow, MeasuredIssueRow,
};
use crate::layout::{Artifact, DataLayout, RepoSlug};
use crate::records::{IssueKind, IssueRecord, PullRequestRecord};
use crate::summary::StageSummary;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, info_span, warn};

/// Result of [`balance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalancedSample {
    /// Sampled non-ML rows, in candidate order.
    pub non_ml: Vec<CategorizedIssueRow>,
    /// ML rows of the retained projects, in input order.
    pub ml: Vec<CategorizedIssueRow>,
    /// Projects dropped for lack of non-ML candidates.
    pub excluded_projects: Vec<RepoSlug>,
}

impl BalancedSample {
    /// Non-ML rows followed by ML rows.
    pub fn into_rows(self) -> Vec<CategorizedIssueRow> {
        let mut rows = self.non_ml;
        rows.extend(self.ml);
        rows
    }
}

/// Draws a per-project balanced non-ML sample.
///
/// `candidates` are closed issues with merged pull requests; rows whose
/// issue URL is an ML issue or that list no pull request are ignored.
pub fn balance<R: Rng + ?Sized>(
    candidates: &[IssuePrRow],
    ml: &[MeasuredIssueRow],
    rng: &mut R,
) -> BalancedSample {
    let mut ml_counts: Vec<(RepoSlug, usize)> = Vec::new();
    for row in ml {
        match ml_counts.iter_mut().find(|(project, _)| *project == row.project) {
            Some((_, count)) => *count += 1,
            None => ml_counts.push((row.project.clone(), 1)),
        }
    }

    let ml_urls: HashSet<&str> = ml.iter().map(|row| row.issue_url.as_str()).collect();
    let mut pool: HashMap<&RepoSlug, Vec<usize>> = HashMap::new();
    for (index, row) in candidates.iter().enumerate() {
        if !ml_urls.contains(row.issue_url.as_str()) && !row.pull_requests.is_empty() {
            pool.entry(&row.project).or_default().push(index);
        }
    }

    let mut chosen = HashSet::new();
    let mut excluded_projects = Vec::new();
    for (project, count) in &ml_counts {
        let available = pool.get(project).map(Vec::as_slice).unwrap_or_default();
        if available.len() < *count {
            debug!(
                repo = %project,
                ml = count,
                available = available.len(),
                "Too few non-ML candidates"
            );
            excluded_projects.push(project.clone());
            continue;
        }
        chosen.extend(available.choose_multiple(rng, *count).copied());
    }

    let non_ml = candidates
        .iter()
        .enumerate()
        .filter(|(index, _)| chosen.contains(index))
        .map(|(_, row)| CategorizedIssueRow {
            project: row.project.clone(),
            issue_url: row.issue_url.clone(),
            issue_number: row.issue_number,
            pull_requests: row.pull_requests.clone(),
            category: IssueKind::NonMl,
        })
        .collect();

    let ml = ml
        .iter()
        .filter(|row| !excluded_projects.contains(&row.project))
        .map(|row| CategorizedIssueRow {
            project: row.project.clone(),
            issue_url: row.issue_url.clone(),
            issue_number: row.issue_number,
            pull_requests: vec![row.pull_request],
            category: IssueKind::Ml,
        })
        .collect();

    BalancedSample {
        non_ml,
        ml,
        excluded_projects,
    }
}

/// Samples non-ML issues to match the measured ML issues.
///
/// # Errors
///
/// Returns [`DatasetError`] if an input table is missing or the output
/// cannot be written.
pub fn sample_non_ml(layout: &DataLayout, seed: u64) -> Result<StageSummary, DatasetError> {
    let _span = info_span!("sample_non_ml", seed).entered();
    let closed: Vec<IssuePrRow> = read_csv(&layout.artifact(Artifact::ClosedIssuePullRequests))?;
    let tagged: Vec<IssuePrRow> = read_csv(&layout.artifact(Artifact::KeywordMlIssues))?;
    let ml: Vec<MeasuredIssueRow> = read_csv(&layout.artifact(Artifact::MeasuredMlIssues))?;

    let tagged_urls: HashSet<&str> = tagged.iter().map(|row| row.issue_url.as_str()).collect();
    let candidates: Vec<IssuePrRow> = closed
        .iter()
        .filter(|row| !tagged_urls.contains(row.issue_url.as_str()))
        .filter(|row| is_measurable(layout, row))
        .cloned()
        .collect();
    debug!(
        closed = closed.len(),
        candidates = candidates.len(),
        "Non-ML candidates selected"
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let sample = balance(&candidates, &ml, &mut rng);

    for project in &sample.excluded_projects {
        warn!(repo = %project, "Project excluded, not enough non-ML issues");
    }

    let mut summary = StageSummary::new("sample-non-ml");
    summary.written = sample.non_ml.len() + sample.ml.len();
    summary.skipped = ml.len() - sample.ml.len();
    summary.read = summary.written + summary.skipped;

    info!(
        ml = sample.ml.len(),
        non_ml = sample.non_ml.len(),
        excluded_projects = sample.excluded_projects.len(),
        "Balanced sample drawn"
    );
    write_csv(&layout.artifact(Artifact::CombinedDataset), &sample.into_rows())?;
    Ok(summary)
}

/// Whether `measure` can produce a row for a candidate: the issue has a
/// closing time and its first pull request reports changed files.
fn is_measurable(layout: &DataLayout, row: &IssuePrRow) -> bool {
    let Some(&pull) = row.pull_requests.first() else {
        return false;
    };
    match IssueRecord::load(layout, &row.project, row.issue_number) {
        Ok(issue) if issue.closed_at.is_some() => {}
        Ok(_) => {
            debug!(issue = %row.issue_url, "Candidate has no closing time");
            return false;
        }
        Err(e) => {
            debug!(issue = %row.issue_url, error = %e, "Candidate issue unreadable");
            return false;
        }
    }
    match PullRequestRecord::load(layout, &row.project, pull) {
        Ok(record) if record.changed_files == Some(0) => {
            debug!(issue = %row.issue_url, pull, "Candidate pull request changed no file");
            false
        }
        Ok(_) => true,
        Err(e) => {
            debug!(issue = %row.issue_url, pull, error = %e, "Candidate pull request unreadable");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::write_json;
    use serde_json::json;
    use tempfile::TempDir;

    fn candidate(project: &str, issue: u64) -> IssuePrRow {
        let slug: RepoSlug = project.parse().unwrap();
        IssuePrRow {
            issue_url: slug.issue_url(issue),
            project: slug,
            issue_number: issue,
            pull_requests: vec![issue + 100],
            title: String::new(),
        }
    }

    fn ml_issue(project: &str, issue: u64) -> MeasuredIssueRow {
        let slug: RepoSlug = project.parse().unwrap();
        MeasuredIssueRow {
            issue_url: slug.issue_url(issue),
            project: slug,
            issue_number: issue,
            pull_request: issue + 100,
            lines_added: 1,
            lines_deleted: 1,
            fix_duration_days: 1,
            category: None,
        }
    }

    #[test]
    fn balances_per_project_and_excludes_short_projects() {
        let candidates = vec![
            candidate("a/one", 1),
            candidate("a/one", 2),
            candidate("a/one", 3),
            candidate("a/one", 4),
            candidate("b/two", 1),
            candidate("b/two", 2),
        ];
        let ml = vec![
            ml_issue("a/one", 1),
            ml_issue("a/one", 2),
            ml_issue("b/two", 1),
            ml_issue("b/two", 2),
        ];

        let sample = balance(&candidates, &ml, &mut StdRng::seed_from_u64(7));

        assert_eq!(sample.excluded_projects, vec!["b/two".parse::<RepoSlug>().unwrap()]);
        assert_eq!(sample.ml.len(), 2);
        assert_eq!(sample.non_ml.len(), 2);
        for row in &sample.non_ml {
            assert_eq!(row.project.full_name(), "a/one");
            assert!(row.issue_number == 3 || row.issue_number == 4);
            assert_eq!(row.category, IssueKind::NonMl);
        }
        assert!(sample.ml.iter().all(|row| row.category == IssueKind::Ml));
    }

    #[test]
    fn same_seed_gives_same_sample() {
        let candidates: Vec<_> = (1..=20).map(|n| candidate("a/one", n)).collect();
        let ml = vec![ml_issue("a/one", 1), ml_issue("a/one", 2), ml_issue("a/one", 3)];

        let first = balance(&candidates, &ml, &mut StdRng::seed_from_u64(2023));
        let second = balance(&candidates, &ml, &mut StdRng::seed_from_u64(2023));

        assert_eq!(first, second);
        assert_eq!(first.non_ml.len(), 3);
        let rows = first.into_rows();
        assert_eq!(rows[0].category, IssueKind::NonMl);
        assert_eq!(rows[5].category, IssueKind::Ml);
    }

    #[test]
    fn candidates_without_pulls_are_ignored() {
        let mut empty = candidate("a/one", 5);
        empty.pull_requests.clear();
        let sample = balance(&[empty], &[ml_issue("a/one", 1)], &mut StdRng::seed_from_u64(1));

        assert!(sample.ml.is_empty());
        assert!(sample.non_ml.is_empty());
        assert_eq!(sample.excluded_projects.len(), 1);
    }

    fn save_documents(layout: &DataLayout, row: &IssuePrRow, changed_files: u64) {
        write_json(
            &layout.issue_file(&row.project, row.issue_number),
            &json!({
                "number": row.issue_number,
                "title": "t",
                "state": "closed",
                "created_at": "2022-01-01T00:00:00Z",
                "closed_at": "2022-01-03T00:00:00Z"
            }),
        )
        .unwrap();
        let pull = row.pull_requests[0];
        write_json(
            &layout.pull_file(&row.project, pull),
            &json!({
                "number": pull,
                "state": "closed",
                "merged_at": "2022-01-02T00:00:00Z",
                "changed_files": changed_files,
                "additions": 10,
                "deletions": 2
            }),
        )
        .unwrap();
    }

    #[test]
    fn samples_only_measurable_untagged_candidates() {
        let temp = TempDir::new().unwrap();
        let layout = DataLayout::new(temp.path());
        let closed: Vec<_> = (1..=4).map(|n| candidate("a/b", n)).collect();
        for (row, changed) in closed.iter().zip([3, 0, 2, 5]) {
            save_documents(&layout, row, changed);
        }
        write_csv(&layout.artifact(Artifact::ClosedIssuePullRequests), &closed).unwrap();
        write_csv(
            &layout.artifact(Artifact::KeywordMlIssues),
            &[closed[0].clone(), closed[2].clone()],
        )
        .unwrap();
        write_csv(&layout.artifact(Artifact::MeasuredMlIssues), &[ml_issue("a/b", 1)]).unwrap();

        for seed in [1, 2, 3, 2023] {
            sample_non_ml(&layout, seed).unwrap();

            let rows: Vec<CategorizedIssueRow> =
                read_csv(&layout.artifact(Artifact::CombinedDataset)).unwrap();
            let non_ml: Vec<u64> = rows
                .iter()
                .filter(|row| row.category == IssueKind::NonMl)
                .map(|row| row.issue_number)
                .collect();
            assert_eq!(non_ml, vec![4]);
        }
    }

    #[test]
    fn zero_file_candidate_excludes_the_project() {
        let temp = TempDir::new().unwrap();
        let layout = DataLayout::new(temp.path());
        let closed = vec![candidate("a/b", 1), candidate("a/b", 2)];
        save_documents(&layout, &closed[0], 3);
        save_documents(&layout, &closed[1], 0);
        write_csv(&layout.artifact(Artifact::ClosedIssuePullRequests), &closed).unwrap();
        write_csv(&layout.artifact(Artifact::KeywordMlIssues), &closed[..1]).unwrap();
        write_csv(&layout.artifact(Artifact::MeasuredMlIssues), &[ml_issue("a/b", 1)]).unwrap();

        let summary = sample_non_ml(&layout, 2023).unwrap();

        assert_eq!(summary.written, 0);
        assert_eq!(summary.skipped, 1);
        let rows: Vec<CategorizedIssueRow> =
            read_csv(&layout.artifact(Artifact::CombinedDataset)).unwrap();
        assert!(rows.is_empty());
    }
}
