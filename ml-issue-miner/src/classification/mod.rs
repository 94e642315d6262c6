//! ML classification stages.
//!
//! An issue is tagged ML when a file touched by one of its merged pull
//! requests imports an ML framework ([`ImportScanner`]) and its title
//! contains a glossary keyword ([`Glossary`]).

mod glossary;
mod imports;
mod keywords;

pub use glossary::{extract_keywords, GlossaryRow};
pub use imports::{imported_modules, ImportScanner};
pub use keywords::{normalize_title, Glossary};

use crate::dataset::{list_dir, read_csv, require, write_csv, DatasetError, IssuePrRow};
use crate::layout::{Artifact, DataLayout};
use crate::summary::{RecordOutcome, StageSummary};
use std::fs;
use std::path::Path;
use tracing::{debug, info, info_span, warn};

/// Keeps issues whose merged pull requests touched a file importing an ML
/// framework.
///
/// Pull requests without downloaded files are logged as empty diffs.
///
/// # Errors
///
/// Returns [`DatasetError`] if the closed issue table is missing or a
/// pull request's file directory cannot be read.
pub fn find_ml_imports(
    layout: &DataLayout,
    scanner: &ImportScanner,
) -> Result<StageSummary, DatasetError> {
    let _span = info_span!("find_imports").entered();
    let rows: Vec<IssuePrRow> = read_csv(&layout.artifact(Artifact::ClosedIssuePullRequests))?;
    let mut summary = StageSummary::new("find-imports");
    let mut kept = Vec::new();
    let mut empty_pulls = 0usize;

    for row in rows {
        let mut imports_ml = Ok(false);
        for &number in &row.pull_requests {
            let pull_dir = layout.pr_files_dir(&row.project, number);
            if !pull_dir.is_dir() {
                debug!(repo = %row.project, pull = number, "No downloaded files, empty diff");
                empty_pulls += 1;
                continue;
            }
            imports_ml = pull_imports_ml(&pull_dir, scanner);
            if !matches!(imports_ml, Ok(false)) {
                break;
            }
        }

        let outcome = match imports_ml {
            Ok(true) => {
                kept.push(row);
                RecordOutcome::Written
            }
            Ok(false) => RecordOutcome::skipped("no ML import"),
            Err(e) => {
                warn!(issue = %row.issue_url, error = %e, "Failed to scan pull request files");
                RecordOutcome::failed(e)
            }
        };
        summary.record(&outcome);
    }

    write_csv(&layout.artifact(Artifact::MlImportIssues), &kept)?;
    info!(%summary, empty_pulls, "Found ML imports");
    Ok(summary)
}

/// Scans every commit directory of a pull request, in name order.
fn pull_imports_ml(pull_dir: &Path, scanner: &ImportScanner) -> Result<bool, DatasetError> {
    for commit_dir in list_dir(pull_dir)?.iter().filter(|path| path.is_dir()) {
        for file in list_dir(commit_dir)? {
            let bytes = fs::read(&file).map_err(|e| DatasetError::io(&file, e))?;
            if scanner.imports_ml(&String::from_utf8_lossy(&bytes)) {
                debug!(file = %file.display(), "ML import found");
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Extracts glossary keywords from a saved HTML page into the keyword CSV.
///
/// # Errors
///
/// Returns [`DatasetError`] if the page cannot be read or the CSV written.
pub fn extract_glossary(
    layout: &DataLayout,
    html_path: &Path,
) -> Result<StageSummary, DatasetError> {
    let _span = info_span!("extract_glossary", html = %html_path.display()).entered();
    require(html_path)?;
    let html = fs::read_to_string(html_path).map_err(|e| DatasetError::io(html_path, e))?;

    let rows = extract_keywords(&html, html_path)?;
    if rows.is_empty() {
        warn!("No glossary headings found");
    }

    let mut summary = StageSummary::new("extract-glossary");
    summary.read = rows.len();
    summary.written = rows.len();

    write_csv(&layout.artifact(Artifact::Glossary), &rows)?;
    info!(%summary, "Extracted glossary keywords");
    Ok(summary)
}

/// Keeps ML-import issues whose title contains a glossary keyword.
///
/// # Errors
///
/// Returns [`DatasetError`] if the import table is missing or the output
/// cannot be written.
pub fn scan_keywords(
    layout: &DataLayout,
    glossary: &Glossary,
) -> Result<StageSummary, DatasetError> {
    let _span = info_span!("scan_keywords", keywords = glossary.len()).entered();
    if glossary.is_empty() {
        warn!("Glossary is empty, no issue can match");
    }

    let rows: Vec<IssuePrRow> = read_csv(&layout.artifact(Artifact::MlImportIssues))?;
    let mut summary = StageSummary::new("scan-keywords");
    let mut kept = Vec::new();

    for row in rows {
        match glossary.find_in(&row.title) {
            Some(keyword) => {
                debug!(issue = %row.issue_url, keyword, "Keyword match");
                kept.push(row);
                summary.record(&RecordOutcome::Written);
            }
            None => summary.record(&RecordOutcome::skipped("no glossary keyword")),
        }
    }

    write_csv(&layout.artifact(Artifact::KeywordMlIssues), &kept)?;
    info!(%summary, "Scanned titles for keywords");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_ml_modules;
    use crate::dataset::write_text;
    use crate::layout::RepoSlug;
    use tempfile::TempDir;

    fn row(slug: &RepoSlug, issue: u64, pulls: Vec<u64>, title: &str) -> IssuePrRow {
        IssuePrRow {
            project: slug.clone(),
            issue_url: slug.issue_url(issue),
            issue_number: issue,
            pull_requests: pulls,
            title: title.to_string(),
        }
    }

    #[test]
    fn find_imports_checks_every_commit_of_every_pull() {
        let temp = TempDir::new().unwrap();
        let layout = DataLayout::new(temp.path());
        let slug = RepoSlug::new("a", "b").unwrap();

        write_text(
            &layout.pr_files_dir(&slug, 10).join("c1").join("src*util.py"),
            "import os\n",
        )
        .unwrap();
        write_text(
            &layout.pr_files_dir(&slug, 10).join("c2").join("src*train.py"),
            "from torch import nn\n",
        )
        .unwrap();
        write_text(
            &layout.pr_files_dir(&slug, 20).join("c3").join("setup.py"),
            "import setuptools\n",
        )
        .unwrap();

        let rows = vec![
            row(&slug, 1, vec![10], "GPU OOM"),
            row(&slug, 2, vec![20], "Packaging"),
            row(&slug, 3, vec![30, 10], "Empty diff first"),
        ];
        write_csv(&layout.artifact(Artifact::ClosedIssuePullRequests), &rows).unwrap();

        let summary = find_ml_imports(&layout, &ImportScanner::new(&default_ml_modules())).unwrap();

        assert_eq!(summary.written, 2);
        let kept: Vec<IssuePrRow> = read_csv(&layout.artifact(Artifact::MlImportIssues)).unwrap();
        let numbers: Vec<u64> = kept.iter().map(|row| row.issue_number).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[test]
    fn unreadable_pull_file_fails_only_its_issue() {
        let temp = TempDir::new().unwrap();
        let layout = DataLayout::new(temp.path());
        let slug = RepoSlug::new("a", "b").unwrap();

        let unreadable = layout.pr_files_dir(&slug, 10).join("c1").join("model.py");
        std::fs::create_dir_all(unreadable).unwrap();
        write_text(
            &layout.pr_files_dir(&slug, 20).join("c2").join("train.py"),
            "import torch\n",
        )
        .unwrap();
        let rows = vec![row(&slug, 1, vec![10], "Broken"), row(&slug, 2, vec![20], "GPU OOM")];
        write_csv(&layout.artifact(Artifact::ClosedIssuePullRequests), &rows).unwrap();

        let summary = find_ml_imports(&layout, &ImportScanner::new(&default_ml_modules())).unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.written, 1);
        let kept: Vec<IssuePrRow> = read_csv(&layout.artifact(Artifact::MlImportIssues)).unwrap();
        assert_eq!(kept[0].issue_number, 2);
    }

    #[test]
    fn interrupted_downloads_are_not_scanned() {
        let temp = TempDir::new().unwrap();
        let layout = DataLayout::new(temp.path());
        let slug = RepoSlug::new("a", "b").unwrap();
        write_text(
            &layout.pr_files_staging_dir(&slug, 10).join("c1").join("train.py"),
            "import torch\n",
        )
        .unwrap();
        write_csv(
            &layout.artifact(Artifact::ClosedIssuePullRequests),
            &[row(&slug, 1, vec![10], "GPU OOM")],
        )
        .unwrap();

        let summary = find_ml_imports(&layout, &ImportScanner::new(&default_ml_modules())).unwrap();

        assert_eq!(summary.written, 0);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn scan_keywords_filters_by_title() {
        let temp = TempDir::new().unwrap();
        let layout = DataLayout::new(temp.path());
        let slug = RepoSlug::new("a", "b").unwrap();
        let rows = vec![
            row(&slug, 1, vec![10], "Loss is NaN after first epoch"),
            row(&slug, 2, vec![11], "Typo in README"),
        ];
        write_csv(&layout.artifact(Artifact::MlImportIssues), &rows).unwrap();

        let summary = scan_keywords(&layout, &Glossary::new(["epoch", "loss"])).unwrap();

        assert_eq!(summary.written, 1);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn extract_glossary_writes_keyword_csv() {
        let temp = TempDir::new().unwrap();
        let layout = DataLayout::new(temp.path());
        let html = temp.path().join("ML_Glossary.html");
        fs::write(&html, r#"<h2 class="hide-from-toc" data-text="epoch">epoch</h2>"#).unwrap();

        let summary = extract_glossary(&layout, &html).unwrap();
        assert_eq!(summary.written, 1);

        let glossary = Glossary::load(&layout.artifact(Artifact::Glossary)).unwrap();
        assert!(glossary.matches("Bad epoch count"));
    }
}
