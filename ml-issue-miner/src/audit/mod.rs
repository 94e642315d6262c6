//! Consistency checks over the final dataset.
//!
//! The audit never modifies any artifact; it reports every violation and
//! fails the stage if there is at least one.

mod violation;

pub use violation::Violation;

use crate::dataset::{read_csv, DatasetError, FinalRow, MeasuredIssueRow};
use crate::layout::{Artifact, DataLayout, RepoSlug};
use crate::measurement::size_of_fix;
use crate::records::{IssueKind, LabeledIssue};
use crate::summary::StageSummary;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{info, info_span, warn};

/// Options of the audit.
#[derive(Debug, Clone, Default)]
pub struct AuditOptions<'a> {
    /// Labeling sheet to cross-check against the dataset.
    pub labels: Option<&'a Path>,
    /// Required number of issues in each class.
    pub expected_per_class: Option<usize>,
}

/// Checks the final dataset against its measured source and, optionally, a
/// labeling sheet.
#[must_use]
pub fn check(
    measured: &[MeasuredIssueRow],
    table: &[FinalRow],
    labels: Option<&[LabeledIssue]>,
    expected_per_class: Option<usize>,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    let mut seen = HashSet::new();
    for row in table {
        if !seen.insert((&row.project, row.issue_number)) {
            violations.push(Violation::DuplicateIssue {
                project: row.project.clone(),
                issue_number: row.issue_number,
            });
        }
        if row.fix_duration_days < 0 {
            violations.push(Violation::NegativeDuration {
                issue_url: row.issue_url.clone(),
                days: row.fix_duration_days,
            });
        }
    }

    let ml = table.iter().filter(|row| row.category == IssueKind::Ml).count();
    let non_ml = table.len() - ml;
    if ml != non_ml {
        violations.push(Violation::Unbalanced { ml, non_ml });
    }
    if let Some(expected) = expected_per_class {
        for (kind, actual) in [(IssueKind::Ml, ml), (IssueKind::NonMl, non_ml)] {
            if actual != expected {
                violations.push(Violation::ClassSize {
                    kind,
                    expected,
                    actual,
                });
            }
        }
    }

    let by_url: HashMap<&str, &MeasuredIssueRow> = measured
        .iter()
        .map(|row| (row.issue_url.as_str(), row))
        .collect();
    for row in table {
        match by_url.get(row.issue_url.as_str()) {
            Some(source) => {
                let expected = size_of_fix(source.lines_added, source.lines_deleted);
                if row.line_change != expected {
                    violations.push(Violation::LineChangeMismatch {
                        issue_url: row.issue_url.clone(),
                        expected,
                        actual: row.line_change,
                    });
                }
            }
            None => violations.push(Violation::MissingMeasurement {
                issue_url: row.issue_url.clone(),
            }),
        }
    }

    let mut ml_projects: Vec<&RepoSlug> = Vec::new();
    let mut non_ml_projects = HashSet::new();
    for row in table {
        match row.category {
            IssueKind::Ml if !ml_projects.contains(&&row.project) => ml_projects.push(&row.project),
            IssueKind::NonMl => {
                non_ml_projects.insert(&row.project);
            }
            IssueKind::Ml => {}
        }
    }
    for project in ml_projects {
        if !non_ml_projects.contains(project) {
            violations.push(Violation::ProjectWithoutNonMl {
                project: project.clone(),
            });
        }
    }

    if let Some(labels) = labels {
        let labeled: HashMap<&str, IssueKind> = labels
            .iter()
            .map(|label| (label.issue_url.as_str(), label.kind))
            .collect();
        for row in table {
            match labeled.get(row.issue_url.as_str()) {
                Some(&kind) if kind != row.category => violations.push(Violation::LabelMismatch {
                    issue_url: row.issue_url.clone(),
                    labeled: kind,
                    dataset: row.category,
                }),
                Some(_) => {}
                None => violations.push(Violation::Unlabeled {
                    issue_url: row.issue_url.clone(),
                }),
            }
        }
    }

    violations
}

/// Audits the measured and tabulated balanced sample.
///
/// # Errors
///
/// Returns [`DatasetError`] if an input table is missing or malformed.
pub fn audit(
    layout: &DataLayout,
    options: &AuditOptions<'_>,
) -> Result<StageSummary, DatasetError> {
    let _span = info_span!("audit").entered();
    let measured: Vec<MeasuredIssueRow> = read_csv(&layout.artifact(Artifact::MeasuredDataset))?;
    let table: Vec<FinalRow> = read_csv(&layout.artifact(Artifact::FinalDataset))?;
    let labels: Option<Vec<LabeledIssue>> = options
        .labels
        .map(|path| read_csv::<LabeledIssue>(path))
        .transpose()?;

    let violations = check(&measured, &table, labels.as_deref(), options.expected_per_class);
    for violation in &violations {
        warn!(%violation, "Audit violation");
    }

    let mut summary = StageSummary::new("audit");
    summary.read = table.len();
    summary.violations = violations.iter().map(ToString::to_string).collect();

    if summary.violations.is_empty() {
        info!(rows = table.len(), "Dataset passed every check");
    } else {
        warn!(violations = summary.violations.len(), "Dataset failed the audit");
    }
    Ok(summary)
}
