//! Repository selection stages.
//!
//! `collect-repos` downloads metadata for the seed repositories,
//! `tabulate-repos` rebuilds the table from the saved documents and
//! `filter-repos` applies the age, popularity and activity thresholds.

mod filter;
mod seed;

pub use filter::RepositoryFilter;
pub use seed::read_seed;

use crate::config::{RepositoryFilterConfig, SeedDatasetConfig};
use crate::dataset::{list_dir, read_csv, read_json, write_csv, write_json, DatasetError};
use crate::github::{repository_route, FetchError, GitHubClient};
use crate::layout::{Artifact, DataLayout, RepoSlug};
use crate::records::RepositoryRecord;
use crate::summary::{RecordOutcome, StageSummary};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, info_span, warn, Instrument};

/// Downloads the metadata of every matching seed repository.
///
/// Saved documents are reused. Repositories answering 404 are skipped.
///
/// # Errors
///
/// Returns [`DatasetError`] if the seed file cannot be read or an output
/// cannot be written.
pub async fn collect_repositories(
    client: &GitHubClient,
    layout: &DataLayout,
    seed: &SeedDatasetConfig,
    seed_path: &Path,
) -> Result<StageSummary, DatasetError> {
    let span = info_span!("collect_repos", seed = %seed_path.display());

    async {
        let slugs = read_seed(seed_path, &seed.category, &seed.language)?;
        info!(count = slugs.len(), "Seed repositories selected");

        let mut summary = StageSummary::new("collect-repos");
        let mut records = Vec::new();

        for slug in &slugs {
            let outcome = match fetch_repository(client, layout, slug).await {
                Ok(Some(record)) => {
                    records.push(record);
                    RecordOutcome::Written
                }
                Ok(None) => {
                    warn!(repo = %slug, "Repository not found, skipping");
                    RecordOutcome::skipped("repository not found")
                }
                Err(e) => {
                    warn!(repo = %slug, error = %e, "Failed to collect repository");
                    RecordOutcome::failed(e)
                }
            };
            summary.record(&outcome);
        }

        write_csv(&layout.artifact(Artifact::Repositories), &records)?;
        info!(%summary, "Collected repositories");
        Ok(summary)
    }
    .instrument(span)
    .await
}

/// Loads the saved metadata document or downloads it.
async fn fetch_repository(
    client: &GitHubClient,
    layout: &DataLayout,
    slug: &RepoSlug,
) -> Result<Option<RepositoryRecord>, FetchError> {
    let path = layout.repo_info_file(slug);
    let document: Value = if path.exists() {
        debug!(repo = %slug, "Reusing saved metadata");
        read_json(&path)?
    } else {
        match client.fetch_json::<()>(&repository_route(slug), None).await? {
            Some(document) => {
                write_json(&path, &document)?;
                document
            }
            None => return Ok(None),
        }
    };

    let record = RepositoryRecord::from_document(&document)
        .map_err(|message| DatasetError::malformed(&path, message))?;
    Ok(Some(record))
}

/// Rebuilds the repository table from every saved metadata document.
///
/// # Errors
///
/// Returns [`DatasetError`] if the directory cannot be listed or the table
/// cannot be written.
pub fn tabulate_repositories(layout: &DataLayout) -> Result<StageSummary, DatasetError> {
    let _span = info_span!("tabulate_repos").entered();
    let mut summary = StageSummary::new("tabulate-repos");
    let mut records = Vec::new();

    for path in list_dir(&layout.repo_info_dir())? {
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let parsed = read_json::<Value>(&path).and_then(|document| {
            RepositoryRecord::from_document(&document)
                .map_err(|message| DatasetError::malformed(&path, message))
        });
        let outcome = match parsed {
            Ok(record) => {
                records.push(record);
                RecordOutcome::Written
            }
            Err(e) => {
                warn!(error = %e, "Unusable repository document");
                RecordOutcome::failed(e)
            }
        };
        summary.record(&outcome);
    }

    write_csv(&layout.artifact(Artifact::TabulatedRepositories), &records)?;
    info!(%summary, "Tabulated repositories");
    Ok(summary)
}

/// Applies [`RepositoryFilter`] to the tabulated repositories.
///
/// # Errors
///
/// Returns [`DatasetError`] if the table is missing or the output cannot be
/// written.
pub fn filter_repositories(
    layout: &DataLayout,
    config: &RepositoryFilterConfig,
) -> Result<StageSummary, DatasetError> {
    let _span = info_span!("filter_repos").entered();
    let filter = RepositoryFilter::from_config(config);
    debug!(?filter, "Repository thresholds");

    let records: Vec<RepositoryRecord> =
        read_csv(&layout.artifact(Artifact::TabulatedRepositories))?;
    let mut summary = StageSummary::new("filter-repos");
    let mut kept = Vec::new();

    for record in records {
        if filter.accepts(&record) {
            summary.record(&RecordOutcome::Written);
            kept.push(record);
        } else {
            debug!(repo = %record.name, "Repository below thresholds");
            summary.record(&RecordOutcome::skipped("below thresholds"));
        }
    }

    write_csv(&layout.artifact(Artifact::FilteredRepositories), &kept)?;
    info!(%summary, "Filtered repositories");
    Ok(summary)
}

/// Repositories of the filtered table, in table order.
///
/// # Errors
///
/// Returns [`DatasetError`] if the table is missing or malformed.
pub fn filtered_repositories(layout: &DataLayout) -> Result<Vec<RepoSlug>, DatasetError> {
    let records: Vec<RepositoryRecord> =
        read_csv(&layout.artifact(Artifact::FilteredRepositories))?;
    Ok(records.into_iter().map(|record| record.name).collect())
}
