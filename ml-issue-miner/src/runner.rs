//! Dispatches pipeline stages.

mod config;
mod error;
mod stage;

pub use config::RunnerConfig;
pub use error::RunnerError;
pub use stage::Stage;

use crate::audit::{audit, AuditOptions};
use crate::classification::{
    extract_glossary, find_ml_imports, scan_keywords, Glossary, ImportScanner,
};
use crate::github::GitHubClient;
use crate::issues::{clean_issues, download_issues, link_issues, list_items};
use crate::layout::DataLayout;
use crate::measurement::{measure, tabulate, MeasureTarget};
use crate::pull_requests::{collect_merge_commits, download_pr_files, download_pulls, filter_closed};
use crate::repositories::{collect_repositories, filter_repositories, tabulate_repositories};
use crate::sampling::sample_non_ml;
use crate::summary::StageSummary;
use tracing::{info, info_span, Instrument};

/// Runs single pipeline stages against one data directory.
pub struct Runner {
    config: RunnerConfig,
    client: GitHubClient,
    layout: DataLayout,
}

impl Runner {
    /// Builds a runner from the provided configuration.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let client = GitHubClient::new(config.token())?;
        let layout = DataLayout::new(config.data_dir());
        Ok(Self {
            config,
            client,
            layout,
        })
    }

    /// Executes one stage.
    pub async fn run(&self, stage: &Stage) -> Result<StageSummary, RunnerError> {
        let span = info_span!("stage", name = stage.name());

        async {
            info!(
                data_dir = %self.layout.root().display(),
                online = stage.is_online(),
                "Starting stage"
            );
            self.dispatch(stage).await
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, stage: &Stage) -> Result<StageSummary, RunnerError> {
        let pipeline = self.config.pipeline();
        let layout = &self.layout;
        let client = &self.client;

        let summary = match stage {
            Stage::CollectRepos { seed } => {
                let seed_path = seed.as_ref().unwrap_or(&pipeline.seed_dataset.path);
                collect_repositories(client, layout, &pipeline.seed_dataset, seed_path).await?
            }
            Stage::TabulateRepos => tabulate_repositories(layout)?,
            Stage::FilterRepos => filter_repositories(layout, &pipeline.repository_filter)?,
            Stage::ListItems => list_items(client, layout).await?,
            Stage::CleanIssues => clean_issues(layout)?,
            Stage::DownloadIssues => download_issues(client, layout).await?,
            Stage::LinkIssues => link_issues(layout)?,
            Stage::DownloadPulls => download_pulls(client, layout).await?,
            Stage::FilterClosed => filter_closed(layout)?,
            Stage::DownloadPrFiles => {
                download_pr_files(client, layout, &pipeline.classification.source_extension).await?
            }
            Stage::FindImports => {
                let scanner = ImportScanner::new(&pipeline.classification.ml_modules);
                find_ml_imports(layout, &scanner)?
            }
            Stage::ExtractGlossary { html } => extract_glossary(layout, html)?,
            Stage::ScanKeywords => {
                let glossary = Glossary::load(&pipeline.glossary_path())?;
                scan_keywords(layout, &glossary)?
            }
            Stage::MergeCommits => collect_merge_commits(layout)?,
            Stage::Measure {
                combined,
                input,
                output,
            } => {
                let target =
                    MeasureTarget::resolve(layout, *combined, input.clone(), output.clone());
                measure(layout, pipeline.measurement.line_source, &target).await?
            }
            Stage::SampleNonMl => sample_non_ml(layout, pipeline.sampling.seed)?,
            Stage::Tabulate => tabulate(layout)?,
            Stage::Audit {
                labels,
                expected_per_class,
            } => {
                let options = AuditOptions {
                    labels: labels.as_deref(),
                    expected_per_class: *expected_per_class,
                };
                audit(layout, &options)?
            }
        };

        Ok(summary)
    }
}
