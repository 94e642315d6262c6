//! Pipeline stages, in operator order.

use std::fmt;
use std::path::PathBuf;

/// One step of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// Download metadata of the seed repositories.
    CollectRepos {
        /// Seed CSV overriding the configured one.
        seed: Option<PathBuf>,
    },
    TabulateRepos,
    FilterRepos,
    ListItems,
    CleanIssues,
    DownloadIssues,
    LinkIssues,
    DownloadPulls,
    FilterClosed,
    DownloadPrFiles,
    FindImports,
    /// Turn a saved glossary page into the keyword CSV.
    ExtractGlossary { html: PathBuf },
    ScanKeywords,
    MergeCommits,
    /// Measure line changes and fix duration.
    Measure {
        combined: bool,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
    },
    SampleNonMl,
    Tabulate,
    /// Verify the final dataset.
    Audit {
        labels: Option<PathBuf>,
        expected_per_class: Option<usize>,
    },
}

impl Stage {
    /// Command-line name of the stage.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CollectRepos { .. } => "collect-repos",
            Self::TabulateRepos => "tabulate-repos",
            Self::FilterRepos => "filter-repos",
            Self::ListItems => "list-items",
            Self::CleanIssues => "clean-issues",
            Self::DownloadIssues => "download-issues",
            Self::LinkIssues => "link-issues",
            Self::DownloadPulls => "download-pulls",
            Self::FilterClosed => "filter-closed",
            Self::DownloadPrFiles => "download-pr-files",
            Self::FindImports => "find-imports",
            Self::ExtractGlossary { .. } => "extract-glossary",
            Self::ScanKeywords => "scan-keywords",
            Self::MergeCommits => "merge-commits",
            Self::Measure { .. } => "measure",
            Self::SampleNonMl => "sample-non-ml",
            Self::Tabulate => "tabulate",
            Self::Audit { .. } => "audit",
        }
    }

    /// Whether the stage talks to the GitHub API.
    #[must_use]
    pub fn is_online(&self) -> bool {
        matches!(
            self,
            Self::CollectRepos { .. }
                | Self::ListItems
                | Self::DownloadIssues
                | Self::DownloadPulls
                | Self::DownloadPrFiles
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
