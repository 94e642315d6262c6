//! On-disk layout of pipeline artifacts.
//!
//! Every stage reads from and writes to a single data directory. Per-repository
//! artifacts are keyed by the `owner*name` file stem of a [`RepoSlug`].
//!
//! ```text
//! data/
//! ├── repo_info/<slug>.json
//! ├── issues_list/<slug>.json
//! ├── pulls_list/<slug>.json
//! ├── cleaned_issues/<slug>.json
//! ├── issues/<slug>/{issue,timeline}/<n>.json
//! ├── pulls/<slug>/<n>.json
//! ├── PR_files/<slug>/PR_<n>/<sha>/<path*with*stars>   (PR_<n>.partial while downloading)
//! └── <numbered stage CSVs>
//! ```

mod slug;

pub use slug::{RepoSlug, SlugError, SLUG_SEPARATOR};

use std::path::{Path, PathBuf};

/// Numbered CSV artifacts produced by the pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// Repositories fetched from the seed list.
    Repositories,
    /// Repositories rebuilt from the saved metadata documents.
    TabulatedRepositories,
    /// Repositories passing the age/stars/activity filter.
    FilteredRepositories,
    /// Issue counts per project after removing pull requests.
    IssueCounts,
    /// Issues referenced by same-repository pull requests.
    IssuePullRequests,
    /// Closed issues with at least one merged pull request.
    ClosedIssuePullRequests,
    /// Issues whose pull requests import an ML framework.
    MlImportIssues,
    /// ML glossary keywords.
    Glossary,
    /// ML-import issues whose title matches a glossary keyword.
    KeywordMlIssues,
    /// Merge commit SHA of every ML pull request.
    MergeCommits,
    /// ML issues with line changes and fix duration.
    MeasuredMlIssues,
    /// Balanced ML and non-ML issue sample.
    CombinedDataset,
    /// Balanced sample with line changes and fix duration.
    MeasuredDataset,
    /// Final analysis table.
    FinalDataset,
}

impl Artifact {
    /// File name of the artifact, relative to the data directory.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Repositories => "1_repositories.csv",
            Self::TabulatedRepositories => "2_repositories.csv",
            Self::FilteredRepositories => "3_filtered_repositories.csv",
            Self::IssueCounts => "6_issue_counts.csv",
            Self::IssuePullRequests => "8_issue_pr.csv",
            Self::ClosedIssuePullRequests => "11_issue_with_closed_pr.csv",
            Self::MlImportIssues => "13_issue_contain_ml.csv",
            Self::Glossary => "google_ml_glossary/Keyword_list.csv",
            Self::KeywordMlIssues => "14_issue_keyword_and_ml.csv",
            Self::MergeCommits => "15_merge_commits.csv",
            Self::MeasuredMlIssues => "18_line_change_and_duration.csv",
            Self::CombinedDataset => "19_combined_dataset.csv",
            Self::MeasuredDataset => "22_all_issues.csv",
            Self::FinalDataset => "23_all_issues_clean.csv",
        }
    }
}

/// Resolves artifact paths inside a data directory.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Creates a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a numbered CSV artifact.
    pub fn artifact(&self, artifact: Artifact) -> PathBuf {
        self.root.join(artifact.file_name())
    }

    /// Directory holding saved repository metadata documents.
    pub fn repo_info_dir(&self) -> PathBuf {
        self.root.join("repo_info")
    }

    /// Saved repository metadata document.
    pub fn repo_info_file(&self, slug: &RepoSlug) -> PathBuf {
        self.repo_info_dir().join(format!("{}.json", slug.file_stem()))
    }

    /// Every issue number (pull requests included) of a repository.
    pub fn issues_list_file(&self, slug: &RepoSlug) -> PathBuf {
        self.root
            .join("issues_list")
            .join(format!("{}.json", slug.file_stem()))
    }

    /// Every pull request number of a repository.
    pub fn pulls_list_file(&self, slug: &RepoSlug) -> PathBuf {
        self.root
            .join("pulls_list")
            .join(format!("{}.json", slug.file_stem()))
    }

    /// Issue numbers with pull requests removed.
    pub fn cleaned_issues_file(&self, slug: &RepoSlug) -> PathBuf {
        self.root
            .join("cleaned_issues")
            .join(format!("{}.json", slug.file_stem()))
    }

    /// Directory holding every downloaded issue, one subdirectory per repository.
    pub fn issues_dir(&self) -> PathBuf {
        self.root.join("issues")
    }

    /// Directory of a repository's downloaded issue documents.
    pub fn issue_dir(&self, slug: &RepoSlug) -> PathBuf {
        self.issues_dir().join(slug.file_stem()).join("issue")
    }

    /// Saved issue document.
    pub fn issue_file(&self, slug: &RepoSlug, number: u64) -> PathBuf {
        self.issue_dir(slug).join(format!("{number}.json"))
    }

    /// Saved issue timeline document.
    pub fn timeline_file(&self, slug: &RepoSlug, number: u64) -> PathBuf {
        self.issues_dir()
            .join(slug.file_stem())
            .join("timeline")
            .join(format!("{number}.json"))
    }

    /// Saved pull request document.
    pub fn pull_file(&self, slug: &RepoSlug, number: u64) -> PathBuf {
        self.root
            .join("pulls")
            .join(slug.file_stem())
            .join(format!("{number}.json"))
    }

    /// Directory of source files touched by a pull request, one subdirectory per commit.
    pub fn pr_files_dir(&self, slug: &RepoSlug, number: u64) -> PathBuf {
        self.root
            .join("PR_files")
            .join(slug.file_stem())
            .join(format!("PR_{number}"))
    }

    /// Directory a pull request's files are downloaded into before being
    /// moved to [`DataLayout::pr_files_dir`].
    pub fn pr_files_staging_dir(&self, slug: &RepoSlug, number: u64) -> PathBuf {
        self.root
            .join("PR_files")
            .join(slug.file_stem())
            .join(format!("PR_{number}.partial"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_per_repository_paths() {
        let layout = DataLayout::new("data");
        let slug = RepoSlug::new("sktime", "sktime").unwrap();

        assert_eq!(
            layout.repo_info_file(&slug),
            PathBuf::from("data/repo_info/sktime*sktime.json")
        );
        assert_eq!(
            layout.timeline_file(&slug, 12),
            PathBuf::from("data/issues/sktime*sktime/timeline/12.json")
        );
        assert_eq!(
            layout.pr_files_dir(&slug, 198),
            PathBuf::from("data/PR_files/sktime*sktime/PR_198")
        );
    }

    #[test]
    fn resolves_numbered_artifacts() {
        let layout = DataLayout::new("data");
        assert_eq!(
            layout.artifact(Artifact::FinalDataset),
            PathBuf::from("data/23_all_issues_clean.csv")
        );
    }
}
