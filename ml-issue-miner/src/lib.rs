#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod audit;
pub mod classification;
pub mod config;
pub mod dataset;
pub mod github;
pub mod issues;
pub mod layout;
pub mod measurement;
pub mod pull_requests;
pub mod rate_limit;
pub mod records;
pub mod repositories;
pub mod runner;
pub mod sampling;
pub mod summary;

pub use audit::{audit, check, AuditOptions, Violation};
pub use classification::{
    extract_glossary, find_ml_imports, normalize_title, scan_keywords, Glossary, ImportScanner,
};
pub use config::{load_config, ConfigError, LineSource, PipelineConfig};
pub use dataset::DatasetError;
pub use github::{FetchError, GitHubClient};
pub use issues::{clean_issues, download_issues, link_issues, list_items};
pub use layout::{Artifact, DataLayout, RepoSlug};
pub use measurement::{measure, resolution_days, size_of_fix, tabulate, MeasureError, MeasureTarget};
pub use pull_requests::{collect_merge_commits, download_pr_files, download_pulls, filter_closed};
pub use rate_limit::{ensure_core_rate_limit, fetch_core_budget, sleep_until_reset, RateLimitInfo};
pub use records::{BugCategory, IssueKind};
pub use repositories::{collect_repositories, filter_repositories, tabulate_repositories};
pub use runner::{Runner, RunnerConfig, RunnerError, Stage};
pub use sampling::{balance, sample_non_ml, BalancedSample};
pub use summary::{RecordOutcome, StageSummary};
