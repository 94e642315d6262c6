//! Pipeline configuration deserialization.

use crate::config::ConfigError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parsed contents of `pipeline.toml`.
///
/// Every section is optional; missing values fall back to the parameters of
/// the published study.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PipelineConfig {
    /// Directory holding every pipeline artifact.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Seed repository list selection.
    #[serde(default)]
    pub seed_dataset: SeedDatasetConfig,

    /// Repository age/popularity/activity thresholds.
    #[serde(default)]
    pub repository_filter: RepositoryFilterConfig,

    /// ML import and keyword classification.
    #[serde(default)]
    pub classification: ClassificationConfig,

    /// Non-ML sampling.
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Line change measurement.
    #[serde(default)]
    pub measurement: MeasurementConfig,
}

/// Selection of repositories from the seed metadata CSV.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SeedDatasetConfig {
    /// Seed repository-metadata CSV (defaults to "repo-metadata.csv").
    #[serde(default = "default_seed_path")]
    pub path: PathBuf,

    /// Required value of the category column (defaults to "applied").
    #[serde(default = "default_seed_category")]
    pub category: String,

    /// Required value of the language column (defaults to "python").
    #[serde(default = "default_seed_language")]
    pub language: String,
}

/// Which repository timestamp stands for "recent commit activity".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityField {
    /// `pushed_at`: last push to any branch.
    Pushed,
    /// `updated_at`: last change to the repository object.
    Updated,
}

/// Conjunctive repository thresholds evaluated against a fixed reference date.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RepositoryFilterConfig {
    #[serde(default = "default_reference_date")]
    pub reference_date: NaiveDate,

    /// Repositories must be created within this many years of the reference date.
    #[serde(default = "default_max_age_years")]
    pub max_age_years: i32,

    #[serde(default = "default_min_stars")]
    pub min_stars: u64,

    /// Repositories must show activity within this many years of the reference date.
    #[serde(default = "default_max_inactive_years")]
    pub max_inactive_years: i32,

    #[serde(default = "default_activity")]
    pub activity: ActivityField,
}

/// ML import and glossary settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClassificationConfig {
    /// Module names whose import marks a file as ML code.
    #[serde(default = "default_ml_modules")]
    pub ml_modules: Vec<String>,

    /// Glossary keyword CSV, relative to the data directory.
    #[serde(default = "default_glossary")]
    pub glossary: PathBuf,

    /// Extension of the source files downloaded from pull requests.
    #[serde(default = "default_source_extension")]
    pub source_extension: String,
}

/// Non-ML sampling settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SamplingConfig {
    /// RNG seed, so a sample can be reproduced.
    #[serde(default = "default_sampling_seed")]
    pub seed: u64,
}

/// Where line counts of a closing pull request come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineSource {
    /// `gh pr view --json additions,deletions,changedFiles`.
    GhCli,
    /// The saved pull request document.
    Api,
}

/// Line change measurement settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MeasurementConfig {
    #[serde(default = "default_line_source")]
    pub line_source: LineSource,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_seed_path() -> PathBuf {
    PathBuf::from("repo-metadata.csv")
}

fn default_seed_category() -> String {
    "applied".to_string()
}

fn default_seed_language() -> String {
    "python".to_string()
}

/// Default reference date of the repository filter (1 Jan 2023).
pub fn default_reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default()
}

fn default_max_age_years() -> i32 {
    5
}

fn default_min_stars() -> u64 {
    100
}

fn default_max_inactive_years() -> i32 {
    2
}

fn default_activity() -> ActivityField {
    ActivityField::Pushed
}

/// Default ML framework modules.
pub fn default_ml_modules() -> Vec<String> {
    vec![
        "tensorflow".to_string(),
        "torch".to_string(),
        "keras".to_string(),
    ]
}

fn default_glossary() -> PathBuf {
    PathBuf::from("google_ml_glossary/Keyword_list.csv")
}

fn default_source_extension() -> String {
    "py".to_string()
}

fn default_sampling_seed() -> u64 {
    2023
}

fn default_line_source() -> LineSource {
    LineSource::GhCli
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            seed_dataset: SeedDatasetConfig::default(),
            repository_filter: RepositoryFilterConfig::default(),
            classification: ClassificationConfig::default(),
            sampling: SamplingConfig::default(),
            measurement: MeasurementConfig::default(),
        }
    }
}

impl Default for SeedDatasetConfig {
    fn default() -> Self {
        Self {
            path: default_seed_path(),
            category: default_seed_category(),
            language: default_seed_language(),
        }
    }
}

impl Default for RepositoryFilterConfig {
    fn default() -> Self {
        Self {
            reference_date: default_reference_date(),
            max_age_years: default_max_age_years(),
            min_stars: default_min_stars(),
            max_inactive_years: default_max_inactive_years(),
            activity: default_activity(),
        }
    }
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            ml_modules: default_ml_modules(),
            glossary: default_glossary(),
            source_extension: default_source_extension(),
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            seed: default_sampling_seed(),
        }
    }
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self {
            line_source: default_line_source(),
        }
    }
}

impl PipelineConfig {
    /// Loads and validates a `pipeline.toml` file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is missing, unparsable, or invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading pipeline config");

        if !path.exists() {
            return Err(ConfigError::MissingFile {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate(path)?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self, path: &Path) -> Result<(), ConfigError> {
        let invalid = |key: &'static str, message: String| ConfigError::ValidationError {
            path: path.to_path_buf(),
            key,
            message,
        };

        let modules = &self.classification.ml_modules;
        if modules.is_empty() {
            return Err(invalid("ml-modules", "must not be empty".to_string()));
        }
        if modules.iter().any(|module| module.trim().is_empty()) {
            return Err(invalid("ml-modules", "must not contain blank names".to_string()));
        }

        let extension = &self.classification.source_extension;
        if extension.is_empty()
            || extension.contains('.')
            || extension.contains('/')
            || extension.contains('\\')
        {
            return Err(invalid(
                "source-extension",
                format!("expected a bare extension such as \"py\", got \"{extension}\""),
            ));
        }

        let filter = &self.repository_filter;
        if filter.max_age_years < 0 {
            return Err(invalid("max-age-years", "must not be negative".to_string()));
        }
        if filter.max_inactive_years < 0 {
            return Err(invalid("max-inactive-years", "must not be negative".to_string()));
        }

        if self.seed_dataset.category.trim().is_empty() {
            return Err(invalid("category", "must not be empty".to_string()));
        }
        if self.seed_dataset.language.trim().is_empty() {
            return Err(invalid("language", "must not be empty".to_string()));
        }

        Ok(())
    }

    /// Resolves the glossary path against the data directory.
    pub fn glossary_path(&self) -> PathBuf {
        self.data_dir.join(&self.classification.glossary)
    }
}
