//! Pipeline configuration loading.
//!
//! This module handles parsing the optional `pipeline.toml` file. Every
//! setting has a default reproducing the published study, so the pipeline
//! runs without any configuration file.

mod error;
mod pipeline;

pub use error::ConfigError;
pub use pipeline::{
    default_ml_modules, default_reference_date, ActivityField, ClassificationConfig, LineSource,
    MeasurementConfig, PipelineConfig, RepositoryFilterConfig, SamplingConfig, SeedDatasetConfig,
};

use std::path::Path;
use tracing::info;

/// Loads the pipeline configuration.
///
/// With no path the built-in defaults are used.
///
/// # Errors
///
/// Returns [`ConfigError`] if an explicitly given file is missing or invalid.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig, ConfigError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "Loading pipeline config");
            PipelineConfig::load(path)
        }
        None => {
            info!("No pipeline config given, using defaults");
            Ok(PipelineConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.sampling.seed, 2023);
    }
}
