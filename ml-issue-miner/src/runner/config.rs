//! Runner configuration.

use crate::config::PipelineConfig;
use std::path::{Path, PathBuf};

/// Configuration for running pipeline stages.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Settings loaded from `pipeline.toml` (or defaults).
    pipeline: PipelineConfig,
    /// GitHub token used for API calls; unauthenticated when absent.
    token: Option<String>,
}

impl RunnerConfig {
    /// Creates a new configuration for a run.
    pub fn new(pipeline: PipelineConfig) -> Self {
        Self {
            pipeline,
            token: None,
        }
    }

    /// Sets the GitHub token.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|token| !token.trim().is_empty());
        self
    }

    /// Overrides the data directory of the pipeline config.
    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.pipeline.data_dir = data_dir;
        self
    }

    /// Returns the pipeline settings.
    pub fn pipeline(&self) -> &PipelineConfig {
        &self.pipeline
    }

    /// Returns the data directory.
    pub fn data_dir(&self) -> &Path {
        &self.pipeline.data_dir
    }

    /// Returns the configured GitHub token.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_token_counts_as_absent() {
        let config =
            RunnerConfig::new(PipelineConfig::default()).with_token(Some("  ".to_string()));
        assert_eq!(config.token(), None);

        let config = config.with_token(Some("ghp_x".to_string()));
        assert_eq!(config.token(), Some("ghp_x"));
    }

    #[test]
    fn data_dir_override_moves_glossary() {
        let config = RunnerConfig::new(PipelineConfig::default()).with_data_dir("out".into());
        assert_eq!(config.data_dir(), Path::new("out"));
        assert_eq!(
            config.pipeline().glossary_path(),
            PathBuf::from("out/google_ml_glossary/Keyword_list.csv")
        );
    }
}
