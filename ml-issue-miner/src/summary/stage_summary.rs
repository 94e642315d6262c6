//! Stage summary types.

use super::outcome::RecordOutcome;
use std::fmt;

/// Counters of a completed stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageSummary {
    /// Stage name, as given on the command line.
    pub stage: String,

    /// Number of input records considered.
    pub read: usize,

    /// Number of output records or artifacts written.
    pub written: usize,

    /// Number of records dropped or already present.
    pub skipped: usize,

    /// Number of records that failed.
    pub failed: usize,

    /// Problems found by a verification stage.
    pub violations: Vec<String>,
}

impl StageSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            ..Default::default()
        }
    }

    /// Updates the summary with the outcome of one input record.
    pub fn record(&mut self, outcome: &RecordOutcome) {
        self.read += 1;
        match outcome {
            RecordOutcome::Written => self.written += 1,
            RecordOutcome::Skipped { .. } => self.skipped += 1,
            RecordOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Returns true if any record failed or a verification found problems.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || !self.violations.is_empty()
    }

    /// Returns true if every record succeeded.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures()
    }
}

impl fmt::Display for StageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: read {}, written {}, skipped {}, failed {}",
            self.stage, self.read, self.written, self.skipped, self.failed
        )?;
        if !self.violations.is_empty() {
            write!(f, ", {} violation(s)", self.violations.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_record_outcomes() {
        let mut summary = StageSummary::new("filter-closed");

        summary.record(&RecordOutcome::Written);
        summary.record(&RecordOutcome::skipped("issue still open"));
        summary.record(&RecordOutcome::Written);

        assert_eq!(summary.read, 3);
        assert_eq!(summary.written, 2);
        assert_eq!(summary.skipped, 1);
        assert!(summary.all_success());
        assert_eq!(
            summary.to_string(),
            "filter-closed: read 3, written 2, skipped 1, failed 0"
        );
    }

    #[test]
    fn failures_and_violations_fail_the_stage() {
        let mut summary = StageSummary::new("download-pulls");
        summary.record(&RecordOutcome::failed("connection reset"));
        assert!(summary.has_failures());

        let mut audit = StageSummary::new("audit");
        audit.violations.push("duplicate issue".to_string());
        assert!(audit.has_failures());
    }
}
