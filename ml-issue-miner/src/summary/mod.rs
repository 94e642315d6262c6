//! Stage summary types and helpers.

mod outcome;
mod stage_summary;

pub use outcome::RecordOutcome;
pub use stage_summary::StageSummary;
