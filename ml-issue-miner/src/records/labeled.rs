//! Manually labeled issues.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether an issue belongs to the ML or the non-ML side of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    /// Fix imports an ML framework and the title matches the ML glossary.
    Ml,
    /// Control issue sampled from the same project.
    NonMl,
}

impl IssueKind {
    /// Returns the CSV spelling of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ml => "ml",
            Self::NonMl => "non-ml",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six-way taxonomy assigned to issues during manual labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BugCategory {
    GpuUsage,
    Model,
    TensorAndInput,
    TrainingProcess,
    ThirdPartyUsage,
    Other,
}

impl BugCategory {
    /// All categories in code order (1..=6).
    pub const ALL: [Self; 6] = [
        Self::GpuUsage,
        Self::Model,
        Self::TensorAndInput,
        Self::TrainingProcess,
        Self::ThirdPartyUsage,
        Self::Other,
    ];

    /// Numeric code used in the labeling spreadsheets.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::GpuUsage => 1,
            Self::Model => 2,
            Self::TensorAndInput => 3,
            Self::TrainingProcess => 4,
            Self::ThirdPartyUsage => 5,
            Self::Other => 6,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::GpuUsage => "GPU Usage",
            Self::Model => "Model",
            Self::TensorAndInput => "Tensor and Input",
            Self::TrainingProcess => "Training Process",
            Self::ThirdPartyUsage => "Third party usage",
            Self::Other => "Other",
        }
    }
}

impl FromStr for BugCategory {
    type Err = String;

    /// Accepts the numeric code or the label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| {
                trimmed == category.code().to_string()
                    || trimmed.eq_ignore_ascii_case(category.label())
            })
            .ok_or_else(|| format!("unknown bug category '{trimmed}'"))
    }
}

impl TryFrom<String> for BugCategory {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BugCategory> for String {
    fn from(category: BugCategory) -> Self {
        category.label().to_string()
    }
}

/// A manually labeled issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledIssue {
    /// Web URL of the issue.
    pub issue_url: String,
    pub category: BugCategory,
    /// ML or non-ML flag assigned by the labeler.
    pub kind: IssueKind,
}
