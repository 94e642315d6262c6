//! Size-of-fix and resolution duration.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Line counts of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineCounts {
    #[serde(rename = "additions")]
    pub added: u64,
    #[serde(rename = "deletions")]
    pub deleted: u64,
    /// Unknown when the source does not report it.
    #[serde(default)]
    pub changed_files: Option<u64>,
}

impl LineCounts {
    /// True when the source reports that no file changed.
    #[must_use]
    pub fn is_empty_diff(&self) -> bool {
        self.changed_files == Some(0)
    }
}

/// Absolute difference between added and deleted lines.
#[must_use]
pub fn size_of_fix(added: u64, deleted: u64) -> u64 {
    added.abs_diff(deleted)
}

/// Whole days between creation and closure, or `None` while still open.
#[must_use]
pub fn resolution_days(created: DateTime<Utc>, closed: Option<DateTime<Utc>>) -> Option<i64> {
    closed.map(|closed| (closed - created).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_of_fix_is_absolute_difference() {
        assert_eq!(size_of_fix(120, 45), 75);
        assert_eq!(size_of_fix(45, 120), 75);
        assert_eq!(size_of_fix(0, 0), 0);
    }

    #[test]
    fn resolution_counts_whole_days() {
        let created = "2022-01-01T00:00:00Z".parse().unwrap();
        let closed = "2022-01-05T00:00:00Z".parse().unwrap();
        assert_eq!(resolution_days(created, Some(closed)), Some(4));

        let same_day = "2022-01-01T23:00:00Z".parse().unwrap();
        assert_eq!(resolution_days(created, Some(same_day)), Some(0));
        assert_eq!(resolution_days(created, None), None);
    }

    #[test]
    fn parses_gh_json_output() {
        let counts: LineCounts =
            serde_json::from_str(r#"{"additions":120,"deletions":45,"changedFiles":3}"#).unwrap();
        assert_eq!(size_of_fix(counts.added, counts.deleted), 75);
        assert!(!counts.is_empty_diff());

        let empty: LineCounts =
            serde_json::from_str(r#"{"additions":0,"deletions":0,"changedFiles":0}"#).unwrap();
        assert!(empty.is_empty_diff());
    }
}
