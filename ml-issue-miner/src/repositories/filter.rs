//! Age, popularity and activity thresholds.

use crate::config::{ActivityField, RepositoryFilterConfig};
use crate::records::RepositoryRecord;
use chrono::Datelike;

/// Year-granular repository filter.
///
/// With reference year `Y`, a repository passes when it was created in or
/// after `Y - max_age_years`, was last active in or after
/// `Y - max_inactive_years`, and has at least `min_stars` stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryFilter {
    pub min_created_year: i32,
    pub min_activity_year: i32,
    pub min_stars: u64,
    pub activity: ActivityField,
}

impl RepositoryFilter {
    /// Derives the thresholds from the configured reference date.
    #[must_use]
    pub fn from_config(config: &RepositoryFilterConfig) -> Self {
        let year = config.reference_date.year();
        Self {
            min_created_year: year - config.max_age_years,
            min_activity_year: year - config.max_inactive_years,
            min_stars: config.min_stars,
            activity: config.activity,
        }
    }

    /// Returns true if the repository meets every threshold.
    ///
    /// A repository without the configured activity timestamp is rejected.
    #[must_use]
    pub fn accepts(&self, repository: &RepositoryRecord) -> bool {
        let activity = match self.activity {
            ActivityField::Pushed => repository.pushed_at,
            ActivityField::Updated => Some(repository.updated_at),
        };
        let Some(activity) = activity else {
            return false;
        };

        repository.created_at.year() >= self.min_created_year
            && activity.year() >= self.min_activity_year
            && repository.stars >= self.min_stars
    }
}
