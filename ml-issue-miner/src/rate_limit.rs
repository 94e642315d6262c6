//! Core API rate limit handling.
//!
//! Download stages issue thousands of sequential requests. Each one goes
//! through [`ensure_core_rate_limit`] first, so a stage sleeps through an
//! exhausted window and resumes instead of failing half way.

mod info;

pub use info::RateLimitInfo;

use chrono::Utc;
use octocrab::Octocrab;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Remaining requests under which the client sleeps until reset.
const LOW_WATER_MARK: u32 = 5;

/// Longest single sleep; the window is re-checked afterwards.
const MAX_SLEEP: Duration = Duration::from_secs(60 * 60);

/// Reads the core API budget of the client's credentials.
///
/// # Errors
///
/// Returns [`octocrab::Error`] if the `/rate_limit` call fails.
pub async fn fetch_core_budget(octocrab: &Octocrab) -> Result<RateLimitInfo, octocrab::Error> {
    let core = octocrab.ratelimit().get().await?.resources.core;
    Ok(RateLimitInfo {
        remaining: u32::try_from(core.remaining).unwrap_or(u32::MAX),
        reset: core.reset,
        limit: u32::try_from(core.limit).unwrap_or(u32::MAX),
    })
}

/// Sleeps until the window resets if the budget is below the low-water mark.
///
/// Returns the time slept, zero when no wait was needed.
pub async fn sleep_until_reset(budget: &RateLimitInfo) -> Duration {
    let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
    let Some(secs) = budget.wait_secs(LOW_WATER_MARK, now) else {
        return Duration::ZERO;
    };

    let mut pause = Duration::from_secs(secs);
    if pause > MAX_SLEEP {
        warn!(reset_in_secs = secs, "Reset is more than an hour away, sleeping one hour");
        pause = MAX_SLEEP;
    }

    info!(
        remaining = budget.remaining,
        limit = budget.limit,
        sleep_secs = pause.as_secs(),
        "GitHub budget low, pausing until reset"
    );
    tokio::time::sleep(pause).await;
    pause
}

/// Checks the core budget and sleeps through an exhausted window.
///
/// # Errors
///
/// Returns [`octocrab::Error`] if the budget cannot be read.
pub async fn ensure_core_rate_limit(octocrab: &Octocrab) -> Result<(), octocrab::Error> {
    let budget = fetch_core_budget(octocrab).await?;
    if budget.is_anonymous() {
        debug!(remaining = budget.remaining, "Running on the unauthenticated quota");
    }
    sleep_until_reset(&budget).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn healthy_budget_never_sleeps() {
        let budget = RateLimitInfo {
            remaining: 4_321,
            reset: u64::MAX,
            limit: 5_000,
        };

        assert_eq!(sleep_until_reset(&budget).await, Duration::ZERO);
    }

    #[tokio::test]
    async fn past_reset_never_sleeps() {
        let budget = RateLimitInfo {
            remaining: 0,
            reset: 1_600_000_000,
            limit: 60,
        };

        assert_eq!(sleep_until_reset(&budget).await, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_budget_sleeps_at_most_an_hour() {
        let budget = RateLimitInfo {
            remaining: 1,
            reset: u64::MAX,
            limit: 60,
        };

        assert_eq!(sleep_until_reset(&budget).await, MAX_SLEEP);
    }
}
