//! Rate limit snapshot.

/// Remaining core API budget at the time of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,

    /// Unix timestamp when the window resets.
    pub reset: u64,

    /// Total requests allowed per window.
    pub limit: u32,
}

impl RateLimitInfo {
    /// Seconds until the window resets, or `None` when the budget is still
    /// above `threshold` or the reset already passed.
    #[must_use]
    pub fn wait_secs(&self, threshold: u32, now: u64) -> Option<u64> {
        if self.remaining >= threshold || self.reset <= now {
            return None;
        }
        Some(self.reset - now)
    }

    /// Whether the client runs with the unauthenticated quota (60 per hour).
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.limit <= 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_wait_while_budget_remains() {
        let info = RateLimitInfo {
            remaining: 4000,
            reset: 2_000,
            limit: 5000,
        };
        assert_eq!(info.wait_secs(5, 1_000), None);
        assert!(!info.is_anonymous());
    }

    #[test]
    fn waits_until_reset_when_exhausted() {
        let info = RateLimitInfo {
            remaining: 2,
            reset: 1_600,
            limit: 60,
        };
        assert_eq!(info.wait_secs(5, 1_000), Some(600));
        assert_eq!(info.wait_secs(5, 1_600), None);
        assert!(info.is_anonymous());
    }
}
