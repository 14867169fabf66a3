use std::time::Duration;

use tokio::time::Instant;

use crate::client::RateLimitInfo;

const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(15 * 60);
const MAX_REQUESTS_PER_WINDOW: u32 = 100;

/// Pacing and backoff parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Rate-limit window of the API
    pub window: Duration,
    /// Minimum time between two requests
    pub min_interval: Duration,
    /// Extra pause between two topics or authors
    pub query_gap: Duration,
    /// First backoff after HTTP 429, doubled on each retry
    pub backoff_start: Duration,
    pub max_retries: u32,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            window: RATE_LIMIT_WINDOW,
            min_interval: RATE_LIMIT_WINDOW / MAX_REQUESTS_PER_WINDOW,
            query_gap: Duration::from_secs(1),
            backoff_start: Duration::from_secs(5),
            max_retries: 3,
        }
    }
}

impl RateLimitPolicy {
    /// No waiting at all; retries still happen.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            window: Duration::ZERO,
            min_interval: Duration::ZERO,
            query_gap: Duration::ZERO,
            backoff_start: Duration::ZERO,
            max_retries: 3,
        }
    }

    /// Backoff before retry number `retry` (1-based).
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        self.backoff_start.saturating_mul(2_u32.saturating_pow(retry.saturating_sub(1)))
    }
}

/// Hard cap on HTTP attempts in one run. Retries count too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestBudget {
    max: usize,
    used: usize,
}

impl RequestBudget {
    #[must_use]
    pub const fn new(max: usize) -> Self {
        Self { max, used: 0 }
    }

    /// Takes one unit; `false` when nothing is left.
    pub fn try_acquire(&mut self) -> bool {
        if self.used >= self.max {
            return false;
        }
        self.used = self.used.saturating_add(1);
        true
    }

    #[must_use]
    pub const fn used(&self) -> usize {
        self.used
    }

    #[must_use]
    pub const fn max(&self) -> usize {
        self.max
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.max.saturating_sub(self.used)
    }

    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.used >= self.max
    }
}

/// Tracks request timing against the policy.
#[derive(Debug)]
pub(crate) struct Pacer {
    policy: RateLimitPolicy,
    last_request: Option<Instant>,
    blocked_until: Option<Instant>,
}

impl Pacer {
    pub(crate) const fn new(policy: RateLimitPolicy) -> Self {
        Self { policy, last_request: None, blocked_until: None }
    }

    /// Sleeps until the next request is allowed, then marks it as sent.
    pub(crate) async fn wait(&mut self) {
        let now = Instant::now();
        let mut ready = now;
        if let Some(last) = self.last_request {
            ready = ready.max(last + self.policy.min_interval);
        }
        if let Some(until) = self.blocked_until.take() {
            ready = ready.max(until);
        }
        if ready > now {
            let wait = ready - now;
            tracing::info!(wait_secs = wait.as_secs_f64(), "Rate limit management: waiting");
            tokio::time::sleep_until(ready).await;
        }
        self.last_request = Some(Instant::now());
    }

    /// Records response headers; an exhausted window blocks until its reset.
    pub(crate) fn observe(&mut self, info: &RateLimitInfo, now_epoch: i64) {
        if info.remaining != Some(0) {
            return;
        }
        let wait = info
            .reset
            .map(|reset| Duration::from_secs(u64::try_from(reset - now_epoch).unwrap_or(0)))
            .unwrap_or(self.policy.window)
            .min(self.policy.window);
        tracing::warn!(wait_secs = wait.as_secs(), "Rate limit window exhausted");
        self.blocked_until = Some(Instant::now() + wait);
    }

    pub(crate) fn block_for(&mut self, wait: Duration) {
        self.blocked_until = Some(Instant::now() + wait);
    }

    pub(crate) const fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }
}
