//! Retry backoff policy and retry queue selection.

use chrono::{DateTime, Duration, Utc};
use ledgerguard_shared::config::SettlementConfig;

use crate::settlement::types::{Settlement, SettlementStatus};

/// Backoff schedule for settlement retries.
///
/// The schedule is indexed by retries already consumed: the first retry
/// waits `backoff[0]`, the second `backoff[1]`, and so on. Attempts past
/// the end of the schedule reuse the last entry.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum automatic retries before terminal failure.
    pub max_retries: u32,
    /// Backoff delays, one per retry attempt. Never empty.
    pub backoff: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: vec![
                Duration::minutes(15),
                Duration::hours(1),
                Duration::hours(4),
            ],
        }
    }
}

impl RetryPolicy {
    /// Builds a policy from the settlement configuration.
    #[must_use]
    pub fn from_config(config: &SettlementConfig) -> Self {
        let backoff: Vec<Duration> = config
            .backoff_minutes
            .iter()
            .map(|&m| Duration::minutes(m))
            .collect();
        if backoff.is_empty() {
            return Self {
                max_retries: config.max_retries,
                ..Self::default()
            };
        }
        Self {
            max_retries: config.max_retries,
            backoff,
        }
    }

    /// Returns the delay before retry attempt `attempt` (zero-based).
    ///
    /// `attempt` is the settlement's retry count at the moment the retry is
    /// scheduled, before it is incremented.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        let idx = (attempt as usize).min(self.backoff.len() - 1);
        self.backoff[idx]
    }

    /// Computes when a retry scheduled at `now` for `attempt` becomes due.
    #[must_use]
    pub fn next_retry_at(&self, now: DateTime<Utc>, attempt: u32) -> DateTime<Utc> {
        now + self.delay(attempt)
    }
}

/// Selects settlements whose scheduled retry is due at `now`.
///
/// Only settlements in Retried with a due `next_retry_at` qualify; the
/// result is ordered oldest due time first so the worker drains in FIFO
/// order.
#[must_use]
pub fn due_for_retry(settlements: &[Settlement], now: DateTime<Utc>) -> Vec<&Settlement> {
    let mut due: Vec<&Settlement> = settlements
        .iter()
        .filter(|s| s.status == SettlementStatus::Retried)
        .filter(|s| s.next_retry_at.is_some_and(|at| at <= now))
        .collect();
    due.sort_by_key(|s| s.next_retry_at);
    due
}
