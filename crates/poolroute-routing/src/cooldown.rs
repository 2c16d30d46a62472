//! Cooldown bookkeeping for throttled endpoints
//!
//! Each endpoint host maps to the instant at which it becomes eligible again.
//! An absent entry means the endpoint was never throttled; an entry at or
//! before `now` is stale and treated as eligible. New throttle signals
//! overwrite the previous expiry, so concurrent writers race with
//! last-write-wins semantics.

use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Cooldown applied when the upstream throttle signal carries no usable retry hint
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60);

/// Upper bound for an expiry that would overflow the clock
const MAX_COOLDOWN: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Per-endpoint cooldown table (lock-free reads, per-shard writes)
#[derive(Debug)]
pub struct CooldownTracker {
    cooling_until: DashMap<String, Instant>,
    default_cooldown: Duration,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::with_default_cooldown(DEFAULT_COOLDOWN)
    }

    pub fn with_default_cooldown(default_cooldown: Duration) -> Self {
        Self {
            cooling_until: DashMap::new(),
            default_cooldown,
        }
    }

    pub fn default_cooldown(&self) -> Duration {
        self.default_cooldown
    }

    /// True unless `host` has an expiry strictly after `now`
    pub fn is_eligible(&self, host: &str, now: Instant) -> bool {
        self.cooling_until
            .get(&key(host))
            .map(|until| *until <= now)
            .unwrap_or(true)
    }

    /// Put `host` on cooldown until `now + retry_after`
    ///
    /// A missing retry hint falls back to the tracker's default cooldown.
    /// Returns the applied duration.
    pub fn mark_throttled(
        &self,
        host: &str,
        retry_after: Option<Duration>,
        now: Instant,
    ) -> Duration {
        let cooldown = retry_after.unwrap_or(self.default_cooldown);
        let until = now
            .checked_add(cooldown)
            .unwrap_or_else(|| now + MAX_COOLDOWN);

        self.cooling_until.insert(key(host), until);
        cooldown
    }

    /// Time left before `host` is eligible again, `None` if it already is
    pub fn cooldown_remaining(&self, host: &str, now: Instant) -> Option<Duration> {
        self.cooling_until
            .get(&key(host))
            .and_then(|until| until.checked_duration_since(now))
            .filter(|remaining| !remaining.is_zero())
    }

    /// Remove stale entries
    pub fn clear_expired(&self, now: Instant) {
        self.cooling_until.retain(|_, until| *until > now);
    }

    /// Hosts currently cooling down, with their remaining time
    pub fn snapshot(&self, now: Instant) -> Vec<(String, Duration)> {
        let mut entries: Vec<(String, Duration)> = self
            .cooling_until
            .iter()
            .filter(|entry| *entry.value() > now)
            .map(|entry| (entry.key().clone(), entry.value().duration_since(now)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Number of stored entries, stale ones included
    pub fn len(&self) -> usize {
        self.cooling_until.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cooling_until.is_empty()
    }
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn key(host: &str) -> String {
    host.to_ascii_lowercase()
}
