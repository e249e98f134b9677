//! # Fibonacci Backoff
//!
//! Per-key requeue delays for failed reconciles, handed to the controller's
//! error policy. The delay grows along the Fibonacci sequence from a minimum
//! and is capped at a maximum:
//! with 5s/300s that is 5s, 5s, 10s, 15s, 25s, 40s, 65s, 105s, 170s, 275s, 300s.

use crate::key::ResourceKey;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::warn;

/// Fibonacci backoff calculator
///
/// Each backoff is the sum of the previous two, starting from `min` twice,
/// capped at `max`. Internally tracked in milliseconds.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    /// Previous backoff value
    prev_ms: u64,
    /// Current backoff value
    current_ms: u64,
    /// Maximum backoff value
    max_ms: u64,
}

fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl FibonacciBackoff {
    /// Create a new Fibonacci backoff with the given bounds.
    ///
    /// A `max` below `min` is raised to `min`.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        let min_ms = as_millis(min).max(1);
        Self {
            prev_ms: 0,
            current_ms: min_ms,
            max_ms: as_millis(max).max(min_ms),
        }
    }

    /// Get the next backoff duration and advance the sequence
    pub fn next_backoff(&mut self) -> Duration {
        let result = self.current_ms;

        let next_ms = self.prev_ms.saturating_add(self.current_ms);
        self.prev_ms = self.current_ms;
        self.current_ms = std::cmp::min(next_ms, self.max_ms);

        Duration::from_millis(result)
    }
}

/// Backoff state for an Ingress that keeps failing
#[derive(Debug, Clone)]
struct BackoffState {
    backoff: FibonacciBackoff,
    error_count: u32,
}

/// Requeue delays per Ingress.
///
/// Each failing key walks its own Fibonacci sequence; a successful reconcile
/// drops the key's state so the next failure starts from `min` again.
#[derive(Debug)]
pub struct RequeueBackoffs {
    min: Duration,
    max: Duration,
    states: Mutex<HashMap<ResourceKey, BackoffState>>,
}

impl RequeueBackoffs {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Record a failure for `key` and return its next requeue delay
    /// together with the number of consecutive failures so far.
    pub fn next_delay(&self, key: &ResourceKey) -> (Duration, u32) {
        match self.states.lock() {
            Ok(mut states) => {
                let state = states.entry(key.clone()).or_insert_with(|| BackoffState {
                    backoff: FibonacciBackoff::new(self.min, self.max),
                    error_count: 0,
                });
                state.error_count = state.error_count.saturating_add(1);
                (state.backoff.next_backoff(), state.error_count)
            }
            Err(e) => {
                warn!("Failed to lock backoff states: {}, using minimum backoff", e);
                (self.min, 1)
            }
        }
    }

    /// Forget the failure history of `key` (on successful reconciliation)
    pub fn reset(&self, key: &ResourceKey) {
        if let Ok(mut states) = self.states.lock() {
            states.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_fibonacci_backoff_sequence() {
        let mut backoff = FibonacciBackoff::new(secs(5), secs(300));

        let expected = [5, 5, 10, 15, 25, 40, 65, 105, 170, 275, 300];
        for want in expected {
            assert_eq!(backoff.next_backoff(), secs(want));
        }
    }

    #[test]
    fn test_fibonacci_backoff_max_cap() {
        let mut backoff = FibonacciBackoff::new(secs(1), secs(10));

        for _ in 0..6 {
            backoff.next_backoff();
        }
        // 1, 1, 2, 3, 5, 8 consumed; next would be 13 but is capped
        assert_eq!(backoff.next_backoff(), secs(10));
        assert_eq!(backoff.next_backoff(), secs(10));
    }

    #[test]
    fn test_requeue_backoffs_are_per_key() {
        let backoffs = RequeueBackoffs::new(secs(5), secs(20));
        let api = ResourceKey::new(Some("web"), "api");
        let www = ResourceKey::new(Some("web"), "www");

        assert_eq!(backoffs.next_delay(&api), (secs(5), 1));
        assert_eq!(backoffs.next_delay(&api), (secs(5), 2));
        assert_eq!(backoffs.next_delay(&api), (secs(10), 3));
        assert_eq!(backoffs.next_delay(&api), (secs(15), 4));
        assert_eq!(backoffs.next_delay(&api), (secs(20), 5));
        assert_eq!(backoffs.next_delay(&api), (secs(20), 6));

        // Another key starts its own sequence
        assert_eq!(backoffs.next_delay(&www), (secs(5), 1));
    }

    #[test]
    fn test_requeue_backoffs_reset() {
        let backoffs = RequeueBackoffs::new(secs(5), secs(300));
        let api = ResourceKey::new(Some("web"), "api");

        backoffs.next_delay(&api);
        backoffs.next_delay(&api);
        backoffs.next_delay(&api);
        backoffs.reset(&api);

        assert_eq!(backoffs.next_delay(&api), (secs(5), 1));
        // Resetting an unknown key is a no-op
        backoffs.reset(&ResourceKey::new(None, "missing"));
    }

    #[test]
    fn test_max_below_min_is_raised() {
        let mut backoff = FibonacciBackoff::new(secs(5), secs(1));
        assert_eq!(backoff.next_backoff(), secs(5));
        assert_eq!(backoff.next_backoff(), secs(5));
        assert_eq!(backoff.next_backoff(), secs(5));
    }
}
