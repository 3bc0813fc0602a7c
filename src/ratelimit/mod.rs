pub mod upstash;

use crate::error::Result;
use async_trait::async_trait;

pub use upstash::UpstashRateLimiter;

/// Outcome of one `limit` call for an identity.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitDecision {
    pub success: bool,
    pub limit: u64,
    pub remaining: u64,
    /// Epoch milliseconds at which the current window closes.
    pub reset: u64,
}

impl RateLimitDecision {
    /// Decision for the `used`-th request in a window allowing `limit`.
    pub fn from_usage(used: u64, limit: u64, reset: u64) -> Self {
        Self {
            success: used <= limit,
            limit,
            remaining: limit.saturating_sub(used),
            reset,
        }
    }
}

/// Counts one request against `identity` and reports whether it is allowed.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn limit(&self, identity: &str) -> Result<RateLimitDecision>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// In-process fixed window that never rolls over; enough for handler tests.
    pub struct CountingRateLimiter {
        limit: u64,
        counts: Mutex<HashMap<String, u64>>,
        calls: AtomicUsize,
    }

    impl CountingRateLimiter {
        pub fn new(limit: u64) -> Self {
            Self {
                limit,
                counts: Mutex::new(HashMap::new()),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn used(&self, identity: &str) -> u64 {
            self.counts
                .lock()
                .unwrap()
                .get(identity)
                .copied()
                .unwrap_or(0)
        }
    }

    #[async_trait]
    impl RateLimiter for CountingRateLimiter {
        async fn limit(&self, identity: &str) -> Result<RateLimitDecision> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut counts = self.counts.lock().unwrap();
            let used = counts.entry(identity.to_string()).or_insert(0);
            *used += 1;
            Ok(RateLimitDecision::from_usage(*used, self.limit, 0))
        }
    }

    /// Limiter whose store is unreachable.
    pub struct FailingRateLimiter;

    #[async_trait]
    impl RateLimiter for FailingRateLimiter {
        async fn limit(&self, _identity: &str) -> Result<RateLimitDecision> {
            Err(crate::error::GenerationError::Store(
                "connection refused".into(),
            ))
        }
    }
}
