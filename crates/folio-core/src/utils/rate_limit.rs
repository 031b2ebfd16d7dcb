use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::cache::{now_millis, KeyValueStore};

/// Attempts counted inside one window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Window {
    count: u32,
    reset_at: i64,
}

/// Fixed-window limiter whose counters live in a `KeyValueStore`, so limits
/// hold across separate CLI invocations.
///
/// Every call counts as an attempt, including refused ones.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
    name: &'static str,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KeyValueStore>, name: &'static str, limit: u32, window: Duration) -> Self {
        Self {
            store,
            name,
            limit,
            window,
        }
    }

    /// Contact form: 3 submissions per 5 minutes.
    pub fn contact_form(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(store, "contact", 3, Duration::from_secs(5 * 60))
    }

    /// Admin login: 5 attempts per 15 minutes.
    pub fn login(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(store, "login", 5, Duration::from_secs(15 * 60))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn storage_key(&self, key: &str) -> String {
        format!("rate_limit_{}_{}", self.name, key.to_lowercase())
    }

    /// Record an attempt for `key`; true if it is within the limit.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, now_millis())
    }

    pub fn check_at(&self, key: &str, now: i64) -> bool {
        let storage_key = self.storage_key(key);
        let window_ms = i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX);

        let stored = match self.store.get(&storage_key) {
            Ok(raw) => raw.and_then(|raw| serde_json::from_str::<Window>(&raw).ok()),
            Err(e) => {
                error!(key = %storage_key, error = %e, "Rate limit read error");
                None
            }
        };

        let mut window = match stored {
            Some(w) if now <= w.reset_at => w,
            _ => Window {
                count: 0,
                reset_at: now.saturating_add(window_ms),
            },
        };
        window.count += 1;

        match serde_json::to_string(&window) {
            Ok(json) => {
                if let Err(e) = self.store.set(&storage_key, &json) {
                    error!(key = %storage_key, error = %e, "Rate limit write error");
                }
            }
            Err(e) => error!(key = %storage_key, error = %e, "Rate limit serialization error"),
        }

        let allowed = window.count <= self.limit;
        if !allowed {
            warn!(limiter = self.name, attempts = window.count, "Rate limit exceeded");
        }
        allowed
    }

    /// Forget the attempts recorded for `key`.
    pub fn reset(&self, key: &str) {
        if let Err(e) = self.store.remove(&self.storage_key(key)) {
            error!(error = %e, "Rate limit reset error");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;

    #[test]
    fn test_allows_limit_then_refuses() {
        let limiter = RateLimiter::contact_form(Arc::new(MemoryStore::new()));
        assert!(limiter.check_at("a@b.co", 0));
        assert!(limiter.check_at("a@b.co", 1_000));
        assert!(limiter.check_at("a@b.co", 2_000));
        assert!(!limiter.check_at("a@b.co", 3_000));
        // other keys are independent
        assert!(limiter.check_at("c@d.co", 3_000));
    }

    #[test]
    fn test_window_resets() {
        let limiter = RateLimiter::new(Arc::new(MemoryStore::new()), "t", 1, Duration::from_millis(100));
        assert!(limiter.check_at("k", 0));
        assert!(!limiter.check_at("k", 100));
        assert!(limiter.check_at("k", 101));
    }

    #[test]
    fn test_reset_and_case_insensitive_keys() {
        let limiter = RateLimiter::login(Arc::new(MemoryStore::new()));
        for _ in 0..5 {
            assert!(limiter.check_at("Admin@Example.com", 0));
        }
        assert!(!limiter.check_at("admin@example.com", 0));
        limiter.reset("ADMIN@example.com");
        assert!(limiter.check_at("admin@example.com", 0));
    }
}
