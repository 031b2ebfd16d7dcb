use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{de::DeserializeOwned, de::IgnoredAny, Deserialize, Serialize};
use tracing::{debug, error, info};

use super::KeyValueStore;

/// Default namespace for cache keys.
pub const DEFAULT_PREFIX: &str = "portfolio_cache";

/// Default time-to-live for cached content: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Wrapper for cached data with its capture time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    /// Capture time in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            timestamp: now_millis(),
        }
    }

    pub fn age_millis(&self, now: i64) -> i64 {
        now.saturating_sub(self.timestamp)
    }

    /// An entry is expired once it is strictly older than the TTL. A capture
    /// time more than one TTL in the future is implausible and counts as
    /// expired too.
    pub fn is_expired(&self, ttl: Duration, now: i64) -> bool {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let age = self.age_millis(now);
        age > ttl_ms || age < -ttl_ms
    }

    pub fn age_display(&self, now: i64) -> String {
        let minutes = self.age_millis(now) / 60_000;
        if minutes < 1 {
            // Also covers clock skew (negative age)
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

/// TTL cache over a `KeyValueStore`, with every key namespaced as
/// `<prefix>_<key>`.
///
/// Caching is an optimization only: storage and serialization failures are
/// logged and the operation becomes a no-op.
#[derive(Clone)]
pub struct PersistedCache {
    store: Arc<dyn KeyValueStore>,
    prefix: String,
}

impl PersistedCache {
    pub fn new(store: Arc<dyn KeyValueStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    pub fn with_default_prefix(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(store, DEFAULT_PREFIX)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}_{}", self.prefix, key)
    }

    /// Cached value for `key` if present and no older than `ttl`.
    pub fn get<T: DeserializeOwned>(&self, key: &str, ttl: Duration) -> Option<T> {
        self.get_at(key, ttl, now_millis())
    }

    /// `get` evaluated at an explicit time. Expired or unparsable entries are
    /// removed from the store.
    pub fn get_at<T: DeserializeOwned>(&self, key: &str, ttl: Duration, now: i64) -> Option<T> {
        let storage_key = self.storage_key(key);
        let raw = match self.store.get(&storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                error!(key = %storage_key, error = %e, "Cache read error");
                return None;
            }
        };

        let cached: CachedData<T> = match serde_json::from_str(&raw) {
            Ok(cached) => cached,
            Err(e) => {
                error!(key = %storage_key, error = %e, "Cache entry unparsable, discarding");
                self.remove_raw(&storage_key);
                return None;
            }
        };

        if cached.is_expired(ttl, now) {
            debug!(key = %storage_key, age_ms = cached.age_millis(now), "Cache entry expired");
            self.remove_raw(&storage_key);
            return None;
        }

        Some(cached.data)
    }

    /// Store `data` stamped with the current time.
    pub fn set<T: Serialize>(&self, key: &str, data: &T) {
        self.set_at(key, data, now_millis());
    }

    /// Store `data` stamped with an explicit capture time.
    pub fn set_at<T: Serialize>(&self, key: &str, data: &T, timestamp: i64) {
        let storage_key = self.storage_key(key);
        let entry = CachedData { data, timestamp };
        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                error!(key = %storage_key, error = %e, "Cache serialization error");
                return;
            }
        };
        if let Err(e) = self.store.set(&storage_key, &json) {
            error!(key = %storage_key, error = %e, "Cache write error");
        }
    }

    /// Drop one entry.
    pub fn remove(&self, key: &str) {
        self.remove_raw(&self.storage_key(key));
    }

    fn remove_raw(&self, storage_key: &str) {
        if let Err(e) = self.store.remove(storage_key) {
            error!(key = %storage_key, error = %e, "Cache remove error");
        }
    }

    /// Remove every entry in this cache's namespace. Returns how many were removed.
    pub fn clear_all(&self) -> usize {
        let namespace = format!("{}_", self.prefix);
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                error!(error = %e, "Cache clear error");
                return 0;
            }
        };

        let mut removed = 0;
        for key in keys.iter().filter(|k| k.starts_with(&namespace)) {
            match self.store.remove(key) {
                Ok(()) => removed += 1,
                Err(e) => error!(key = %key, error = %e, "Cache remove error"),
            }
        }
        info!(removed, "Portfolio cache cleared");
        removed
    }

    /// Human-readable age of an entry regardless of TTL, for status output.
    pub fn entry_age(&self, key: &str) -> Option<String> {
        let raw = self.store.get(&self.storage_key(key)).ok().flatten()?;
        match serde_json::from_str::<CachedData<IgnoredAny>>(&raw) {
            Ok(cached) => Some(cached.age_display(now_millis())),
            Err(e) => {
                debug!(key, error = %e, "Failed to read cache entry for age display");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{FileStore, MemoryStore};
    use tempfile::TempDir;

    fn memory_cache() -> (Arc<MemoryStore>, PersistedCache) {
        let store = Arc::new(MemoryStore::new());
        let cache = PersistedCache::with_default_prefix(store.clone());
        (store, cache)
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let (_, cache) = memory_cache();
        let value = vec!["a".to_string(), "b".to_string()];
        cache.set("projects", &value);
        let back: Option<Vec<String>> = cache.get("projects", DEFAULT_TTL);
        assert_eq!(back, Some(value));
    }

    #[test]
    fn test_keys_are_namespaced() {
        let (store, cache) = memory_cache();
        cache.set("skills", &vec![1]);
        assert_eq!(store.keys().unwrap(), vec!["portfolio_cache_skills".to_string()]);
    }

    #[test]
    fn test_expired_entry_is_purged() {
        let (store, cache) = memory_cache();
        let ttl = Duration::from_millis(300_000);
        cache.set_at("projects", &vec![1, 2], 1_000);

        // exactly at the TTL the entry is still valid
        assert_eq!(cache.get_at::<Vec<i32>>("projects", ttl, 301_000), Some(vec![1, 2]));

        assert_eq!(cache.get_at::<Vec<i32>>("projects", ttl, 301_001), None);
        assert!(store.get("portfolio_cache_projects").unwrap().is_none());
    }

    #[test]
    fn test_extreme_timestamps_are_purged() {
        let (store, cache) = memory_cache();
        for timestamp in [i64::MIN, i64::MAX] {
            store
                .set(
                    "portfolio_cache_projects",
                    &format!(r#"{{"data":[],"timestamp":{}}}"#, timestamp),
                )
                .unwrap();
            assert_eq!(cache.get::<Vec<i32>>("projects", DEFAULT_TTL), None);
            assert!(store.get("portfolio_cache_projects").unwrap().is_none());
        }
    }

    #[test]
    fn test_clock_skew_within_ttl_is_served() {
        let (_, cache) = memory_cache();
        let ttl = Duration::from_millis(300_000);
        cache.set_at("skills", &vec![1], 100_000);
        assert_eq!(cache.get_at::<Vec<i32>>("skills", ttl, 40_000), Some(vec![1]));
        assert_eq!(cache.get_at::<Vec<i32>>("skills", ttl, 0), Some(vec![1]));
    }

    #[test]
    fn test_unparsable_entry_is_purged() {
        let (store, cache) = memory_cache();
        store.set("portfolio_cache_blogs", "{not json").unwrap();
        assert_eq!(cache.get::<Vec<i32>>("blogs", DEFAULT_TTL), None);
        assert!(store.get("portfolio_cache_blogs").unwrap().is_none());
    }

    #[test]
    fn test_wrong_shape_is_purged() {
        let (store, cache) = memory_cache();
        cache.set("skills", &"a string");
        assert_eq!(cache.get::<Vec<i32>>("skills", DEFAULT_TTL), None);
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_quota_error_is_a_no_op() {
        let store = Arc::new(MemoryStore::with_quota(16));
        let cache = PersistedCache::with_default_prefix(store.clone());
        cache.set("projects", &vec!["far too large for the quota"; 4]);
        assert!(store.keys().unwrap().is_empty());
        assert_eq!(cache.get::<Vec<String>>("projects", DEFAULT_TTL), None);
    }

    #[test]
    fn test_clear_all_only_touches_namespace() {
        let (store, cache) = memory_cache();
        cache.set("skills", &vec![1]);
        cache.set("projects", &vec![2]);
        store.set("portfolio_theme", "dark").unwrap();

        assert_eq!(cache.clear_all(), 2);
        assert_eq!(store.keys().unwrap(), vec!["portfolio_theme".to_string()]);
    }

    #[test]
    fn test_file_backed_cache() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(FileStore::new(temp_dir.path().to_path_buf()).unwrap());
        let cache = PersistedCache::new(store, "test");
        cache.set("experience", &vec![42]);
        assert_eq!(cache.get::<Vec<i32>>("experience", DEFAULT_TTL), Some(vec![42]));
        assert!(temp_dir.path().join("test_experience.json").exists());
    }

    #[test]
    fn test_age_display() {
        let entry = CachedData { data: (), timestamp: 0 };
        assert_eq!(entry.age_display(30_000), "just now");
        assert_eq!(entry.age_display(5 * 60_000), "5m ago");
        assert_eq!(entry.age_display(3 * 3_600_000), "3h ago");
        assert_eq!(entry.age_display(2 * 86_400_000), "2d ago");
        assert_eq!(entry.age_display(-10_000), "just now");

        let ancient = CachedData { data: (), timestamp: i64::MIN };
        assert_eq!(ancient.age_millis(0), i64::MAX);
    }

    #[test]
    fn test_entry_age() {
        let (_, cache) = memory_cache();
        assert!(cache.entry_age("skills").is_none());
        cache.set("skills", &vec![1]);
        assert_eq!(cache.entry_age("skills").as_deref(), Some("just now"));
    }
}
