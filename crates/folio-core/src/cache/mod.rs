//! Local caching of remote content.
//!
//! `PersistedCache` stores each resource as `{data, timestamp}` JSON under a
//! namespaced key and treats entries older than the TTL (5 minutes by
//! default) as absent. Storage is pluggable through `KeyValueStore`:
//! `FileStore` for the on-disk cache directory, `MemoryStore` for a
//! process-local cache.

pub mod persisted;
pub mod store;

pub use persisted::{now_millis, CachedData, PersistedCache, DEFAULT_PREFIX, DEFAULT_TTL};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
