//! Remote-first loading with a cache in front and static data behind.
//!
//! For one resource key, `DualMode::load` does exactly this, in order:
//!
//! 1. Serve the cached value if it is no older than the TTL. No remote call.
//! 2. Otherwise call the fetch function:
//!    - an error falls back to static data (logged as a warning)
//!    - empty data falls back to static data (logged as info)
//!    - non-empty data is cached and served
//! 3. A panic inside the fetch is caught and also falls back to static data,
//!    this time recording the message as the state's error.
//!
//! The result carries its provenance (`Loaded`), which collapses into the
//! `{data, loading, error}` shape consumers render from (`DualModeState`).

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::cache::{PersistedCache, DEFAULT_TTL};
use crate::models::Content;
use crate::services::FetchResult;

/// Why static data was served instead of remote data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The backend call failed with this message.
    Backend(String),
    /// The backend answered with no rows.
    Empty,
    /// The fetch panicked with this message.
    Unexpected(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::Backend(e) => write!(f, "backend error: {}", e),
            FallbackReason::Empty => f.write_str("no remote rows"),
            FallbackReason::Unexpected(e) => write!(f, "unexpected error: {}", e),
        }
    }
}

/// A loaded value tagged with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<T> {
    /// Fetched from the backend just now.
    Fresh(T),
    /// Served from the cache, within its TTL.
    Stale(T),
    Fallback { data: T, reason: FallbackReason },
}

impl<T> Loaded<T> {
    pub fn data(&self) -> &T {
        match self {
            Loaded::Fresh(data) | Loaded::Stale(data) | Loaded::Fallback { data, .. } => data,
        }
    }

    pub fn into_data(self) -> T {
        match self {
            Loaded::Fresh(data) | Loaded::Stale(data) | Loaded::Fallback { data, .. } => data,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Loaded::Fallback { .. })
    }

    /// Short provenance label: "remote", "cache" or "static".
    pub fn source(&self) -> &'static str {
        match self {
            Loaded::Fresh(_) => "remote",
            Loaded::Stale(_) => "cache",
            Loaded::Fallback { .. } => "static",
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Loaded<U> {
        match self {
            Loaded::Fresh(data) => Loaded::Fresh(f(data)),
            Loaded::Stale(data) => Loaded::Stale(f(data)),
            Loaded::Fallback { data, reason } => Loaded::Fallback {
                data: f(data),
                reason,
            },
        }
    }

    /// Collapse into the consumer-facing state. Only an unexpected failure
    /// surfaces an error; backend errors and empty results stay silent.
    pub fn into_state(self) -> DualModeState<T> {
        let error = match &self {
            Loaded::Fallback {
                reason: FallbackReason::Unexpected(message),
                ..
            } => Some(message.clone()),
            _ => None,
        };
        DualModeState {
            data: Some(self.into_data()),
            loading: false,
            error,
        }
    }
}

/// What a consumer renders from: starts loading, then settles exactly once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DualModeState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> DualModeState<T> {
    pub fn loading() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
        }
    }
}

impl<T> From<Loaded<T>> for DualModeState<T> {
    fn from(loaded: Loaded<T>) -> Self {
        loaded.into_state()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Dual-mode loader bound to one cache and TTL.
#[derive(Clone)]
pub struct DualMode {
    cache: PersistedCache,
    ttl: Duration,
}

impl DualMode {
    pub fn new(cache: PersistedCache, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    pub fn with_default_ttl(cache: PersistedCache) -> Self {
        Self::new(cache, DEFAULT_TTL)
    }

    pub fn cache(&self) -> &PersistedCache {
        &self.cache
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Load `key`, falling back to `fallback()` whenever remote data is
    /// unavailable. Never fails.
    pub async fn load<T, Fb, F, Fut>(&self, key: &str, fallback: Fb, fetch: F) -> Loaded<T>
    where
        T: Content,
        Fb: FnOnce() -> T,
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchResult<T>>,
    {
        if let Some(data) = self.cache.get::<T>(key, self.ttl) {
            debug!(resource = key, "Serving cached data");
            return Loaded::Stale(data);
        }

        // fetch() runs inside the future so a panic while building it is caught too
        let outcome = AssertUnwindSafe(async move { fetch().await })
            .catch_unwind()
            .await;

        match outcome {
            Ok(FetchResult::Error(message)) => {
                warn!(resource = key, error = %message, "Backend fetch failed, using static data");
                Loaded::Fallback {
                    data: fallback(),
                    reason: FallbackReason::Backend(message),
                }
            }
            Ok(FetchResult::Data(data)) if data.is_empty() => {
                info!(resource = key, "Backend returned no data, using static data");
                Loaded::Fallback {
                    data: fallback(),
                    reason: FallbackReason::Empty,
                }
            }
            Ok(FetchResult::Data(data)) => {
                self.cache.set(key, &data);
                debug!(resource = key, "Fetched and cached remote data");
                Loaded::Fresh(data)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(resource = key, error = %message, "Unexpected failure loading data, using static data");
                Loaded::Fallback {
                    data: fallback(),
                    reason: FallbackReason::Unexpected(message),
                }
            }
        }
    }

    /// Drop one cached entry so the next load goes to the backend.
    pub fn invalidate(&self, key: &str) {
        self.cache.remove(key);
    }

    /// Start a load on a background task and observe it through a handle.
    pub fn spawn<T, Fb, F, Fut>(&self, key: impl Into<String>, fallback: Fb, fetch: F) -> ResourceHandle<T>
    where
        T: Content,
        Fb: FnOnce() -> T + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = FetchResult<T>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(DualModeState::loading());
        let loader = self.clone();
        let key = key.into();
        let task = tokio::spawn(async move {
            let loaded = loader.load(&key, fallback, fetch).await;
            // The handle may already be gone
            let _ = tx.send(loaded.into_state());
        });
        ResourceHandle { rx, task }
    }
}

/// A mounted consumer of one resource.
///
/// Dropping the handle aborts the load, so a late result is never applied.
pub struct ResourceHandle<T> {
    rx: watch::Receiver<DualModeState<T>>,
    task: JoinHandle<()>,
}

impl<T: Clone> ResourceHandle<T> {
    /// Current state, `loading` until the load settles.
    pub fn state(&self) -> DualModeState<T> {
        self.rx.borrow().clone()
    }

    /// Wait for the terminal state.
    pub async fn wait(mut self) -> DualModeState<T> {
        loop {
            {
                let state = self.rx.borrow_and_update();
                if !state.loading {
                    return state.clone();
                }
            }
            if self.rx.changed().await.is_err() {
                return self.rx.borrow().clone();
            }
        }
    }
}

impl<T> Drop for ResourceHandle<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
