//! Data access for the folio portfolio.
//!
//! Content is loaded remote-first: the backend is asked for each resource,
//! successful non-empty answers are cached for a few minutes, and anything
//! else falls back to the dataset bundled into the binary. Admin writes go
//! straight to the backend through the resource services.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod dual_mode;
pub mod fallback;
pub mod models;
pub mod preload;
pub mod repository;
pub mod resource;
pub mod services;
pub mod utils;
pub mod validation;

pub use api::{Backend, BackendClient, BackendError, MemoryBackend, Query};
pub use cache::{FileStore, KeyValueStore, MemoryStore, PersistedCache};
pub use config::Config;
pub use dual_mode::{DualMode, DualModeState, FallbackReason, Loaded, ResourceHandle};
pub use preload::{preload_all, PreloadOutcome, PreloadReport};
pub use repository::ContentRepository;
pub use resource::Resource;
pub use services::FetchResult;
pub use validation::{validate_contact, ValidationError};
