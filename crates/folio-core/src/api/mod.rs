//! Managed-backend access.
//!
//! `Backend` is the capability the rest of the crate depends on: "given a
//! table name and a query shape, return rows or an error", plus bucket file
//! storage. `BackendClient` talks to a Supabase-style REST endpoint;
//! `MemoryBackend` keeps everything in process.

pub mod backend;
pub mod client;
pub mod error;
pub mod memory;
pub mod query;

pub use backend::{Backend, StoredObject};
pub use client::BackendClient;
pub use error::BackendError;
pub use memory::MemoryBackend;
pub use query::{OrderBy, Query};
