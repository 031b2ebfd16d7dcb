//! Admin authentication.
//!
//! - `Session`: the signed-in admin's access token, persisted in the cache
//!   directory and ignored once expired
//! - `CredentialStore`: optional OS keychain storage for the admin password

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{Session, SessionData};
