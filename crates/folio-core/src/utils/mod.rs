//! String formatting helpers and the attempt rate limiter.

pub mod format;
pub mod rate_limit;

pub use format::{format_timestamp, sanitize_html, truncate_text};
pub use rate_limit::RateLimiter;
