//! Application configuration management.
//!
//! Settings come from `~/.config/folio/config.json` and are then overridden
//! by environment variables (the CLI loads `.env` first):
//!
//! | Variable | Field |
//! |---|---|
//! | `FOLIO_BACKEND_URL` | `backend_url` |
//! | `FOLIO_BACKEND_KEY` | `backend_key` |
//! | `FOLIO_CACHE_TTL_SECS` | `cache_ttl_secs` |
//! | `FOLIO_CACHE_DIR` | `cache_dir` |
//! | `FOLIO_ADMIN_EMAIL` | `admin_email` |
//!
//! Without a backend URL every remote call fails and the static dataset is served.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::{DEFAULT_PREFIX, DEFAULT_TTL};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "folio";

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_ttl_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_email: Option<String>,
}

impl Config {
    /// Config file plus environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Read a config file; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Override fields from variables resolved by `lookup`. Blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = var("FOLIO_BACKEND_URL") {
            self.backend_url = Some(url);
        }
        if let Some(key) = var("FOLIO_BACKEND_KEY") {
            self.backend_key = Some(key);
        }
        if let Some(ttl) = var("FOLIO_CACHE_TTL_SECS") {
            match ttl.trim().parse() {
                Ok(secs) => self.cache_ttl_secs = Some(secs),
                Err(e) => warn!(value = %ttl, error = %e, "Ignoring invalid FOLIO_CACHE_TTL_SECS"),
            }
        }
        if let Some(dir) = var("FOLIO_CACHE_DIR") {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(email) = var("FOLIO_ADMIN_EMAIL") {
            self.admin_email = Some(email);
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.cache_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TTL)
    }

    pub fn cache_prefix(&self) -> &str {
        self.cache_prefix.as_deref().unwrap_or(DEFAULT_PREFIX)
    }
}
