//! Store configuration: storage location and autosave cadence.
//!
//! Defaults are fixed constants; `from_env` lets a host override them
//! without code changes.

use std::path::PathBuf;
use std::time::Duration;

/// Well-known storage slot shared across sessions.
pub const DEFAULT_STORE_PATH: &str = "store.json";
pub const DEFAULT_AUTOSAVE_INTERVAL_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// File holding the serialized collections.
    pub path: PathBuf,
    /// Period of the background autosave task.
    pub autosave_interval: Duration,
    /// When false, data reaches disk only through explicit flushes.
    pub autosave: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_PATH),
            autosave_interval: Duration::from_millis(DEFAULT_AUTOSAVE_INTERVAL_MS),
            autosave: true,
        }
    }
}

impl StoreConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `WIDGET_STORE_PATH`: default `store.json`
    /// - `WIDGET_STORE_AUTOSAVE_MS`: default 2000; zero or unparsable falls back
    #[must_use]
    pub fn from_env() -> Self {
        let path = std::env::var("WIDGET_STORE_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_STORE_PATH), PathBuf::from);
        let interval_ms = match env_parse("WIDGET_STORE_AUTOSAVE_MS", DEFAULT_AUTOSAVE_INTERVAL_MS) {
            0 => DEFAULT_AUTOSAVE_INTERVAL_MS,
            ms => ms,
        };

        Self { path, autosave_interval: Duration::from_millis(interval_ms), autosave: true }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    #[must_use]
    pub fn with_autosave_interval(mut self, interval: Duration) -> Self {
        self.autosave_interval = interval;
        self
    }

    #[must_use]
    pub fn without_autosave(mut self) -> Self {
        self.autosave = false;
        self
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
