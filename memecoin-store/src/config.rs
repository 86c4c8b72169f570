//! Store configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which backend a [`crate::LedgerStore`] should be built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process maps, lost on restart. Default for development and tests.
    Memory,
    /// Embedded sled database persisted under [`StoreConfig::sled_path`].
    Sled,
}

impl StoreBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "sled" => Some(Self::Sled),
            _ => None,
        }
    }
}

/// Backend selection plus retention windows for each record family.
///
/// Retention mirrors the platform's data lifecycle: user ledgers are
/// long-lived and refreshed on every write, content records age out after
/// a week, and trend entries only matter for a day. Settled balances and
/// badges live on the user record, so content expiry never erases reward
/// history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Filesystem path for the sled database (sled backend only).
    pub sled_path: String,
    /// Retention for user ledger records, refreshed on every write.
    pub user_ttl_secs: u64,
    /// Retention for memes, engagements and marketplace listings.
    pub content_ttl_secs: u64,
    /// Retention for trend entries.
    pub trend_ttl_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            sled_path: "./data/memecoin".to_string(),
            user_ttl_secs: 30 * 24 * 60 * 60,
            content_ttl_secs: 7 * 24 * 60 * 60,
            trend_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl StoreConfig {
    /// Load configuration from `MEMECOIN_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            backend: std::env::var("MEMECOIN_STORE_BACKEND")
                .ok()
                .and_then(|v| StoreBackend::parse(&v))
                .unwrap_or(defaults.backend),
            sled_path: std::env::var("MEMECOIN_SLED_PATH").unwrap_or(defaults.sled_path),
            user_ttl_secs: env_u64("MEMECOIN_USER_TTL_SECS", defaults.user_ttl_secs),
            content_ttl_secs: env_u64("MEMECOIN_CONTENT_TTL_SECS", defaults.content_ttl_secs),
            trend_ttl_secs: env_u64("MEMECOIN_TREND_TTL_SECS", defaults.trend_ttl_secs),
        }
    }

    /// In-memory preset for local development.
    pub fn development() -> Self {
        Self::default()
    }

    /// In-memory preset for tests.
    pub fn test() -> Self {
        Self::default()
    }

    pub fn user_ttl(&self) -> Duration {
        Duration::from_secs(self.user_ttl_secs)
    }

    pub fn content_ttl(&self) -> Duration {
        Duration::from_secs(self.content_ttl_secs)
    }

    pub fn trend_ttl(&self) -> Duration {
        Duration::from_secs(self.trend_ttl_secs)
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.backend, StoreBackend::Memory);
        assert_eq!(config.user_ttl_secs, 30 * 24 * 60 * 60);
        assert_eq!(config.content_ttl_secs, 7 * 24 * 60 * 60);
        assert_eq!(config.trend_ttl_secs, 24 * 60 * 60);
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!(StoreBackend::parse("memory"), Some(StoreBackend::Memory));
        assert_eq!(StoreBackend::parse("SLED"), Some(StoreBackend::Sled));
        assert_eq!(StoreBackend::parse("postgres"), None);
    }
}
