//! Configuration types for productlist-core

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Product API endpoint settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the product API (default: "https://dummyjson.com")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the paged products endpoint, relative to `base_url` (default: "products")
    #[serde(default = "default_products_path")]
    pub products_path: String,

    /// Request timeout (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            products_path: default_products_path(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Pagination behavior
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Number of products requested per page (default: 20)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Pause between clearing the list and reloading it on refresh (default: 1 second)
    ///
    /// Advisory UX pacing only; zero is valid.
    #[serde(default = "default_refresh_delay", with = "duration_serde")]
    pub refresh_delay: Duration,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            refresh_delay: default_refresh_delay(),
        }
    }
}

/// In-memory response cache for image bytes
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Enable the cache (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum total bytes held in memory (default: 300 MiB)
    #[serde(default = "default_capacity_bytes")]
    pub capacity_bytes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity_bytes: default_capacity_bytes(),
        }
    }
}

/// Main configuration
///
/// Grouped into sub-configs:
/// - [`api`](ApiConfig): endpoint, timeout, user agent
/// - [`pagination`](PaginationConfig): page size, refresh pacing
/// - [`cache`](CacheConfig): in-memory byte cache
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Product API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,

    /// Response cache settings
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    /// Check the configuration for values the loading core cannot work with
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the offending key when:
    /// - `page_size` is zero
    /// - `base_url` is not an absolute URL
    /// - `timeout` is zero
    pub fn validate(&self) -> Result<()> {
        if self.pagination.page_size == 0 {
            return Err(Error::Config {
                message: "page size must be positive".to_string(),
                key: Some("page_size".to_string()),
            });
        }

        if let Err(e) = url::Url::parse(&self.api.base_url) {
            return Err(Error::Config {
                message: format!("invalid base URL '{}': {}", self.api.base_url, e),
                key: Some("base_url".to_string()),
            });
        }

        if self.api.timeout.is_zero() {
            return Err(Error::Config {
                message: "request timeout must be non-zero".to_string(),
                key: Some("timeout".to_string()),
            });
        }

        Ok(())
    }
}

fn default_base_url() -> String {
    "https://dummyjson.com".to_string()
}

fn default_products_path() -> String {
    "products".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("productlist-core/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_page_size() -> u32 {
    20
}

fn default_refresh_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_true() -> bool {
    true
}

fn default_capacity_bytes() -> u64 {
    300 * 1024 * 1024
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
