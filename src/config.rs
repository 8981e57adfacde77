// ⚙️ Runtime settings
// Built-in defaults, overridden by DRIVEHIVE_* environment variables

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::catalog::Catalog;

pub const ENV_CATALOG: &str = "DRIVEHIVE_CATALOG";
pub const ENV_SEARCH_DELAY_MS: &str = "DRIVEHIVE_SEARCH_DELAY_MS";
pub const ENV_PRICE_DEBOUNCE_MS: &str = "DRIVEHIVE_PRICE_DEBOUNCE_MS";
pub const ENV_RESIZE_DEBOUNCE_MS: &str = "DRIVEHIVE_RESIZE_DEBOUNCE_MS";
pub const ENV_ADDR: &str = "DRIVEHIVE_ADDR";
pub const ENV_LOG_FILE: &str = "DRIVEHIVE_LOG_FILE";
/// Read by the tracing `EnvFilter`
pub const ENV_LOG: &str = "DRIVEHIVE_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// `None` = the seeded catalog
    pub catalog_path: Option<PathBuf>,
    /// Simulated latency of a search submission
    pub search_delay: Duration,
    pub price_debounce: Duration,
    pub resize_debounce: Duration,
    pub server_addr: String,
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            catalog_path: None,
            search_delay: Duration::from_millis(1000),
            price_debounce: Duration::from_millis(500),
            resize_debounce: Duration::from_millis(250),
            server_addr: "0.0.0.0:3000".to_string(),
            log_file: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup (the environment in production)
    pub fn from_lookup<L>(lookup: L) -> Self
    where
        L: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        let millis = |key: &str, default: Duration| -> Duration {
            match lookup(key) {
                None => default,
                Some(raw) => match raw.trim().parse::<u64>() {
                    Ok(ms) => Duration::from_millis(ms),
                    Err(_) => {
                        tracing::warn!(key, value = %raw, "ignoring non-numeric duration");
                        default
                    }
                },
            }
        };

        Settings {
            catalog_path: lookup(ENV_CATALOG)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            search_delay: millis(ENV_SEARCH_DELAY_MS, defaults.search_delay),
            price_debounce: millis(ENV_PRICE_DEBOUNCE_MS, defaults.price_debounce),
            resize_debounce: millis(ENV_RESIZE_DEBOUNCE_MS, defaults.resize_debounce),
            server_addr: lookup(ENV_ADDR)
                .filter(|a| !a.is_empty())
                .unwrap_or(defaults.server_addr),
            log_file: lookup(ENV_LOG_FILE)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Load the configured catalog, or the seeded one
    pub fn load_catalog(&self) -> Result<Catalog> {
        match &self.catalog_path {
            Some(path) => Catalog::load(path),
            None => Ok(Catalog::seeded()),
        }
    }
}
