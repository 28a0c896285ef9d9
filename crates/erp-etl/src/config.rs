//! # ETL Configuration
//!
//! Settings for the scheduled warehouse rebuild.
//!
//! ## Configuration Sources (Priority Order)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Configuration Priority                                │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     ETL_INTERVAL_SECS=30                                               │
//! │     ETL_ENABLED=false                                                  │
//! │                                                                         │
//! │  2. [etl] table of the server config file (erp.toml)                   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     interval 60 s, queue of 1, "Central Store" / "Antananarivo"        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```toml
//! interval_secs = 60
//! queue_capacity = 1
//! store_name = "Central Store"
//! store_city = "Antananarivo"
//! enabled = true
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use erp_core::star::DimStore;
use erp_core::DEFAULT_STORE_ID;

use crate::error::{EtlError, EtlResult};

/// Scheduler and transform settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtlConfig {
    /// Seconds between scheduled runs.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Pending run requests the worker will hold.
    /// One pending run is enough: later triggers coalesce into it.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Name written to the single `dim_store` row.
    #[serde(default = "default_store_name")]
    pub store_name: String,

    /// City written to the single `dim_store` row.
    #[serde(default = "default_store_city")]
    pub store_city: String,

    /// When false the interval timer is off; manual triggers still run.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_interval_secs() -> u64 {
    60
}

fn default_queue_capacity() -> usize {
    1
}

fn default_store_name() -> String {
    DimStore::default().name
}

fn default_store_city() -> String {
    DimStore::default().city
}

fn default_true() -> bool {
    true
}

impl Default for EtlConfig {
    fn default() -> Self {
        EtlConfig {
            interval_secs: default_interval_secs(),
            queue_capacity: default_queue_capacity(),
            store_name: default_store_name(),
            store_city: default_store_city(),
            enabled: true,
        }
    }
}

impl EtlConfig {
    /// Parses a standalone `[etl]` table.
    pub fn from_toml(contents: &str) -> EtlResult<Self> {
        let config: EtlConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> EtlResult<()> {
        if self.interval_secs == 0 {
            return Err(EtlError::InvalidConfig(
                "interval_secs must be greater than 0".into(),
            ));
        }

        if self.queue_capacity == 0 {
            return Err(EtlError::InvalidConfig(
                "queue_capacity must be greater than 0".into(),
            ));
        }

        if self.store_name.trim().is_empty() {
            return Err(EtlError::InvalidConfig("store_name must not be empty".into()));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("ETL_INTERVAL_SECS") {
            match value.parse::<u64>() {
                Ok(secs) => {
                    debug!(interval_secs = secs, "Overriding ETL interval from environment");
                    self.interval_secs = secs;
                }
                Err(_) => warn!(value = %value, "Ignoring non-numeric ETL_INTERVAL_SECS"),
            }
        }

        if let Ok(value) = std::env::var("ETL_ENABLED") {
            match value.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.enabled = true,
                "0" | "false" | "no" | "off" => self.enabled = false,
                _ => warn!(value = %value, "Ignoring unknown ETL_ENABLED value"),
            }
        }
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// The store dimension row this configuration describes.
    pub fn store(&self) -> DimStore {
        DimStore {
            store_id: DEFAULT_STORE_ID,
            name: self.store_name.clone(),
            city: self.store_city.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EtlConfig::default();
        assert_eq!(config.interval_secs, 60);
        assert_eq!(config.queue_capacity, 1);
        assert!(config.enabled);
        assert_eq!(config.store(), DimStore::default());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = EtlConfig::from_toml("interval_secs = 15\nstore_city = \"Toamasina\"").unwrap();
        assert_eq!(config.interval_secs, 15);
        assert_eq!(config.store_city, "Toamasina");
        assert_eq!(config.store_name, "Central Store");
        assert_eq!(config.queue_capacity, 1);
    }

    #[test]
    fn test_config_validation() {
        let mut config = EtlConfig::default();
        assert!(config.validate().is_ok());

        config.interval_secs = 0;
        assert!(config.validate().is_err());

        config.interval_secs = 5;
        config.queue_capacity = 0;
        assert!(config.validate().is_err());

        config.queue_capacity = 1;
        config.store_name = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_interval_in_toml_is_rejected() {
        let err = EtlConfig::from_toml("interval_secs = 0").unwrap_err();
        assert!(err.is_config_error());
    }
}
