//! Server configuration module.
//!
//! ## Load Order (later overrides earlier)
//! 1. Default values
//! 2. TOML file: `$ERP_CONFIG`, else `./erp.toml` when present
//! 3. Environment variables
//!
//! ## Environment Variables
//! - `ERP_HTTP_PORT` - HTTP listen port (default: 8000)
//! - `ERP_BIND_ADDR` - listen address (default: 0.0.0.0)
//! - `ERP_DB_PATH` - transactional store (default: ./erp.db)
//! - `WAREHOUSE_DB_PATH` - star-schema store (default: ./warehouse.db)
//! - `ETL_INTERVAL_SECS`, `ETL_ENABLED` - see [`erp_etl::EtlConfig`]
//! - `RUST_LOG` - log filter, read by the subscriber in `main`
//!
//! ## Example Config File
//! ```toml
//! [server]
//! bind_addr = "127.0.0.1"
//! port = 8080
//!
//! [database]
//! erp_path = "/var/lib/erp/erp.db"
//! warehouse_path = "/var/lib/erp/warehouse.db"
//!
//! [etl]
//! interval_secs = 300
//! ```

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use erp_etl::EtlConfig;

const DEFAULT_CONFIG_FILE: &str = "erp.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl HttpSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_erp_path")]
    pub erp_path: PathBuf,

    #[serde(default = "default_warehouse_path")]
    pub warehouse_path: PathBuf,

    /// Give up opening a store after this many seconds of retrying.
    #[serde(default = "default_startup_timeout")]
    pub startup_timeout_secs: u64,
}

fn default_erp_path() -> PathBuf {
    PathBuf::from("./erp.db")
}

fn default_warehouse_path() -> PathBuf {
    PathBuf::from("./warehouse.db")
}

fn default_startup_timeout() -> u64 {
    30
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            erp_path: default_erp_path(),
            warehouse_path: default_warehouse_path(),
            startup_timeout_secs: default_startup_timeout(),
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub etl: EtlConfig,
}

impl ServerConfig {
    /// Loads configuration from file, environment, and defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("ERP_CONFIG").ok().map(PathBuf::from);
        let explicit = path.is_some();
        let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            info!(?path, "Loading config from file");
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
            Self::from_toml(&contents)?
        } else if explicit {
            return Err(ConfigError::Load(format!("{} does not exist", path.display())));
        } else {
            debug!(?path, "Config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides(|key| env::var(key).ok())?;
        config.etl.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Load(e.to_string()))
    }

    /// Applies overrides from `lookup` (the process environment in `load`).
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(port) = lookup("ERP_HTTP_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidValue("ERP_HTTP_PORT".to_string()))?;
        }

        if let Some(addr) = lookup("ERP_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Some(path) = lookup("ERP_DB_PATH") {
            self.database.erp_path = PathBuf::from(path);
        }

        if let Some(path) = lookup("WAREHOUSE_DB_PATH") {
            self.database.warehouse_path = PathBuf::from(path);
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_addr.trim().is_empty() {
            return Err(ConfigError::MissingRequired("server.bind_addr".to_string()));
        }

        if self.database.erp_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired("database.erp_path".to_string()));
        }

        if self.database.warehouse_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired("database.warehouse_path".to_string()));
        }

        if self.database.erp_path == self.database.warehouse_path {
            return Err(ConfigError::InvalidValue(
                "database.warehouse_path must differ from database.erp_path".to_string(),
            ));
        }

        self.etl
            .validate()
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Failed to load config: {0}")]
    Load(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.server.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.database.erp_path, PathBuf::from("./erp.db"));
        assert_eq!(config.etl.interval_secs, 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_sections() {
        let config = ServerConfig::from_toml(
            r#"
            [server]
            port = 9000

            [database]
            warehouse_path = "/tmp/wh.db"

            [etl]
            interval_secs = 5
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_addr, "0.0.0.0");
        assert_eq!(config.database.warehouse_path, PathBuf::from("/tmp/wh.db"));
        assert_eq!(config.database.erp_path, PathBuf::from("./erp.db"));
        assert_eq!(config.etl.interval_secs, 5);
        assert!(!config.etl.enabled);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = ServerConfig::from_toml("[server]\nport = 9000").unwrap();
        config
            .apply_env_overrides(env_of(&[
                ("ERP_HTTP_PORT", "7000"),
                ("ERP_DB_PATH", "/data/erp.db"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.database.erp_path, PathBuf::from("/data/erp.db"));
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let mut config = ServerConfig::default();
        let err = config
            .apply_env_overrides(env_of(&[("ERP_HTTP_PORT", "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_validation() {
        let mut config = ServerConfig::default();
        config.etl.interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.database.erp_path = PathBuf::new();
        assert!(matches!(config.validate(), Err(ConfigError::MissingRequired(_))));

        let mut config = ServerConfig::default();
        config.database.warehouse_path = config.database.erp_path.clone();
        assert!(config.validate().is_err());
    }
}
