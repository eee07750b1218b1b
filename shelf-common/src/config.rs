//! Bootstrap configuration loading
//!
//! Resolution priority, highest first:
//! 1. Command-line arguments
//! 2. Environment variables (`SHELF_DATABASE`, `SHELF_HOST`, `SHELF_PORT`,
//!    `SHELF_LOG_LEVEL`)
//! 3. TOML configuration file
//! 4. Compiled defaults
//!
//! A missing TOML file is not an error; an unreadable or invalid one is.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ENV_CONFIG_FILE: &str = "SHELF_CONFIG";
pub const ENV_DATABASE: &str = "SHELF_DATABASE";
pub const ENV_HOST: &str = "SHELF_HOST";
pub const ENV_PORT: &str = "SHELF_PORT";
pub const ENV_LOG_LEVEL: &str = "SHELF_LOG_LEVEL";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration as written in the TOML file
///
/// Every field is optional; absent values fall through to defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Path to SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Listen address
    #[serde(default)]
    pub host: Option<String>,

    /// HTTP server port
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging section of the TOML file
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default)]
    pub level: Option<String>,
}

/// Platform defaults used when nothing else is configured
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let data_dir = dirs::data_local_dir()
            .map(|d| d.join("shelf"))
            .unwrap_or_else(|| PathBuf::from("./shelf_data"));

        Self {
            database_path: data_dir.join("shelf.db"),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// One configuration layer (command line, environment or file)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub database_path: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

impl ConfigOverrides {
    /// Read the `SHELF_*` environment variables
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var(ENV_PORT) {
            Ok(raw) => Some(raw.trim().parse::<u16>().map_err(|e| {
                Error::Config(format!("Invalid {} value '{}': {}", ENV_PORT, raw, e))
            })?),
            Err(_) => None,
        };

        Ok(Self {
            database_path: std::env::var(ENV_DATABASE).ok().map(PathBuf::from),
            host: std::env::var(ENV_HOST).ok(),
            port,
            log_level: std::env::var(ENV_LOG_LEVEL).ok(),
        })
    }

    /// Fill unset fields from a lower-priority layer
    pub fn or(self, lower: ConfigOverrides) -> ConfigOverrides {
        ConfigOverrides {
            database_path: self.database_path.or(lower.database_path),
            host: self.host.or(lower.host),
            port: self.port.or(lower.port),
            log_level: self.log_level.or(lower.log_level),
        }
    }
}

impl From<TomlConfig> for ConfigOverrides {
    fn from(config: TomlConfig) -> Self {
        Self {
            database_path: config.database_path,
            host: config.host,
            port: config.port,
            log_level: config.logging.level,
        }
    }
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl ServiceConfig {
    /// Resolve configuration from all layers
    ///
    /// `config_file` is the explicit TOML path from the command line; when
    /// absent `SHELF_CONFIG` and then the platform config directory are tried.
    pub fn resolve(cli: ConfigOverrides, config_file: Option<&Path>) -> Result<Self> {
        let env = ConfigOverrides::from_env()?;

        let toml_path = config_file
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(ENV_CONFIG_FILE).ok().map(PathBuf::from))
            .or_else(default_config_path);

        let file = match toml_path {
            Some(path) => load_toml_config(&path)?.map(ConfigOverrides::from),
            None => None,
        };

        let layered = cli.or(env).or(file.unwrap_or_default());
        Ok(Self::from_layers(layered, CompiledDefaults::for_current_platform()))
    }

    /// Apply compiled defaults beneath already merged layers
    pub fn from_layers(layered: ConfigOverrides, defaults: CompiledDefaults) -> Self {
        Self {
            database_path: layered.database_path.unwrap_or(defaults.database_path),
            host: layered.host.unwrap_or(defaults.host),
            port: layered.port.unwrap_or(defaults.port),
            log_level: layered.log_level.unwrap_or(defaults.log_level),
        }
    }

    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Platform configuration file location (`<config_dir>/shelf/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("shelf").join("config.toml"))
}

/// Load a TOML configuration file
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_toml_config(path: &Path) -> Result<Option<TomlConfig>> {
    if !path.exists() {
        warn!(
            "Config file not found at {} (using defaults)",
            path.display()
        );
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str::<TomlConfig>(&content).map_err(|e| {
        Error::Config(format!("Failed to parse {}: {}", path.display(), e))
    })?;

    info!("Loaded configuration from {}", path.display());
    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_empty_layers() {
        let config = ServiceConfig::from_layers(
            ConfigOverrides::default(),
            CompiledDefaults::for_current_platform(),
        );

        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.log_level, "info");
        assert!(config.database_path.ends_with("shelf.db"));
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_higher_layer_wins() {
        let cli = ConfigOverrides {
            port: Some(8080),
            ..Default::default()
        };
        let file = ConfigOverrides {
            port: Some(9090),
            host: Some("0.0.0.0".to_string()),
            ..Default::default()
        };

        let merged = cli.or(file);
        assert_eq!(merged.port, Some(8080));
        assert_eq!(merged.host.as_deref(), Some("0.0.0.0"));
    }

    #[test]
    fn test_toml_logging_section_maps_to_level() {
        let config: TomlConfig = toml::from_str("[logging]\nlevel = \"debug\"\n").unwrap();
        let layer = ConfigOverrides::from(config);

        assert_eq!(layer.log_level.as_deref(), Some("debug"));
        assert!(layer.port.is_none());
    }
}
