//! Configuration loading and client settings resolution
//!
//! Resolution priority for each setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (hall id has none and must be supplied)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Compiled default for the scheduler host
pub const DEFAULT_BASE_URL: &str = "https://v2.hallmaster.co.uk";

/// Environment variable naming the hall to query
pub const HALL_ID_ENV: &str = "HALLMASTER_HALL_ID";

/// Environment variable overriding the scheduler host
pub const BASE_URL_ENV: &str = "HALLMASTER_BASE_URL";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration file contents
///
/// Every field is optional; a missing file behaves like an empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Scheduler host, e.g. `https://v2.hallmaster.co.uk`
    #[serde(default)]
    pub base_url: Option<String>,

    /// Hall whose schedule is queried
    #[serde(default)]
    pub hall_id: Option<u32>,

    /// User-Agent header sent with every request
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Default user agent, carrying this crate's version
pub fn default_user_agent() -> String {
    format!("Hallmaster Rust API v{}", env!("CARGO_PKG_VERSION"))
}

/// Platform config file location: `<config dir>/hallmaster/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("hallmaster").join("config.toml"))
}

/// Load the TOML config
///
/// An explicit path must exist. Without one, the platform default is tried
/// and its absence only logs a warning.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            Some(path) => {
                warn!("No config file at {}, using defaults", path.display());
                return Ok(TomlConfig::default());
            }
            None => {
                warn!("Could not determine config directory, using defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    let content = std::fs::read_to_string(&path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    debug!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Fully resolved settings for one client session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub base_url: String,
    pub hall_id: u32,
    pub user_agent: String,
    pub request_timeout: Duration,
}

impl ClientSettings {
    /// Settings with compiled defaults for everything but the hall
    pub fn for_hall(hall_id: u32) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            hall_id,
            user_agent: default_user_agent(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Resolve settings from CLI overrides, environment and TOML
    pub fn resolve(
        cli_hall_id: Option<u32>,
        cli_base_url: Option<&str>,
        toml: &TomlConfig,
    ) -> Result<Self> {
        let env_hall_id = match std::env::var(HALL_ID_ENV) {
            Ok(value) if !value.trim().is_empty() => Some(value.trim().parse::<u32>().map_err(|e| {
                Error::Config(format!("{} must be a hall number: {}", HALL_ID_ENV, e))
            })?),
            _ => None,
        };

        let hall_id = cli_hall_id
            .or(env_hall_id)
            .or(toml.hall_id)
            .ok_or_else(|| {
                Error::Config(format!(
                    "Hall id not configured. Use --hall-id, {} or hall_id in the config file",
                    HALL_ID_ENV
                ))
            })?;

        let base_url = cli_base_url
            .map(str::to_string)
            .or_else(|| std::env::var(BASE_URL_ENV).ok().filter(|v| !v.trim().is_empty()))
            .or_else(|| toml.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "Base URL must be http(s): {}",
                base_url
            )));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            hall_id,
            user_agent: toml.user_agent.clone().unwrap_or_else(default_user_agent),
            request_timeout: Duration::from_secs(
                toml.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        })
    }
}
