//! Configuration Loader
//!
//! Loads and validates the optional TOML configuration file. Every section
//! has defaults, so an absent file behaves like an empty one.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::adapters::binance::{self, BinanceConfig};
use crate::output::OutputFormat;

/// Environment variable overriding the exchange REST URL
pub const BASE_URL_VAR: &str = "DEXCLI_BASE_URL";

/// Main configuration structure matching dexcli.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub exchange: ExchangeSection,
    #[serde(default)]
    pub output: OutputSection,
}

/// Exchange connection section
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExchangeSection {
    /// Exchange backend identifier
    #[serde(default = "default_exchange_name")]
    pub name: String,
    /// Use the exchange testnet
    #[serde(default)]
    pub testnet: bool,
    /// Custom REST base URL (takes precedence over `testnet`)
    #[serde(default)]
    pub base_url: Option<String>,
    /// `recvWindow` for signed requests, in milliseconds
    #[serde(default = "default_recv_window_ms")]
    pub recv_window_ms: u64,
    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ExchangeSection {
    fn default() -> Self {
        Self {
            name: default_exchange_name(),
            testnet: false,
            base_url: None,
            recv_window_ms: default_recv_window_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Output section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    /// Default format when `--format` is not given
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

fn default_exchange_name() -> String {
    binance::EXCHANGE_ID.to_string()
}

fn default_recv_window_ms() -> u64 {
    5000
}

fn default_timeout_secs() -> u64 {
    30
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to load env file {path}: {reason}")]
    EnvFile { path: PathBuf, reason: String },
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let path = expand_path(path.as_ref());
    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::IoError {
        path: path.clone(),
        source,
    })?;
    let config: AppConfig = toml::from_str(&content)?;
    config.validate()?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Load the file if a path was given, otherwise use defaults
pub fn load_optional(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(AppConfig::default()),
    }
}

/// Expand `~` in user-supplied paths
pub fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(raw) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
        None => path.to_path_buf(),
    }
}

impl AppConfig {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.exchange.name != binance::EXCHANGE_ID {
            return Err(ConfigError::ValidationError(format!(
                "unsupported exchange '{}', expected '{}'",
                self.exchange.name,
                binance::EXCHANGE_ID
            )));
        }

        if self.exchange.recv_window_ms == 0 || self.exchange.recv_window_ms > 60_000 {
            return Err(ConfigError::ValidationError(format!(
                "recv_window_ms must be 1-60000, got {}",
                self.exchange.recv_window_ms
            )));
        }

        if self.exchange.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be > 0".to_string(),
            ));
        }

        if let Some(ref url) = self.exchange.base_url {
            if url.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "base_url cannot be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Build the exchange client configuration.
    ///
    /// Precedence for the URL: `env_base_url`, then `exchange.base_url`,
    /// then testnet (from the file or `force_testnet`), then mainnet.
    pub fn binance_config(&self, env_base_url: Option<String>, force_testnet: bool) -> BinanceConfig {
        let base_url = env_base_url
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.exchange.base_url.clone())
            .unwrap_or_else(|| {
                if self.exchange.testnet || force_testnet {
                    binance::TESTNET_URL.to_string()
                } else {
                    binance::MAINNET_URL.to_string()
                }
            });

        BinanceConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            recv_window_ms: self.exchange.recv_window_ms,
            timeout: Duration::from_secs(self.exchange.timeout_secs),
        }
    }
}
