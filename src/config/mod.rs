//! Configuration Module
//!
//! Loads the optional TOML config file and API credentials.

pub mod credentials;
pub mod loader;

pub use credentials::{Credentials, API_KEY_VAR, API_SECRET_VAR};
pub use loader::{
    expand_path, load_config, load_optional, AppConfig, ConfigError, BASE_URL_VAR,
};

/// Environment variable naming the config file
pub const CONFIG_PATH_VAR: &str = "DEXCLI_CONFIG";
