//! Layered CLI configuration
//!
//! Priority: CLI arguments > environment > config file > defaults. The
//! config file lives at the XDG-compliant path
//! `~/.config/driveflow/config.toml` and environment overrides use the
//! `DRIVEFLOW_` prefix with `__` as the section separator
//! (e.g. `DRIVEFLOW_NETWORK__TIMEOUT_SECONDS=60`).

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct NetworkConfig {
    pub timeout_seconds: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    pub default_format: String,
    pub color_enabled: bool,
}

/// Fallback identifiers used when neither flag nor environment supplies one
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct DefaultsConfig {
    pub spreadsheet_id: Option<String>,
    pub folder_id: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_format: "text".to_string(),
            color_enabled: true,
        }
    }
}

/// Configuration manager that handles XDG-compliant paths and layered
/// configuration
pub struct ConfigManager {
    config_path: PathBuf,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    /// Create a new ConfigManager with default XDG-compliant paths
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a ConfigManager with a specific path (for testing)
    #[allow(dead_code)]
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default XDG-compliant configuration path
    fn default_config_path() -> PathBuf {
        #[cfg(not(target_os = "windows"))]
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg_config).join("driveflow/config.toml");
        }

        #[cfg(target_os = "linux")]
        {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config/driveflow/config.toml")
        }

        #[cfg(target_os = "macos")]
        {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("Library/Application Support/driveflow/config.toml")
        }

        #[cfg(target_os = "windows")]
        {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("driveflow\\config.toml")
        }
    }

    /// Load configuration with layered priority: ENV > File > Defaults
    pub fn load(&self) -> Result<AppConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(AppConfig::default()));

        if self.config_path.exists() {
            figment = figment.merge(Toml::file(&self.config_path));
        }

        figment = figment.merge(Env::prefixed("DRIVEFLOW_").split("__"));

        figment.extract().context("Failed to load configuration")
    }
}

/// Load the application configuration from the default location
pub fn get_config() -> Result<AppConfig> {
    ConfigManager::new().load()
}
