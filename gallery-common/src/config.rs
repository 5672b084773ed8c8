//! Configuration file resolution and TOML loading
//!
//! Bootstrap configuration follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Per-user config file (`<config_dir>/gallery/<module>.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing or malformed file is never fatal: the loader warns and returns
//! defaults so the service can still start.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "GALLERY_CONFIG";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit logs as JSON lines instead of human-readable text
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LoggingConfig {
    /// Filter directive for `tracing_subscriber::EnvFilter`
    ///
    /// Unknown levels fall back to `info`.
    pub fn filter_directive(&self) -> String {
        match self.level.to_lowercase().as_str() {
            level @ ("trace" | "debug" | "info" | "warn" | "error") => level.to_string(),
            other => {
                warn!(level = other, "Unknown log level in config, using info");
                "info".to_string()
            }
        }
    }
}

/// Resolves which config file a module should read
pub struct ConfigPathResolver {
    module_name: String,
}

impl ConfigPathResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
        }
    }

    /// Resolve the config file path, or `None` when only defaults apply
    pub fn resolve(&self, cli_arg: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = cli_arg {
            return Some(path.to_path_buf());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        let user_config = self.default_path()?;
        if user_config.exists() {
            Some(user_config)
        } else {
            None
        }
    }

    /// Platform config location for this module
    pub fn default_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("gallery").join(format!("{}.toml", self.module_name)))
    }
}

/// Load a TOML file, falling back to `T::default()` on any failure
pub fn load_toml_or_default<T>(path: Option<&Path>) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        info!("No config file found, using compiled defaults");
        return T::default();
    };

    match load_toml(path) {
        Ok(config) => {
            info!(path = %path.display(), "Loaded configuration");
            config
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Config unusable, using compiled defaults");
            T::default()
        }
    }
}

/// Load and parse a TOML file strictly
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Write a config file atomically (temp file + rename)
pub fn write_toml_config<T: Serialize>(config: &T, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}

/// Resolve a secret from the environment first, then the config file
///
/// Warns when both sources carry a value since the environment silently wins.
pub fn resolve_secret(env_var: &str, toml_value: Option<&str>) -> Option<String> {
    let env_value = std::env::var(env_var)
        .ok()
        .filter(|v| !v.trim().is_empty());
    let toml_value = toml_value.filter(|v| !v.trim().is_empty());

    if env_value.is_some() && toml_value.is_some() {
        warn!(env_var, "Secret found in environment and TOML config, using environment");
    }

    env_value.or_else(|| toml_value.map(str::to_string))
}
