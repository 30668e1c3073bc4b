//! Configuration file resolution and loading
//!
//! Bootstrap configuration lives in a single TOML file. Its path is resolved
//! in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Per-user config directory (`<config_dir>/playout/config.toml`)
//! 4. System-wide `/etc/playout/config.toml` (unix only)
//!
//! When none of these exist the caller falls back to built-in defaults.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "PLAYOUT_CONFIG";

/// Resolve which configuration file to read, if any
///
/// An explicitly requested path (CLI or environment) is returned even when it
/// does not exist, so the subsequent load reports a clear error instead of
/// silently falling back to defaults.
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Per-user config directory
    if let Some(user_config) = dirs::config_dir().map(|d| d.join("playout").join("config.toml")) {
        if user_config.exists() {
            return Some(user_config);
        }
    }

    // Priority 4: System-wide config
    if cfg!(unix) {
        let system_config = PathBuf::from("/etc/playout/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Read and deserialize a TOML file
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    debug!("Loading configuration from {}", path.display());
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
    })?;
    Ok(toml::from_str(&content)?)
}
