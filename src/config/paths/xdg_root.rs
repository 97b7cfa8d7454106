//! XDG Base Directory utilities for configuration lookup.

use crate::error::DiscoveryError;
use std::path::PathBuf;

/// Get XDG config home directory
///
/// Returns `$XDG_CONFIG_HOME` if set, otherwise defaults to `$HOME/.config`
/// Follows XDG Base Directory Specification
pub fn config_home() -> Result<PathBuf, DiscoveryError> {
    config_home_from(
        std::env::var("XDG_CONFIG_HOME").ok(),
        std::env::var("HOME").ok(),
    )
}

fn config_home_from(
    xdg_config_home: Option<String>,
    home: Option<String>,
) -> Result<PathBuf, DiscoveryError> {
    if let Some(xdg_config_home) = xdg_config_home.filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(xdg_config_home));
    }

    let home = home.ok_or_else(|| {
        DiscoveryError::ConfigError(
            "Could not determine XDG config home directory (HOME not set)".to_string(),
        )
    })?;

    Ok(PathBuf::from(home).join(".config"))
}

/// Global config file path
///
/// Returns `$XDG_CONFIG_HOME/roster/config.toml`. The file is optional and
/// never created here.
pub fn global_config_file() -> Result<PathBuf, DiscoveryError> {
    Ok(config_file_under(config_home()?))
}

fn config_file_under(config_home: PathBuf) -> PathBuf {
    config_home.join("roster").join("config.toml")
}
