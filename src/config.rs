//! Configuration Management
//!
//! Layered configuration for discovery: scope layout, scan tuning and logging.
//! Sources are merged by the `config` crate, lowest to highest precedence:
//! built-in defaults, global file (`$XDG_CONFIG_HOME/roster/config.toml`),
//! workspace file (`<root>/roster.toml`), `ROSTER_*` environment variables.

pub mod facade;
pub mod layout;
mod merge;
pub mod paths;
mod sources;

pub use facade::ConfigLoader;
pub use layout::{LayoutConfig, ScanConfig};

use crate::error::DiscoveryError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Workspace file name looked up under the discovery root.
pub const WORKSPACE_CONFIG_FILE: &str = "roster.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RosterConfig {
    /// Render as TOML (used by `roster config`).
    pub fn to_toml(&self) -> Result<String, DiscoveryError> {
        toml::to_string_pretty(self)
            .map_err(|e| DiscoveryError::Serialization(format!("Failed to render config: {}", e)))
    }
}
