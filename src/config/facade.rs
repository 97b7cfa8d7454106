//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::RosterConfig;
use crate::error::DiscoveryError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for `root` from files and environment.
    pub fn load(root: &Path) -> Result<RosterConfig, DiscoveryError> {
        Ok(MergeService::load(root)?)
    }

    /// Load configuration from a specific file (environment still applies).
    pub fn load_from_file(path: &Path) -> Result<RosterConfig, DiscoveryError> {
        if !path.exists() {
            return Err(DiscoveryError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        Ok(MergeService::load_from_file(path)?)
    }

    /// Load from `explicit` when given, otherwise the layered sources for `root`.
    pub fn load_for(root: &Path, explicit: Option<&Path>) -> Result<RosterConfig, DiscoveryError> {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None => Self::load(root),
        }
    }

    /// Create default configuration.
    pub fn default() -> RosterConfig {
        RosterConfig::default()
    }
}
