//! Error types crossing the crate boundary.
//!
//! Per-unit problems (unparseable configuration, missing fields, missing
//! dependencies, unreadable files) are recorded as [`crate::ValidationError`]
//! values and never surface here.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to enumerate scope directory {}: {source}", path.display())]
    ScopeEnumeration {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write diagnostic report to {}: {source}", path.display())]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),
}

impl From<config::ConfigError> for DiscoveryError {
    fn from(err: config::ConfigError) -> Self {
        DiscoveryError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for DiscoveryError {
    fn from(err: serde_json::Error) -> Self {
        DiscoveryError::Serialization(err.to_string())
    }
}
