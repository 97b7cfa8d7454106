//! Diagnostic snapshot of a discovery session.

use crate::agent::AgentRecord;
use crate::discovery::orchestrator::DiscoveryStats;
use crate::error::DiscoveryError;
use crate::types::ValidationError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// What to put in a report and where to write it.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Full records instead of bare ids
    pub include_full_records: bool,
    /// Write the report as pretty JSON here (parent directories are created)
    pub output_path: Option<PathBuf>,
}

/// Agent listing: full records or ids only.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ReportAgents {
    Full(Vec<AgentRecord>),
    Ids(Vec<String>),
}

impl ReportAgents {
    pub fn len(&self) -> usize {
        match self {
            ReportAgents::Full(records) => records.len(),
            ReportAgents::Ids(ids) => ids.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub version: String,
    pub root: PathBuf,
    pub workers: usize,
}

impl SystemInfo {
    pub fn collect(root: &Path, workers: usize) -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            root: root.to_path_buf(),
            workers,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    pub timestamp: DateTime<Utc>,
    pub summary: DiscoveryStats,
    pub discovered_agents: ReportAgents,
    pub validation_errors: Vec<ValidationError>,
    pub dependency_map: BTreeMap<String, Vec<String>>,
    pub system_info: SystemInfo,
}

impl DiagnosticReport {
    pub fn to_json(&self) -> Result<String, DiscoveryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<(), DiscoveryError> {
        let json = self.to_json()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| DiscoveryError::ReportWrite {
                path: path.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, json).map_err(|source| DiscoveryError::ReportWrite {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Diagnostic report written");
        Ok(())
    }
}
