//! Core types shared by the parser, scanner, resolver and orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Origin tier of an agent definition or dependency directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Core,
    Extension,
    Shared,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Core => "core",
            Scope::Extension => "extension",
            Scope::Shared => "shared",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a unit file was found: its scope, owning extension and the scope's
/// base directory (the directory that holds `agents/`, `tasks/`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeContext {
    pub scope: Scope,
    pub extension_id: Option<String>,
    pub base_dir: PathBuf,
}

impl ScopeContext {
    pub fn core(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            scope: Scope::Core,
            extension_id: None,
            base_dir: base_dir.into(),
        }
    }

    pub fn shared(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            scope: Scope::Shared,
            extension_id: None,
            base_dir: base_dir.into(),
        }
    }

    pub fn extension(extension_id: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            scope: Scope::Extension,
            extension_id: Some(extension_id.into()),
            base_dir: base_dir.into(),
        }
    }

    /// Human-readable label, e.g. `core` or `extension:game-dev`.
    pub fn label(&self) -> String {
        match &self.extension_id {
            Some(ext) => format!("{}:{}", self.scope, ext),
            None => self.scope.to_string(),
        }
    }
}

/// A problem recorded against one unit file. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub file_path: PathBuf,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ValidationError {
    pub fn new(file_path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file_path.display(), self.message)
    }
}
