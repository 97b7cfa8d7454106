//! Scope layout and scan configuration.

use crate::discovery::layout::ScopeLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_core_dir() -> PathBuf {
    PathBuf::from("core")
}

fn default_shared_dir() -> PathBuf {
    PathBuf::from("common")
}

fn default_extensions_dir() -> PathBuf {
    PathBuf::from("extensions")
}

fn default_agents_subdir() -> PathBuf {
    PathBuf::from("agents")
}

fn default_unit_extension() -> String {
    "md".to_string()
}

fn default_dependency_extensions() -> Vec<String> {
    vec!["md".to_string(), "yaml".to_string(), "yml".to_string()]
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Directory layout under the discovery root (all paths relative to it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Core scope base directory
    #[serde(default = "default_core_dir")]
    pub core_dir: PathBuf,

    /// Shared/common scope base directory
    #[serde(default = "default_shared_dir")]
    pub shared_dir: PathBuf,

    /// Directory whose sub-directories are extension scopes
    #[serde(default = "default_extensions_dir")]
    pub extensions_dir: PathBuf,

    /// Only sub-directories starting with this prefix are extensions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_prefix: Option<String>,

    /// Unit-file sub-directory inside each scope base
    #[serde(default = "default_agents_subdir")]
    pub agents_subdir: PathBuf,

    /// File extension of unit files (without the dot)
    #[serde(default = "default_unit_extension")]
    pub unit_extension: String,

    /// Extensions tried for dependency names that carry none
    #[serde(default = "default_dependency_extensions")]
    pub dependency_extensions: Vec<String>,
}

impl LayoutConfig {
    /// Resolve the layout to absolute scope locations under `root`.
    pub fn resolve(&self, root: &Path) -> ScopeLayout {
        ScopeLayout::new(root, self)
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            core_dir: default_core_dir(),
            shared_dir: default_shared_dir(),
            extensions_dir: default_extensions_dir(),
            extension_prefix: None,
            agents_subdir: default_agents_subdir(),
            unit_extension: default_unit_extension(),
            dependency_extensions: default_dependency_extensions(),
        }
    }
}

/// Scan tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Upper bound on unit files read concurrently (minimum 1)
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl ScanConfig {
    pub fn effective_workers(&self) -> usize {
        self.workers.max(1)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}
