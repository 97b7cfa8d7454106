//! Agent record and its canonical nested shapes.

use crate::types::Scope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Closed set of dependency kinds that participate in resolution.
///
/// The variant name doubles as the sub-directory searched under each scope base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Tasks,
    Templates,
    Checklists,
    Data,
    Utils,
}

impl DependencyKind {
    pub const ALL: [DependencyKind; 5] = [
        DependencyKind::Tasks,
        DependencyKind::Templates,
        DependencyKind::Checklists,
        DependencyKind::Data,
        DependencyKind::Utils,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyKind::Tasks => "tasks",
            DependencyKind::Templates => "templates",
            DependencyKind::Checklists => "checklists",
            DependencyKind::Data => "data",
            DependencyKind::Utils => "utils",
        }
    }

    /// Map a configuration key to a kind; `None` for anything outside the closed set.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == key.trim())
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub role: String,
    pub style: String,
    pub identity: String,
    pub focus: String,
    pub principles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Dependency under a kind outside the closed set. Kept for visibility only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherDependency {
    pub kind: String,
    pub name: String,
}

/// Declared dependencies: kind -> ordered names, plus unrecognized kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependencies {
    #[serde(flatten)]
    pub declared: BTreeMap<DependencyKind, Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other: Vec<OtherDependency>,
}

impl Dependencies {
    /// Record a dependency under `kind`. Unknown kinds land in `other`.
    /// Repeated names within one kind are kept once, first occurrence wins.
    pub fn push(&mut self, kind: &str, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        match DependencyKind::from_key(kind) {
            Some(known) => {
                let names = self.declared.entry(known).or_default();
                if !names.iter().any(|existing| existing == name) {
                    names.push(name.to_string());
                }
            }
            None => {
                let kind = kind.trim().to_string();
                if !self
                    .other
                    .iter()
                    .any(|dep| dep.kind == kind && dep.name == name)
                {
                    self.other.push(OtherDependency {
                        kind,
                        name: name.to_string(),
                    });
                }
            }
        }
    }

    pub fn names(&self, kind: DependencyKind) -> &[String] {
        self.declared
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolvable dependencies, kind order then declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (DependencyKind, &str)> {
        self.declared
            .iter()
            .flat_map(|(kind, names)| names.iter().map(move |name| (*kind, name.as_str())))
    }

    pub fn contains(&self, kind: DependencyKind, name: &str) -> bool {
        self.names(kind).iter().any(|n| n == name)
    }

    /// Number of resolvable dependencies (excludes `other`).
    pub fn total(&self) -> usize {
        self.declared.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0 && self.other.is_empty()
    }
}

/// Resolved dependency paths: kind -> name -> absolute path.
pub type ResolvedDependencies = BTreeMap<DependencyKind, BTreeMap<String, PathBuf>>;

/// One discovered agent definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    pub id: String,
    pub name: String,
    pub title: String,
    pub icon: String,

    pub file_path: PathBuf,
    pub relative_path: PathBuf,
    pub file_name: String,

    pub scope: Scope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_to_use: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customization: Option<String>,

    pub persona: Persona,
    pub commands: Vec<Command>,
    pub dependencies: Dependencies,
    pub resolved_dependencies: ResolvedDependencies,

    pub is_valid: bool,
    pub validation_errors: Vec<String>,
    pub discovered_at: DateTime<Utc>,

    pub raw_content: String,
    pub parsed_config: serde_yaml::Value,
}

impl AgentRecord {
    /// `id` qualified by scope, e.g. `extension:game-dev/designer`.
    pub fn qualified_id(&self) -> String {
        match &self.extension_id {
            Some(ext) => format!("{}:{}/{}", self.scope, ext, self.id),
            None => format!("{}/{}", self.scope, self.id),
        }
    }

    pub fn resolved_path(&self, kind: DependencyKind, name: &str) -> Option<&PathBuf> {
        self.resolved_dependencies
            .get(&kind)
            .and_then(|names| names.get(name))
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved_dependencies.values().map(BTreeMap::len).sum()
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.validation_errors.push(message.into());
        self.is_valid = false;
    }

    /// Recompute `is_valid` from the recorded errors.
    pub fn refresh_validity(&mut self) {
        self.is_valid = self.validation_errors.is_empty();
    }
}
