//! Metadata extractor: unit text plus scope context into an [`AgentRecord`].
//!
//! Failures never escape. A document without any configuration block (or an
//! unreadable file) is dropped and reported as a [`ValidationError`]; a
//! document with configuration always yields a record, valid or not.

use crate::agent::normalize::{
    normalize_commands, normalize_dependencies, scalar_to_string, string_list,
};
use crate::agent::parser::parse_unit;
use crate::agent::record::{AgentRecord, Command, Dependencies, Persona};
use crate::agent::validation::validate_record;
use crate::types::{ScopeContext, ValidationError};
use chrono::Utc;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

pub const NO_CONFIGURATION: &str = "No valid configuration found";
pub const IDENTITY_SECTION: &str = "agent";
pub const DEFAULT_ICON: &str = "🤖";

/// Result of extracting one unit file.
#[derive(Debug, Clone)]
pub enum ExtractOutcome {
    /// Configuration was found; the record may still be invalid.
    Extracted(Box<AgentRecord>),
    /// Nothing usable; the unit is skipped and the error kept for diagnostics.
    Dropped(ValidationError),
}

impl ExtractOutcome {
    pub fn record(&self) -> Option<&AgentRecord> {
        match self {
            ExtractOutcome::Extracted(record) => Some(record),
            ExtractOutcome::Dropped(_) => None,
        }
    }
}

/// Builds records relative to a discovery root.
#[derive(Debug, Clone)]
pub struct Extractor {
    root: PathBuf,
}

impl Extractor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Read `path` and extract it.
    pub fn extract_file(&self, path: &Path, ctx: &ScopeContext) -> ExtractOutcome {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                return ExtractOutcome::Dropped(ValidationError::new(
                    path,
                    format!("Failed to read unit file: {}", e),
                ))
            }
        };
        match String::from_utf8(bytes) {
            Ok(raw) => self.extract(path, &raw, ctx),
            Err(e) => ExtractOutcome::Dropped(ValidationError::new(
                path,
                format!("Unit file is not valid UTF-8: {}", e),
            )),
        }
    }

    /// Extract a record from already-read text.
    pub fn extract(&self, path: &Path, raw: &str, ctx: &ScopeContext) -> ExtractOutcome {
        let parsed = parse_unit(raw);
        if !parsed.has_config() {
            debug!(path = %path.display(), "No configuration block found");
            return ExtractOutcome::Dropped(ValidationError::new(path, NO_CONFIGURATION));
        }

        let mut record = self.build_record(path, raw, parsed.config, ctx);
        let result = validate_record(&record);
        record.validation_errors = result.errors;
        record.refresh_validity();

        debug!(
            path = %path.display(),
            id = %record.id,
            scope = %ctx.label(),
            valid = record.is_valid,
            encoding = ?parsed.encoding,
            "Extracted agent"
        );
        ExtractOutcome::Extracted(Box::new(record))
    }

    fn build_record(
        &self,
        path: &Path,
        raw: &str,
        config: Mapping,
        ctx: &ScopeContext,
    ) -> AgentRecord {
        let agent_section = config.get(IDENTITY_SECTION).and_then(Value::as_mapping);
        let identity = agent_section.unwrap_or(&config);

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let id = string_field(identity, &["id"])
            .map(|id| normalize_id(&id))
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| normalize_id(&stem));
        let name = string_field(identity, &["name"]).unwrap_or_else(|| id.clone());
        let title = string_field(identity, &["title"]).unwrap_or_else(|| name.clone());
        let icon = string_field(identity, &["icon"]).unwrap_or_else(|| DEFAULT_ICON.to_string());

        let section = |key: &str| {
            config
                .get(key)
                .or_else(|| agent_section.and_then(|a| a.get(key)))
        };

        let persona = section("persona")
            .and_then(Value::as_mapping)
            .map(build_persona)
            .unwrap_or_default();
        let commands: Vec<Command> = section("commands")
            .map(normalize_commands)
            .unwrap_or_default();
        let dependencies: Dependencies = section("dependencies")
            .map(normalize_dependencies)
            .unwrap_or_default();

        let relative_path = path.strip_prefix(&self.root).unwrap_or(path).to_path_buf();

        AgentRecord {
            when_to_use: string_field(identity, &["whenToUse", "when_to_use"]),
            customization: string_field(identity, &["customization"]),
            id,
            name,
            title,
            icon,
            file_path: path.to_path_buf(),
            relative_path,
            file_name,
            scope: ctx.scope,
            extension_id: ctx.extension_id.clone(),
            persona,
            commands,
            dependencies,
            resolved_dependencies: BTreeMap::new(),
            is_valid: false,
            validation_errors: Vec::new(),
            discovered_at: Utc::now(),
            raw_content: raw.to_string(),
            parsed_config: Value::Mapping(config.clone()),
        }
    }
}

/// NFKC-normalized, trimmed identifier.
pub fn normalize_id(raw: &str) -> String {
    raw.nfkc().collect::<String>().trim().to_string()
}

/// First present scalar among `keys`, trimmed. Present-but-empty stays `Some("")`.
fn string_field(mapping: &Mapping, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| mapping.get(*key).and_then(scalar_to_string))
        .map(|s| s.trim().to_string())
}

fn build_persona(section: &Mapping) -> Persona {
    let text = |key: &str| string_field(section, &[key]).unwrap_or_default();
    Persona {
        role: text("role"),
        style: text("style"),
        identity: text("identity"),
        focus: text("focus"),
        principles: ["principles", "core_principles"]
            .iter()
            .find_map(|key| section.get(*key))
            .map(string_list)
            .unwrap_or_default(),
    }
}
