//! Structural validation of an agent record.
//!
//! Every check runs; a record can carry several errors at once. The only I/O
//! is an existence check on the record's own file.

use crate::agent::extractor::IDENTITY_SECTION;
use crate::agent::record::AgentRecord;
use serde_yaml::Value;

/// Validation outcome: named checks plus error messages.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub checks: Vec<(String, bool)>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a check; a failed check adds `error` to the error list.
    pub fn check(&mut self, description: &str, passed: bool, error: impl FnOnce() -> String) {
        self.checks.push((description.to_string(), passed));
        if !passed {
            self.errors.push(error());
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.checks.iter().all(|(_, passed)| *passed)
    }

    pub fn total_checks(&self) -> usize {
        self.checks.len()
    }

    pub fn passed_checks(&self) -> usize {
        self.checks.iter().filter(|(_, passed)| *passed).count()
    }
}

fn has_identity_section(config: &Value) -> bool {
    config
        .as_mapping()
        .and_then(|m| m.get(IDENTITY_SECTION))
        .map(Value::is_mapping)
        .unwrap_or(false)
}

/// Validate the structural completeness of `record`.
pub fn validate_record(record: &AgentRecord) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.check("Agent id is present", !record.id.trim().is_empty(), || {
        "Missing agent id".to_string()
    });
    result.check("Agent name is present", !record.name.trim().is_empty(), || {
        "Missing agent name".to_string()
    });
    result.check("Agent title is present", !record.title.trim().is_empty(), || {
        "Missing agent title".to_string()
    });
    result.check(
        "Persona role is present",
        !record.persona.role.trim().is_empty(),
        || "Missing persona role".to_string(),
    );
    result.check("Unit file exists", record.file_path.exists(), || {
        format!("Unit file does not exist: {}", record.file_path.display())
    });
    result.check(
        "Unit file has content",
        !record.raw_content.trim().is_empty(),
        || "Unit file is empty".to_string(),
    );
    result.check(
        "Agent declaration section present",
        has_identity_section(&record.parsed_config),
        || "Configuration has no agent declaration section".to_string(),
    );
    for (index, command) in record.commands.iter().enumerate() {
        result.check(
            &format!("Command #{} has a name", index + 1),
            !command.name.trim().is_empty(),
            || format!("Command #{} has an empty name", index + 1),
        );
    }

    result
}
