//! Polymorphic field normalization.
//!
//! `commands` and `dependencies` show up in three encodings:
//!
//! ```yaml
//! commands: [help, "create-prd: Create a PRD"]     # sequence of strings
//! commands: [{help: Show help}, {create-prd: ...}]  # sequence of single-key mappings
//! commands: {help: Show help, create-prd: ...}      # mapping
//! ```
//!
//! The value is decoded once into [`Entry`] items; both fields are built from
//! those, so every encoding lands on the same canonical shape.

use crate::agent::record::{Command, Dependencies};
use serde_yaml::{Mapping, Value};
use tracing::debug;

/// Kind used for a bare dependency string that names no kind.
pub const UNSPECIFIED_KIND: &str = "unspecified";

/// One decoded item of a polymorphic field.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry<'a> {
    /// A plain string item, e.g. `help` or `tasks/create-doc.md`.
    Bare(String),
    /// A key with its value, from a mapping or a single-key mapping item.
    Keyed(String, &'a Value),
}

/// Decode a sequence-of-strings, sequence-of-mappings, mapping, or single string.
pub fn decode_entries(value: &Value) -> Vec<Entry<'_>> {
    match value {
        Value::Mapping(mapping) => keyed_entries(mapping).collect(),
        Value::Sequence(items) => items
            .iter()
            .flat_map(|item| match item {
                Value::Mapping(mapping) => keyed_entries(mapping).collect::<Vec<_>>(),
                other => match scalar_to_string(other) {
                    Some(s) => vec![Entry::Bare(s)],
                    None => {
                        debug!(?other, "Skipping non-scalar sequence item");
                        Vec::new()
                    }
                },
            })
            .collect(),
        Value::Tagged(tagged) => decode_entries(&tagged.value),
        other => scalar_to_string(other)
            .map(|s| vec![Entry::Bare(s)])
            .unwrap_or_default(),
    }
}

fn keyed_entries(mapping: &Mapping) -> impl Iterator<Item = Entry<'_>> {
    mapping
        .iter()
        .filter_map(|(key, value)| scalar_to_string(key).map(|key| Entry::Keyed(key, value)))
}

/// String form of a scalar YAML value; `None` for null, sequences and mappings.
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_to_string(&tagged.value),
        _ => None,
    }
}

/// Scalars and sequences of scalars as an ordered string list.
pub fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(items) => items.iter().filter_map(scalar_to_string).collect(),
        other => scalar_to_string(other).into_iter().collect(),
    }
}

fn command_name(raw: &str) -> String {
    raw.trim().trim_start_matches('*').trim().to_string()
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Normalize a `commands` value into ordered commands.
pub fn normalize_commands(value: &Value) -> Vec<Command> {
    decode_entries(value)
        .into_iter()
        .map(|entry| match entry {
            Entry::Bare(text) => match text.split_once(':') {
                Some((name, description)) => Command {
                    name: command_name(name),
                    description: non_empty(description),
                },
                None => Command {
                    name: command_name(&text),
                    description: None,
                },
            },
            Entry::Keyed(name, description) => Command {
                name: command_name(&name),
                description: scalar_to_string(description).and_then(|d| non_empty(&d)),
            },
        })
        .collect()
}

/// Normalize a `dependencies` value into the closed kind set plus `other`.
pub fn normalize_dependencies(value: &Value) -> Dependencies {
    let mut deps = Dependencies::default();
    for entry in decode_entries(value) {
        match entry {
            Entry::Bare(text) => match text.split_once('/') {
                Some((kind, name)) => deps.push(kind, name),
                None => deps.push(UNSPECIFIED_KIND, &text),
            },
            Entry::Keyed(kind, names) => {
                for name in string_list(names) {
                    deps.push(&kind, &name);
                }
            }
        }
    }
    deps
}
