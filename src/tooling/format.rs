//! Format discovery results as text.

use crate::agent::AgentRecord;
use crate::discovery::{DiscoveryStats, IdCollision, RetryReport};
use crate::types::ValidationError;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use std::collections::BTreeMap;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn yes_no(value: bool) -> String {
    if value {
        format!("{}", "yes".green())
    } else {
        format!("{}", "no".red())
    }
}

fn scope_label(record: &AgentRecord) -> String {
    match &record.extension_id {
        Some(ext) => format!("{}:{}", record.scope, ext),
        None => record.scope.to_string(),
    }
}

/// Agent table, error list and summary for `roster scan`.
pub fn format_scan_text(
    records: &[AgentRecord],
    errors: &[ValidationError],
    collisions: &[IdCollision],
    stats: &DiscoveryStats,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Agents")));
    if records.is_empty() {
        out.push_str("No agents found.\n\n");
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Id", "Title", "Scope", "Deps", "Resolved", "Valid"]);
        for record in records {
            table.add_row(vec![
                record.id.clone(),
                record.title.clone(),
                scope_label(record),
                record.dependencies.total().to_string(),
                record.resolved_count().to_string(),
                yes_no(record.is_valid),
            ]);
        }
        out.push_str(&format!("{}\n\n", table));
    }

    if !errors.is_empty() {
        out.push_str(&format!("{}\n\n", format_section_heading("Validation errors")));
        out.push_str(&format_errors_text(errors));
        out.push('\n');
    }

    if !collisions.is_empty() {
        out.push_str(&format!("{}\n\n", format_section_heading("Id collisions")));
        for collision in collisions {
            let outcome = if collision.same_scope { "replaced" } else { "kept both" };
            out.push_str(&format!(
                "  {}: {} / {} ({})\n",
                collision.id,
                collision.existing.display(),
                collision.incoming.display(),
                outcome
            ));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "Total: {} agents, {} valid, {} invalid, {} extension(s), {} error(s).\n",
        stats.total_agents,
        stats.valid_agents,
        stats.invalid_agents,
        stats.extensions.len(),
        stats.validation_error_count
    ));
    out
}

pub fn format_errors_text(errors: &[ValidationError]) -> String {
    let mut out = String::new();
    for error in errors {
        out.push_str(&format!(
            "  {} {}\n    {}\n",
            "✗".red(),
            error.file_path.display(),
            error.message
        ));
    }
    out
}

/// Detail view for `roster show`.
pub fn format_agent_text(record: &AgentRecord) -> String {
    let mut out = format!(
        "{}\n\n",
        format_section_heading(&format!("{} {} ({})", record.icon, record.title, record.id))
    );
    out.push_str(&format!("  Name: {}\n", record.name));
    out.push_str(&format!("  Scope: {}\n", scope_label(record)));
    out.push_str(&format!("  File: {}\n", record.file_path.display()));
    out.push_str(&format!("  Valid: {}\n", yes_no(record.is_valid)));
    if let Some(when) = &record.when_to_use {
        out.push_str(&format!("  When to use: {}\n", when));
    }
    if !record.persona.role.is_empty() {
        out.push_str(&format!("  Role: {}\n", record.persona.role));
    }
    out.push('\n');

    if !record.commands.is_empty() {
        out.push_str(&format!("{}\n\n", format_section_heading("Commands")));
        for command in &record.commands {
            match &command.description {
                Some(description) => {
                    out.push_str(&format!("  *{}: {}\n", command.name, description))
                }
                None => out.push_str(&format!("  *{}\n", command.name)),
            }
        }
        out.push('\n');
    }

    if !record.dependencies.is_empty() || !record.dependencies.other.is_empty() {
        out.push_str(&format!("{}\n\n", format_section_heading("Dependencies")));
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Kind", "Name", "Resolved path"]);
        for (kind, name) in record.dependencies.iter() {
            let path = record
                .resolved_path(kind, name)
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| format!("{}", "missing".red()));
            table.add_row(vec![kind.to_string(), name.to_string(), path]);
        }
        for other in &record.dependencies.other {
            table.add_row(vec![other.kind.clone(), other.name.clone(), "-".to_string()]);
        }
        out.push_str(&format!("{}\n\n", table));
    }

    if !record.validation_errors.is_empty() {
        out.push_str(&format!("{}\n\n", format_section_heading("Errors")));
        for message in &record.validation_errors {
            out.push_str(&format!("  {} {}\n", "✗".red(), message));
        }
    }
    out
}

/// Reverse dependency map for `roster deps`.
pub fn format_dependency_map_text(map: &BTreeMap<String, Vec<String>>) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Dependency map"));
    if map.is_empty() {
        out.push_str("No resolved dependencies.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Dependency", "Used by"]);
    for (name, consumers) in map {
        table.add_row(vec![name.clone(), consumers.join(", ")]);
    }
    out.push_str(&format!("{}\n\n", table));
    out.push_str(&format!("Total: {} dependencies.\n", map.len()));
    out
}

pub fn format_retry_text(report: &RetryReport) -> String {
    let mut out = format!("{}\n\n", format_section_heading("Retry"));
    if report.retried.is_empty() && report.still_failed.is_empty() {
        out.push_str("Nothing to retry.\n");
        return out;
    }
    for path in &report.retried {
        out.push_str(&format!("  {} {}\n", "✓".green(), path.display()));
    }
    for path in &report.still_failed {
        out.push_str(&format!("  {} {}\n", "✗".red(), path.display()));
    }
    if !report.errors.is_empty() {
        out.push_str(&format!("\n{}\n\n", format_section_heading("Errors")));
        out.push_str(&format_errors_text(&report.errors));
    }
    out.push_str(&format!(
        "\nRetried: {}, still failed: {}.\n",
        report.retried.len(),
        report.still_failed.len()
    ));
    out
}
