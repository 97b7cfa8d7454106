//! CLI Tooling
//!
//! Command-line interface for discovery. Every command runs a fresh scan of
//! the root, so results always reflect what is on disk.

use crate::config::{ConfigLoader, RosterConfig};
use crate::discovery::{DiscoveryOrchestrator, ReportOptions};
use crate::error::DiscoveryError;
use crate::tooling::format::{
    format_agent_text, format_dependency_map_text, format_retry_text, format_scan_text,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

/// Roster CLI - agent discovery and dependency resolution
#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Discover agent definitions and resolve their dependencies across scopes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Discovery root directory
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Configuration file path (replaces the global and workspace files)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Upper bound on unit files read concurrently
    #[arg(long)]
    pub workers: Option<usize>,
}

impl Cli {
    /// Merge command-line overrides into loaded configuration.
    pub fn apply_overrides(&self, config: &mut RosterConfig) {
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
        if let Some(workers) = self.workers {
            config.scan.workers = workers;
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan all scopes and list discovered agents
    Scan {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show one agent by id
    Show {
        /// Agent id
        id: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show the dependency map (dependency name -> consuming agents)
    Deps {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Scan, then retry failed units (or the given paths)
    Retry {
        /// Unit files to retry; defaults to every file with errors
        paths: Vec<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Produce a diagnostic report
    Report {
        /// Write the report to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Include full agent records instead of ids
        #[arg(long)]
        full: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_format(format: &str) -> Result<OutputFormat, DiscoveryError> {
    match format {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        _ => Err(DiscoveryError::ConfigError(format!(
            "Invalid format: '{}'. Must be 'text' or 'json'.",
            format
        ))),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, DiscoveryError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// CLI context: discovery root plus effective configuration
pub struct CliContext {
    root: PathBuf,
    config: RosterConfig,
}

impl CliContext {
    /// Create a new CLI context, loading layered configuration for `root`.
    pub fn new(root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, DiscoveryError> {
        let config = ConfigLoader::load_for(&root, config_path.as_deref())?;
        Ok(Self { root, config })
    }

    pub fn with_config(root: PathBuf, config: RosterConfig) -> Self {
        Self { root, config }
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut RosterConfig {
        &mut self.config
    }

    fn scanned(&self) -> Result<DiscoveryOrchestrator, DiscoveryError> {
        let mut orchestrator = DiscoveryOrchestrator::from_config(&self.root, &self.config);
        orchestrator.scan_all()?;
        Ok(orchestrator)
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, DiscoveryError> {
        match command {
            Commands::Scan { format } => self.handle_scan(parse_format(format)?),
            Commands::Show { id, format } => self.handle_show(id, parse_format(format)?),
            Commands::Deps { format } => self.handle_deps(parse_format(format)?),
            Commands::Retry { paths, format } => self.handle_retry(paths, parse_format(format)?),
            Commands::Report { output, full } => self.handle_report(output.clone(), *full),
            Commands::Config => self.config.to_toml(),
        }
    }

    fn handle_scan(&self, format: OutputFormat) -> Result<String, DiscoveryError> {
        let orchestrator = self.scanned()?;
        let session = orchestrator.session();
        let stats = orchestrator.stats();
        match format {
            OutputFormat::Json => to_json(&json!({
                "agents": session.records(),
                "validationErrors": session.validation_errors(),
                "collisions": session.collisions(),
                "summary": stats,
            })),
            OutputFormat::Text => Ok(format_scan_text(
                session.records(),
                session.validation_errors(),
                session.collisions(),
                &stats,
            )),
        }
    }

    fn handle_show(&self, id: &str, format: OutputFormat) -> Result<String, DiscoveryError> {
        let orchestrator = self.scanned()?;
        let record = orchestrator
            .find(id)
            .ok_or_else(|| DiscoveryError::AgentNotFound(id.to_string()))?;
        match format {
            OutputFormat::Json => to_json(record),
            OutputFormat::Text => Ok(format_agent_text(record)),
        }
    }

    fn handle_deps(&self, format: OutputFormat) -> Result<String, DiscoveryError> {
        let orchestrator = self.scanned()?;
        let map = orchestrator.session().dependency_map();
        match format {
            OutputFormat::Json => to_json(map),
            OutputFormat::Text => Ok(format_dependency_map_text(map)),
        }
    }

    fn handle_retry(
        &self,
        paths: &[PathBuf],
        format: OutputFormat,
    ) -> Result<String, DiscoveryError> {
        let mut orchestrator = self.scanned()?;
        let targets = (!paths.is_empty()).then_some(paths);
        let report = orchestrator.retry_failed(targets);
        match format {
            OutputFormat::Json => to_json(&report),
            OutputFormat::Text => Ok(format_retry_text(&report)),
        }
    }

    fn handle_report(
        &self,
        output: Option<PathBuf>,
        full: bool,
    ) -> Result<String, DiscoveryError> {
        let orchestrator = self.scanned()?;
        let options = ReportOptions {
            include_full_records: full,
            output_path: output.clone(),
        };
        let report = orchestrator.diagnostic_report(&options)?;
        match output {
            Some(path) => {
                info!(
                    path = %path.display(),
                    agents = report.discovered_agents.len(),
                    "Report command complete"
                );
                Ok(format!("Diagnostic report written to {}", path.display()))
            }
            None => report.to_json(),
        }
    }
}
