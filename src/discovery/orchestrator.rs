//! Discovery orchestrator: scan, validate, resolve, retry and report.
//!
//! Every `scan_all` starts from a fresh [`DiscoverySession`]; the previous
//! session is discarded, never merged. `retry_failed` works on the current
//! session through the same extract, validate and resolve path as the scan.

use crate::agent::{AgentRecord, ExtractOutcome, Extractor};
use crate::concurrency::BoundedPool;
use crate::config::{RosterConfig, ScanConfig};
use crate::discovery::layout::ScopeLayout;
use crate::discovery::report::{DiagnosticReport, ReportAgents, ReportOptions, SystemInfo};
use crate::discovery::resolver::DependencyResolver;
use crate::discovery::scanner::DirectoryScanner;
use crate::discovery::session::DiscoverySession;
use crate::error::DiscoveryError;
use crate::types::{Scope, ValidationError};
use chrono::Utc;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const OUTSIDE_SCOPES: &str = "Path is outside every known scope";

/// Aggregate counts over the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryStats {
    pub total_agents: usize,
    pub by_scope: BTreeMap<String, usize>,
    pub valid_agents: usize,
    pub invalid_agents: usize,
    pub extensions: BTreeSet<String>,
    pub dependency_map_size: usize,
    pub validation_error_count: usize,
    pub collisions: usize,
}

/// Outcome of a retry pass.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryReport {
    /// Paths that now produce a valid record
    pub retried: Vec<PathBuf>,
    /// Paths that are still dropped or invalid
    pub still_failed: Vec<PathBuf>,
    /// Errors produced by this pass
    pub errors: Vec<ValidationError>,
}

pub struct DiscoveryOrchestrator {
    layout: ScopeLayout,
    pool: BoundedPool,
    session: DiscoverySession,
}

impl DiscoveryOrchestrator {
    pub fn new(layout: ScopeLayout, scan: &ScanConfig) -> Self {
        Self {
            layout,
            pool: BoundedPool::new(scan.effective_workers()),
            session: DiscoverySession::new(),
        }
    }

    pub fn from_config(root: &Path, config: &RosterConfig) -> Self {
        Self::new(config.layout.resolve(root), &config.scan)
    }

    pub fn layout(&self) -> &ScopeLayout {
        &self.layout
    }

    /// State of the last scan (and any retries since).
    pub fn session(&self) -> &DiscoverySession {
        &self.session
    }

    pub fn find(&self, id: &str) -> Option<&AgentRecord> {
        self.session.find(id)
    }

    /// Scan core, then every extension in lexical order, then resolve.
    ///
    /// Returns the records in scan order. On error the session is left empty.
    pub fn scan_all(&mut self) -> Result<Vec<AgentRecord>, DiscoveryError> {
        self.session = DiscoverySession::new();
        let mut session = DiscoverySession::new();
        let scanner = DirectoryScanner::new(&self.layout, self.pool);

        let core = self.layout.core_context();
        let mut scopes = vec![core];
        scopes.extend(self.layout.discover_extensions()?);

        for ctx in &scopes {
            for record in scanner.scan_scope(&self.layout.agents_dir(ctx), ctx, &mut session)? {
                session.insert(record);
            }
        }

        session.resolve_all(&DependencyResolver::new(&self.layout));
        self.session = session;

        let stats = self.stats();
        info!(
            root = %self.layout.root().display(),
            agents = stats.total_agents,
            valid = stats.valid_agents,
            invalid = stats.invalid_agents,
            extensions = stats.extensions.len(),
            errors = stats.validation_error_count,
            "Discovery complete"
        );
        Ok(self.session.records().to_vec())
    }

    /// Re-run extraction, validation and resolution for `paths`, or for every
    /// path in the session error list when `paths` is `None`.
    ///
    /// Records and errors previously produced by a retried path are replaced
    /// by the new outcome. Records and errors for other paths are kept.
    pub fn retry_failed(&mut self, paths: Option<&[PathBuf]>) -> RetryReport {
        let targets: Vec<PathBuf> = match paths {
            Some(paths) => {
                let mut seen = HashSet::new();
                paths
                    .iter()
                    .map(|p| self.absolute(p))
                    .filter(|p| seen.insert(p.clone()))
                    .collect()
            }
            None => self.session.failed_paths(),
        };

        let extractor = Extractor::new(self.layout.root());
        let resolver = DependencyResolver::new(&self.layout);
        let mut report = RetryReport::default();

        for path in targets {
            let Some(ctx) = self.layout.context_for_path(&path) else {
                warn!(path = %path.display(), "Retry target is outside every scope");
                report.errors.push(ValidationError::new(&path, OUTSIDE_SCOPES));
                report.still_failed.push(path);
                continue;
            };

            self.session.remove_errors_for(&path);
            let stale = self.session.remove_by_path(&path);
            if stale > 0 {
                debug!(path = %path.display(), stale, "Withdrew records from earlier read");
            }
            let record = match extractor.extract_file(&path, &ctx) {
                ExtractOutcome::Extracted(record) => record,
                ExtractOutcome::Dropped(error) => {
                    debug!(path = %path.display(), reason = %error.message, "Retry still dropped");
                    self.session.record_error(error.clone());
                    report.errors.push(error);
                    report.still_failed.push(path);
                    continue;
                }
            };

            let before = self.session.validation_errors().len();
            for message in &record.validation_errors {
                self.session.record_error(ValidationError::new(&path, message.clone()));
            }
            let position = self.session.insert_in_scan_order(*record);
            self.session.resolve_at(position, &resolver);
            report
                .errors
                .extend(self.session.validation_errors()[before..].iter().cloned());

            if self.session.records()[position].is_valid {
                report.retried.push(path);
            } else {
                report.still_failed.push(path);
            }
        }

        info!(
            retried = report.retried.len(),
            still_failed = report.still_failed.len(),
            "Retry complete"
        );
        report
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.layout.root().join(path)
        }
    }

    pub fn stats(&self) -> DiscoveryStats {
        let records = self.session.records();
        let mut stats = DiscoveryStats {
            total_agents: records.len(),
            dependency_map_size: self.session.dependency_map().len(),
            validation_error_count: self.session.validation_errors().len(),
            collisions: self.session.collisions().len(),
            ..DiscoveryStats::default()
        };
        for scope in [Scope::Core, Scope::Extension, Scope::Shared] {
            stats.by_scope.insert(scope.to_string(), 0);
        }
        for record in records {
            *stats.by_scope.entry(record.scope.to_string()).or_default() += 1;
            if record.is_valid {
                stats.valid_agents += 1;
            } else {
                stats.invalid_agents += 1;
            }
            if let Some(ext) = &record.extension_id {
                stats.extensions.insert(ext.clone());
            }
        }
        stats
    }

    /// Snapshot the session, writing it to `options.output_path` when set.
    pub fn diagnostic_report(
        &self,
        options: &ReportOptions,
    ) -> Result<DiagnosticReport, DiscoveryError> {
        let records = self.session.records();
        let discovered_agents = if options.include_full_records {
            ReportAgents::Full(records.to_vec())
        } else {
            ReportAgents::Ids(records.iter().map(|r| r.id.clone()).collect())
        };

        let report = DiagnosticReport {
            timestamp: Utc::now(),
            summary: self.stats(),
            discovered_agents,
            validation_errors: self.session.validation_errors().to_vec(),
            dependency_map: self.session.dependency_map().clone(),
            system_info: SystemInfo::collect(self.layout.root(), self.pool.workers()),
        };

        if let Some(path) = &options.output_path {
            report.write_to(path)?;
        }
        Ok(report)
    }
}
