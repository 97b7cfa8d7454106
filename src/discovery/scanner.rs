//! Directory scanner: unit files of one scope into agent records.

use crate::agent::{AgentRecord, ExtractOutcome, Extractor};
use crate::concurrency::BoundedPool;
use crate::discovery::layout::ScopeLayout;
use crate::discovery::session::DiscoverySession;
use crate::error::DiscoveryError;
use crate::types::{ScopeContext, ValidationError};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

pub struct DirectoryScanner<'a> {
    layout: &'a ScopeLayout,
    extractor: Extractor,
    pool: BoundedPool,
}

impl<'a> DirectoryScanner<'a> {
    pub fn new(layout: &'a ScopeLayout, pool: BoundedPool) -> Self {
        Self {
            layout,
            extractor: Extractor::new(layout.root()),
            pool,
        }
    }

    /// Unit files directly under `dir`, ordered by file name.
    ///
    /// `Ok(None)` when `dir` does not exist.
    pub fn list_units(&self, dir: &Path) -> Result<Option<Vec<PathBuf>>, DiscoveryError> {
        match std::fs::metadata(dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(DiscoveryError::ScopeEnumeration {
                    path: dir.to_path_buf(),
                    source: std::io::Error::other("not a directory"),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(DiscoveryError::ScopeEnumeration {
                    path: dir.to_path_buf(),
                    source,
                })
            }
        }

        let mut units = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() > 0 => {
                    warn!(
                        dir = %dir.display(),
                        error = %e,
                        "Skipping unreadable directory entry"
                    );
                    continue;
                }
                Err(e) => {
                    return Err(DiscoveryError::ScopeEnumeration {
                        path: dir.to_path_buf(),
                        source: e.into(),
                    })
                }
            };
            if entry.file_type().is_file() && self.layout.is_unit_file(entry.path()) {
                units.push(entry.into_path());
            }
        }
        Ok(Some(units))
    }

    /// Scan one scope directory, recording every error in `session`.
    ///
    /// Returns the records this directory produced, in listing order, for the
    /// caller to insert. A missing directory yields an empty result.
    pub fn scan_scope(
        &self,
        dir: &Path,
        ctx: &ScopeContext,
        session: &mut DiscoverySession,
    ) -> Result<Vec<AgentRecord>, DiscoveryError> {
        let Some(units) = self.list_units(dir)? else {
            warn!(
                scope = %ctx.label(),
                path = %dir.display(),
                "Scope directory not found, skipping"
            );
            return Ok(Vec::new());
        };

        let extractor = self.extractor.clone();
        let unit_ctx = ctx.clone();
        let outcomes = self
            .pool
            .map(units, move |path| extractor.extract_file(&path, &unit_ctx))?;

        let mut records = Vec::with_capacity(outcomes.len());
        let mut dropped = 0usize;
        for outcome in outcomes {
            match outcome {
                ExtractOutcome::Extracted(record) => {
                    for message in &record.validation_errors {
                        session.record_error(ValidationError::new(
                            &record.file_path,
                            message.clone(),
                        ));
                    }
                    records.push(*record);
                }
                ExtractOutcome::Dropped(error) => {
                    warn!(
                        path = %error.file_path.display(),
                        reason = %error.message,
                        "Unit skipped"
                    );
                    dropped += 1;
                    session.record_error(error);
                }
            }
        }

        info!(
            scope = %ctx.label(),
            path = %dir.display(),
            discovered = records.len(),
            dropped,
            "Scanned scope"
        );
        Ok(records)
    }
}
