//! Dependency resolver: first-match search across ordered scope bases.
//!
//! For an agent in scope S, a dependency `kind/name` is looked up under
//! `{S base}/{kind}`, then `{shared base}/{kind}` (unless S is shared), then
//! `{core base}/{kind}` (only when S is an extension). The first existing
//! candidate wins; there is no merging across scopes.

use crate::agent::{AgentRecord, DependencyKind};
use crate::discovery::layout::ScopeLayout;
use crate::types::{Scope, ScopeContext, ValidationError};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

const MISSING_PREFIX: &str = "Missing dependency: ";
const INVALID_PREFIX: &str = "Invalid dependency name: ";

/// Outcome of resolving one record.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// `(kind, name, winning path)` in declaration order
    pub resolved: Vec<(DependencyKind, String, PathBuf)>,
    /// One error per unresolved dependency
    pub missing: Vec<ValidationError>,
}

pub struct DependencyResolver<'a> {
    layout: &'a ScopeLayout,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(layout: &'a ScopeLayout) -> Self {
        Self { layout }
    }

    fn context_of(&self, record: &AgentRecord) -> ScopeContext {
        match (record.scope, record.extension_id.as_deref()) {
            (Scope::Extension, Some(ext)) => self.layout.extension_context(ext),
            (Scope::Shared, _) => self.layout.shared_context(),
            _ => self.layout.core_context(),
        }
    }

    /// Ordered candidate paths for one dependency of an agent in `ctx`.
    pub fn candidates(&self, ctx: &ScopeContext, kind: DependencyKind, name: &str) -> Vec<PathBuf> {
        let has_extension = Path::new(name).extension().is_some();
        let mut candidates = Vec::new();
        for base in self.layout.search_bases(ctx) {
            let dir = base.join(kind.as_str());
            candidates.push(dir.join(name));
            if !has_extension {
                for ext in self.layout.dependency_extensions() {
                    candidates.push(dir.join(format!("{}.{}", name, ext)));
                }
            }
        }
        candidates
    }

    /// Resolve all declared dependencies of `record` in place.
    ///
    /// Previous resolution results and missing-dependency errors on the
    /// record are discarded first, so resolving twice gives the same result.
    pub fn resolve(&self, record: &mut AgentRecord) -> Resolution {
        record.resolved_dependencies.clear();
        record
            .validation_errors
            .retain(|e| !e.starts_with(MISSING_PREFIX) && !e.starts_with(INVALID_PREFIX));

        let ctx = self.context_of(record);
        let declared: Vec<(DependencyKind, String)> = record
            .dependencies
            .iter()
            .map(|(kind, name)| (kind, name.to_string()))
            .collect();

        let mut resolution = Resolution::default();
        for (kind, name) in declared {
            if !is_safe_name(&name) {
                let message = format!("{}{}/{}", INVALID_PREFIX, kind, name);
                record.validation_errors.push(message.clone());
                resolution
                    .missing
                    .push(ValidationError::new(&record.file_path, message));
                continue;
            }

            let candidates = self.candidates(&ctx, kind, &name);
            match candidates.iter().find(|path| path.exists()) {
                Some(found) => {
                    debug!(
                        agent = %record.id,
                        %kind,
                        %name,
                        path = %found.display(),
                        "Resolved dependency"
                    );
                    record
                        .resolved_dependencies
                        .entry(kind)
                        .or_default()
                        .insert(name.clone(), found.clone());
                    resolution.resolved.push((kind, name, found.clone()));
                }
                None => {
                    let checked = candidates
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    let message =
                        format!("{}{}/{} (checked: {})", MISSING_PREFIX, kind, name, checked);
                    debug!(agent = %record.id, %kind, %name, "Dependency not found");
                    record.validation_errors.push(message.clone());
                    resolution
                        .missing
                        .push(ValidationError::new(&record.file_path, message));
                }
            }
        }

        record.refresh_validity();
        resolution
    }
}

/// Dependency names must stay inside their kind directory.
fn is_safe_name(name: &str) -> bool {
    let path = Path::new(name);
    !path.as_os_str().is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)))
}
