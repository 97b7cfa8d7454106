//! Absolute scope locations for one discovery root.

use crate::config::LayoutConfig;
use crate::error::DiscoveryError;
use crate::types::{Scope, ScopeContext};
use std::path::{Component, Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Resolved layout: where each scope lives and how unit files are recognized.
#[derive(Debug, Clone)]
pub struct ScopeLayout {
    root: PathBuf,
    core_base: PathBuf,
    shared_base: PathBuf,
    extensions_dir: PathBuf,
    extension_prefix: Option<String>,
    agents_subdir: PathBuf,
    unit_extension: String,
    dependency_extensions: Vec<String>,
}

fn absolute(path: &Path) -> PathBuf {
    if let Ok(canonical) = dunce::canonicalize(path) {
        return canonical;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl ScopeLayout {
    pub fn new(root: &Path, config: &LayoutConfig) -> Self {
        let root = absolute(root);
        Self {
            core_base: root.join(&config.core_dir),
            shared_base: root.join(&config.shared_dir),
            extensions_dir: root.join(&config.extensions_dir),
            extension_prefix: config
                .extension_prefix
                .clone()
                .filter(|prefix| !prefix.is_empty()),
            agents_subdir: config.agents_subdir.clone(),
            unit_extension: config.unit_extension.trim_start_matches('.').to_string(),
            dependency_extensions: config
                .dependency_extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_string())
                .filter(|ext| !ext.is_empty())
                .collect(),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn core_base(&self) -> &Path {
        &self.core_base
    }

    pub fn shared_base(&self) -> &Path {
        &self.shared_base
    }

    pub fn extensions_dir(&self) -> &Path {
        &self.extensions_dir
    }

    pub fn dependency_extensions(&self) -> &[String] {
        &self.dependency_extensions
    }

    pub fn core_context(&self) -> ScopeContext {
        ScopeContext::core(&self.core_base)
    }

    pub fn shared_context(&self) -> ScopeContext {
        ScopeContext::shared(&self.shared_base)
    }

    pub fn extension_context(&self, extension_id: &str) -> ScopeContext {
        ScopeContext::extension(extension_id, self.extensions_dir.join(extension_id))
    }

    /// Directory holding the unit files of a scope.
    pub fn agents_dir(&self, ctx: &ScopeContext) -> PathBuf {
        ctx.base_dir.join(&self.agents_subdir)
    }

    /// Whether `path` carries the unit-file extension.
    pub fn is_unit_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(&self.unit_extension))
            .unwrap_or(false)
    }

    fn is_extension_name(&self, name: &str) -> bool {
        if name.starts_with('.') {
            return false;
        }
        match &self.extension_prefix {
            Some(prefix) => name.starts_with(prefix.as_str()),
            None => true,
        }
    }

    /// Extension scopes in lexical order.
    ///
    /// A missing extensions directory means no extensions are installed and is
    /// only logged. Any other failure to enumerate it is returned.
    pub fn discover_extensions(&self) -> Result<Vec<ScopeContext>, DiscoveryError> {
        let dir = &self.extensions_dir;
        match std::fs::metadata(dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(DiscoveryError::ScopeEnumeration {
                    path: dir.clone(),
                    source: std::io::Error::other("not a directory"),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %dir.display(), "Extensions directory not found, no extension scopes");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(DiscoveryError::ScopeEnumeration {
                    path: dir.clone(),
                    source,
                })
            }
        }

        let mut contexts = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| DiscoveryError::ScopeEnumeration {
                path: dir.clone(),
                source: e.into(),
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                warn!(path = %entry.path().display(), "Skipping extension with non UTF-8 name");
                continue;
            };
            if self.is_extension_name(name) {
                contexts.push(self.extension_context(name));
            }
        }
        Ok(contexts)
    }

    /// Scope context owning a unit file path, if any.
    ///
    /// Relative paths are taken relative to the root.
    pub fn context_for_path(&self, path: &Path) -> Option<ScopeContext> {
        let path = if path.is_absolute() {
            absolute(path)
        } else {
            absolute(&self.root.join(path))
        };

        if let Ok(rest) = path.strip_prefix(&self.extensions_dir) {
            return match rest.components().next() {
                Some(Component::Normal(name)) => {
                    let name = name.to_str()?;
                    self.is_extension_name(name)
                        .then(|| self.extension_context(name))
                }
                _ => None,
            };
        }
        if path.starts_with(&self.core_base) {
            return Some(self.core_context());
        }
        if path.starts_with(&self.shared_base) {
            return Some(self.shared_context());
        }
        None
    }

    /// Base directories searched for a dependency, in precedence order.
    ///
    /// Own scope first, then shared (unless the owner is shared), then core
    /// (only for extensions).
    pub fn search_bases(&self, ctx: &ScopeContext) -> Vec<PathBuf> {
        let mut bases = vec![ctx.base_dir.clone()];
        if ctx.scope != Scope::Shared {
            bases.push(self.shared_base.clone());
        }
        if ctx.scope == Scope::Extension {
            bases.push(self.core_base.clone());
        }
        bases
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn layout(dir: &TempDir) -> ScopeLayout {
        ScopeLayout::new(dir.path(), &LayoutConfig::default())
    }

    #[test]
    fn test_discover_extensions_lexical_and_filtered() {
        let dir = TempDir::new().unwrap();
        for name in ["zeta", "alpha", ".hidden", "mid"] {
            std::fs::create_dir_all(dir.path().join("extensions").join(name)).unwrap();
        }
        std::fs::write(dir.path().join("extensions/README.md"), "x").unwrap();

        let ids: Vec<_> = layout(&dir)
            .discover_extensions()
            .unwrap()
            .into_iter()
            .filter_map(|ctx| ctx.extension_id)
            .collect();
        assert_eq!(ids, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_discover_extensions_with_prefix() {
        let dir = TempDir::new().unwrap();
        for name in ["pack-a", "other", "pack-b"] {
            std::fs::create_dir_all(dir.path().join("extensions").join(name)).unwrap();
        }
        let config = LayoutConfig {
            extension_prefix: Some("pack-".to_string()),
            ..LayoutConfig::default()
        };
        let contexts = ScopeLayout::new(dir.path(), &config)
            .discover_extensions()
            .unwrap();
        assert_eq!(contexts.len(), 2);
    }

    #[test]
    fn test_missing_extensions_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(layout(&dir).discover_extensions().unwrap().is_empty());
    }

    #[test]
    fn test_extensions_path_that_is_a_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("extensions"), "oops").unwrap();
        assert!(matches!(
            layout(&dir).discover_extensions(),
            Err(DiscoveryError::ScopeEnumeration { .. })
        ));
    }

    #[test]
    fn test_search_bases_per_scope() {
        let dir = TempDir::new().unwrap();
        let layout = layout(&dir);
        let root = layout.root().to_path_buf();

        assert_eq!(
            layout.search_bases(&layout.core_context()),
            vec![root.join("core"), root.join("common")]
        );
        assert_eq!(
            layout.search_bases(&layout.shared_context()),
            vec![root.join("common")]
        );
        assert_eq!(
            layout.search_bases(&layout.extension_context("game")),
            vec![root.join("extensions/game"), root.join("common"), root.join("core")]
        );
    }

    #[test]
    fn test_context_for_path() {
        let dir = TempDir::new().unwrap();
        let layout = layout(&dir);
        let root = layout.root().to_path_buf();

        let ctx = layout
            .context_for_path(&root.join("extensions/game/agents/designer.md"))
            .unwrap();
        assert_eq!(ctx.extension_id.as_deref(), Some("game"));
        assert_eq!(
            layout.context_for_path(Path::new("core/agents/pm.md")).unwrap().scope,
            Scope::Core
        );
        assert!(layout.context_for_path(Path::new("/elsewhere/x.md")).is_none());
    }

    #[test]
    fn test_unit_file_extension_match() {
        let dir = TempDir::new().unwrap();
        let layout = layout(&dir);
        assert!(layout.is_unit_file(Path::new("a/pm.md")));
        assert!(layout.is_unit_file(Path::new("a/pm.MD")));
        assert!(!layout.is_unit_file(Path::new("a/pm.yaml")));
        assert!(!layout.is_unit_file(Path::new("a/README")));
    }
}
