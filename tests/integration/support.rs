use roster::config::RosterConfig;
use roster::DiscoveryOrchestrator;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary discovery root. Paths are canonical so they compare equal to
/// the paths the scanner reports.
pub struct Fixture {
    _dir: TempDir,
    root: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        Self { _dir: dir, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn write(&self, rel: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    pub fn orchestrator(&self) -> DiscoveryOrchestrator {
        DiscoveryOrchestrator::from_config(&self.root, &RosterConfig::default())
    }
}

/// Configuration body (YAML) of a structurally complete agent.
pub fn agent_yaml(id: &str, dependencies: &str) -> String {
    let mut yaml = format!(
        "agent:\n  id: {id}\n  name: {id}-name\n  title: {id} title\n  icon: \"🧪\"\n  whenToUse: Testing\npersona:\n  role: Tester\n  style: Direct\n  core_principles:\n    - Be exact\ncommands:\n  - help: Show help\n  - \"*run: Run it\"\n"
    );
    if !dependencies.is_empty() {
        yaml.push_str("dependencies:\n");
        yaml.push_str(dependencies);
    }
    yaml
}

pub fn front_matter_unit(id: &str, dependencies: &str) -> String {
    format!("---\n{}---\n\n# {}\n", agent_yaml(id, dependencies), id)
}

pub fn fenced_unit(id: &str, dependencies: &str) -> String {
    format!(
        "# {}\n\nActivation notes.\n\n```yaml\n{}```\n\nMore prose.\n",
        id,
        agent_yaml(id, dependencies)
    )
}
