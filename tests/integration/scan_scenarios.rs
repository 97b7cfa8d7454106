use roster::config::{ConfigLoader, RosterConfig};
use roster::{AgentRecord, DependencyKind, DiscoveryOrchestrator, Scope};

use crate::integration::support::{fenced_unit, front_matter_unit, Fixture};

#[test]
fn core_agent_resolves_task_from_shared_scope() {
    let fx = Fixture::new();
    fx.write("core/agents/pm.md", front_matter_unit("pm", "  tasks: [\"create-doc\"]\n"));
    let task = fx.write("common/tasks/create-doc.md", "# Create doc\n");

    let mut orch = fx.orchestrator();
    let records = orch.scan_all().unwrap();

    assert_eq!(records.len(), 1);
    let pm = &records[0];
    assert_eq!(
        pm.resolved_path(DependencyKind::Tasks, "create-doc"),
        Some(&task)
    );
    assert!(pm.is_valid, "errors: {:?}", pm.validation_errors);
    assert_eq!(
        orch.session().dependency_map()["create-doc"],
        vec!["pm".to_string()]
    );
    assert!(orch.session().validation_errors().is_empty());
}

fn snapshot(records: &[AgentRecord]) -> Vec<(String, Scope, bool, Vec<String>, String)> {
    records
        .iter()
        .map(|r| {
            (
                r.id.clone(),
                r.scope,
                r.is_valid,
                r.validation_errors.clone(),
                format!("{:?}", r.resolved_dependencies),
            )
        })
        .collect()
}

#[test]
fn scanning_twice_gives_identical_results() {
    let fx = Fixture::new();
    fx.write("core/agents/pm.md", front_matter_unit("pm", "  tasks: [create-doc]\n"));
    fx.write("core/agents/qa.md", front_matter_unit("qa", "  checklists: [absent]\n"));
    fx.write("core/agents/junk.md", "no config");
    fx.write(
        "extensions/game/agents/designer.md",
        fenced_unit("designer", "  templates: [gdd.yaml]\n"),
    );
    fx.write("extensions/game/templates/gdd.yaml", "x: 1\n");
    fx.write("common/tasks/create-doc.md", "x");

    let mut orch = fx.orchestrator();
    let first = orch.scan_all().unwrap();
    let first_errors: Vec<_> = orch
        .session()
        .validation_errors()
        .iter()
        .map(|e| (e.file_path.clone(), e.message.clone()))
        .collect();
    let first_map = orch.session().dependency_map().clone();

    let second = orch.scan_all().unwrap();
    let second_errors: Vec<_> = orch
        .session()
        .validation_errors()
        .iter()
        .map(|e| (e.file_path.clone(), e.message.clone()))
        .collect();

    assert_eq!(snapshot(&first), snapshot(&second));
    assert_eq!(first_errors, second_errors);
    assert_eq!(&first_map, orch.session().dependency_map());
    assert_eq!(first_errors.len(), 2);
}

#[test]
fn front_matter_and_fenced_block_extract_identically() {
    let deps = "  tasks:\n    - create-doc\n  templates: prd.yaml\n  workflows: [greenfield]\n";
    let a = Fixture::new();
    a.write("core/agents/dev.md", front_matter_unit("dev", deps));
    let b = Fixture::new();
    b.write("core/agents/dev.md", fenced_unit("dev", deps));

    let ra = a.orchestrator().scan_all().unwrap().remove(0);
    let rb = b.orchestrator().scan_all().unwrap().remove(0);

    assert_eq!(ra.id, rb.id);
    assert_eq!(ra.name, rb.name);
    assert_eq!(ra.title, rb.title);
    assert_eq!(ra.icon, rb.icon);
    assert_eq!(ra.when_to_use, rb.when_to_use);
    assert_eq!(ra.persona, rb.persona);
    assert_eq!(ra.commands, rb.commands);
    assert_eq!(ra.dependencies, rb.dependencies);
    assert_eq!(ra.parsed_config, rb.parsed_config);
    assert_eq!(ra.relative_path, rb.relative_path);
    assert_eq!(ra.scope, rb.scope);
    assert_eq!(ra.is_valid, rb.is_valid);
    assert_eq!(ra.validation_errors.len(), rb.validation_errors.len());

    assert_eq!(ra.commands[1].name, "run");
    assert_eq!(ra.commands[1].description.as_deref(), Some("Run it"));
}

#[test]
fn extension_private_dependency_beats_shared_and_core() {
    let fx = Fixture::new();
    fx.write(
        "extensions/game/agents/designer.md",
        front_matter_unit(
            "designer",
            "  tasks: [brainstorm]\n  checklists: [story-dod]\n  data: [kb]\n",
        ),
    );
    let private = fx.write("extensions/game/tasks/brainstorm.md", "x");
    fx.write("common/tasks/brainstorm.md", "x");
    fx.write("core/tasks/brainstorm.md", "x");
    let shared = fx.write("common/checklists/story-dod.yaml", "x");
    fx.write("core/checklists/story-dod.md", "x");
    let core = fx.write("core/data/kb.md", "x");

    let records = fx.orchestrator().scan_all().unwrap();
    let designer = &records[0];

    assert_eq!(designer.extension_id.as_deref(), Some("game"));
    assert_eq!(
        designer.resolved_path(DependencyKind::Tasks, "brainstorm"),
        Some(&private)
    );
    assert_eq!(
        designer.resolved_path(DependencyKind::Checklists, "story-dod"),
        Some(&shared)
    );
    assert_eq!(designer.resolved_path(DependencyKind::Data, "kb"), Some(&core));
    assert!(designer.is_valid);
}

#[test]
fn one_broken_unit_does_not_affect_the_others() {
    let fx = Fixture::new();
    fx.write("core/agents/a.md", front_matter_unit("a", ""));
    let bad_yaml = fx.write("core/agents/b.md", "---\nagent: [unclosed\n---\n");
    let binary = fx.write("core/agents/c.md", [0xffu8, 0xfe, 0x00, 0x41]);
    fx.write("core/agents/d.md", front_matter_unit("d", ""));

    let mut orch = fx.orchestrator();
    let records = orch.scan_all().unwrap();

    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "d"]);
    assert!(records.iter().all(|r| r.is_valid));
    assert_eq!(orch.session().failed_paths(), vec![bad_yaml, binary]);
}

#[test]
fn missing_dependency_reports_every_checked_path_once() {
    let fx = Fixture::new();
    let unit = fx.write(
        "core/agents/qa.md",
        front_matter_unit("qa", "  templates: [story-tmpl]\n"),
    );

    let mut orch = fx.orchestrator();
    let records = orch.scan_all().unwrap();
    let qa = &records[0];

    assert!(!qa.is_valid);
    assert!(qa
        .resolved_path(DependencyKind::Templates, "story-tmpl")
        .is_none());

    let errors = orch.session().validation_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].file_path, unit);
    let message = &errors[0].message;
    assert!(message.starts_with("Missing dependency: templates/story-tmpl (checked: "));
    for rel in [
        "core/templates/story-tmpl",
        "core/templates/story-tmpl.md",
        "core/templates/story-tmpl.yaml",
        "core/templates/story-tmpl.yml",
        "common/templates/story-tmpl",
        "common/templates/story-tmpl.md",
        "common/templates/story-tmpl.yaml",
        "common/templates/story-tmpl.yml",
    ] {
        assert!(
            message.contains(&fx.path(rel).display().to_string()),
            "{} not in {}",
            rel,
            message
        );
    }
}

#[test]
fn duplicate_ids_across_scopes_prefer_core_for_lookup() {
    let fx = Fixture::new();
    fx.write("core/agents/pm.md", front_matter_unit("pm", ""));
    fx.write("extensions/game/agents/pm.md", front_matter_unit("pm", ""));

    let mut orch = fx.orchestrator();
    let records = orch.scan_all().unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(orch.find("pm").unwrap().scope, Scope::Core);
    assert_eq!(orch.session().collisions().len(), 1);
    assert_eq!(orch.stats().collisions, 1);
}

#[test]
fn workspace_config_changes_the_layout() {
    let fx = Fixture::new();
    fx.write(
        "roster.toml",
        "[layout]\ncore_dir = \"base\"\nshared_dir = \"shared\"\nextensions_dir = \"packs\"\nextension_prefix = \"pack-\"\n\n[scan]\nworkers = 2\n",
    );
    fx.write("base/agents/pm.md", front_matter_unit("pm", "  utils: [fmt]\n"));
    fx.write("packs/pack-a/agents/a.md", front_matter_unit("a", ""));
    fx.write("packs/other/agents/o.md", front_matter_unit("o", ""));
    let util = fx.write("shared/utils/fmt.yml", "x");

    let config: RosterConfig = ConfigLoader::load(fx.root()).unwrap();
    assert_eq!(config.scan.workers, 2);

    let mut orch = DiscoveryOrchestrator::from_config(fx.root(), &config);
    let records = orch.scan_all().unwrap();

    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["pm", "a"]);
    assert_eq!(
        records[0].resolved_path(DependencyKind::Utils, "fmt"),
        Some(&util)
    );
}

#[test]
fn missing_scope_directories_are_not_errors() {
    let fx = Fixture::new();
    let mut orch = fx.orchestrator();
    assert!(orch.scan_all().unwrap().is_empty());
    assert!(orch.session().validation_errors().is_empty());
}
