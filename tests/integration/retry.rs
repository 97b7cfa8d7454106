use std::path::PathBuf;

use crate::integration::support::{front_matter_unit, Fixture};

#[test]
fn corrected_file_moves_to_retried_and_stays_in_later_scans() {
    let fx = Fixture::new();
    fx.write("core/agents/pm.md", front_matter_unit("pm", ""));
    let dev = fx.write("extensions/game/agents/dev.md", "---\nagent: {broken\n---\n");

    let mut orch = fx.orchestrator();
    orch.scan_all().unwrap();
    assert!(orch.find("dev").is_none());
    assert_eq!(orch.session().failed_paths(), vec![dev.clone()]);

    std::fs::write(&dev, front_matter_unit("dev", "")).unwrap();
    let report = orch.retry_failed(Some(&[dev.clone()]));

    assert_eq!(report.retried, vec![dev.clone()]);
    assert!(report.still_failed.is_empty());
    assert!(report.errors.is_empty());
    let record = orch.find("dev").unwrap();
    assert_eq!(record.extension_id.as_deref(), Some("game"));
    assert!(orch.session().validation_errors().is_empty());

    let ids: Vec<_> = orch
        .scan_all()
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec!["pm".to_string(), "dev".to_string()]);
}

#[test]
fn default_retry_covers_every_failed_path_once() {
    let fx = Fixture::new();
    let qa = fx.write(
        "core/agents/qa.md",
        front_matter_unit("qa", "  tasks: [a, b]\n"),
    );
    let junk = fx.write("core/agents/zz.md", "nothing here");

    let mut orch = fx.orchestrator();
    orch.scan_all().unwrap();
    assert_eq!(orch.session().validation_errors().len(), 3);

    fx.write("common/tasks/a.md", "x");
    let report = orch.retry_failed(None);

    assert!(report.retried.is_empty());
    assert_eq!(report.still_failed, vec![junk.clone(), qa.clone()]);
    let messages: Vec<_> = report
        .errors
        .iter()
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], "No valid configuration found");
    assert!(messages[1].starts_with("Missing dependency: tasks/b"));

    let qa_record = orch.find("qa").unwrap();
    assert!(qa_record
        .resolved_path(roster::DependencyKind::Tasks, "a")
        .is_some());
    assert_eq!(orch.session().dependency_map()["a"], vec!["qa".to_string()]);
}

#[test]
fn retrying_one_path_keeps_errors_of_others() {
    let fx = Fixture::new();
    let first = fx.write("core/agents/one.md", "plain");
    let second = fx.write("core/agents/two.md", "plain");

    let mut orch = fx.orchestrator();
    orch.scan_all().unwrap();
    let report = orch.retry_failed(Some(&[PathBuf::from("core/agents/one.md")]));

    assert_eq!(report.still_failed, vec![first.clone()]);
    assert_eq!(orch.session().failed_paths(), vec![second, first]);
    assert_eq!(orch.session().validation_errors().len(), 2);
}

#[test]
fn retried_file_with_new_id_replaces_its_old_record() {
    let fx = Fixture::new();
    let pm = fx.write(
        "core/agents/pm.md",
        "---\nagent:\n  id: pm\n  name: PM\n  title: PM\n---\n",
    );
    fx.write("common/tasks/create-doc.md", "x");

    let mut orch = fx.orchestrator();
    orch.scan_all().unwrap();
    assert!(!orch.find("pm").unwrap().is_valid);

    fx.write(
        "core/agents/pm.md",
        front_matter_unit("pm2", "  tasks: [create-doc]\n"),
    );
    let report = orch.retry_failed(None);

    assert_eq!(report.retried, vec![pm]);
    let ids: Vec<_> = orch
        .session()
        .records()
        .iter()
        .map(|r| (r.id.as_str(), r.is_valid))
        .collect();
    assert_eq!(ids, vec![("pm2", true)]);
    assert_eq!(orch.stats().total_agents, 1);
    assert_eq!(
        orch.session().dependency_map()["create-doc"],
        vec!["pm2".to_string()]
    );
}

#[test]
fn retried_file_without_configuration_loses_its_record() {
    let fx = Fixture::new();
    let pm = fx.write(
        "core/agents/pm.md",
        front_matter_unit("pm", "  tasks: [create-doc]\n"),
    );
    fx.write("common/tasks/create-doc.md", "x");

    let mut orch = fx.orchestrator();
    orch.scan_all().unwrap();
    assert!(orch.find("pm").unwrap().is_valid);

    fx.write("core/agents/pm.md", "just prose now");
    let report = orch.retry_failed(Some(&[pm.clone()]));

    assert_eq!(report.still_failed, vec![pm.clone()]);
    assert_eq!(report.errors[0].message, "No valid configuration found");
    assert!(orch.find("pm").is_none());
    assert_eq!(orch.stats().total_agents, 0);
    assert!(orch.session().dependency_map().is_empty());
    assert_eq!(orch.session().failed_paths(), vec![pm]);
}
