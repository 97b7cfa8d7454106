use roster::discovery::{ReportAgents, ReportOptions};

use crate::integration::support::{front_matter_unit, Fixture};

#[test]
fn report_file_has_all_sections() {
    let fx = Fixture::new();
    let deps = "  tasks: [create-doc]\n";
    fx.write("core/agents/pm.md", front_matter_unit("pm", deps));
    fx.write(
        "extensions/game/agents/designer.md",
        front_matter_unit("designer", deps),
    );
    fx.write("common/tasks/create-doc.md", "x");
    fx.write("core/agents/broken.md", "no config");

    let mut orch = fx.orchestrator();
    orch.scan_all().unwrap();

    let target = fx.path("diagnostics/latest/report.json");
    let report = orch
        .diagnostic_report(&ReportOptions {
            include_full_records: false,
            output_path: Some(target.clone()),
        })
        .unwrap();
    assert!(matches!(report.discovered_agents, ReportAgents::Ids(_)));

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
    assert_eq!(
        value["discoveredAgents"],
        serde_json::json!(["pm", "designer"])
    );
    assert_eq!(value["summary"]["totalAgents"], 2);
    assert_eq!(value["summary"]["validAgents"], 2);
    assert_eq!(value["summary"]["byScope"]["extension"], 1);
    assert_eq!(value["summary"]["extensions"], serde_json::json!(["game"]));
    assert_eq!(value["validationErrors"].as_array().unwrap().len(), 1);
    assert_eq!(
        value["validationErrors"][0]["message"],
        "No valid configuration found"
    );
    assert_eq!(
        value["dependencyMap"]["create-doc"],
        serde_json::json!(["pm", "designer"])
    );
    assert_eq!(value["systemInfo"]["version"], env!("CARGO_PKG_VERSION"));
    assert!(value["timestamp"].is_string());
}

#[test]
fn full_report_embeds_records() {
    let fx = Fixture::new();
    fx.write("core/agents/pm.md", front_matter_unit("pm", ""));

    let mut orch = fx.orchestrator();
    orch.scan_all().unwrap();
    let report = orch
        .diagnostic_report(&ReportOptions {
            include_full_records: true,
            output_path: None,
        })
        .unwrap();

    let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    let agent = &value["discoveredAgents"][0];
    assert_eq!(agent["id"], "pm");
    assert_eq!(agent["scope"], "core");
    assert_eq!(agent["persona"]["role"], "Tester");
    assert!(agent.get("rawContent").is_some());
    assert!(agent["dependencies"].get("declared").is_none());
}
