use roster::tooling::cli::{CliContext, Commands};

use crate::integration::support::{front_matter_unit, Fixture};

fn context(fx: &Fixture) -> CliContext {
    let config = fx.write("config/roster.toml", "[scan]\nworkers = 2\n");
    CliContext::new(fx.root().to_path_buf(), Some(config)).unwrap()
}

#[test]
fn explicit_config_file_is_loaded() {
    let fx = Fixture::new();
    let cli = context(&fx);
    assert_eq!(cli.config().scan.workers, 2);

    let missing = CliContext::new(fx.root().to_path_buf(), Some(fx.path("nope.toml")));
    assert!(missing.is_err());
}

#[test]
fn scan_json_contract_has_required_fields() {
    let fx = Fixture::new();
    fx.write("core/agents/pm.md", front_matter_unit("pm", ""));

    let output = context(&fx)
        .execute(&Commands::Scan {
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

    let agent = &parsed["agents"][0];
    for key in [
        "id",
        "name",
        "title",
        "icon",
        "filePath",
        "scope",
        "persona",
        "commands",
        "dependencies",
        "resolvedDependencies",
        "isValid",
        "validationErrors",
    ] {
        assert!(agent.get(key).is_some(), "missing {}", key);
    }
    assert!(parsed
        .get("validationErrors")
        .and_then(|v| v.as_array())
        .is_some());
    assert!(parsed
        .get("collisions")
        .and_then(|v| v.as_array())
        .is_some());
    assert_eq!(parsed["summary"]["totalAgents"], 1);
}

#[test]
fn retry_json_contract_has_required_fields() {
    let fx = Fixture::new();
    fx.write("core/agents/broken.md", "plain text");

    let output = context(&fx)
        .execute(&Commands::Retry {
            paths: Vec::new(),
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(parsed["retried"].as_array().unwrap().len(), 0);
    assert_eq!(parsed["stillFailed"].as_array().unwrap().len(), 1);
    assert_eq!(
        parsed["errors"][0]["message"],
        "No valid configuration found"
    );
}

#[test]
fn scan_text_lists_agents_and_errors() {
    let fx = Fixture::new();
    fx.write("core/agents/pm.md", front_matter_unit("pm", ""));
    fx.write("core/agents/broken.md", "plain text");

    let output = context(&fx)
        .execute(&Commands::Scan {
            format: "text".to_string(),
        })
        .unwrap();
    assert!(output.contains("pm title"));
    assert!(output.contains("broken.md"));
    assert!(output.contains("No valid configuration found"));
}
