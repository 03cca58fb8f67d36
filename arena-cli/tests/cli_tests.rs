use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::io::Write;

fn arena() -> Command {
    let mut cmd = Command::cargo_bin("agent-arena").unwrap();
    cmd.env_remove("RUST_LOG")
        .env("AGENT_ARENA__MOCK__LATENCY_MS", "0")
        .env("AGENT_ARENA__SIMULATOR__MAX_RETRIES", "0");
    for framework in ["LANGGRAPH", "AUTOGEN", "CREWAI", "LLAMAINDEX"] {
        cmd.env_remove(format!("AGENT_ARENA__CREDENTIALS__{framework}"));
    }
    cmd
}

#[test]
fn test_catalog_lists_frameworks_and_models() {
    arena()
        .args(["catalog", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("LangGraph"))
        .stdout(predicate::str::contains("llamaindex"))
        .stdout(predicate::str::contains("claude-sonnet-4"));
}

#[test]
fn test_run_without_credentials_uses_mock_path() {
    let output = arena()
        .args([
            "run",
            "--task",
            "Summarize AI agents",
            "--framework",
            "langgraph",
            "--model",
            "gpt-41",
            "--format",
            "json",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    let outcomes = report["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 1);
    let record = &outcomes[0]["record"];
    assert_eq!(record["tokens"], 250);
    assert_eq!(record["cost"], 0.0025);
    assert_eq!(record["quality"], 95);
    assert_eq!(record["source"], "mock");
    assert!(record.get("error").is_none());

    assert_eq!(report["task"], "Summarize AI agents");
    assert_eq!(report["summary"]["status"], "available");
    assert_eq!(report["summary"]["average_tokens"], 250);
    assert_eq!(report["statistics"]["mock"], 1);
}

#[test]
fn test_run_with_unknown_framework_reports_failure_per_combination() {
    let output = arena()
        .args([
            "run", "--task", "t", "--framework", "haystack", "--framework", "crewai", "--model",
            "gpt-4o", "--format", "json",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let outcomes = report["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0]["record"]["error"]
        .as_str()
        .unwrap()
        .contains("haystack"));
    assert!(outcomes[1]["record"].get("error").is_none());
}

#[test]
fn test_run_table_output() {
    arena()
        .args([
            "run", "--no-color", "--task", "t", "--framework", "autogen", "--model", "gpt-4o",
            "--model", "gemini-25-pro",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Highlights"))
        .stdout(predicate::str::contains("Fastest"))
        .stdout(predicate::str::contains("2 combination(s) settled."));
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"simulator": {{"timeout_secs": 0}}}}"#).unwrap();

    arena()
        .args(["catalog", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_config_file_pricing_override_shows_in_catalog() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"pricing": {{"rates": {{"gpt-41": 0.5}}}}}}"#).unwrap();

    let output = arena()
        .args(["catalog", "--format", "json", "--config"])
        .arg(file.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    let catalog: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let gpt41 = catalog["models"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["id"] == "gpt-41")
        .unwrap();
    assert_eq!(gpt41["rate_per_1k"], 0.5);
    assert_eq!(catalog["frameworks"].as_array().unwrap().len(), 4);
}

#[test]
fn test_env_pricing_override_shows_in_catalog() {
    let output = arena()
        .env("AGENT_ARENA__PRICING__RATES__GPT-4O", "0.25")
        .args(["catalog", "--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let catalog: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let gpt4o = catalog["models"]
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["id"] == "gpt-4o")
        .unwrap();
    assert_eq!(gpt4o["rate_per_1k"], 0.25);
}
