//! Integration tests for the surfreport CLI

use std::process::{Command, Output};

fn surfreport(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_surfreport"))
        .args(["--config", "/nonexistent/surfreport.toml"])
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help with explicit help flag
#[test]
fn test_cli_help() {
    let output = surfreport(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("surfreport"));
    assert!(stdout.contains("report"));
    assert!(stdout.contains("serve"));
}

#[test]
fn test_tools_command_lists_catalog() {
    let output = surfreport(&["tools"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let tools: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = tools
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        ["get_weather_forecast", "search_surf_spot_info", "get_spot_coordinates"]
    );
}

#[test]
fn test_call_unknown_tool_fails() {
    let output = surfreport(&["call", "not_a_real_tool", "{}"]);
    assert!(!output.status.success());

    let response: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(response["success"], false);
    assert_eq!(response["payload"], "unknown tool: not_a_real_tool");
}

#[test]
fn test_call_spot_info_needs_no_network() {
    let output = surfreport(&["call", "search_surf_spot_info", r#"{"spot_name": "Pipeline"}"#]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Pipeline surf spot"));
}

#[test]
fn test_call_rejects_non_object_arguments() {
    let output = surfreport(&["call", "get_weather_forecast", "[1, 2]"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("JSON object"));
}

#[test]
fn test_report_requires_both_coordinates() {
    let output = surfreport(&["report", "--lat", "-38.3"]);
    assert!(!output.status.success());
}
