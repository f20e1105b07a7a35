use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

mod server;

fn run_with_config(config_path: &Path, extra_args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sitegrade"))
        .arg(server::unreachable_url())
        .arg("--config")
        .arg(config_path)
        .args(extra_args)
        .output()
        .expect("Failed to execute command")
}

fn parse_stdout(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be a JSON report")
}

#[test]
fn test_cli_with_json_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.json");

    let json_content = r#"{
        "depth": 3,
        "max_pages": 50,
        "output": "json",
        "timeout": 2
    }"#;
    fs::write(&config_path, json_content).unwrap();

    let output = run_with_config(&config_path, &[]);

    assert!(output.status.success());
    let report = parse_stdout(&output);
    assert_eq!(report["metrics"]["unreachable"], 1);
}

#[test]
fn test_cli_with_toml_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    let toml_content = r#"
depth = 3
max_pages = 50
output = "json"
timeout = 2
"#;
    fs::write(&config_path, toml_content).unwrap();

    let output = run_with_config(&config_path, &[]);

    assert!(output.status.success());
    parse_stdout(&output);
}

#[test]
fn test_cli_with_yml_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.yml");

    let yaml_content = r#"
depth: 3
max_pages: 50
output: json
timeout: 2
"#;
    fs::write(&config_path, yaml_content).unwrap();

    let output = run_with_config(&config_path, &[]);

    assert!(output.status.success());
    parse_stdout(&output);
}

#[test]
fn test_cli_with_invalid_config_format() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.txt");
    fs::write(&config_path, "invalid content").unwrap();

    let output = run_with_config(&config_path, &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unsupported config file format"));
}

#[test]
fn test_cli_with_invalid_json_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    fs::write(&config_path, r#"{ invalid json }"#).unwrap();

    let output = run_with_config(&config_path, &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse JSON config"));
}

#[test]
fn test_cli_with_invalid_toml_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, r#"[[[ invalid toml"#).unwrap();

    let output = run_with_config(&config_path, &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse TOML config"));
}

#[test]
fn test_cli_with_invalid_yaml_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");

    let invalid_yaml = r#"
output: "json
  depth: invalid
"#;
    fs::write(&config_path, invalid_yaml).unwrap();

    let output = run_with_config(&config_path, &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to parse YAML config"));
}

#[test]
fn test_cli_with_nonexistent_config() {
    let output = run_with_config(Path::new("/nonexistent/path/config.json"), &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read config file"));
}

#[test]
fn test_cli_args_override_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.json");

    // The file asks for JSON, the command line asks for text
    let json_content = r#"{
        "output": "json",
        "timeout": 2
    }"#;
    fs::write(&config_path, json_content).unwrap();

    let output = run_with_config(&config_path, &["--output", "text"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Audit Report"));
    assert!(serde_json::from_slice::<serde_json::Value>(&output.stdout).is_err());
}

#[test]
fn test_config_invalid_value_is_rejected() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, "concurrency = 0\n").unwrap();

    let output = run_with_config(&config_path, &[]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("concurrency must be at least 1"));
}

#[test]
fn test_config_with_performance_table() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    let toml_content = r#"
output = "json"
timeout = 2

[performance]
lcp = 5000.0
cls = 0.3
"#;
    fs::write(&config_path, toml_content).unwrap();

    let output = run_with_config(&config_path, &[]);

    assert!(output.status.success());
    let report = parse_stdout(&output);
    let performance = report["audit"]["category_scores"]
        .as_array()
        .unwrap()
        .iter()
        .find(|score| score["category"] == "Performance")
        .expect("performance category present");
    assert!(performance["value"].as_f64().unwrap() < 100.0);
}

#[test]
fn test_save_path_from_config() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    let report_path = dir.path().join("saved.json");

    let json_content = format!(
        r#"{{ "save": {}, "timeout": 2 }}"#,
        serde_json::to_string(&report_path.to_string_lossy()).unwrap()
    );
    fs::write(&config_path, json_content).unwrap();

    let output = run_with_config(&config_path, &[]);

    assert!(output.status.success());
    let saved = fs::read_to_string(&report_path).expect("report saved");
    let report: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(report["metrics"]["total_crawled_pages"], 1);
}
