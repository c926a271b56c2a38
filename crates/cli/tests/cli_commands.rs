use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const CONFIG: &str = r#"{
	"application": "browser",
	"port": 9123,
	"url_patterns": [
		{ "pattern": "^https://mail\\..*", "args": ["--open", "$url"], "url_params": { "x": "2", "y": "9" } },
		{ "pattern": "^https://docs\\." }
	]
}"#;

fn write_config(json: &str) -> (TempDir, PathBuf) {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("config.json");
	std::fs::write(&path, json).unwrap();
	(dir, path)
}

fn openwith(config: &Path, args: &[&str]) -> Output {
	Command::new(env!("CARGO_BIN_EXE_openwith"))
		.arg("--config")
		.arg(config)
		.args(args)
		.env_remove("SERVICE_MODE")
		.env_remove("RUST_LOG")
		.output()
		.unwrap()
}

fn stdout_json(output: &Output) -> Value {
	assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
	serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn resolve_prints_rewritten_command() {
	let (_dir, path) = write_config(CONFIG);

	let value = stdout_json(&openwith(&path, &["resolve", "https://mail.example.com/?x=1&z=3"]));

	assert_eq!(value["rule"], 0);
	assert_eq!(value["rewritten_url"], "https://mail.example.com/?x=2&z=3");
	assert_eq!(value["executable"], "browser");
	assert_eq!(value["args"][1], "https://mail.example.com/?x=2&z=3");
	assert_eq!(value["command_line"], "\"browser\" --open https://mail.example.com/?x=2&z=3");
}

#[test]
fn resolve_with_empty_template_falls_back_to_url() {
	let (_dir, path) = write_config(CONFIG);

	let value = stdout_json(&openwith(&path, &["resolve", "https://docs.example.com/a"]));

	assert_eq!(value["rule"], 1);
	assert_eq!(value["args"], serde_json::json!(["https://docs.example.com/a"]));
}

#[test]
fn resolve_without_match_has_no_rule() {
	let (_dir, path) = write_config(CONFIG);

	let value = stdout_json(&openwith(&path, &["resolve", "https://other.test/"]));

	assert!(value["rule"].is_null());
	assert_eq!(value["rewritten_url"], "https://other.test/");
}

#[test]
fn check_summarizes_rules() {
	let (_dir, path) = write_config(CONFIG);

	let value = stdout_json(&openwith(&path, &["check"]));

	assert_eq!(value["application"], "browser");
	assert_eq!(value["port"], 9123);
	assert_eq!(value["rules"].as_array().unwrap().len(), 2);
	assert_eq!(value["rules"][0]["url_params"], serde_json::json!(["x", "y"]));
}

#[test]
fn invalid_pattern_fails_check() {
	let (_dir, path) = write_config(r#"{"application": "browser", "url_patterns": [{"pattern": "(open"}]}"#);

	let output = openwith(&path, &["check"]);

	assert!(!output.status.success());
	assert!(output.stdout.is_empty());
	assert!(String::from_utf8_lossy(&output.stderr).contains("url_patterns[0]"));
}

#[test]
fn missing_config_fails() {
	let dir = tempfile::tempdir().unwrap();

	let output = openwith(&dir.path().join("absent.json"), &["resolve", "https://a.test/"]);

	assert!(!output.status.success());
}

#[test]
fn any_service_mode_value_still_parses() {
	let (_dir, path) = write_config(CONFIG);

	for value in ["true", "false", "1", "TRUE", "yes", ""] {
		let output = Command::new(env!("CARGO_BIN_EXE_openwith"))
			.arg("--config")
			.arg(&path)
			.arg("check")
			.env("SERVICE_MODE", value)
			.env_remove("RUST_LOG")
			.output()
			.unwrap();

		assert!(output.status.success(), "SERVICE_MODE={value:?}: {}", String::from_utf8_lossy(&output.stderr));
	}
}
