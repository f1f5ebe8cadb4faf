//! CLI tests for the `calculator` binary.
//!
//! Spawns the binary against the bundled catalog and verifies JSON output
//! and exit codes.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use calculator::exit_codes;
use calculator::test_support::TestCatalog;
use serde_json::{Value, json};

fn demo_catalog() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("catalog")
}

fn calculator(args: &[&str]) -> Command {
    let missing_config = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("no-such-config.toml");
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_calculator"));
    cmd.arg("--config")
        .arg(missing_config)
        .arg("--catalog")
        .arg(demo_catalog())
        .args(args);
    cmd
}

fn run_with_stdin(mut cmd: Command, stdin: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn calculator");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait calculator")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout json")
}

#[test]
fn list_prints_every_definition() {
    let output = calculator(&["list"]).output().expect("calculator list");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let listed = stdout_json(&output);
    let names: Vec<&str> = listed
        .as_array()
        .expect("array")
        .iter()
        .map(|definition| definition["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, vec!["matrix_add", "matrix_sub", "prime_count"]);
}

#[test]
fn check_reports_admitted_count() {
    let output = calculator(&["check"]).output().expect("calculator check");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "3 algorithms admitted"
    );
}

#[test]
fn describe_unknown_algorithm_answers_with_errors() {
    let output = calculator(&["describe", "nonexistent"])
        .output()
        .expect("calculator describe");
    assert_eq!(output.status.code(), Some(exit_codes::ANSWERED_WITH_ERRORS));
    assert_eq!(
        stdout_json(&output),
        json!({"result": null, "errors": "algorithm 'nonexistent' not found"})
    );
}

#[test]
fn execute_reads_parameters_from_stdin() {
    let output = run_with_stdin(
        calculator(&["execute", "matrix_sub"]),
        r#"{"parameters": [
            {"name": "n", "value": [[1, 2, 3], [2, 3, 4]]},
            {"name": "m", "value": [[0, 2, 2], [2, 1, 4]]}
        ]}"#,
    );
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(
        stdout_json(&output),
        json!({
            "result": {"outputs": [
                {"name": "result", "value": [[1.0, 0.0, 1.0], [0.0, 2.0, 0.0]]}
            ]},
            "errors": null
        })
    );
}

#[test]
fn execute_reads_parameters_from_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let params = temp.path().join("params.json");
    fs::write(&params, r#"{"parameters": [{"name": "n", "value": 100}]}"#)
        .expect("write params");
    let output = calculator(&["execute", "prime_count", "--params"])
        .arg(&params)
        .output()
        .expect("calculator execute");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(stdout_json(&output)["result"]["outputs"][0]["value"], json!(25.0));
}

#[test]
fn invalid_parameters_answer_with_errors() {
    let output = run_with_stdin(
        calculator(&["execute", "matrix_sub"]),
        r#"{"parameters": [{"name": "n", "value": [[1]]}, {"name": "m", "value": [[1], [2]]}]}"#,
    );
    assert_eq!(output.status.code(), Some(exit_codes::ANSWERED_WITH_ERRORS));
    let answer = stdout_json(&output);
    assert!(answer["result"].is_null());
    assert!(
        answer["errors"]
            .as_str()
            .expect("errors")
            .contains("length mismatch")
    );
}

#[test]
fn malformed_parameters_are_invalid() {
    let output = run_with_stdin(calculator(&["execute", "matrix_sub"]), "not json");
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("parse parameters"));
}

#[test]
fn empty_catalog_is_invalid() {
    let catalog = TestCatalog::new();
    let output = Command::new(env!("CARGO_BIN_EXE_calculator"))
        .arg("--catalog")
        .arg(catalog.root())
        .arg("--config")
        .arg(catalog.root().join("calculator.toml"))
        .arg("check")
        .output()
        .expect("calculator check");
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("contains no algorithms"));
}

#[test]
fn worker_serves_one_job() {
    let output = run_with_stdin(
        {
            let mut cmd = Command::new(env!("CARGO_BIN_EXE_calculator"));
            cmd.arg("worker");
            cmd
        },
        r#"{"entry": "matrix_add", "arguments": {"n": [[1]], "m": [[2]]}}"#,
    );
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(
        stdout_json(&output),
        json!({"status": "ok", "outputs": {"result": [[3.0]]}})
    );
}

#[test]
fn worker_does_not_build_the_catalog() {
    let catalog = TestCatalog::new();
    let output = run_with_stdin(
        {
            let mut cmd = Command::new(env!("CARGO_BIN_EXE_calculator"));
            cmd.arg("--catalog").arg(catalog.root()).arg("worker");
            cmd
        },
        r#"{"entry": "prime_count", "arguments": {"n": 10}}"#,
    );
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(
        stdout_json(&output),
        json!({"status": "ok", "outputs": {"count": 4.0}})
    );
}

#[test]
fn overflowing_execution_answers_with_errors() {
    let output = run_with_stdin(
        calculator(&["execute", "matrix_add"]),
        r#"{"parameters": [
            {"name": "n", "value": [[1e308, 1]]},
            {"name": "m", "value": [[1e308, 1]]}
        ]}"#,
    );
    assert_eq!(output.status.code(), Some(exit_codes::ANSWERED_WITH_ERRORS));
    let answer = stdout_json(&output);
    assert!(answer.to_string().contains("not finite"), "{answer}");
}
