//! CLI tests for the et-core binary.
//!
//! Each test runs with an empty XDG config home and no ET_CONFIG so the
//! built-in defaults apply unless the test passes `--config`.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::{tempdir, TempDir};

// ============================================================================
// Helpers
// ============================================================================

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/scenario.json")
}

/// Command with an isolated config environment. Keep the returned dir alive.
fn et_core() -> (Command, TempDir) {
    let home = tempdir().expect("tempdir");
    let mut cmd = cargo_bin_cmd!("et-core");
    cmd.timeout(Duration::from_secs(60))
        .env_remove("ET_CONFIG")
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", home.path());
    (cmd, home)
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("parse JSON")
}

// ============================================================================
// Commands
// ============================================================================

#[test]
fn test_info_json_envelope() {
    let (mut cmd, _home) = et_core();
    let json = stdout_json(cmd.arg("info").arg(fixture()));

    assert_eq!(json["command"], "info");
    assert!(json.get("schema_version").is_some(), "should have schema_version");
    assert!(json.get("generated_at").is_some(), "should have generated_at");
    let dataset = &json["dataset"];
    assert_eq!(dataset["dimension_ids"], serde_json::json!(["time", "geo"]));
    assert_eq!(dataset["data_shape"], serde_json::json!([3, 2]));
    assert_eq!(dataset["row_count"], 4);
    assert_eq!(dataset["observation_count"], 4);
    assert_eq!(dataset["language"], "en");
    assert_eq!(dataset["updated"], "2024-03-01T23:00:00+01:00");
    assert!(json.get("request").is_none(), "no request file in use");
}

#[test]
fn test_info_reports_missing_obs_count_as_null() {
    let dir = tempdir().expect("tempdir");
    let mut doc: Value =
        serde_json::from_str(&fs::read_to_string(fixture()).expect("read fixture")).unwrap();
    doc["extension"]["annotation"] = serde_json::json!([]);
    let path = dir.path().join("no_count.json");
    fs::write(&path, doc.to_string()).expect("write doc");

    let (mut cmd, _home) = et_core();
    let json = stdout_json(cmd.arg("info").arg(&path));
    assert!(json["dataset"]["observation_count"].is_null());
    assert!(json["dataset"]["latest_period"].is_null());
}

#[test]
fn test_table_tsv_output() {
    let (mut cmd, _home) = et_core();
    cmd.args(["--format", "tsv", "table"])
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "time\tgeo\tstatus\tobservation\n2020\tBE\t-\t10\n",
        ))
        .stdout(predicate::str::contains("2022\tDE\tbe\t15\n"));
}

#[test]
fn test_table_indexed_json_rows() {
    let (mut cmd, _home) = et_core();
    let json = stdout_json(cmd.args(["table", "--indexed"]).arg(fixture()));
    assert_eq!(json["indexed"], true);
    assert_eq!(json["row_count"], 4);
    assert_eq!(
        json["rows"][2],
        serde_json::json!({"time": 1, "geo": 1, "status": "p", "observation": 13.0})
    );
}

#[test]
fn test_table_reads_stdin() {
    let (mut cmd, _home) = et_core();
    let document = fs::read_to_string(fixture()).expect("read fixture");
    cmd.args(["--format", "tsv", "table", "-"])
        .write_stdin(document)
        .assert()
        .success()
        .stdout(predicate::str::contains("2021\tDE\tp\t13\n"));
}

#[test]
fn test_pivot_tsv_fills_gaps() {
    let (mut cmd, _home) = et_core();
    cmd.args(["--format", "tsv", "pivot"])
        .arg(fixture())
        .assert()
        .success()
        .stdout("geo\t2020\t2021\t2022\nBE\t10\t12\t-\nDE\t-\t13\t15\n");
}

#[test]
fn test_pivot_status_json() {
    let (mut cmd, _home) = et_core();
    let json = stdout_json(cmd.args(["pivot", "--status"]).arg(fixture()));
    assert_eq!(json["pivot"]["field"], "status");
    assert_eq!(json["pivot"]["cells"][1][2], "be");
}

#[test]
fn test_pivot_rejects_axis_assignment() {
    let (mut cmd, _home) = et_core();
    let output = cmd
        .args(["pivot", "--fix", "geo=BE"])
        .arg(fixture())
        .assert()
        .code(13)
        .get_output()
        .stderr
        .clone();

    let json: Value = serde_json::from_slice(&output).expect("stderr is one JSON object");
    assert_eq!(json["error"]["kind"], "validation");
    assert_eq!(json["error"]["code"], 30);
    assert!(json.get("schema_version").is_some());
}

#[test]
fn test_tsv_error_is_plain_line() {
    let (mut cmd, _home) = et_core();
    cmd.args(["--format", "tsv", "pivot", "--fix", "unit=NR"])
        .arg(fixture())
        .assert()
        .code(13)
        .stderr(predicate::str::starts_with("Error: validation failed"))
        .stderr(predicate::str::contains("\x1b[").not());
}

#[test]
fn test_latest_default_and_explicit_fill() {
    let (mut cmd, _home) = et_core();
    let json = stdout_json(cmd.arg("latest").arg(fixture()));
    // Default level 0.8: 2022 holds 1 of 2 and fails, 2021 is full.
    assert_eq!(json["period"], "2021");
    assert_eq!(json["fill_level"], 0.8);

    let (mut cmd, _home) = et_core();
    cmd.args(["--format", "tsv", "latest", "--fill-level", "0.5"])
        .arg(fixture())
        .assert()
        .success()
        .stdout("2022\n");
}

#[test]
fn test_latest_without_match_exits_one() {
    let (mut cmd, _home) = et_core();
    let output = cmd
        .args(["latest", "--fix", "geo=FR"])
        .arg(fixture())
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("parse JSON");
    assert!(json["period"].is_null());
}

#[test]
fn test_schema_describes_summary() {
    let (mut cmd, _home) = et_core();
    let json = stdout_json(cmd.arg("schema"));
    assert!(json["properties"]["dimension_ids"].is_object());
    assert!(json["properties"]["row_count"].is_object());
    assert_eq!(json["properties"]["updated"]["format"], "date-time");
}

// ============================================================================
// Config and error paths
// ============================================================================

#[test]
fn test_config_file_sets_none_value() {
    let dir = tempdir().expect("tempdir");
    let config = dir.path().join("engine.json");
    fs::write(&config, r#"{"none_value": ":"}"#).expect("write config");

    let (mut cmd, _home) = et_core();
    cmd.args(["--format", "tsv", "--config"])
        .arg(&config)
        .arg("pivot")
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("BE\t10\t12\t:\n"));
}

#[test]
fn test_env_config_is_used() {
    let dir = tempdir().expect("tempdir");
    let config = dir.path().join("engine.json");
    fs::write(&config, r#"{"default_fill_level": 0.5}"#).expect("write config");

    let (mut cmd, _home) = et_core();
    cmd.env("ET_CONFIG", &config)
        .args(["--format", "tsv", "latest"])
        .arg(fixture())
        .assert()
        .success()
        .stdout("2022\n");
}

#[test]
fn test_request_file_is_reported_by_info() {
    let dir = tempdir().expect("tempdir");
    let request = dir.path().join("request.json");
    fs::write(
        &request,
        r#"{
            "dataset": "lfsi_emp_a",
            "language": "DE",
            "none_value": ":",
            "dimension_filter": {"sex": ["M", "F"]},
            "time_period_filter": [[">=", "2021"]]
        }"#,
    )
    .expect("write request");

    let (mut cmd, _home) = et_core();
    let json = stdout_json(cmd.arg("--config").arg(&request).arg("info").arg(fixture()));
    let report = &json["request"];
    assert_eq!(report["dataset"], "lfsi_emp_a");
    assert_eq!(report["language"], "de");
    assert_eq!(report["dimension_filter"]["sex"], serde_json::json!(["M", "F"]));
    assert_eq!(
        report["time_period_filter"],
        serde_json::json!([{"operator": "ge", "period": "2021"}])
    );

    let (mut cmd, _home) = et_core();
    cmd.args(["--format", "tsv", "--config"])
        .arg(&request)
        .arg("info")
        .arg(fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("request_dataset\tlfsi_emp_a\n"))
        .stdout(predicate::str::contains("dimension_filter\tsex=M+F\n"))
        .stdout(predicate::str::contains("time_period_filter\tge 2021\n"));
}

#[test]
fn test_invalid_config_exits_ten() {
    let dir = tempdir().expect("tempdir");
    let config = dir.path().join("engine.json");
    fs::write(&config, "{ not json").expect("write config");

    let (mut cmd, _home) = et_core();
    cmd.args(["--config"])
        .arg(&config)
        .arg("info")
        .arg(fixture())
        .assert()
        .code(10);
}

#[test]
fn test_missing_field_exits_eleven() {
    let dir = tempdir().expect("tempdir");
    let doc = dir.path().join("broken.json");
    fs::write(&doc, r#"{"id": ["geo"], "size": [1], "dimension": {}}"#).expect("write doc");

    let (mut cmd, _home) = et_core();
    cmd.args(["--format", "tsv", "info"])
        .arg(&doc)
        .assert()
        .code(11)
        .stderr(predicate::str::contains("updated"));
}

#[test]
fn test_missing_input_file_exits_io() {
    let (mut cmd, _home) = et_core();
    cmd.args(["info", "/nonexistent/dataset.json"])
        .assert()
        .code(15);
}
