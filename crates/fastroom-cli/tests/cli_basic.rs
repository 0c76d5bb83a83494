//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(dir: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_fastroom"))
        .args(args)
        .env("FASTROOM_DATA_DIR", dir.path())
        .env_remove("FASTROOM_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(dir: &TempDir, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(dir, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_status_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let status = run_json(&dir, &["fast", "status", "--json"]);
    assert_eq!(status["state"], "paused");
    assert_eq!(status["target_hours"], 18);
    assert_eq!(status["elapsed_ms"], 0);
    assert!(status["start_ms"].is_null());
    assert_eq!(status["phase"]["name"], "Anabolic");
}

#[test]
fn test_status_text() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(&dir, &["fast", "status"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Ready to Start"));
    assert!(stdout.contains("not medical advice"));
}

#[test]
fn test_start_pause_persist() {
    let dir = tempfile::tempdir().unwrap();
    let started = run_json(&dir, &["fast", "start", "--json"]);
    assert_eq!(started["state"], "running");
    let start_ms = started["start_ms"].as_i64().unwrap();

    let paused = run_json(&dir, &["fast", "pause", "--json"]);
    assert_eq!(paused["state"], "paused");
    assert_eq!(paused["start_ms"].as_i64(), Some(start_ms));

    let resumed = run_json(&dir, &["fast", "start", "--json"]);
    assert_eq!(resumed["state"], "running");
    assert_eq!(resumed["start_ms"].as_i64(), Some(start_ms));
}

#[test]
fn test_paused_elapsed_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let two_hours = 2 * 3_600_000;
    let now = chrono::Utc::now().timestamp_millis();
    let two_hours_ago = (now - two_hours).to_string();

    run_json(&dir, &["fast", "set-start", &two_hours_ago, "--json"]);
    run_json(&dir, &["fast", "start", "--json"]);
    let paused = run_json(&dir, &["fast", "pause", "--json"]);
    let frozen = paused["elapsed_ms"].as_i64().unwrap();
    assert!(frozen >= two_hours);

    let status = run_json(&dir, &["fast", "status", "--json"]);
    assert_eq!(status["state"], "paused");
    assert_eq!(status["elapsed_ms"].as_i64(), Some(frozen));
    assert_eq!(status["phase_index"], 0);
}

#[test]
fn test_set_start_moves_phase() {
    let dir = tempfile::tempdir().unwrap();
    run_json(&dir, &["fast", "start", "--json"]);
    let now = chrono::Utc::now().timestamp_millis();
    let thirteen_hours_ago = (now - 13 * 3_600_000).to_string();

    let status = run_json(&dir, &["fast", "set-start", &thirteen_hours_ago, "--json"]);
    assert_eq!(status["phase_index"], 2);
    assert_eq!(status["next_phase"]["index"], 3);
}

#[test]
fn test_invalid_inputs_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let before = run_json(&dir, &["fast", "set-target", "20", "--json"]);
    assert_eq!(before["target_hours"], 20);

    let after = run_json(&dir, &["fast", "set-target", "-5", "--json"]);
    assert_eq!(after["target_hours"], 20);
    let after = run_json(&dir, &["fast", "set-target", "0", "--json"]);
    assert_eq!(after["target_hours"], 20);

    let after = run_json(&dir, &["fast", "set-start", "tomorrow-ish", "--json"]);
    assert!(after["start_ms"].is_null());
}

#[test]
fn test_reset_sets_fresh_start() {
    let dir = tempfile::tempdir().unwrap();
    run_json(&dir, &["fast", "start", "--json"]);
    let before = chrono::Utc::now().timestamp_millis();
    let reset = run_json(&dir, &["fast", "reset", "--json"]);
    assert_eq!(reset["state"], "paused");
    assert_eq!(reset["elapsed_ms"], 0);
    assert!(reset["start_ms"].as_i64().unwrap() >= before);
    assert!(reset["estimated_end_ms"].is_i64());
}

#[test]
fn test_phases_list_json() {
    let dir = tempfile::tempdir().unwrap();
    let phases = run_json(&dir, &["phases", "list", "--json"]);
    let phases = phases.as_array().unwrap();
    assert_eq!(phases.len(), 6);
    assert_eq!(phases[0]["threshold_ms"], 0);
}

#[test]
fn test_phases_at_boundary() {
    let dir = tempfile::tempdir().unwrap();
    let at = run_json(&dir, &["phases", "at", "12", "--json"]);
    assert_eq!(at["phase_index"], 2);
    let at = run_json(&dir, &["phases", "at", "50", "--json"]);
    assert!(at["next_phase"].is_null());
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(&dir, &["config", "get", "session.default_target_hours"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "18");

    let (_, _, code) = run_cli(&dir, &["config", "set", "session.default_target_hours", "16"]);
    assert_eq!(code, 0);
    let status = run_json(&dir, &["fast", "status", "--json"]);
    assert_eq!(status["target_hours"], 16);
}

#[test]
fn test_config_rejects_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(&dir, &["config", "set", "display.nope", "1"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}
