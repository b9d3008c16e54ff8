//! Basic CLI smoke tests.
//!
//! Each test runs the binary against its own temporary data directory.

use std::process::Command;

use tempfile::TempDir;

fn run_cli(dir: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_focustimer"))
        .env("FOCUSTIMER_DATA_DIR", dir.path())
        .args(args)
        .output()
        .expect("failed to execute CLI");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);
    (stdout, stderr, code)
}

fn run_ok(dir: &TempDir, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(dir, args);
    assert_eq!(code, 0, "command {args:?} failed: {stderr}");
    stdout
}

#[test]
fn status_starts_idle() {
    let dir = TempDir::new().unwrap();
    let stdout = run_ok(&dir, &["timer", "status"]);
    assert!(stdout.contains("\"idle\""));
}

#[test]
fn start_then_status_shows_focus() {
    let dir = TempDir::new().unwrap();
    run_ok(&dir, &["timer", "start", "--focus", "25", "--break", "5"]);
    let stdout = run_ok(&dir, &["timer", "status"]);
    assert!(stdout.contains("\"focus\""));
    assert!(stdout.contains("\"total_seconds\": 1500"));
}

#[test]
fn stop_records_interrupted_session() {
    let dir = TempDir::new().unwrap();
    run_ok(&dir, &["timer", "start", "--focus", "25", "--break", "5"]);
    run_ok(&dir, &["timer", "stop"]);

    let stdout = run_ok(&dir, &["sessions", "list"]);
    let records: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["status"], "interrupted");
}

#[test]
fn pause_survives_process_restarts() {
    let dir = TempDir::new().unwrap();
    run_ok(&dir, &["timer", "start", "--focus", "25", "--break", "5"]);
    run_ok(&dir, &["timer", "pause"]);
    let stdout = run_ok(&dir, &["timer", "status"]);
    assert!(stdout.contains("\"paused\""));
    run_ok(&dir, &["timer", "resume"]);
    let stdout = run_ok(&dir, &["timer", "status"]);
    assert!(stdout.contains("\"focus\""));
    run_ok(&dir, &["timer", "stop"]);
}

#[test]
fn default_categories_listed() {
    let dir = TempDir::new().unwrap();
    let stdout = run_ok(&dir, &["category", "list"]);
    assert!(stdout.contains("Study"));
    assert!(stdout.contains("Coding"));
}

#[test]
fn start_with_category_defaults() {
    let dir = TempDir::new().unwrap();
    // Work defaults to 50/10.
    run_ok(&dir, &["timer", "start", "--category", "Work"]);
    let stdout = run_ok(&dir, &["timer", "status"]);
    assert!(stdout.contains("\"total_seconds\": 3000"));
}

#[test]
fn unknown_category_fails() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&dir, &["timer", "start", "--category", "Nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown category"));
}

#[test]
fn start_with_preset() {
    let dir = TempDir::new().unwrap();
    run_ok(&dir, &["timer", "start", "--preset", "Deep Work"]);
    let stdout = run_ok(&dir, &["timer", "status"]);
    assert!(stdout.contains("\"total_seconds\": 5400"));
}

#[test]
fn config_set_round_trips() {
    let dir = TempDir::new().unwrap();
    let stdout = run_ok(&dir, &["config", "set", "log_breaks", "on"]);
    assert!(stdout.contains("\"log_breaks\": true"));
    let stdout = run_ok(&dir, &["config", "show"]);
    assert!(stdout.contains("\"log_breaks\": true"));
    assert!(stdout.contains("Classic Pomodoro"));
}

#[test]
fn config_set_rejects_unknown_key() {
    let dir = TempDir::new().unwrap();
    let (_, _, code) = run_cli(&dir, &["config", "set", "volume", "on"]);
    assert_ne!(code, 0);
}

#[test]
fn stats_and_export() {
    let dir = TempDir::new().unwrap();
    run_ok(&dir, &["timer", "start", "--focus", "25", "--break", "5"]);
    run_ok(&dir, &["timer", "stop"]);

    let stdout = run_ok(&dir, &["stats", "today"]);
    assert!(stdout.contains("total_seconds"));
    let stdout = run_ok(&dir, &["stats", "all"]);
    assert!(stdout.contains("session_count"));

    let out = dir.path().join("export.csv");
    let out_str = out.to_string_lossy().to_string();
    run_ok(&dir, &["export", "--out", &out_str]);
    let csv = std::fs::read_to_string(&out).unwrap();
    assert!(csv.starts_with("ID,Category,Start Time"));
    assert_eq!(csv.lines().count(), 2);
}

#[test]
fn completions_generate() {
    let dir = TempDir::new().unwrap();
    let stdout = run_ok(&dir, &["completions", "bash"]);
    assert!(stdout.contains("focustimer"));
}
