//! Integration tests for the anon-note binary: flag parsing, fail-fast
//! configuration, and the offline paths (status, local rejections).
//!
//! None of these reach the network; the endpoint points at a closed port.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn anon_note_bin() -> &'static str {
    env!("CARGO_BIN_EXE_anon-note")
}

/// Command with a clean environment apart from the given db path.
fn base_command(db: &Path) -> Command {
    let mut cmd = Command::new(anon_note_bin());
    for var in [
        "ANON_NOTE_API_URL",
        "ANON_NOTE_BEARER_TOKEN",
        "ANON_NOTE_MAX_MESSAGES_PER_DAY",
        "ANON_NOTE_CONFIG",
        "ANON_NOTE_LOG_FORMAT",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("ANON_NOTE_DB_PATH", db);
    cmd
}

fn configured_command(db: &Path) -> Command {
    let mut cmd = base_command(db);
    cmd.args([
        "--api-url",
        "http://127.0.0.1:9/notes",
        "--bearer-token",
        "test-token",
        "--max-messages-per-day",
        "3",
    ]);
    cmd
}

fn status_json(db: &Path) -> serde_json::Value {
    let output = configured_command(db)
        .arg("--status")
        .output()
        .expect("failed to run anon-note");
    assert!(output.status.success(), "status failed: {}", stderr(&output));
    serde_json::from_slice(&output.stdout).expect("status output is not JSON")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn log_format_json_with_help_exits_zero() {
    let output = Command::new(anon_note_bin())
        .args(["--log-format", "json", "--help"])
        .output()
        .expect("failed to run anon-note");

    assert!(
        output.status.success(),
        "expected exit 0, got {:?}\nstderr: {}",
        output.status.code(),
        stderr(&output),
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--log-format"), "help text should mention --log-format:\n{stdout}");
}

#[test]
fn help_mentions_env_vars() {
    let output = Command::new(anon_note_bin())
        .arg("--help")
        .output()
        .expect("failed to run anon-note");

    let stdout = String::from_utf8_lossy(&output.stdout);
    for var in ["ANON_NOTE_API_URL", "ANON_NOTE_MAX_MESSAGES_PER_DAY", "ANON_NOTE_LOG_FORMAT"] {
        assert!(stdout.contains(var), "help text should mention {var}:\n{stdout}");
    }
}

#[test]
fn invalid_log_format_rejected_by_parser() {
    let output = Command::new(anon_note_bin())
        .args(["--log-format", "xml", "--help"])
        .output()
        .expect("failed to run anon-note");
    assert!(!output.status.success());
}

#[test]
fn missing_configuration_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let output = base_command(&dir.path().join("quota.db"))
        .arg("--status")
        .output()
        .expect("failed to run anon-note");

    assert_eq!(output.status.code(), Some(2), "stderr: {}", stderr(&output));
}

#[test]
fn zero_daily_cap_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let output = base_command(&dir.path().join("quota.db"))
        .args([
            "--api-url",
            "http://127.0.0.1:9/notes",
            "--bearer-token",
            "t",
            "--max-messages-per-day",
            "0",
            "--status",
        ])
        .output()
        .expect("failed to run anon-note");

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("greater than zero"), "stderr: {}", stderr(&output));
}

#[test]
fn status_reports_fresh_day() {
    let dir = tempfile::tempdir().unwrap();
    let json = status_json(&dir.path().join("quota.db"));

    assert_eq!(json["sent_today"], 0);
    assert_eq!(json["daily_limit"], 3);
    assert_eq!(json["remaining"], 3);
    assert_eq!(json["limit_reached"], false);
}

#[test]
fn status_reads_yaml_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("anon-note.yaml");
    std::fs::write(
        &config_path,
        "api_url: http://127.0.0.1:9/notes\nbearer_token: t\nmax_messages_per_day: 5\n",
    )
    .unwrap();

    let output = base_command(&dir.path().join("quota.db"))
        .args(["--config", config_path.to_str().unwrap(), "--status"])
        .output()
        .expect("failed to run anon-note");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["daily_limit"], 5);
}

#[test]
fn short_message_rejected_without_touching_quota() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("quota.db");

    let output = configured_command(&db)
        .arg("short text")
        .output()
        .expect("failed to run anon-note");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Send a message of at least 1 sentence"), "stdout: {stdout}");
    assert_eq!(status_json(&db)["sent_today"], 0);
}

#[test]
fn unreachable_endpoint_reports_failure_without_counting() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("quota.db");

    let output = configured_command(&db)
        .arg("This is a perfectly fine anonymous note.")
        .output()
        .expect("failed to run anon-note");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Something went wrong! Please try again."), "stdout: {stdout}");
    assert_eq!(status_json(&db)["sent_today"], 0);
}

#[test]
fn interactive_empty_line_shows_retry_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = configured_command(&dir.path().join("quota.db"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run anon-note");

    child
        .stdin
        .take()
        .expect("stdin piped")
        .write_all(b"   \n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert_eq!(output.status.code(), Some(1), "EOF without delivery exits 1");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Please enter a message before sending."), "stdout: {stdout}");
    assert!(stdout.contains("do you want to try one more time?"), "stdout: {stdout}");
}
