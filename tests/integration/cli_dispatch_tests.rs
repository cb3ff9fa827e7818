//! Integration tests for CLI dispatch
//!
//! These tests verify that main.rs correctly dispatches commands
//! and returns JSON output. Every test points the binary at a config in a
//! temp directory so sessions and logs stay isolated.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a config under `dir` and return its path
fn write_config(dir: &Path, extra: &str) -> PathBuf {
    let path = dir.join("config.json");
    let config = format!(
        r#"{{
            "sessionDir": "{}",
            "logDir": "{}"{}
        }}"#,
        dir.join("sessions").display(),
        dir.join("logs").display(),
        extra
    );
    std::fs::write(&path, config).unwrap();
    path
}

fn bot(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hotel-bot").unwrap();
    cmd.arg("--config")
        .arg(config)
        .env_remove("IS_SPELL_CORRECTION_ENABLED")
        .env_remove("RUST_LOG");
    cmd
}

fn run_json(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("Failed to execute command");
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("stdout is not JSON ({}): {}", e, stdout))
}

fn texts(outcome: &Value) -> Vec<String> {
    outcome["replies"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["text"].as_str().map(String::from))
        .collect()
}

// ============================================================================
// Help Tests
// ============================================================================

#[test]
fn test_cli_help_displays() {
    Command::cargo_bin("hotel-bot")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("slot-filling dialogs"));
}

#[test]
fn test_cli_version_displays() {
    Command::cargo_bin("hotel-bot")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hotel-bot"));
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[test]
fn test_unknown_command_fails() {
    Command::cargo_bin("hotel-bot")
        .unwrap()
        .arg("unknown-command")
        .assert()
        .failure();
}

#[test]
fn test_malformed_config_fails_with_json_error() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, "{ not json").unwrap();

    bot(&config)
        .arg("dialogs")
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"success\": false"))
        .stdout(predicate::str::contains("Configuration error"));
}

#[test]
fn test_turn_with_bad_json_fails() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");

    bot(&config)
        .arg("turn")
        .write_stdin("hello")
        .assert()
        .failure()
        .stdout(predicate::str::contains("JSON error"));
}

// ============================================================================
// Conversation Tests
// ============================================================================

#[test]
fn test_dialogs_lists_registry() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");

    let json = run_json(bot(&config).arg("dialogs"));
    assert_eq!(json["success"], true);
    assert_eq!(json["count"], 5);
    assert_eq!(json["confidenceThreshold"], 0.5);
}

#[test]
fn test_say_greeting() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");

    let json = run_json(bot(&config).args(["say", "hello"]));
    assert_eq!(json["success"], true);
    assert_eq!(json["route"], "activated");
    assert_eq!(
        texts(&json),
        vec!["You reached the Greeting intent. You said 'hello'."]
    );
}

#[test]
fn test_say_continues_conversation_across_invocations() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");

    let first = run_json(bot(&config).args(["say", "-c", "trip", "search", "hotels"]));
    assert_eq!(first["state"]["state"], "awaitingInput");
    assert_eq!(texts(&first).last().unwrap(), "Please enter your destination");

    let second = run_json(bot(&config).args(["say", "-c", "trip", "Chicago"]));
    assert_eq!(second["route"], "resumed");
    assert_eq!(second["state"]["state"], "idle");
    assert_eq!(
        texts(&second),
        vec!["Looking for hotels in Chicago...", "I found 5 hotels:"]
    );

    let session = run_json(bot(&config).args(["session", "show", "trip"]));
    assert_eq!(session["session"]["turnCount"], 2);
}

#[test]
fn test_turn_reads_inbound_message_from_stdin() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");

    let mut cmd = bot(&config);
    cmd.arg("turn")
        .write_stdin(r#"{"conversationId": "web-1", "text": "what is the weather"}"#);
    let json = run_json(&mut cmd);

    assert_eq!(json["conversationId"], "web-1");
    assert_eq!(json["route"], "fallback");
    assert_eq!(
        texts(&json),
        vec!["You reached the default message handler. You said 'what is the weather'."]
    );
}

#[test]
fn test_spell_correction_from_config() {
    let dir = TempDir::new().unwrap();
    let config = write_config(
        dir.path(),
        r#", "spellCorrectionEnabled": true, "corrections": {"hotles": "hotels"}"#,
    );

    let json = run_json(bot(&config).args(["say", "search", "hotles", "in", "Seattle"]));
    assert_eq!(json["correctedText"], "search hotels in Seattle");
    assert_eq!(json["intent"]["name"], "SearchHotels");
}

#[test]
fn test_chat_reads_lines_until_quit() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");

    bot(&config)
        .args(["chat", "-c", "terminal"])
        .write_stdin("help\n/quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("bot> Hi! Try asking me things like"))
        .stdout(predicate::str::contains("\"turns\": 1"));
}

// ============================================================================
// Session and Logging Command Tests
// ============================================================================

#[test]
fn test_session_reset() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");

    run_json(bot(&config).args(["say", "-c", "r1", "search", "hotels"]));

    let json = run_json(bot(&config).args(["session", "reset", "r1"]));
    assert_eq!(json["reset"], true);

    let json = run_json(bot(&config).args(["session", "show", "r1"]));
    assert!(json["session"].is_null());
    assert_eq!(json["state"]["state"], "idle");
}

#[test]
fn test_logs_and_clear_logs() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");

    run_json(bot(&config).args(["say", "hello"]));
    run_json(bot(&config).args(["say", "help"]));

    let json = run_json(bot(&config).args(["logs", "10", "turn"]));
    assert_eq!(json["success"], true);
    assert_eq!(json["count"], 2);
    assert_eq!(json["entries"][0]["level"], "info");

    let json = run_json(bot(&config).arg("clear-logs"));
    assert_eq!(json["cleared"], 2);

    let json = run_json(bot(&config).arg("logs"));
    assert_eq!(json["count"], 0);
}
