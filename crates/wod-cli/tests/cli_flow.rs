//! Binary-level tests for runs that never reach the network.
//!
//! Each test gets its own HOME so the user's real config is never read.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn wodbot_binary() -> String {
    env!("CARGO_BIN_EXE_wodbot").to_string()
}

fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("wodbot.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

fn wodbot(home: &Path, args: &[&str]) -> Output {
    Command::new(wodbot_binary())
        .env("HOME", home)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run wodbot")
}

const CONFIG: &str = r#"
email = "athlete@example.com"
password = "hunter2"
box_name = "examplebox"
box_id = 77
hours_in_advance = 49

[[goals]]
day = "wed"
time = "10:00"
name = "CrossFit"
"#;

/// Window command prints every goal without credentials or network.
#[test]
fn test_window_reports_open_goal() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), CONFIG);

    let output = wodbot(
        temp.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "window",
            "--now",
            "2026-10-19 09:00",
        ],
    );

    assert!(
        output.status.success(),
        "window should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Now: Mon 2026-10-19 09:00:00"));
    assert!(stdout.contains("- Wed 10:00 CrossFit (49h): target Wed 2026-10-21 -> open"));
}

/// One microsecond before the window opens the run is a quiet no-op.
#[test]
fn test_book_before_window_is_a_noop() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), CONFIG);

    let output = wodbot(
        temp.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "book",
            "--now",
            "2026-10-19 08:59:59.999999",
        ],
    );

    assert!(
        output.status.success(),
        "early run should exit cleanly: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        "Booking for CrossFit at 10:00 not open yet (target 2026-10-21 09:59)"
    );
}

/// A day without goals is reported and exits cleanly.
#[test]
fn test_book_without_training_day() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), CONFIG);

    let output = wodbot(
        temp.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "book",
            "--now",
            "2026-10-20 09:00",
        ],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "No training day for Thursday 2026-10-22");
}

/// Environment variables override the config file.
#[test]
fn test_env_overrides_advance_notice() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), CONFIG);

    let output = Command::new(wodbot_binary())
        .env("HOME", temp.path())
        .env_remove("XDG_CONFIG_HOME")
        .env("WODBOT_HOURS_IN_ADVANCE", "25")
        .args([
            "--config",
            config.to_str().unwrap(),
            "window",
            "--now",
            "2026-10-20 09:00",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("- Wed 10:00 CrossFit (25h): target Wed 2026-10-21 -> open"),
        "unexpected output: {stdout}"
    );
}

/// Missing goals fail with a pointer to the config file.
#[test]
fn test_book_without_goals_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "email = \"athlete@example.com\"\n");

    let output = wodbot(
        temp.path(),
        &["--config", config.to_str().unwrap(), "book"],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("no booking goals configured"),
        "unexpected stderr: {stderr}"
    );
}

/// Invalid goal times are rejected before anything else happens.
#[test]
fn test_invalid_goal_time_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(
        temp.path(),
        r#"
[[goals]]
day = "wed"
time = "25:00"
name = "CrossFit"
"#,
    );

    let output = wodbot(
        temp.path(),
        &["--config", config.to_str().unwrap(), "window"],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid booking goal #1"));
    assert!(stderr.contains("invalid class time: 25:00"));
}

/// Numeric-looking secrets from the environment are kept as typed.
#[test]
fn test_numeric_env_secrets_load_verbatim() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), CONFIG);

    let output = Command::new(wodbot_binary())
        .env("HOME", temp.path())
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("RUST_LOG")
        .env("WODBOT_PASSWORD", "123456")
        .env("WODBOT_BOX_NAME", "0042")
        .env("WODBOT_TELEGRAM__BOT_TOKEN", "123:abc")
        .env("WODBOT_TELEGRAM__CHAT_ID", "-1001234")
        .args([
            "--verbose",
            "--config",
            config.to_str().unwrap(),
            "window",
            "--now",
            "2026-10-19 09:00",
        ])
        .output()
        .unwrap();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "window should succeed: {stderr}");
    assert!(stderr.contains(r#"box_name: Some("0042")"#), "stderr: {stderr}");
    assert!(stderr.contains(r#"chat_id: "-1001234""#), "stderr: {stderr}");
    assert!(stderr.contains(r#"password: Some("[REDACTED]")"#), "stderr: {stderr}");
}

/// An out-of-range advance notice is a config error, not a crash.
#[test]
fn test_oversized_advance_notice_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), CONFIG);

    let output = Command::new(wodbot_binary())
        .env("HOME", temp.path())
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("RUST_LOG")
        .env("WODBOT_HOURS_IN_ADVANCE", "4000000000")
        .args(["--config", config.to_str().unwrap(), "window"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("panicked"), "stderr: {stderr}");
    assert!(stderr.contains("invalid booking goal #1"), "stderr: {stderr}");
    assert!(stderr.contains("advance notice of 4000000000h is out of range"));
}
