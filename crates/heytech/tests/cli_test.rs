//! Integration tests for the `heytech` CLI binary.
//!
//! Argument parsing, help output, completions and error handling run
//! without a device; the last section talks to a tiny in-process fake.
#![allow(clippy::unwrap_used)]

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `heytech` binary with env isolation.
///
/// Clears all `HEYTECH_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn heytech_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("heytech");
    cmd.env("HOME", "/tmp/heytech-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/heytech-cli-test-nonexistent")
        .env_remove("HEYTECH_PROFILE")
        .env_remove("HEYTECH_HOST")
        .env_remove("HEYTECH_PORT")
        .env_remove("HEYTECH_PIN")
        .env_remove("HEYTECH_OUTPUT")
        .env_remove("HEYTECH_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// A controller stand-in on a blocking listener. Answers `sop` and logs
/// every line it receives.
fn fake_device() -> (u16, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let received = Arc::new(Mutex::new(Vec::new()));

    let log = Arc::clone(&received);
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            let mut writer = stream.try_clone().unwrap();
            for line in BufReader::new(stream).lines() {
                let Ok(line) = line else { break };
                let line = line.trim_end().to_owned();
                if line == "sop" {
                    let _ = writer.write_all(b"start_sop10,0,100,ende_sop\r\n");
                }
                log.lock().unwrap().push(line);
            }
        }
    });

    (port, received)
}

fn wait_for_line(received: &Mutex<Vec<String>>, needle: &str) -> Vec<String> {
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        let lines = received.lock().unwrap().clone();
        if lines.iter().any(|l| l == needle) || Instant::now() > deadline {
            return lines;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = heytech_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(
        text.contains("Usage"),
        "Expected 'Usage' in output:\n{text}"
    );
}

#[test]
fn test_help_flag() {
    heytech_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Heytech")
            .and(predicate::str::contains("shutters"))
            .and(predicate::str::contains("climate"))
            .and(predicate::str::contains("logbook")),
    );
}

#[test]
fn test_version_flag() {
    heytech_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("heytech"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    heytech_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    heytech_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = heytech_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_climate_without_host() {
    heytech_cmd()
        .arg("climate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No controller host configured"));
}

#[test]
fn test_move_requires_channels() {
    let output = heytech_cmd()
        .args(["shutters", "move", "open", "--host", "127.0.0.1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_invalid_output_format() {
    let output = heytech_cmd()
        .args(["climate", "--output", "xml"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_logbook_clear_requires_yes() {
    heytech_cmd()
        .args(["logbook", "clear", "--host", "127.0.0.1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("requires confirmation"));
}

#[test]
fn test_unreachable_device_exit_code() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let output = heytech_cmd()
        .args(["shutters", "positions", "--host", "127.0.0.1"])
        .args(["--port", &port.to_string()])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(text.contains("127.0.0.1"), "{text}");
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_set_and_use_profile() {
    let home = tempfile::tempdir().unwrap();
    let with_home = || {
        let mut cmd = heytech_cmd();
        cmd.env("HOME", home.path())
            .env("XDG_CONFIG_HOME", home.path().join(".config"));
        cmd
    };

    with_home()
        .args(["--profile", "attic", "config", "set", "host", "10.0.1.9"])
        .assert()
        .success();
    with_home()
        .args(["--profile", "attic", "config", "set", "pin", "4711"])
        .assert()
        .success();
    with_home()
        .args(["config", "use", "attic"])
        .assert()
        .success();

    with_home()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("default_profile = \"attic\"")
                .and(predicate::str::contains("host = \"10.0.1.9\""))
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("4711").not()),
        );
}

#[test]
fn test_config_use_unknown_profile() {
    heytech_cmd()
        .args(["config", "use", "garage"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("garage"));
}

// ── Against a fake device ───────────────────────────────────────────

#[test]
fn test_positions_as_json() {
    let (port, _received) = fake_device();
    heytech_cmd()
        .args(["shutters", "positions", "-o", "json-compact", "--host", "127.0.0.1"])
        .args(["--port", &port.to_string(), "--timeout", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"[{"channel":1,"position":10},{"channel":2,"position":0},{"channel":3,"position":100}]"#,
        ));
}

#[test]
fn test_move_sends_one_bracket_per_channel() {
    let (port, received) = fake_device();
    heytech_cmd()
        .args(["shutters", "move", "close", "2", "5", "--host", "127.0.0.1"])
        .args(["--port", &port.to_string()])
        .assert()
        .success()
        .stderr(predicate::str::contains("Sent 'close' to channel 2, 5"));

    let lines = wait_for_line(&received, "5");
    let bracket = |ch: &str| {
        lines
            .windows(4)
            .any(|w| w[0] == "rhb" && w[1] == ch && w[2] == "down" && w[3].is_empty())
    };
    assert!(bracket("2"), "{lines:?}");
    assert!(bracket("5"), "{lines:?}");
}
