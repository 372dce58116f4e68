//! CLI integration tests

use std::path::Path;
use std::process::Command;

use assert_cmd::Command as AssertCommand;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Scratch XDG homes so runs never touch the real user config or daemon
struct Sandbox {
    root: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        for dir in ["config", "data", "runtime", "recordings"] {
            std::fs::create_dir_all(root.path().join(dir)).unwrap();
        }
        Self { root }
    }

    fn recordings(&self) -> std::path::PathBuf {
        self.root.path().join("recordings")
    }

    fn add_recording(&self, name: &str, bytes: &[u8]) {
        std::fs::write(self.recordings().join(name), bytes).unwrap();
    }

    fn metadata_file(&self) -> std::path::PathBuf {
        self.root.path().join("data/voice-sync/sync_metadata.json")
    }

    fn apply(&self, cmd: &mut Command) {
        let root = self.root.path();
        cmd.env("XDG_CONFIG_HOME", root.join("config"))
            .env("XDG_DATA_HOME", root.join("data"))
            .env("XDG_RUNTIME_DIR", root.join("runtime"))
            .env("NO_COLOR", "1")
            .env_remove("VOICE_SYNC_AUTH_TOKEN")
            .env_remove("VOICE_SYNC_SERVER_URL")
            .env_remove("VOICE_SYNC_LOG");
    }

    fn bin(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_voice-sync"));
        self.apply(&mut cmd);
        cmd.arg("--recordings-dir").arg(self.recordings());
        cmd
    }

    fn assert_bin(&self) -> AssertCommand {
        let mut cmd = AssertCommand::cargo_bin("voice-sync").unwrap();
        let root = self.root.path();
        cmd.env("XDG_CONFIG_HOME", root.join("config"))
            .env("XDG_DATA_HOME", root.join("data"))
            .env("XDG_RUNTIME_DIR", root.join("runtime"))
            .env("NO_COLOR", "1")
            .env_remove("VOICE_SYNC_AUTH_TOKEN")
            .env_remove("VOICE_SYNC_SERVER_URL")
            .env_remove("VOICE_SYNC_LOG")
            .arg("--recordings-dir")
            .arg(self.recordings());
        cmd
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn help_output() {
    let output = Command::new(env!("CARGO_BIN_EXE_voice-sync"))
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--daemon"));
    assert!(stdout.contains("--recordings-dir"));
    assert!(stdout.contains("--network"));
    assert!(stdout.contains("sync"));
    assert!(stdout.contains("status"));
    assert!(stdout.contains("retry"));
}

#[test]
fn version_output() {
    let output = Command::new(env!("CARGO_BIN_EXE_voice-sync"))
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("voice-sync"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn config_path_command() {
    let sandbox = Sandbox::new();
    sandbox
        .assert_bin()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("voice-sync").and(predicate::str::contains("config.toml")));
}

#[test]
fn config_set_then_get() {
    let sandbox = Sandbox::new();
    sandbox
        .assert_bin()
        .args(["config", "set", "network.mode", "always"])
        .assert()
        .success();

    sandbox
        .assert_bin()
        .args(["config", "get", "network.mode"])
        .assert()
        .success()
        .stdout(predicate::str::diff("always\n"));
}

#[test]
fn config_get_masks_token() {
    let sandbox = Sandbox::new();
    sandbox
        .assert_bin()
        .args(["config", "set", "auth_token", "abcdefghijklmnop"])
        .assert()
        .success();

    sandbox
        .assert_bin()
        .args(["config", "get", "auth_token"])
        .assert()
        .success()
        .stdout(predicate::str::contains("abcd...mnop"))
        .stdout(predicate::str::contains("efgh").not());
}

#[test]
fn invalid_config_key_error() {
    let sandbox = Sandbox::new();
    sandbox
        .assert_bin()
        .args(["config", "set", "api_key", "x"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown key"));
}

#[test]
fn invalid_config_value_error() {
    let sandbox = Sandbox::new();
    sandbox
        .assert_bin()
        .args(["config", "set", "retry_delays", "5s,soon"])
        .assert()
        .code(1);
}

#[test]
fn invalid_network_mode_error() {
    let sandbox = Sandbox::new();
    let output = sandbox
        .bin()
        .args(["--network", "cellular", "status"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("invalid value") || stderr.contains("cellular"),
        "Expected error about invalid network mode, got: {}",
        stderr
    );
}

#[test]
fn daemon_with_subcommand_is_usage_error() {
    let sandbox = Sandbox::new();
    sandbox
        .assert_bin()
        .args(["--daemon", "status"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot be combined"));
}

#[test]
fn daemon_status_without_daemon() {
    let sandbox = Sandbox::new();
    sandbox
        .assert_bin()
        .args(["daemon", "status"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No daemon running"));
}

#[test]
fn status_on_empty_directory() {
    let sandbox = Sandbox::new();
    sandbox
        .assert_bin()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No recordings tracked"))
        .stdout(predicate::str::contains("pending: 0"));
}

#[test]
fn status_of_unknown_recording_is_not_synced() {
    let sandbox = Sandbox::new();
    sandbox
        .assert_bin()
        .args(["status", "never-seen.m4a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not synced"));
}

#[test]
fn invalid_recording_id_is_usage_error() {
    let sandbox = Sandbox::new();
    sandbox
        .assert_bin()
        .args(["status", "../escape.m4a"])
        .assert()
        .code(2);
}

#[test]
fn retry_of_missing_recording_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .assert_bin()
        .args(["--network", "always", "retry", "gone.m4a"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Recording not found"));
}

#[test]
fn sync_off_network_registers_and_keeps_files() {
    let sandbox = Sandbox::new();
    sandbox.add_recording("memo.m4a", b"audio");

    sandbox
        .assert_bin()
        .args(["--network", "never", "sync"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Not on preferred network"));

    assert!(sandbox.recordings().join("memo.m4a").exists());
    let metadata = read(&sandbox.metadata_file());
    assert!(metadata.contains("\"memo.m4a\""));
    assert!(metadata.contains("not_synced"));

    sandbox
        .assert_bin()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("memo.m4a"))
        .stdout(predicate::str::contains("Not synced"))
        .stdout(predicate::str::contains("pending: 1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_uploads_and_deletes_local_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/recordings"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let sandbox = Sandbox::new();
    sandbox.add_recording("memo.m4a", b"audio");

    let mut cmd = sandbox.bin();
    cmd.args(["--network", "always", "--server-url", &server.uri(), "sync"]);
    let output = tokio::task::spawn_blocking(move || cmd.output())
        .await
        .unwrap()
        .expect("Failed to execute command");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(!sandbox.recordings().join("memo.m4a").exists());
    assert!(read(&sandbox.metadata_file()).contains("\"synced\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_failure_exits_with_error_and_keeps_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("disk full"))
        .mount(&server)
        .await;

    let sandbox = Sandbox::new();
    sandbox.add_recording("memo.wav", b"RIFF");

    let mut cmd = sandbox.bin();
    cmd.args(["--network", "always", "--server-url", &server.uri(), "sync"]);
    let output = tokio::task::spawn_blocking(move || cmd.output())
        .await
        .unwrap()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Server error: 500"), "stderr: {}", stderr);

    assert!(sandbox.recordings().join("memo.wav").exists());
    let metadata = read(&sandbox.metadata_file());
    assert!(metadata.contains("\"failed\""));
    assert!(metadata.contains("\"attempt_count\": 1"));
}
