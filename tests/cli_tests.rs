use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn vedit(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("vedit").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("VEDIT_CONFIG")
        .env_remove("VEDIT_SESSION")
        .env_remove("RUST_LOG")
        .arg("--state-dir")
        .arg(dir.path().join("state"))
        .arg("--log-level")
        .arg("error");
    cmd
}

#[test]
fn test_help_lists_operations() {
    let dir = TempDir::new().unwrap();
    vedit(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("merge"))
        .stdout(predicate::str::contains("trim"))
        .stdout(predicate::str::contains("concat"))
        .stdout(predicate::str::contains("music"));
}

#[test]
fn test_sessions_empty_state() {
    let dir = TempDir::new().unwrap();
    vedit(&dir)
        .arg("sessions")
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved sessions"));
}

#[test]
fn test_status_of_fresh_session() {
    let dir = TempDir::new().unwrap();
    vedit(&dir)
        .args(["--session", "alice", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Session: alice"))
        .stdout(predicate::str::contains("nothing staged"));
}

#[test]
fn test_status_as_json() {
    let dir = TempDir::new().unwrap();
    vedit(&dir)
        .args(["status", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"session\": \"default\""));
}

#[test]
fn test_clear_is_repeatable() {
    let dir = TempDir::new().unwrap();
    for _ in 0..2 {
        vedit(&dir)
            .args(["clear", "trim"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cleared Trim & Create Subclips"));
    }
    vedit(&dir)
        .arg("sessions")
        .assert()
        .success()
        .stdout(predicate::str::contains("default"));
}

#[test]
fn test_missing_upload_is_a_validation_error() {
    let dir = TempDir::new().unwrap();
    vedit(&dir)
        .args(["trim", "--video", "absent.mp4"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("absent.mp4"));
}

#[test]
fn test_export_without_output_is_a_validation_error() {
    let dir = TempDir::new().unwrap();
    vedit(&dir)
        .args(["export", "concat", "--to", "out.mp4"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no output to export"));
}

#[test]
fn test_out_of_range_volume_is_rejected() {
    let dir = TempDir::new().unwrap();
    vedit(&dir)
        .args(["music", "--music-volume", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 0.0 and 1.0"));
}

#[test]
fn test_invalid_codec_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    vedit(&dir)
        .args(["--video-codec", "h265", "status"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown video codec"));
}

#[test]
fn test_inspect_missing_file() {
    let dir = TempDir::new().unwrap();
    vedit(&dir)
        .args(["inspect", "--input", "nowhere.mov"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}
