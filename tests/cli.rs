//! Runs the punk-records binary against a fake vegapull

#![cfg(unix)]

mod common;

use common::{FakeTool, entries, write_config_file};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn run_binary(args: &[&str], config: &Path, stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_punk-records"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(stdin).unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn pull_declined_leaves_data_untouched() {
    let temp = tempfile::tempdir().unwrap();
    let data = temp.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(data.join("cards_old.json"), "[]").unwrap();
    let config = write_config_file(
        temp.path(),
        &FakeTool::with_packs(&["sv1"]).config(temp.path(), &data),
    );

    let output = run_binary(&["pull"], &config, b"n\n");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("aborted by user"));
    assert_eq!(entries(&data), ["cards_old.json"]);
}

#[test]
fn pull_confirmed_replaces_data_and_reports_success() {
    let temp = tempfile::tempdir().unwrap();
    let data = temp.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(data.join("cards_old.json"), "[]").unwrap();
    let config = write_config_file(
        temp.path(),
        &FakeTool::with_packs(&["sv1"]).config(temp.path(), &data),
    );

    let output = run_binary(&["pull"], &config, b"yes\n");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(
        String::from_utf8_lossy(&output.stdout)
            .contains("Successfully filled the punk records with latest data")
    );
    assert_eq!(entries(&data), ["cards_sv1.json", "images", "packs.json"]);
}

#[test]
fn failing_pack_exits_non_zero() {
    let temp = tempfile::tempdir().unwrap();
    let data = temp.path().join("data");
    let config = write_config_file(
        temp.path(),
        &FakeTool::with_packs(&["sv1", "sv2"])
            .fail_cards("sv2")
            .config(temp.path(), &data),
    );

    let output = run_binary(&["pull"], &config, b"");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to pull cards"));
    assert!(stderr.contains("sv2"));
}

#[test]
fn unpack_expands_archives_left_by_pull() {
    let temp = tempfile::tempdir().unwrap();
    let data = temp.path().join("data");
    let config = write_config_file(
        temp.path(),
        &FakeTool::with_packs(&["sv1"]).config(temp.path(), &data),
    );
    assert!(run_binary(&["pull"], &config, b"").status.success());
    std::fs::write(data.join("images/readme.txt"), "keep me").unwrap();

    let output = run_binary(&["unpack"], &config, b"");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(entries(&data.join("images")), ["readme.txt", "sv1"]);
    assert!(data.join("images/sv1/sv1-001.png").exists());
}

#[test]
fn invalid_concurrency_is_a_configuration_error() {
    let temp = tempfile::tempdir().unwrap();
    let config = write_config_file(
        temp.path(),
        &FakeTool::with_packs(&[]).config(temp.path(), &temp.path().join("data")),
    );

    let output = run_binary(&["--max-concurrency", "0", "pull"], &config, b"");

    assert_eq!(output.status.code(), Some(2));
}
