//! Integration tests for core CLI contract behavior.

use {predicates::prelude::*, std::fs, tempfile::tempdir};

fn cli_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("uartboot").expect("binary should build");
    // Keep env-driven defaults out of the contract tests
    cmd.env_remove("UARTBOOT_PORT").env_remove("UARTBOOT_BAUD");
    cmd
}

#[test]
fn help_exits_zero_and_writes_stdout_only() {
    let mut cmd = cli_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("uartboot"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn version_exits_zero_and_writes_stdout_only() {
    let mut cmd = cli_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("uartboot"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn help_lists_timeout_flag_in_milliseconds() {
    let mut cmd = cli_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--timeout-ms"));
}

#[test]
fn missing_required_args_fails_with_usage() {
    let mut cmd = cli_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn missing_image_file_fails_before_opening_the_port() {
    let dir = tempdir().expect("tempdir should be created");
    let nonexistent = dir.path().join("not_exists.bin");

    // The port path is bogus too; the file error must win because the image
    // is read before the port is opened.
    let mut cmd = cli_cmd();
    cmd.args(["--port", "/dev/ttyDOESNOTEXIST", "--quiet"])
        .arg("--file")
        .arg(&nonexistent)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read image"));
}

#[test]
fn unopenable_port_reports_serial_error() {
    let dir = tempdir().expect("tempdir should be created");
    let image = dir.path().join("image.bin");
    fs::write(&image, vec![0u8; 64]).expect("image should be written");

    let mut cmd = cli_cmd();
    cmd.args(["--port", "/dev/ttyDOESNOTEXIST", "--quiet"])
        .arg("--file")
        .arg(&image)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open serial port"));
}

#[test]
fn invalid_flow_value_is_rejected() {
    let mut cmd = cli_cmd();
    cmd.args([
        "--port",
        "/dev/ttyDOESNOTEXIST",
        "--file",
        "whatever.bin",
        "--flow",
        "sideways",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("--flow"));
}
