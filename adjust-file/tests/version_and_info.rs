#![forbid(unsafe_code)]

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn version_prints_bare_string() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("adjust-file")?;
    cmd.arg("--version").env("ADJUST_FILE_STATE", "/nonexistent/state.json");
    cmd.assert()
        .success()
        .stdout(format!("{}\n", env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn info_advertises_cancel() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("adjust-file")?;
    cmd.arg("--info");
    cmd.assert()
        .success()
        .stdout(format!("{{\"version\":\"{}\",\"has_cancel\":true}}\n", env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn version_and_info_ignore_stdin_and_app_id() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("adjust-file")?;
    cmd.args(["--info", "--query", "svc1"]).write_stdin("not json at all");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"has_cancel\":true"));

    let mut cmd = Command::cargo_bin("adjust-file")?;
    cmd.args(["--query", "--version"]).write_stdin("{");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("error").not());
    Ok(())
}

#[test]
fn help_shows_description() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("adjust-file")?;
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("JSON state file"))
        .stdout(predicate::str::contains("--query"));
    Ok(())
}
