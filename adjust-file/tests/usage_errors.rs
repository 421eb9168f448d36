#![forbid(unsafe_code)]

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn query_without_app_id_is_usage_error() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("adjust-file")?;
    cmd.arg("--query");
    cmd.assert()
        .failure()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Missing required param app_id"));
    Ok(())
}

#[test]
fn adjust_without_app_id_never_reads_input() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("adjust-file")?;
    cmd.write_stdin(r#"{"svc1":{"replicas":5}}"#);
    cmd.assert()
        .failure()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Missing required param app_id"));
    Ok(())
}

#[test]
fn unknown_flag_is_usage_error() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("adjust-file")?;
    cmd.args(["--describe", "svc1"]);
    cmd.assert()
        .failure()
        .code(2)
        .stdout(predicate::str::is_empty());
    Ok(())
}
