use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn quiet_run_prints_final_snapshot() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("duoloop"));
    cmd.args([
        "--quiet",
        "--run-ms",
        "300",
        "--duration-ms",
        "2000",
        "clip.mp4",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"generation\":1"))
    .stdout(predicate::str::contains("\"total_duration_ms\":2000.0"));
}

#[test]
fn quiet_run_without_source_fails() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("duoloop"));
    cmd.args(["--quiet", "--run-ms", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing media source"));
}
