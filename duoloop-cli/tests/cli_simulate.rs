use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn simulate_instant_swaps_emits_event_lines() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("duoloop"));
    cmd.args([
        "simulate",
        "--cycles",
        "2",
        "--duration-ms",
        "3000",
        "--fps",
        "100",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"event\":\"handoff_started\""))
    .stdout(predicate::str::contains("\"kind\":\"instant\""))
    .stdout(predicate::str::contains("\"event\":\"retirement_scheduled\""))
    .stdout(predicate::str::contains("\"event\":\"retired\""))
    .stdout(predicate::str::contains("\"cycles\":2"))
    .stdout(predicate::str::contains("blend_completed").not());
}

#[test]
fn simulate_crossfade_reports_blend() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("duoloop"));
    cmd.args([
        "simulate",
        "--cycles",
        "1",
        "--duration-ms",
        "4000",
        "--crossfade-ms",
        "400",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"kind\":\"blended\""))
    .stdout(predicate::str::contains("\"threshold_ms\":1200.0"))
    .stdout(predicate::str::contains("\"event\":\"blend_completed\""));
}

#[test]
fn simulate_reads_config_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, r#"{{"cutover_offset_ms": 500}}"#).expect("write config");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("duoloop"));
    cmd.args(["simulate", "--cycles", "1", "--duration-ms", "2000", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"threshold_ms\":500.0"));
}

#[test]
fn simulate_rejects_bad_config() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "not json").expect("write config");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("duoloop"));
    cmd.args(["simulate", "--config"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("settings parse error"));
}

#[test]
fn simulate_with_huge_fps_still_finishes() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("duoloop"));
    cmd.args([
        "simulate",
        "--cycles",
        "1",
        "--duration-ms",
        "2000",
        "--fps",
        "3e9",
    ])
    .timeout(std::time::Duration::from_secs(30))
    .assert()
    .success()
    .stdout(predicate::str::contains("\"summary\":true"));
}

#[test]
fn simulate_rejects_infinite_jitter() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("duoloop"));
    cmd.args(["simulate", "--cycles", "1", "--jitter-ms", "inf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("jitter-ms must be finite"))
        .stderr(predicate::str::contains("panicked").not());
}
