//! Integration tests for the seatvm CLI.
//!
//! These tests invoke the `seatvm` binary as a subprocess and check
//! exit codes, stdout, and stderr.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(deprecated)]
fn seatvm() -> Command {
    let mut cmd = Command::cargo_bin("seatvm").unwrap();
    cmd.env("SEATVM_LOG", "off");
    cmd
}

const COPY_FIRST: &str = r#"[
    {"type": "PICK", "target": "MOCO"},
    {"type": "MOVE_RIGHT", "target": "MOCO"},
    {"type": "PUT", "target": "MOCO"}
]"#;

const COPY_CHALLENGE: &str = r#"{
    "id": "copy-first",
    "title": "Copy First",
    "initialArray": [7, 0, 0, 0],
    "targetArray": [7, 7, 0, 0],
    "maxSteps": 3
}"#;

/// Write `content` to `name` inside `dir` and return the path as a string.
fn write(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

/// A program file and a challenge file for the copy-first example.
fn copy_first(dir: &TempDir) -> (String, String) {
    (
        write(dir, "program.json", COPY_FIRST),
        write(dir, "challenge.json", COPY_CHALLENGE),
    )
}

// ---- No-args / help ----

#[test]
fn no_args_prints_usage_and_exits_1() {
    seatvm()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Usage: seatvm"));
}

#[test]
fn help_flag_exits_0() {
    seatvm()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Commands:"));
}

#[test]
fn unknown_command_exits_1() {
    seatvm()
        .arg("frobnicate")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("frobnicate"));
}

// ---- Challenges ----

#[test]
fn challenges_lists_catalog() {
    let output = seatvm().arg("challenges").assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    assert_eq!(stdout.lines().count(), 10);
    assert!(stdout.contains("challenge-1"));
    assert!(stdout.contains("Find Maximum"));
    assert!(stdout.contains("challenge-10"));
}

#[test]
fn challenges_json() {
    let output = seatvm().args(["challenges", "--json"]).assert().success();
    let value: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    let list = value.as_array().unwrap();
    assert_eq!(list.len(), 10);
    assert_eq!(list[1]["id"], "challenge-2");
    assert!(list[1]["initialArray"].is_array());
}

#[test]
fn challenges_marks_progress() {
    let dir = TempDir::new().unwrap();
    let progress = write(
        &dir,
        "progress.json",
        r#"{"challenge-2": {"challengeId": "challenge-2", "completed": true, "bestStepCount": 17}}"#,
    );
    seatvm()
        .args(["challenges", "--progress", progress.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("done (17 steps)"));
}

// ---- Run ----

#[test]
fn run_copy_first() {
    let dir = TempDir::new().unwrap();
    let (program, challenge) = copy_first(&dir);
    seatvm()
        .args(["run", program.as_str(), "--challenge-file", challenge.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Challenge completed optimally!"))
        .stdout(predicate::str::contains("steps: 3"))
        .stdout(predicate::str::contains("array: [7, 7, 0, 0]"));
}

#[test]
fn run_with_interval() {
    let dir = TempDir::new().unwrap();
    let (program, challenge) = copy_first(&dir);
    seatvm()
        .args(["run", program.as_str(), "--challenge-file", challenge.as_str(), "--interval-ms", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Challenge completed optimally!"));
}

#[test]
fn run_wrong_answer_exits_2() {
    let dir = TempDir::new().unwrap();
    let program = write(&dir, "program.json", r#"[{"type": "WAIT"}]"#);
    let challenge = write(&dir, "challenge.json", COPY_CHALLENGE);
    seatvm()
        .args(["run", program.as_str(), "--challenge-file", challenge.as_str()])
        .assert()
        .failure()
        .code(2)
        .stdout(predicate::str::contains("Mismatch at seat 1: expected 7, got 0"));
}

#[test]
fn run_hard_error_exits_3() {
    let dir = TempDir::new().unwrap();
    let program = write(&dir, "program.json", r#"[{"type": "PUT", "target": "MOCO"}]"#);
    let challenge = write(&dir, "challenge.json", COPY_CHALLENGE);
    seatvm()
        .args(["run", program.as_str(), "--challenge-file", challenge.as_str()])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("runtime error: hand is empty"));
}

#[test]
fn run_soft_error_validates() {
    let dir = TempDir::new().unwrap();
    let program = write(
        &dir,
        "program.json",
        r#"[
            {"type": "MOVE_RIGHT", "target": "CHOCO"},
            {"type": "MOVE_RIGHT", "target": "CHOCO"},
            {"type": "MOVE_RIGHT", "target": "CHOCO"}
        ]"#,
    );
    let challenge = write(
        &dir,
        "challenge.json",
        r#"{"initialArray": [1, 2], "targetArray": [1, 2]}"#,
    );
    seatvm()
        .args(["run", program.as_str(), "--challenge-file", challenge.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("steps: 1"));
}

#[test]
fn run_builtin_challenge() {
    let dir = TempDir::new().unwrap();
    // Swap the first and last seats of [10, 20, 30, 40, 50].
    let program = write(
        &dir,
        "program.json",
        r#"[
            {"type": "MOVE_TO_END", "target": "CHOCO"},
            {"type": "SWAP"}
        ]"#,
    );
    seatvm()
        .args(["run", program.as_str(), "--challenge", "challenge-4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("array: [50, 20, 30, 40, 10]"));
}

#[test]
fn run_infinite_loop_hits_step_limit() {
    let dir = TempDir::new().unwrap();
    let program = write(
        &dir,
        "program.json",
        r#"[{"type": "LABEL", "labelName": "top"}, {"type": "JUMP", "label": "top"}]"#,
    );
    let challenge = write(&dir, "challenge.json", COPY_CHALLENGE);
    seatvm()
        .args(["run", program.as_str(), "--challenge-file", challenge.as_str(), "--step-limit", "20"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("stopped after 20 steps"));
}

#[test]
fn run_updates_progress() {
    let dir = TempDir::new().unwrap();
    let (program, challenge) = copy_first(&dir);
    let progress: PathBuf = dir.path().join("progress.json");
    seatvm()
        .args([
            "run",
            program.as_str(),
            "--challenge-file",
            challenge.as_str(),
            "--progress",
            progress.to_str().unwrap(),
        ])
        .assert()
        .success();

    let ledger: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&progress).unwrap()).unwrap();
    assert_eq!(ledger["copy-first"]["completed"], true);
    assert_eq!(ledger["copy-first"]["bestStepCount"], 3);
}

// ---- Input errors ----

#[test]
fn run_missing_program_exits_1() {
    let dir = TempDir::new().unwrap();
    let challenge = write(&dir, "challenge.json", COPY_CHALLENGE);
    seatvm()
        .args(["run", "/nonexistent/program.json", "--challenge-file", challenge.as_str()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn run_invalid_program_exits_1() {
    let dir = TempDir::new().unwrap();
    let program = write(&dir, "program.json", "{ not a list");
    let challenge = write(&dir, "challenge.json", COPY_CHALLENGE);
    seatvm()
        .args(["run", program.as_str(), "--challenge-file", challenge.as_str()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid program JSON"));
}

#[test]
fn run_without_challenge_exits_1() {
    let dir = TempDir::new().unwrap();
    let program = write(&dir, "program.json", COPY_FIRST);
    seatvm()
        .args(["run", program.as_str()])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("a challenge is required"));
}

#[test]
fn run_unknown_challenge_exits_1() {
    let dir = TempDir::new().unwrap();
    let program = write(&dir, "program.json", COPY_FIRST);
    seatvm()
        .args(["run", program.as_str(), "--challenge", "nope"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown challenge 'nope'"));
}

// ---- Trace ----

#[test]
fn trace_prints_one_line_per_step() {
    let dir = TempDir::new().unwrap();
    let (program, challenge) = copy_first(&dir);
    let output = seatvm()
        .args(["trace", program.as_str(), "--challenge-file", challenge.as_str()])
        .assert()
        .success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0]["instruction"], "PICK");
    assert_eq!(lines[0]["hand"], 7);
    assert_eq!(lines[2]["array"], serde_json::json!([7, 7, 0, 0]));
    assert_eq!(lines[2]["stepCount"], 3);
    assert_eq!(lines[3]["completed"], true);
}

#[test]
fn trace_stops_on_soft_error() {
    let dir = TempDir::new().unwrap();
    let program = write(&dir, "program.json", r#"[{"type": "MOVE_LEFT", "target": "MOCO"}]"#);
    let challenge = write(&dir, "challenge.json", COPY_CHALLENGE);
    seatvm()
        .args(["trace", program.as_str(), "--challenge-file", challenge.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("CannotMove"));
}

#[test]
fn trace_hard_error_exits_3() {
    let dir = TempDir::new().unwrap();
    let program = write(&dir, "program.json", r#"[{"type": "JUMP", "label": "missing"}]"#);
    let challenge = write(&dir, "challenge.json", COPY_CHALLENGE);
    seatvm()
        .args(["trace", program.as_str(), "--challenge-file", challenge.as_str()])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("label \"missing\" not found"));
}

// ---- Validate ----

#[test]
fn validate_prints_json() {
    let dir = TempDir::new().unwrap();
    let (program, challenge) = copy_first(&dir);
    let output = seatvm()
        .args(["validate", program.as_str(), "--challenge-file", challenge.as_str()])
        .assert()
        .success();
    let result: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(result["success"], true);
    assert_eq!(result["optimized"], true);
    assert_eq!(result["stepCount"], 3);
}

#[test]
fn validate_failure_exits_2() {
    let dir = TempDir::new().unwrap();
    let program = write(&dir, "program.json", "[]");
    let challenge = write(&dir, "challenge.json", COPY_CHALLENGE);
    let output = seatvm()
        .args(["validate", program.as_str(), "--challenge-file", challenge.as_str()])
        .assert()
        .failure()
        .code(2);
    let result: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(result["success"], false);
}
