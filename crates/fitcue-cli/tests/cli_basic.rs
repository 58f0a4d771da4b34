//! Basic CLI E2E tests.
//!
//! Tests invoke the built `fitcue` binary with HOME pointed at a temp dir,
//! so config reads and writes never touch the real user config.

use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command and return (code, stdout, stderr).
fn run_cli(home: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_fitcue"))
        .args(args)
        .env("HOME", home)
        .env_remove("FITCUE_ENV")
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

const PLAN: &str = r#"{
    "title": "Starter",
    "days": [{
        "day": "Monday",
        "focus": "Full body",
        "exercises": [
            {"name": "Goblet Squat", "sets": "3", "reps": "10", "rest": "90s"},
            {"name": "Push-up", "sets": "3", "reps": "AMRAP", "rest": "N/A"}
        ]
    }]
}"#;

#[test]
fn test_hiit_plan_json_defaults() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["hiit", "plan", "--json"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["total_secs"], 580);
    // warmup + 8 work + 7 rest + cooldown
    assert_eq!(parsed["segments"].as_array().unwrap().len(), 17);
    assert_eq!(parsed["segments"][0]["phase"], "warmup");
}

#[test]
fn test_hiit_plan_flags_override_config() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(
        home.path(),
        &["hiit", "plan", "--json", "--work", "30", "--cycles", "2"],
    );
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["total_secs"], 60 + 60 + 20 + 60);
}

#[test]
fn test_hiit_plan_rejects_zero_cycles() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["hiit", "plan", "--cycles", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("total_cycles"));
}

#[test]
fn test_hiit_run_to_finish() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(
        home.path(),
        &[
            "hiit", "run", "--json", "--quiet", "--warmup", "1", "--work", "1", "--rest", "1",
            "--cooldown", "1", "--cycles", "1",
        ],
    );
    assert_eq!(code, 0);
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines[0]["type"], "session_started");
    assert!(lines.iter().any(|l| l["type"] == "session_finished"));
    let last = lines.last().unwrap();
    assert_eq!(last["phase"], "finished");
}

#[test]
fn test_workout_show_json() {
    let home = tempfile::tempdir().unwrap();
    let plan = home.path().join("plan.json");
    std::fs::write(&plan, PLAN).unwrap();

    let (code, stdout, _) = run_cli(
        home.path(),
        &["workout", "show", plan.to_str().unwrap(), "--json"],
    );
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let exercises = &parsed["days"][0]["exercises"];
    assert_eq!(exercises[0]["rest_secs"], 90);
    assert_eq!(exercises[1]["rest_secs"], 60);
}

#[test]
fn test_workout_play_ends_at_eof() {
    let home = tempfile::tempdir().unwrap();
    let plan = home.path().join("plan.json");
    std::fs::write(&plan, PLAN).unwrap();

    let (code, stdout, _) = run_cli(
        home.path(),
        &["workout", "play", plan.to_str().unwrap(), "--json", "--quiet"],
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("\"workout_started\""));
    assert!(stdout.contains("\"workout_ended\""));
}

#[test]
fn test_workout_play_missing_day() {
    let home = tempfile::tempdir().unwrap();
    let plan = home.path().join("plan.json");
    std::fs::write(&plan, PLAN).unwrap();

    let (code, _, stderr) = run_cli(
        home.path(),
        &["workout", "play", plan.to_str().unwrap(), "--day", "5"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("out of bounds"));
}

#[test]
fn test_config_set_then_get() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["config", "get", "interval.work_secs"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "40");

    let (code, _, _) = run_cli(home.path(), &["config", "set", "interval.work_secs", "45"]);
    assert_eq!(code, 0);

    let (_, stdout, _) = run_cli(home.path(), &["config", "get", "interval.work_secs"]);
    assert_eq!(stdout.trim(), "45");

    let (code, _, _) = run_cli(home.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(home.path(), &["config", "get", "interval.work_secs"]);
    assert_eq!(stdout.trim(), "40");
}

#[test]
fn test_config_unknown_key_fails() {
    let home = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(home.path(), &["config", "get", "audio.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown configuration key"));
}

#[test]
fn test_config_path_is_under_home() {
    let home = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(home.path(), &["config", "path"]);
    assert_eq!(code, 0);
    assert!(stdout.trim().ends_with(".config/fitcue/config.toml"));
    assert!(stdout.starts_with(home.path().to_str().unwrap()));
}
