use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

fn evoplan() -> Command {
    Command::cargo_bin("evoplan").expect("binary builds")
}

fn generate_problem(dir: &TempDir) -> std::path::PathBuf {
    let problem_path = dir.path().join("problem.json");
    evoplan()
        .args([
            "generate",
            "--output",
            problem_path.to_str().unwrap(),
            "--seed",
            "7",
            "--users",
            "12",
            "--groups",
            "3",
            "--rooms",
            "3",
            "--subjects",
            "4",
            "--slots-per-day",
            "16",
        ])
        .assert()
        .success();
    problem_path
}

#[test]
fn generate_writes_a_parseable_problem() {
    let dir = tempfile::tempdir().unwrap();
    let problem_path = generate_problem(&dir);

    let content = fs::read_to_string(&problem_path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["grid"]["slots_per_day"], 16);
    assert!(value["subjects"].as_array().unwrap().len() == 4);
}

#[test]
fn solve_then_validate_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let problem_path = generate_problem(&dir);
    let schedule_path = dir.path().join("schedule.json");

    evoplan()
        .args([
            "solve",
            "--input",
            problem_path.to_str().unwrap(),
            "--output",
            schedule_path.to_str().unwrap(),
            "--seed",
            "1",
            "--population-size",
            "16",
            "--generations",
            "15",
            "--patience",
            "10",
        ])
        .assert()
        .success();

    evoplan()
        .args([
            "validate",
            "--input",
            problem_path.to_str().unwrap(),
            "--schedule",
            schedule_path.to_str().unwrap(),
        ])
        .assert()
        .success();
}

#[test]
fn validate_rejects_a_corrupted_schedule() {
    let dir = tempfile::tempdir().unwrap();
    let problem_path = generate_problem(&dir);
    let schedule_path = dir.path().join("schedule.json");

    evoplan()
        .args([
            "solve",
            "--input",
            problem_path.to_str().unwrap(),
            "--output",
            schedule_path.to_str().unwrap(),
            "--seed",
            "1",
            "--population-size",
            "16",
            "--generations",
            "15",
            "--patience",
            "10",
        ])
        .assert()
        .success();

    // Duplicate the first meeting: one instance now appears twice.
    let mut meetings: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&schedule_path).unwrap()).unwrap();
    let first = meetings[0].clone();
    meetings.as_array_mut().unwrap().push(first);
    fs::write(&schedule_path, serde_json::to_string(&meetings).unwrap()).unwrap();

    evoplan()
        .args([
            "validate",
            "--input",
            problem_path.to_str().unwrap(),
            "--schedule",
            schedule_path.to_str().unwrap(),
        ])
        .assert()
        .failure();
}

#[test]
fn solve_fails_cleanly_on_a_missing_input() {
    evoplan()
        .args(["solve", "--input", "/nonexistent/problem.json"])
        .assert()
        .failure();
}
