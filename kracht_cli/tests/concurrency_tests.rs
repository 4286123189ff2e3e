//! Concurrency tests for the kracht binary.
//!
//! These tests verify that multiple processes can safely:
//! - Save workouts to the same data directory (store-wide lock)
//! - Append snacks simultaneously
//! - Read history while writers are active

use assert_cmd::Command;
use std::path::Path;
use std::thread;
use tempfile::TempDir;

fn cli(temp_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("kracht"));
    cmd.env("XDG_CONFIG_HOME", temp_dir.join("config"))
        .arg("--data-dir")
        .arg(temp_dir.join("data"));
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn workout_count(temp_dir: &Path) -> usize {
    let contents = std::fs::read_to_string(temp_dir.join("data/workouts.json"))
        .expect("Failed to read workouts");
    let workouts: Vec<serde_json::Value> =
        serde_json::from_str(&contents).expect("Workouts are not valid JSON");
    workouts.len()
}

#[test]
fn test_concurrent_workout_saves() {
    let temp_dir = setup_test_dir();
    let root = temp_dir.path().to_path_buf();

    let handles: Vec<_> = ["A", "B", "C", "A", "B", "C"]
        .into_iter()
        .map(|template| {
            let root = root.clone();
            thread::spawn(move || {
                cli(&root)
                    .args(["start", template, "--auto-complete"])
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Writer thread panicked");
    }

    // No lost updates: every read-modify-write saw the previous one
    assert_eq!(workout_count(&root), 6);
}

#[test]
fn test_concurrent_snack_appends() {
    let temp_dir = setup_test_dir();
    let root = temp_dir.path().to_path_buf();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let root = root.clone();
            thread::spawn(move || {
                cli(&root)
                    .args(["snack", "lateral_raises", "--set", &format!("{}x5", 10 + i)])
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Snack thread panicked");
    }

    let log = std::fs::read_to_string(root.join("data/snacks.jsonl")).unwrap();
    assert_eq!(log.lines().count(), 8);
    for line in log.lines() {
        let snack: serde_json::Value = serde_json::from_str(line).expect("Torn snack line");
        assert_eq!(snack["exercise_name"], "Lateral Raises");
    }
}

#[test]
fn test_reads_during_writes() {
    let temp_dir = setup_test_dir();
    let root = temp_dir.path().to_path_buf();

    cli(&root)
        .args(["start", "A", "--auto-complete"])
        .assert()
        .success();

    let writer_root = root.clone();
    let writer = thread::spawn(move || {
        for _ in 0..3 {
            cli(&writer_root)
                .args(["start", "B", "--auto-complete"])
                .assert()
                .success();
        }
    });

    // Readers never see a half-written document
    for _ in 0..5 {
        cli(&root).arg("history").assert().success();
        cli(&root).arg("stats").assert().success();
    }

    writer.join().expect("Writer thread panicked");
    assert_eq!(workout_count(&root), 4);
}
