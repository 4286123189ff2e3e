//! Integration tests for the kracht binary.
//!
//! These tests verify end-to-end behavior including:
//! - Running workouts (non-interactive and scripted stdin)
//! - Seeding from the previous workout of the same template
//! - History, progress, stats and calendar output
//! - Templates, snacks, profile and CSV export

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the CLI binary, isolated from any user config
fn cli(temp_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("kracht"));
    cmd.env("XDG_CONFIG_HOME", temp_dir.join("config"))
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(temp_dir.join("data"));
    cmd
}

fn stored_workouts(temp_dir: &Path) -> Vec<serde_json::Value> {
    let contents = fs::read_to_string(temp_dir.join("data/workouts.json"))
        .expect("Failed to read workouts");
    serde_json::from_str(&contents).expect("Workouts are not valid JSON")
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Strength workout tracker"));
}

#[test]
fn test_templates_list_shows_defaults() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("templates")
        .assert()
        .success()
        .stdout(predicate::str::contains("Full Body - Press Focus"))
        .stdout(predicate::str::contains("Full Body - Pull Focus"))
        .stdout(predicate::str::contains("Full Body - Core & Stability"));
}

#[test]
fn test_templates_show_by_name() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["templates", "show", "b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deadlift"))
        .stdout(predicate::str::contains("3:00"));
}

#[test]
fn test_unknown_template_fails() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["start", "Z", "--auto-complete"])
        .assert()
        .failure();
}

#[test]
fn test_auto_complete_logs_workout() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "A", "--auto-complete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout saved"))
        .stdout(predicate::str::contains("15/15"));

    let workouts = stored_workouts(temp_dir.path());
    assert_eq!(workouts.len(), 1);
    assert_eq!(workouts[0]["workout_type"], "A");
    assert_eq!(workouts[0]["completed"], true);
    assert_eq!(workouts[0]["exercises"].as_array().unwrap().len(), 5);
}

#[test]
fn test_scripted_session_saves() {
    let temp_dir = setup_test_dir();

    // weight 40 on set 1, reps 8, done, skip rest, finish despite open sets
    cli(temp_dir.path())
        .args(["start", "C"])
        .write_stdin("w 1 40\nr 1 8\n1\ns\nf\ny\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not all sets are done"))
        .stdout(predicate::str::contains("Workout saved"))
        .stdout(predicate::str::contains("Volume:   320 kg"));

    let workouts = stored_workouts(temp_dir.path());
    assert_eq!(workouts.len(), 1);
    let first_set = &workouts[0]["exercises"][0]["sets"][0];
    assert_eq!(first_set["reps"], 8);
    assert_eq!(first_set["weight"], 40.0);
    assert_eq!(first_set["completed"], true);
}

#[test]
fn test_bad_input_is_rejected_without_ending_session() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "A"])
        .write_stdin("w 1 heavy\nq\ny\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("not a weight"))
        .stdout(predicate::str::contains("Workout discarded"));

    assert!(!temp_dir.path().join("data/workouts.json").exists());
}

#[test]
fn test_closed_input_discards_session() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "B"])
        .write_stdin("1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("workout discarded"));

    assert!(!temp_dir.path().join("data/workouts.json").exists());
}

#[test]
fn test_next_session_is_seeded() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "C"])
        .write_stdin("w 1 42.5\nr 1 9\n1\nf\ny\n")
        .assert()
        .success();

    // The first exercise's first set starts from last time's numbers
    cli(temp_dir.path())
        .args(["start", "C"])
        .write_stdin("q\ny\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("9 × 42.5 kg"));
}

#[test]
fn test_history_and_delete() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "A", "--auto-complete"])
        .assert()
        .success();

    cli(temp_dir.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("15/15 sets"));

    let id = stored_workouts(temp_dir.path())[0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    cli(temp_dir.path())
        .args(["delete", &id[..8]])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted workout A"));

    cli(temp_dir.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No workouts logged yet"));
}

#[test]
fn test_delete_unknown_workout_fails() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["delete", "does-not-exist"])
        .assert()
        .failure();
}

#[test]
fn test_stats_after_workouts() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Athlete"))
        .stdout(predicate::str::contains("Level 1"))
        .stdout(predicate::str::contains("Streak:     0 week(s)"));

    // 100 XP reaches level 2
    cli(temp_dir.path())
        .args(["start", "B", "--auto-complete"])
        .assert()
        .success();

    cli(temp_dir.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Level 2"))
        .stdout(predicate::str::contains("Streak:     1 week(s)"))
        .stdout(predicate::str::contains("This week:  1 workout(s)"));
}

#[test]
fn test_progress_lists_records() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "C"])
        .write_stdin("w 1 30\nr 1 10\n1\nf\ny\n")
        .assert()
        .success();

    cli(temp_dir.path())
        .arg("progress")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workouts:        1"))
        .stdout(predicate::str::contains("Seated OH Press"))
        .stdout(predicate::str::contains("300 kg"));
}

#[test]
fn test_calendar_month() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["calendar", "--month", "2024-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("February 2024"))
        .stdout(predicate::str::contains("29"))
        .stdout(predicate::str::contains("0 workout(s)"));

    cli(temp_dir.path())
        .args(["calendar", "--month", "2024-2x"])
        .assert()
        .failure();
}

#[test]
fn test_snack_logging() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("snack")
        .assert()
        .success()
        .stdout(predicate::str::contains("Triceps Pushdown"));

    cli(temp_dir.path())
        .args(["snack", "biceps_curl", "--set", "12x10", "--set", "10x12,5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Biceps Curl × 2 sets, 245 kg"));

    cli(temp_dir.path())
        .arg("snack")
        .assert()
        .success()
        .stdout(predicate::str::contains("Recent"));

    let log = fs::read_to_string(temp_dir.path().join("data/snacks.jsonl")).unwrap();
    assert_eq!(log.lines().count(), 1);
}

#[test]
fn test_snack_prompts_for_sets() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["snack", "dips"])
        .write_stdin("10\n8\n6\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dips × 3 sets, 0 kg"));
}

#[test]
fn test_profile_update() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("profile")
        .assert()
        .success()
        .stdout(predicate::str::contains("Athlete"))
        .stdout(predicate::str::contains("nl"));

    cli(temp_dir.path())
        .args(["profile", "--name", "Sam", "--language", "en"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile updated"));

    cli(temp_dir.path())
        .arg("profile")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sam"))
        .stdout(predicate::str::contains("en"));

    cli(temp_dir.path())
        .args(["profile", "--language", "fr"])
        .assert()
        .failure();
}

#[test]
fn test_template_import_and_delete() {
    let temp_dir = setup_test_dir();
    let file = temp_dir.path().join("legs.json");
    fs::write(
        &file,
        r#"{
            "id": "legs",
            "name": "Legs",
            "description": "Leg day",
            "exercises": [
                {"name": "squat", "displayName": "Squat", "targetReps": "5", "sets": 5, "restTime": 240}
            ]
        }"#,
    )
    .unwrap();

    cli(temp_dir.path())
        .arg("templates")
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 template(s)"));

    // Defaults are kept next to the imported template
    cli(temp_dir.path())
        .args(["templates", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Leg day"))
        .stdout(predicate::str::contains("Full Body - Press Focus"));

    cli(temp_dir.path())
        .args(["templates", "delete", "legs"])
        .assert()
        .success();

    cli(temp_dir.path())
        .args(["templates", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Leg day").not());
}

#[test]
fn test_invalid_template_import_rejected() {
    let temp_dir = setup_test_dir();
    let file = temp_dir.path().join("bad.json");
    fs::write(
        &file,
        r#"[{"id": "x", "name": "", "exercises": [{"name": "a", "displayName": "A", "sets": 0}]}]"#,
    )
    .unwrap();

    cli(temp_dir.path())
        .arg("templates")
        .arg("import")
        .arg(&file)
        .assert()
        .failure();

    assert!(!temp_dir.path().join("data/templates.json").exists());
}

#[test]
fn test_export_csv() {
    let temp_dir = setup_test_dir();
    let csv_path = temp_dir.path().join("export/history.csv");

    cli(temp_dir.path())
        .args(["start", "C", "--auto-complete"])
        .assert()
        .success();

    cli(temp_dir.path())
        .arg("export")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 12 sets from 1 workouts"));

    let csv = fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("workout_id,date,workout_type"));
    assert_eq!(csv.lines().count(), 13);
}

#[test]
fn test_config_file_changes_xp() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("kracht.toml");
    fs::write(&config_path, "[progress]\nxp_per_workout = 250\n").unwrap();

    cli(temp_dir.path())
        .args(["start", "A", "--auto-complete"])
        .assert()
        .success();

    // 250 XP: level 3 starts at 250
    cli(temp_dir.path())
        .arg("--config")
        .arg(&config_path)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Level 3"));
}
