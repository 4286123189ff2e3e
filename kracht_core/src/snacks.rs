//! Workout snacks: short single-exercise sessions outside a full workout.

use crate::types::*;
use chrono::{DateTime, Utc};

/// Approximate duration recorded for every snack
pub const SNACK_DURATION_MINUTES: u32 = 5;

/// Sets offered for a snack
pub const SNACK_SET_COUNT: usize = 3;

/// A built-in snack exercise
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnackOption {
    pub name: &'static str,
    pub display_name: &'static str,
    pub target: &'static str,
    pub reps: &'static str,
}

pub const SNACK_OPTIONS: &[SnackOption] = &[
    SnackOption {
        name: "biceps_curl",
        display_name: "Biceps Curl",
        target: "Biceps",
        reps: "10-15",
    },
    SnackOption {
        name: "triceps_pushdown",
        display_name: "Triceps Pushdown",
        target: "Triceps",
        reps: "10-15",
    },
    SnackOption {
        name: "dips",
        display_name: "Dips",
        target: "Triceps/Chest",
        reps: "8-12",
    },
    SnackOption {
        name: "seated_row",
        display_name: "Seated Row",
        target: "Back",
        reps: "10-15",
    },
    SnackOption {
        name: "abs_roller",
        display_name: "Abs Roller",
        target: "Core",
        reps: "8-15",
    },
    SnackOption {
        name: "lateral_raises",
        display_name: "Lateral Raises",
        target: "Shoulders",
        reps: "12-15",
    },
];

/// Look up a snack by key or display name (case-insensitive)
pub fn find_snack(key: &str) -> Option<&'static SnackOption> {
    SNACK_OPTIONS
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(key) || s.display_name.eq_ignore_ascii_case(key))
}

impl WorkoutSnack {
    /// Record a finished snack; every entered set counts as completed
    pub fn record(option: &SnackOption, sets: Vec<ExerciseSet>, now: DateTime<Utc>) -> Self {
        let sets = sets
            .into_iter()
            .map(|s| ExerciseSet {
                completed: true,
                ..s
            })
            .collect();

        Self {
            id: generate_id(),
            exercise_name: option.display_name.to_string(),
            date: now,
            sets,
            duration_minutes: SNACK_DURATION_MINUTES,
            completed: true,
        }
    }
}
