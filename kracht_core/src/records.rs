//! Volume and personal-record calculations.
//!
//! All functions here are total: empty or partial input yields zeros or an
//! empty list, never an error.

use crate::{ExerciseSet, Workout};
use std::collections::BTreeMap;

/// Sum of reps × weight over completed sets
pub fn volume(sets: &[ExerciseSet]) -> f64 {
    sets.iter().filter(|s| s.completed).map(ExerciseSet::load).sum()
}

/// Best-ever numbers for one exercise
#[derive(Clone, Debug, PartialEq)]
pub struct PersonalRecord {
    pub exercise: String,
    /// Heaviest completed set weight
    pub max_weight: f64,
    /// The completed set at `max_weight` with the most reps
    pub best_set: ExerciseSet,
    /// Highest single-session volume for this exercise
    pub max_volume: f64,
}

/// Compute personal records across the completed workouts in `history`
///
/// Results are keyed by exercise name and returned in name order.
/// Exercises without a completed set carrying weight are left out.
pub fn personal_records(history: &[Workout]) -> Vec<PersonalRecord> {
    let mut records: BTreeMap<&str, PersonalRecord> = BTreeMap::new();

    for workout in history.iter().filter(|w| w.completed) {
        for exercise in &workout.exercises {
            let record = records
                .entry(exercise.name.as_str())
                .or_insert_with(|| PersonalRecord {
                    exercise: exercise.name.clone(),
                    max_weight: 0.0,
                    best_set: ExerciseSet::default(),
                    max_volume: 0.0,
                });

            for set in exercise.sets().iter().filter(|s| s.completed) {
                let heavier = set.weight > record.max_weight;
                let more_reps_at_max =
                    set.weight == record.max_weight && set.reps > record.best_set.reps;
                if heavier || more_reps_at_max {
                    record.max_weight = set.weight;
                    record.best_set = set.clone();
                }
            }

            record.max_volume = record.max_volume.max(exercise.volume());
        }
    }

    records
        .into_values()
        .filter(|r| r.max_weight > 0.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Exercise;
    use chrono::{TimeZone, Utc};

    fn done(reps: u32, weight: f64) -> ExerciseSet {
        ExerciseSet {
            reps,
            weight,
            completed: true,
        }
    }

    fn workout(completed: bool, exercises: Vec<Exercise>) -> Workout {
        Workout {
            id: crate::generate_id(),
            workout_type: "A".into(),
            date: Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap(),
            duration_minutes: 45,
            notes: String::new(),
            completed,
            exercises,
        }
    }

    #[test]
    fn test_volume_empty_is_zero() {
        assert_eq!(volume(&[]), 0.0);
    }

    #[test]
    fn test_volume_ignores_incomplete_sets() {
        let sets = vec![done(10, 20.0), ExerciseSet::new(10, 100.0), done(5, 10.0)];
        assert_eq!(volume(&sets), 250.0);
    }

    #[test]
    fn test_best_set_tie_break_prefers_reps() {
        let history = vec![workout(
            true,
            vec![Exercise::new(
                "Squat",
                180,
                vec![done(5, 100.0), done(8, 100.0), done(10, 90.0)],
            )],
        )];

        let records = personal_records(&history);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].max_weight, 100.0);
        assert_eq!(records[0].best_set.reps, 8);
    }

    #[test]
    fn test_records_span_sessions() {
        let history = vec![
            workout(
                true,
                vec![Exercise::new("Deadlift", 180, vec![done(5, 120.0), done(5, 120.0)])],
            ),
            workout(
                true,
                vec![Exercise::new("Deadlift", 180, vec![done(3, 130.0)])],
            ),
        ];

        let records = personal_records(&history);
        let dl = &records[0];
        assert_eq!(dl.max_weight, 130.0);
        assert_eq!(dl.best_set, done(3, 130.0));
        assert_eq!(dl.max_volume, 1200.0);
    }

    #[test]
    fn test_records_exclude_weightless_and_unfinished() {
        let history = vec![
            workout(
                true,
                vec![
                    Exercise::new("Pull-up", 180, vec![done(8, 0.0)]),
                    Exercise::new("Squat", 180, vec![ExerciseSet::new(5, 100.0)]),
                ],
            ),
            workout(
                false,
                vec![Exercise::new("Bench", 180, vec![done(5, 80.0)])],
            ),
        ];

        let records = personal_records(&history);
        assert!(records.is_empty());
        assert!(records.iter().all(|r| r.max_weight > 0.0));
    }
}
