//! Workout history queries.
//!
//! Helpers over a loaded history: ordering, lookups used to seed new
//! sessions, calendar views and the progress summary.

use crate::Workout;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::collections::BTreeMap;

/// Sort workouts newest first (stable for equal dates)
pub fn sort_newest_first(workouts: &mut [Workout]) {
    workouts.sort_by(|a, b| b.date.cmp(&a.date));
}

/// Completed workouts only, preserving order
pub fn completed(workouts: &[Workout]) -> impl Iterator<Item = &Workout> {
    workouts.iter().filter(|w| w.completed)
}

/// Most recent completed workout started from the template named `workout_type`
pub fn latest_completed_of_type<'a>(
    workouts: &'a [Workout],
    workout_type: &str,
) -> Option<&'a Workout> {
    completed(workouts)
        .filter(|w| w.workout_type == workout_type)
        .max_by_key(|w| w.date)
}

/// Workouts whose date falls on `day` (UTC)
pub fn workouts_on(workouts: &[Workout], day: NaiveDate) -> Vec<&Workout> {
    workouts
        .iter()
        .filter(|w| w.date.date_naive() == day)
        .collect()
}

/// Day-of-month → number of workouts logged that day, for one month
pub fn month_activity(workouts: &[Workout], year: i32, month: u32) -> BTreeMap<u32, usize> {
    let mut days = BTreeMap::new();
    for workout in workouts {
        let date = workout.date.date_naive();
        if date.year() == year && date.month() == month {
            *days.entry(date.day()).or_insert(0) += 1;
        }
    }
    days
}

/// One point of the progress charts
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressPoint {
    pub date: DateTime<Utc>,
    pub volume: f64,
    pub duration_minutes: u32,
}

/// Aggregate numbers over completed workouts
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressSummary {
    pub completed_count: usize,
    pub total_volume: f64,
    pub average_volume: f64,
    pub total_minutes: u32,
    /// Oldest first
    pub series: Vec<ProgressPoint>,
}

/// Summarise the completed workouts in `workouts`
pub fn progress_summary(workouts: &[Workout]) -> ProgressSummary {
    let mut series: Vec<ProgressPoint> = completed(workouts)
        .map(|w| ProgressPoint {
            date: w.date,
            volume: w.volume(),
            duration_minutes: w.duration_minutes,
        })
        .collect();
    series.sort_by_key(|p| p.date);

    let completed_count = series.len();
    let total_volume: f64 = series.iter().map(|p| p.volume).sum();
    let total_minutes = series.iter().map(|p| p.duration_minutes).sum();
    let average_volume = if completed_count == 0 {
        0.0
    } else {
        total_volume / completed_count as f64
    };

    ProgressSummary {
        completed_count,
        total_volume,
        average_volume,
        total_minutes,
        series,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Exercise, ExerciseSet};
    use chrono::TimeZone;

    fn create_test_workout(workout_type: &str, day: u32, completed: bool) -> Workout {
        Workout {
            id: crate::generate_id(),
            workout_type: workout_type.into(),
            date: Utc.with_ymd_and_hms(2024, 2, day, 18, 0, 0).unwrap(),
            duration_minutes: 40,
            notes: String::new(),
            completed,
            exercises: vec![Exercise::new(
                "Squat",
                180,
                vec![ExerciseSet {
                    reps: 10,
                    weight: 50.0,
                    completed: true,
                }],
            )],
        }
    }

    #[test]
    fn test_latest_completed_of_type() {
        let workouts = vec![
            create_test_workout("A", 10, false),
            create_test_workout("B", 9, true),
            create_test_workout("A", 8, true),
            create_test_workout("A", 3, true),
        ];

        let last = latest_completed_of_type(&workouts, "A").unwrap();
        assert_eq!(last.id, workouts[2].id);
        assert!(latest_completed_of_type(&workouts, "C").is_none());
    }

    #[test]
    fn test_sort_newest_first() {
        let mut workouts = vec![
            create_test_workout("A", 1, true),
            create_test_workout("B", 20, true),
            create_test_workout("C", 5, true),
        ];
        sort_newest_first(&mut workouts);
        let types: Vec<_> = workouts.iter().map(|w| w.workout_type.as_str()).collect();
        assert_eq!(types, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_month_activity_and_day_lookup() {
        let workouts = vec![
            create_test_workout("A", 5, true),
            create_test_workout("B", 5, true),
            create_test_workout("C", 12, false),
        ];

        let days = month_activity(&workouts, 2024, 2);
        assert_eq!(days.get(&5), Some(&2));
        assert_eq!(days.get(&12), Some(&1));
        assert!(month_activity(&workouts, 2024, 3).is_empty());

        let day = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
        assert_eq!(workouts_on(&workouts, day).len(), 2);
    }

    #[test]
    fn test_progress_summary() {
        let workouts = vec![
            create_test_workout("B", 9, true),
            create_test_workout("A", 8, false),
            create_test_workout("A", 3, true),
        ];

        let summary = progress_summary(&workouts);
        assert_eq!(summary.completed_count, 2);
        assert_eq!(summary.total_volume, 1000.0);
        assert_eq!(summary.average_volume, 500.0);
        assert_eq!(summary.total_minutes, 80);
        assert!(summary.series[0].date < summary.series[1].date);
    }

    #[test]
    fn test_progress_summary_empty() {
        let summary = progress_summary(&[]);
        assert_eq!(summary.completed_count, 0);
        assert_eq!(summary.average_volume, 0.0);
    }
}
