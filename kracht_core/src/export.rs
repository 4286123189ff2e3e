//! CSV export of workout history.
//!
//! One row per logged set, so the file can be pivoted in a spreadsheet.

use crate::{Result, Workout};
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    workout_id: &'a str,
    date: String,
    workout_type: &'a str,
    duration_minutes: u32,
    workout_completed: bool,
    exercise: &'a str,
    set_number: usize,
    reps: u32,
    weight: f64,
    set_completed: bool,
}

/// Write `workouts` to `path`, replacing any existing file
///
/// Returns the number of set rows written. The file is fsynced before
/// returning.
pub fn write_history_csv(workouts: &[Workout], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = std::fs::File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(file);

    let mut rows = 0;
    for workout in workouts {
        let date = workout.date.to_rfc3339();
        for exercise in &workout.exercises {
            for (idx, set) in exercise.sets().iter().enumerate() {
                writer.serialize(CsvRow {
                    workout_id: &workout.id,
                    date: date.clone(),
                    workout_type: &workout.workout_type,
                    duration_minutes: workout.duration_minutes,
                    workout_completed: workout.completed,
                    exercise: &exercise.name,
                    set_number: idx + 1,
                    reps: set.reps,
                    weight: set.weight,
                    set_completed: set.completed,
                })?;
                rows += 1;
            }
        }
    }

    // Flush and sync to disk
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} sets from {} workouts to {:?}", rows, workouts.len(), path);
    Ok(rows)
}
