//! Core domain types for the Kracht workout tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Logged sets, exercises and workouts
//! - Workout templates and their exercises
//! - Workout snacks (standalone single-exercise records)
//! - The user profile
//!
//! Field names follow the stored document format so records written by
//! either persistence backend read back unchanged.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rest applied when a template exercise does not specify one
pub const DEFAULT_REST_SECONDS: u32 = 90;

/// Generate a fresh record id
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

// ============================================================================
// Logged Sets and Exercises
// ============================================================================

/// One logged attempt at an exercise
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ExerciseSet {
    #[serde(default)]
    pub reps: u32,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub completed: bool,
}

impl ExerciseSet {
    pub fn new(reps: u32, weight: f64) -> Self {
        Self {
            reps,
            weight,
            completed: false,
        }
    }

    /// reps × weight, regardless of completion
    pub fn load(&self) -> f64 {
        f64::from(self.reps) * self.weight
    }
}

/// An exercise within a workout
///
/// Completion is derived from the sets on every read, so it cannot drift
/// from them. Sets are only mutable through the methods below.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "ExerciseRecord", into = "ExerciseRecord")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub rest_time_seconds: u32,
    sets: Vec<ExerciseSet>,
}

/// Stored shape of an exercise; the `completed` column is written for
/// readers of the raw documents and ignored on load.
#[derive(Serialize, Deserialize)]
struct ExerciseRecord {
    id: String,
    name: String,
    #[serde(default = "default_rest_seconds")]
    rest_time_seconds: u32,
    #[serde(default)]
    sets: Vec<ExerciseSet>,
    #[serde(default)]
    completed: bool,
}

fn default_rest_seconds() -> u32 {
    DEFAULT_REST_SECONDS
}

impl From<ExerciseRecord> for Exercise {
    fn from(record: ExerciseRecord) -> Self {
        Exercise {
            id: record.id,
            name: record.name,
            rest_time_seconds: record.rest_time_seconds,
            sets: record.sets,
        }
    }
}

impl From<Exercise> for ExerciseRecord {
    fn from(exercise: Exercise) -> Self {
        let completed = exercise.is_completed();
        ExerciseRecord {
            id: exercise.id,
            name: exercise.name,
            rest_time_seconds: exercise.rest_time_seconds,
            sets: exercise.sets,
            completed,
        }
    }
}

impl Exercise {
    /// Create an exercise with a freshly generated id
    pub fn new(name: impl Into<String>, rest_time_seconds: u32, sets: Vec<ExerciseSet>) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            rest_time_seconds,
            sets,
        }
    }

    pub fn sets(&self) -> &[ExerciseSet] {
        &self.sets
    }

    pub fn set(&self, index: usize) -> Option<&ExerciseSet> {
        self.sets.get(index)
    }

    /// True iff every set is completed
    pub fn is_completed(&self) -> bool {
        self.sets.iter().all(|s| s.completed)
    }

    pub fn is_last_set(&self, index: usize) -> bool {
        index + 1 == self.sets.len()
    }

    /// Flip the completed flag of one set, returning the new value
    pub fn toggle_set(&mut self, index: usize) -> Result<bool> {
        let set = self.set_mut(index)?;
        set.completed = !set.completed;
        Ok(set.completed)
    }

    pub fn set_reps(&mut self, index: usize, reps: u32) -> Result<()> {
        self.set_mut(index)?.reps = reps;
        Ok(())
    }

    /// Weight must be a finite, non-negative number
    pub fn set_weight(&mut self, index: usize, weight: f64) -> Result<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::InvalidInput(format!(
                "weight must be a non-negative number, got {}",
                weight
            )));
        }
        self.set_mut(index)?.weight = weight;
        Ok(())
    }

    /// Volume of the completed sets
    pub fn volume(&self) -> f64 {
        crate::records::volume(&self.sets)
    }

    fn set_mut(&mut self, index: usize) -> Result<&mut ExerciseSet> {
        let len = self.sets.len();
        self.sets.get_mut(index).ok_or_else(|| {
            Error::InvalidInput(format!(
                "set {} out of range for '{}' ({} sets)",
                index + 1,
                self.name,
                len
            ))
        })
    }
}

// ============================================================================
// Workouts
// ============================================================================

/// A workout session record, in progress or finished
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    /// Name of the template this workout was started from
    pub workout_type: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub notes: String,
    /// Set when the session was finished (saved), whether or not every set
    /// was ticked off; see [`Workout::all_exercises_completed`] for that
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

impl Workout {
    /// Total volume over all exercises
    pub fn volume(&self) -> f64 {
        self.exercises.iter().map(Exercise::volume).sum()
    }

    /// Whether the session ended with finish rather than being in progress
    ///
    /// Only finished workouts count towards XP and streaks.
    pub fn is_finished(&self) -> bool {
        self.completed
    }

    pub fn all_exercises_completed(&self) -> bool {
        self.exercises.iter().all(Exercise::is_completed)
    }

    pub fn set_count(&self) -> usize {
        self.exercises.iter().map(|e| e.sets().len()).sum()
    }

    pub fn completed_set_count(&self) -> usize {
        self.exercises
            .iter()
            .flat_map(|e| e.sets())
            .filter(|s| s.completed)
            .count()
    }

    pub fn exercise(&self, index: usize) -> Result<&Exercise> {
        self.exercises.get(index).ok_or_else(|| {
            Error::InvalidInput(format!(
                "exercise {} out of range ({} exercises)",
                index + 1,
                self.exercises.len()
            ))
        })
    }

    pub fn exercise_mut(&mut self, index: usize) -> Result<&mut Exercise> {
        let len = self.exercises.len();
        self.exercises.get_mut(index).ok_or_else(|| {
            Error::InvalidInput(format!(
                "exercise {} out of range ({} exercises)",
                index + 1,
                len
            ))
        })
    }
}

// ============================================================================
// Templates
// ============================================================================

/// One planned exercise inside a template
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateExercise {
    pub name: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    /// Free text, e.g. "8-12" or "Failure"
    #[serde(rename = "targetReps", default)]
    pub target_reps: String,
    pub sets: u32,
    /// `None` falls back to the default rest; `Some(0)` disables the timer
    #[serde(rename = "restTime", default, skip_serializing_if = "Option::is_none")]
    pub rest_time: Option<u32>,
}

/// A reusable, ordered exercise plan (e.g. "Training A")
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkoutTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub exercises: Vec<TemplateExercise>,
}

// ============================================================================
// Snacks and Profile
// ============================================================================

/// A lightweight single-exercise record, not linked to any workout
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSnack {
    pub id: String,
    pub exercise_name: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub sets: Vec<ExerciseSet>,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub completed: bool,
}

impl WorkoutSnack {
    pub fn volume(&self) -> f64 {
        crate::records::volume(&self.sets)
    }
}

/// Display language preference
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Nl,
    En,
}

impl std::str::FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "nl" | "dutch" | "nederlands" => Ok(Language::Nl),
            "en" | "english" => Ok(Language::En),
            other => Err(Error::InvalidInput(format!("unknown language: {}", other))),
        }
    }
}

/// User profile
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub language: Language,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: generate_id(),
            name: "Athlete".into(),
            language: Language::default(),
        }
    }
}
