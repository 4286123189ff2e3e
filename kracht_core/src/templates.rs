//! Built-in workout templates and template helpers.
//!
//! The three default templates are what a fresh store falls back to.

use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;

/// Cached default templates - built once and reused
static DEFAULT_TEMPLATES: Lazy<Vec<WorkoutTemplate>> = Lazy::new(build_default_templates);

/// Rest used by the built-in templates
const BUILTIN_REST_SECONDS: u32 = 180;

/// Get a reference to the cached default templates
pub fn get_default_templates() -> &'static [WorkoutTemplate] {
    &DEFAULT_TEMPLATES
}

/// Owned copy of the default templates, for stores that need to return them
pub fn default_templates() -> Vec<WorkoutTemplate> {
    DEFAULT_TEMPLATES.clone()
}

fn exercise(name: &str, display_name: &str, target_reps: &str, sets: u32) -> TemplateExercise {
    TemplateExercise {
        name: name.into(),
        display_name: display_name.into(),
        target_reps: target_reps.into(),
        sets,
        rest_time: Some(BUILTIN_REST_SECONDS),
    }
}

fn build_default_templates() -> Vec<WorkoutTemplate> {
    vec![
        WorkoutTemplate {
            id: "A".into(),
            name: "A".into(),
            description: "Full Body - Press Focus".into(),
            exercises: vec![
                exercise("seated_oh_press", "Seated OH Press", "10-15", 3),
                exercise("pull_up", "Pull-up", "5-10", 3),
                exercise("lateral_raises", "Lateral Raises", "10-15", 3),
                exercise("squat", "Squat", "8-12", 3),
                exercise("incline_db_press", "Incline Dumbbell Press", "10-15", 3),
            ],
        },
        WorkoutTemplate {
            id: "B".into(),
            name: "B".into(),
            description: "Full Body - Pull Focus".into(),
            exercises: vec![
                exercise("pull_up", "Pull-up", "Failure", 3),
                exercise("seated_oh_press", "Seated OH Press", "8-12", 3),
                exercise("deadlift", "Deadlift", "5-8", 3),
                exercise("incline_db_press", "Incline Dumbbell Press", "8-12", 3),
                exercise("seated_row", "Seated Row", "10-15", 3),
            ],
        },
        WorkoutTemplate {
            id: "C".into(),
            name: "C".into(),
            description: "Full Body - Core & Stability".into(),
            exercises: vec![
                exercise("seated_oh_press", "Seated OH Press", "10-15", 2),
                exercise("pull_up", "Pull-up", "Failure", 2),
                exercise("abs_roller", "Abs Roller", "5-10", 2),
                exercise("squat", "Squat", "8-12", 2),
                exercise("seated_row", "Seated Row", "10-15", 2),
                exercise("incline_db_press", "Incline Dumbbell Press", "10-15", 2),
            ],
        },
    ]
}

impl WorkoutTemplate {
    /// Empty template as the editor creates it
    pub fn blank(name: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            name: name.into(),
            description: String::new(),
            exercises: Vec::new(),
        }
    }

    /// Default exercise row added by the editor
    pub fn new_exercise() -> TemplateExercise {
        let id = generate_id();
        TemplateExercise {
            name: format!("ex_{}", &id[..8]),
            display_name: "New Exercise".into(),
            target_reps: "10-12".into(),
            sets: 3,
            rest_time: Some(DEFAULT_REST_SECONDS),
        }
    }

    /// Total planned sets
    pub fn set_count(&self) -> u32 {
        self.exercises.iter().map(|e| e.sets).sum()
    }

    /// Validate template integrity
    ///
    /// Returns a list of validation errors (empty if valid)
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.id.trim().is_empty() {
            errors.push("Template id is empty".to_string());
        }
        if self.name.trim().is_empty() {
            errors.push(format!("Template '{}' has no name", self.id));
        }

        for (idx, ex) in self.exercises.iter().enumerate() {
            if ex.display_name.trim().is_empty() {
                errors.push(format!(
                    "Template '{}' exercise {} has no display name",
                    self.name,
                    idx + 1
                ));
            }
            if ex.sets == 0 {
                errors.push(format!(
                    "Template '{}' exercise '{}' has zero sets",
                    self.name, ex.display_name
                ));
            }
        }

        errors
    }

    /// Validate and convert the error list into a single `InvalidInput`
    pub fn ensure_valid(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidInput(errors.join("; ")))
        }
    }
}

/// Find a template by id, falling back to a case-insensitive name match
pub fn find_template<'a>(templates: &'a [WorkoutTemplate], key: &str) -> Option<&'a WorkoutTemplate> {
    templates
        .iter()
        .find(|t| t.id == key)
        .or_else(|| templates.iter().find(|t| t.name.eq_ignore_ascii_case(key)))
}

/// Insert or replace templates by id, keeping existing order
pub fn upsert_templates(existing: &mut Vec<WorkoutTemplate>, incoming: &[WorkoutTemplate]) {
    for template in incoming {
        match existing.iter_mut().find(|t| t.id == template.id) {
            Some(slot) => *slot = template.clone(),
            None => existing.push(template.clone()),
        }
    }
}
