//! Terminal formatting helpers.

use kracht_core::{Exercise, Session, Workout};

/// `m:ss`, or `h:mm:ss` from one hour on
pub fn clock(seconds: u64) -> String {
    let (h, m, s) = (seconds / 3600, (seconds / 60) % 60, seconds % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Weight without a trailing `.0`
pub fn kg(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{:.0}", weight)
    } else {
        format!("{:.1}", weight)
    }
}

pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub fn banner(title: &str) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", title);
    println!("╰─────────────────────────────────────────╯");
}

fn exercise_line(index: usize, exercise: &Exercise, current: bool) {
    let done = exercise.sets().iter().filter(|s| s.completed).count();
    let marker = if current { "▶" } else { " " };
    let check = if exercise.is_completed() { " ✓" } else { "" };
    println!(
        "{} {}. {}  {}/{} sets{}  (rest {})",
        marker,
        index + 1,
        exercise.name,
        done,
        exercise.sets().len(),
        check,
        clock(u64::from(exercise.rest_time_seconds))
    );
}

fn set_lines(exercise: &Exercise) {
    for (idx, set) in exercise.sets().iter().enumerate() {
        println!(
            "     {}  [{}] {} × {} kg",
            idx + 1,
            if set.completed { "x" } else { " " },
            set.reps,
            kg(set.weight)
        );
    }
}

/// Exercise list with the sets of the current exercise expanded
pub fn session(session: &Session, elapsed_seconds: u64) {
    let workout = session.workout();
    println!();
    println!(
        "Workout {}  ·  {}  ·  {}/{} sets",
        workout.workout_type,
        clock(elapsed_seconds),
        workout.completed_set_count(),
        workout.set_count()
    );
    for (idx, exercise) in workout.exercises.iter().enumerate() {
        let current = idx == session.current_exercise_index();
        exercise_line(idx, exercise, current);
        if current {
            set_lines(exercise);
        }
    }
}

/// Full breakdown of a stored workout
pub fn workout(workout: &Workout) {
    println!(
        "{}  Workout {}  {} min  {} kg  ({})",
        workout.date.format("%Y-%m-%d %H:%M"),
        workout.workout_type,
        workout.duration_minutes,
        kg(workout.volume()),
        workout.id
    );
    for (idx, exercise) in workout.exercises.iter().enumerate() {
        exercise_line(idx, exercise, false);
        set_lines(exercise);
    }
}

pub fn finished(workout: &Workout) {
    println!("\n✓ Workout saved!");
    println!("  Duration: {} min", workout.duration_minutes);
    println!(
        "  Sets:     {}/{}",
        workout.completed_set_count(),
        workout.set_count()
    );
    println!("  Volume:   {} kg", kg(workout.volume()));
}

/// Fixed-width bar for a percentage in [0, 100]
pub fn bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
