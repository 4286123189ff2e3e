//! Active workout session state machine.
//!
//! A [`Session`] owns one in-progress workout: the exercise cursor, per-set
//! completion and the rest countdown. Template selection and seeding happen
//! inside [`Session::start`], so a session is in progress as soon as it
//! exists. It ends by being consumed through [`Session::finish`] or
//! [`Session::quit`].
//!
//! The session never reads a clock on its own. Callers pass `now` to start
//! and finish, and drive the rest countdown with one [`Session::tick_rest`]
//! per elapsed second.

use crate::history::latest_completed_of_type;
use crate::types::*;
use crate::Result;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// Pause between the countdown reaching zero and the rest overlay closing
pub const DEFAULT_REST_GRACE: Duration = Duration::from_millis(500);

/// Lifecycle of a workout session as seen by the UI
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No active workout
    Idle,
    /// Exercise cursor and elapsed timer running
    InProgress,
    /// Rest countdown overlay shown
    Resting { remaining: u32, total: u32 },
    /// Finished workout kept in memory because the save failed
    SaveFailed,
    /// Terminal: workout persisted
    Finished,
    /// Terminal: session discarded
    Quit,
}

// ============================================================================
// Audible cues
// ============================================================================

/// Short tones played during the last seconds of a rest
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    /// Remaining 5 and 4
    Countdown,
    /// Remaining 3, 2 and 1
    FinalCountdown,
    /// Remaining reached zero
    Ready,
}

impl Tone {
    pub fn frequency_hz(self) -> u32 {
        match self {
            Tone::Countdown => 800,
            Tone::FinalCountdown => 1000,
            Tone::Ready => 1200,
        }
    }

    pub fn duration_ms(self) -> u32 {
        match self {
            Tone::Countdown | Tone::FinalCountdown => 150,
            Tone::Ready => 300,
        }
    }

    /// Tone for a countdown value, if any
    pub fn for_remaining(remaining: u32) -> Option<Tone> {
        match remaining {
            0 => Some(Tone::Ready),
            1..=3 => Some(Tone::FinalCountdown),
            4..=5 => Some(Tone::Countdown),
            _ => None,
        }
    }
}

/// Output for audible cues. Failures are logged by the session and never
/// interrupt the countdown.
pub trait CueSink {
    fn play(&mut self, tone: Tone) -> Result<()>;
}

/// Cue sink that discards every tone
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl CueSink for Silent {
    fn play(&mut self, _tone: Tone) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// Rest timer
// ============================================================================

/// Countdown shown between sets
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestTimer {
    total: u32,
    remaining: u32,
    expired: bool,
}

impl RestTimer {
    pub fn new(seconds: u32) -> Self {
        Self {
            total: seconds,
            remaining: seconds,
            expired: seconds == 0,
        }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Countdown reached zero and the grace interval is running
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    fn tick(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.expired = self.remaining == 0;
        self.remaining
    }

    fn adjust(&mut self, delta_seconds: i64) -> u32 {
        let adjusted = (i64::from(self.remaining) + delta_seconds).clamp(0, i64::from(u32::MAX));
        self.remaining = adjusted as u32;
        self.expired = self.remaining == 0;
        self.remaining
    }
}

/// Outcome of one rest-countdown tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestTick {
    /// No countdown active; the ticker should be stopped
    NotResting,
    /// Countdown still running
    Counting { remaining: u32 },
    /// Countdown just hit zero; dismiss after the grace interval
    Expired,
    /// Countdown was already at zero and has now been dismissed
    Dismissed,
}

// ============================================================================
// Session
// ============================================================================

/// Tunables for a session
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSettings {
    /// Rest used when a template exercise has none
    pub default_rest_seconds: u32,
    pub rest_grace: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            default_rest_seconds: DEFAULT_REST_SECONDS,
            rest_grace: DEFAULT_REST_GRACE,
        }
    }
}

/// One active workout session
pub struct Session {
    workout: Workout,
    started_at: DateTime<Utc>,
    cursor: usize,
    rest: Option<RestTimer>,
    settings: SessionSettings,
    cues: Box<dyn CueSink>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("workout", &self.workout)
            .field("started_at", &self.started_at)
            .field("cursor", &self.cursor)
            .field("rest", &self.rest)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Build the initial workout for `template`
///
/// Sets are seeded from the most recent completed workout of the same type:
/// exercises are matched by display name, sets by position. Anything without
/// history starts at 0 reps / 0 weight.
pub fn seed_workout(
    template: &WorkoutTemplate,
    history: &[Workout],
    now: DateTime<Utc>,
    default_rest_seconds: u32,
) -> Workout {
    let previous = latest_completed_of_type(history, &template.name);

    let exercises = template
        .exercises
        .iter()
        .map(|planned| {
            let last = previous.and_then(|w| {
                w.exercises
                    .iter()
                    .find(|e| e.name == planned.display_name)
            });

            let sets = (0..planned.sets as usize)
                .map(|idx| {
                    last.and_then(|e| e.set(idx))
                        .map(|s| ExerciseSet::new(s.reps, s.weight))
                        .unwrap_or_default()
                })
                .collect();

            Exercise::new(
                planned.display_name.clone(),
                planned.rest_time.unwrap_or(default_rest_seconds),
                sets,
            )
        })
        .collect();

    Workout {
        id: generate_id(),
        workout_type: template.name.clone(),
        date: now,
        duration_minutes: 0,
        notes: String::new(),
        completed: false,
        exercises,
    }
}

impl Session {
    /// Start a session from `template`, seeding sets from `history`
    pub fn start(
        template: &WorkoutTemplate,
        history: &[Workout],
        now: DateTime<Utc>,
        settings: SessionSettings,
    ) -> Self {
        let workout = seed_workout(template, history, now, settings.default_rest_seconds);

        tracing::info!(
            "Started session {} from template '{}' ({} exercises, {} sets)",
            workout.id,
            template.name,
            workout.exercises.len(),
            workout.set_count()
        );

        Self {
            workout,
            started_at: now,
            cursor: 0,
            rest: None,
            settings,
            cues: Box::new(Silent),
        }
    }

    /// Route audible cues to `cues`
    pub fn with_cues(mut self, cues: Box<dyn CueSink>) -> Self {
        self.cues = cues;
        self
    }

    /// Replace the cue sink of a running session
    pub fn set_cues(&mut self, cues: Box<dyn CueSink>) {
        self.cues = cues;
    }

    pub fn workout(&self) -> &Workout {
        &self.workout
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// InProgress or Resting
    pub fn state(&self) -> SessionState {
        match &self.rest {
            Some(timer) => SessionState::Resting {
                remaining: timer.remaining(),
                total: timer.total(),
            },
            None => SessionState::InProgress,
        }
    }

    pub fn is_resting(&self) -> bool {
        self.rest.is_some()
    }

    pub fn rest(&self) -> Option<&RestTimer> {
        self.rest.as_ref()
    }

    /// Whole seconds since the session started; rest time included
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> u64 {
        (now - self.started_at).num_seconds().max(0) as u64
    }

    // ------------------------------------------------------------------
    // Exercise cursor
    // ------------------------------------------------------------------

    pub fn current_exercise_index(&self) -> usize {
        self.cursor
    }

    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.workout.exercises.get(self.cursor)
    }

    /// Move to the next exercise; false when already on the last one
    pub fn next_exercise(&mut self) -> bool {
        if self.cursor + 1 < self.workout.exercises.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Move to the previous exercise; false when already on the first one
    pub fn previous_exercise(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    pub fn select_exercise(&mut self, index: usize) -> Result<()> {
        self.workout.exercise(index)?;
        self.cursor = index;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Set logging
    // ------------------------------------------------------------------

    /// Update reps; missing input counts as 0
    pub fn set_reps(&mut self, exercise: usize, set: usize, reps: Option<u32>) -> Result<()> {
        self.workout
            .exercise_mut(exercise)?
            .set_reps(set, reps.unwrap_or(0))
    }

    /// Update weight; missing input counts as 0
    pub fn set_weight(&mut self, exercise: usize, set: usize, weight: Option<f64>) -> Result<()> {
        self.workout
            .exercise_mut(exercise)?
            .set_weight(set, weight.unwrap_or(0.0))
    }

    /// Toggle a set's completed flag, returning the new value
    ///
    /// Completing a set starts the exercise's rest countdown unless it is
    /// the final set of the final exercise or the rest is 0. Toggling is
    /// allowed while resting; a new completion restarts the countdown.
    pub fn toggle_set(&mut self, exercise: usize, set: usize) -> Result<bool> {
        let exercise_count = self.workout.exercises.len();
        let target = self.workout.exercise_mut(exercise)?;
        let completed = target.toggle_set(set)?;

        let final_set = exercise + 1 == exercise_count && target.is_last_set(set);
        let rest_seconds = target.rest_time_seconds;

        tracing::debug!(
            "Set {} of '{}' marked {}",
            set + 1,
            target.name,
            if completed { "done" } else { "not done" }
        );

        if completed && !final_set && rest_seconds > 0 {
            self.begin_rest(rest_seconds);
        }

        Ok(completed)
    }

    // ------------------------------------------------------------------
    // Rest countdown
    // ------------------------------------------------------------------

    fn begin_rest(&mut self, seconds: u32) {
        self.rest = Some(RestTimer::new(seconds));
        tracing::info!("Rest started: {}s", seconds);
        self.announce(seconds);
    }

    /// Advance the rest countdown by one second
    pub fn tick_rest(&mut self) -> RestTick {
        let Some(timer) = self.rest.as_mut() else {
            return RestTick::NotResting;
        };

        if timer.is_expired() {
            self.rest = None;
            tracing::debug!("Rest dismissed on tick after expiry");
            return RestTick::Dismissed;
        }

        let remaining = timer.tick();
        self.announce(remaining);

        if remaining == 0 {
            RestTick::Expired
        } else {
            RestTick::Counting { remaining }
        }
    }

    /// Grace interval elapsed: close the overlay if the countdown is still
    /// at zero. Returns whether it was dismissed.
    pub fn expire_rest(&mut self) -> bool {
        match &self.rest {
            Some(timer) if timer.is_expired() => {
                self.rest = None;
                tracing::info!("Rest finished");
                true
            }
            _ => false,
        }
    }

    /// End the rest early
    pub fn skip_rest(&mut self) {
        if self.rest.take().is_some() {
            tracing::info!("Rest skipped");
        }
    }

    /// Add or remove seconds from the running countdown, clamped at 0
    ///
    /// Returns the new remaining time, or `None` when not resting.
    pub fn adjust_rest(&mut self, delta_seconds: i64) -> Option<u32> {
        let remaining = self.rest.as_mut()?.adjust(delta_seconds);
        tracing::debug!("Rest adjusted by {}s to {}s", delta_seconds, remaining);
        self.announce(remaining);
        Some(remaining)
    }

    pub fn rest_grace(&self) -> Duration {
        self.settings.rest_grace
    }

    fn announce(&mut self, remaining: u32) {
        if let Some(tone) = Tone::for_remaining(remaining) {
            if let Err(e) = self.cues.play(tone) {
                tracing::warn!("Failed to play {:?} tone: {}", tone, e);
            }
        }
    }

    // ------------------------------------------------------------------
    // Terminal transitions
    // ------------------------------------------------------------------

    /// Finish the session, producing the completed workout record
    ///
    /// Duration is the floor of elapsed minutes since start.
    pub fn finish(self, now: DateTime<Utc>) -> Workout {
        let elapsed = self.elapsed_seconds(now);
        let mut workout = self.workout;
        workout.completed = true;
        workout.duration_minutes = u32::try_from(elapsed / 60).unwrap_or(u32::MAX);

        tracing::info!(
            "Finished session {} after {} min ({}/{} sets done)",
            workout.id,
            workout.duration_minutes,
            workout.completed_set_count(),
            workout.set_count()
        );

        workout
    }

    /// Abandon the session without persisting anything
    pub fn quit(self) {
        tracing::info!("Quit session {}", self.workout.id);
    }
}
