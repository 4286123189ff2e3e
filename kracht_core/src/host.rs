//! Session lifecycle around the persistence collaborator.
//!
//! [`SessionHost`] is owned by the UI context. It walks a session through
//! Idle → InProgress/Resting → Finished | SaveFailed | Quit, loads history
//! for seeding, and hands the finished workout to the store. Begin and save
//! both complete within one call, so no intermediate state is observable.
//! A failed save keeps the workout in memory so it can be retried.

use crate::session::{Session, SessionSettings, SessionState};
use crate::store::{load_workouts_or_empty, Store};
use crate::{Error, Result, Workout, WorkoutTemplate};
use chrono::{DateTime, Utc};

enum Phase {
    Idle,
    Active(Session),
    SaveFailed(Workout),
    Finished(Workout),
    Quit,
}

/// Owner of at most one active session
pub struct SessionHost {
    store: Box<dyn Store>,
    settings: SessionSettings,
    phase: Phase,
}

impl SessionHost {
    pub fn new(store: Box<dyn Store>, settings: SessionSettings) -> Self {
        Self {
            store,
            settings,
            phase: Phase::Idle,
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn state(&self) -> SessionState {
        match &self.phase {
            Phase::Idle => SessionState::Idle,
            Phase::Active(session) => session.state(),
            Phase::SaveFailed(_) => SessionState::SaveFailed,
            Phase::Finished(_) => SessionState::Finished,
            Phase::Quit => SessionState::Quit,
        }
    }

    /// Start a session from `template`
    ///
    /// History that cannot be loaded only disables seeding. Fails when a
    /// session is active or a finished workout still awaits saving.
    pub fn begin(&mut self, template: &WorkoutTemplate, now: DateTime<Utc>) -> Result<&mut Session> {
        match self.phase {
            Phase::Active(_) => {
                return Err(Error::Session("a workout is already in progress".into()))
            }
            Phase::SaveFailed(_) => {
                return Err(Error::Session(
                    "the last workout has not been saved yet".into(),
                ))
            }
            _ => {}
        }

        tracing::debug!("Starting workout from template '{}'", template.name);
        let history = load_workouts_or_empty(self.store.as_ref());
        let session = Session::start(template, &history, now, self.settings.clone());

        self.phase = Phase::Active(session);
        match &mut self.phase {
            Phase::Active(session) => Ok(session),
            _ => unreachable!("phase was just set to Active"),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.phase {
            Phase::Active(session) => Some(session),
            _ => None,
        }
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        match &mut self.phase {
            Phase::Active(session) => Some(session),
            _ => None,
        }
    }

    /// Finish the active session and persist it
    ///
    /// On a failed save the finished workout stays in memory
    /// ([`SessionState::SaveFailed`]) and the error is returned.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<Workout> {
        let session = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Active(session) => session,
            other => {
                self.phase = other;
                return Err(Error::Session("no workout in progress".into()));
            }
        };

        let workout = session.finish(now);
        self.persist(workout)
    }

    /// Retry saving a workout whose save failed
    pub fn retry_save(&mut self) -> Result<Workout> {
        let workout = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::SaveFailed(workout) => workout,
            other => {
                self.phase = other;
                return Err(Error::Session("no unsaved workout".into()));
            }
        };
        self.persist(workout)
    }

    /// The finished workout awaiting a retry, if any
    pub fn unsaved(&self) -> Option<&Workout> {
        match &self.phase {
            Phase::SaveFailed(workout) => Some(workout),
            _ => None,
        }
    }

    /// Discard the active session (or an unsaved workout) without saving
    pub fn quit(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.phase, Phase::Quit) {
            Phase::Active(session) => {
                session.quit();
                Ok(())
            }
            Phase::SaveFailed(workout) => {
                tracing::warn!("Discarded unsaved workout {}", workout.id);
                Ok(())
            }
            other => {
                self.phase = other;
                Err(Error::Session("no workout in progress".into()))
            }
        }
    }

    fn persist(&mut self, workout: Workout) -> Result<Workout> {
        match self.store.save_workout(&workout) {
            Ok(()) => {
                tracing::info!("Saved workout {}", workout.id);
                self.phase = Phase::Finished(workout.clone());
                Ok(workout)
            }
            Err(e) => {
                tracing::warn!("Failed to save workout {}: {}", workout.id, e);
                self.phase = Phase::SaveFailed(workout);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;
    use crate::templates::default_templates;
    use crate::{User, WorkoutSnack};
    use chrono::Duration;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Store whose workout saves fail until switched on
    struct Flaky {
        inner: LocalStore,
        accept: Rc<Cell<bool>>,
    }

    impl Store for Flaky {
        fn load_workouts(&self) -> Result<Vec<Workout>> {
            self.inner.load_workouts()
        }
        fn save_workout(&self, workout: &Workout) -> Result<()> {
            if self.accept.get() {
                self.inner.save_workout(workout)
            } else {
                Err(Error::StorageUnavailable("offline".into()))
            }
        }
        fn delete_workout(&self, id: &str) -> Result<()> {
            self.inner.delete_workout(id)
        }
        fn load_templates(&self) -> Result<Vec<WorkoutTemplate>> {
            self.inner.load_templates()
        }
        fn save_templates(&self, templates: &[WorkoutTemplate]) -> Result<()> {
            self.inner.save_templates(templates)
        }
        fn delete_template(&self, id: &str) -> Result<()> {
            self.inner.delete_template(id)
        }
        fn load_profile(&self) -> Result<Option<User>> {
            self.inner.load_profile()
        }
        fn save_profile(&self, user: &User) -> Result<()> {
            self.inner.save_profile(user)
        }
        fn save_snack(&self, snack: &WorkoutSnack) -> Result<()> {
            self.inner.save_snack(snack)
        }
        fn load_snacks(&self) -> Result<Vec<WorkoutSnack>> {
            self.inner.load_snacks()
        }
    }

    fn host(dir: &std::path::Path) -> SessionHost {
        SessionHost::new(Box::new(LocalStore::new(dir)), SessionSettings::default())
    }

    #[test]
    fn test_full_lifecycle_persists() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut host = host(temp_dir.path());
        let template = default_templates().remove(0);
        let start = Utc::now();

        assert_eq!(host.state(), SessionState::Idle);
        host.begin(&template, start).unwrap();
        assert_eq!(host.state(), SessionState::InProgress);
        let session = host.session_mut().unwrap();
        session.set_weight(0, 0, Some(30.0)).unwrap();
        session.toggle_set(0, 0).unwrap();
        assert!(matches!(host.state(), SessionState::Resting { .. }));

        let saved = host.finish(start + Duration::seconds(3600)).unwrap();
        assert_eq!(host.state(), SessionState::Finished);
        assert_eq!(saved.duration_minutes, 60);

        let stored = host.store().load_workouts().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, saved.id);

        // next session of the same type is seeded from the saved one
        let next = host.begin(&template, start + Duration::days(2)).unwrap();
        assert_eq!(next.workout().exercises[0].sets()[0].weight, 30.0);
    }

    #[test]
    fn test_cannot_begin_twice() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut host = host(temp_dir.path());
        let template = default_templates().remove(1);

        host.begin(&template, Utc::now()).unwrap();
        assert!(matches!(
            host.begin(&template, Utc::now()),
            Err(Error::Session(_))
        ));
    }

    #[test]
    fn test_quit_discards_without_saving() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut host = host(temp_dir.path());
        let template = default_templates().remove(2);

        host.begin(&template, Utc::now()).unwrap();
        host.quit().unwrap();

        assert_eq!(host.state(), SessionState::Quit);
        assert!(host.store().load_workouts().unwrap().is_empty());
        assert!(host.quit().is_err());
    }

    #[test]
    fn test_failed_save_keeps_workout_for_retry() {
        let temp_dir = tempfile::tempdir().unwrap();
        let accept = Rc::new(Cell::new(false));
        let store = Flaky {
            inner: LocalStore::new(temp_dir.path()),
            accept: accept.clone(),
        };
        let mut host = SessionHost::new(Box::new(store), SessionSettings::default());
        let template = default_templates().remove(0);

        host.begin(&template, Utc::now()).unwrap();
        let err = host.finish(Utc::now()).unwrap_err();
        assert!(err.is_storage());
        assert_eq!(host.state(), SessionState::SaveFailed);

        let pending_id = host.unsaved().unwrap().id.clone();
        assert!(host.unsaved().unwrap().completed);
        assert!(host.begin(&template, Utc::now()).is_err());

        accept.set(true);
        let saved = host.retry_save().unwrap();
        assert_eq!(saved.id, pending_id);
        assert_eq!(host.state(), SessionState::Finished);
        assert_eq!(host.store().load_workouts().unwrap().len(), 1);
    }

    #[test]
    fn test_unreadable_history_still_starts() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("workouts.json"), "not json").unwrap();
        let mut host = host(temp_dir.path());
        let template = default_templates().remove(0);

        let session = host.begin(&template, Utc::now()).unwrap();
        assert_eq!(session.workout().set_count(), 15);
    }
}
