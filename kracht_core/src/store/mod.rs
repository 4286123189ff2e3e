//! Persistence contract and backends.
//!
//! Two interchangeable implementations of [`Store`] exist: [`LocalStore`]
//! (files in the data directory) and [`RemoteStore`] (authenticated REST
//! backend). [`open`] picks one from configuration; nothing else in the
//! crate branches on the backend.

mod local;
mod remote;

pub use local::LocalStore;
pub use remote::RemoteStore;

use crate::config::{Backend, Config};
use crate::{Result, User, Workout, WorkoutSnack, WorkoutTemplate};

/// Load/save contract for everything the tracker persists
pub trait Store {
    /// All workouts, newest first
    fn load_workouts(&self) -> Result<Vec<Workout>>;

    /// Insert or replace by id
    fn save_workout(&self, workout: &Workout) -> Result<()>;

    fn delete_workout(&self, id: &str) -> Result<()>;

    /// Stored templates, or the built-in defaults when none are stored
    fn load_templates(&self) -> Result<Vec<WorkoutTemplate>>;

    /// Insert or replace each template by id
    fn save_templates(&self, templates: &[WorkoutTemplate]) -> Result<()>;

    fn delete_template(&self, id: &str) -> Result<()>;

    fn load_profile(&self) -> Result<Option<User>>;

    fn save_profile(&self, user: &User) -> Result<()>;

    fn save_snack(&self, snack: &WorkoutSnack) -> Result<()>;

    /// All snacks, newest first
    fn load_snacks(&self) -> Result<Vec<WorkoutSnack>>;
}

/// Open the backend selected in `config`
pub fn open(config: &Config) -> Result<Box<dyn Store>> {
    config.validate()?;
    match config.storage.backend {
        Backend::Local => {
            tracing::debug!("Using local store at {:?}", config.data.data_dir);
            Ok(Box::new(LocalStore::new(&config.data.data_dir)))
        }
        Backend::Remote => {
            tracing::debug!("Using remote store at {}", config.storage.remote.base_url);
            Ok(Box::new(RemoteStore::new(&config.storage.remote)?))
        }
    }
}

/// Load workouts, degrading to an empty history when storage fails
pub fn load_workouts_or_empty(store: &dyn Store) -> Vec<Workout> {
    store.load_workouts().unwrap_or_else(|e| {
        tracing::warn!("Failed to load workouts: {}. Continuing with empty history.", e);
        Vec::new()
    })
}

/// Load templates, degrading to the built-in defaults when storage fails
pub fn load_templates_or_default(store: &dyn Store) -> Vec<WorkoutTemplate> {
    store.load_templates().unwrap_or_else(|e| {
        tracing::warn!("Failed to load templates: {}. Using built-in templates.", e);
        crate::templates::default_templates()
    })
}
