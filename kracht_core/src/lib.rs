#![forbid(unsafe_code)]

//! Core domain model and business logic for the Kracht fitness tracker.
//!
//! This crate provides:
//! - Domain types (workouts, exercises, sets, templates, snacks)
//! - The workout session state machine and its host
//! - Volume, personal records, streaks and gamification
//! - Persistence (local files or a remote REST backend)
//! - CSV export

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod templates;
pub mod snacks;
pub mod records;
pub mod gamification;
pub mod streak;
pub mod history;
pub mod session;
pub mod host;
pub mod store;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use templates::{default_templates, find_template, get_default_templates};
pub use records::{personal_records, PersonalRecord};
pub use gamification::{calculate_stats, GamificationStats};
pub use streak::workout_streak;
pub use session::{CueSink, RestTick, Session, SessionSettings, SessionState, Tone};
pub use host::SessionHost;
pub use store::{LocalStore, RemoteStore, Store};
pub use export::write_history_csv;
