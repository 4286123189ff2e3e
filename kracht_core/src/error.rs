//! Error types for the kracht_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for kracht_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Transport error talking to the remote backend
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The persistence backend could not load or save
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Rejected user input (bad index, blank name, unparsable number)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Session lifecycle misuse (e.g. starting while one is active)
    #[error("Session error: {0}")]
    Session(String),

    /// Lookup by id or name failed
    #[error("Not found: {0}")]
    NotFound(String),
}

impl Error {
    /// True for failures of the persistence collaborator.
    ///
    /// Callers degrade to empty/default results on these instead of aborting.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::Json(_) | Error::Http(_) | Error::StorageUnavailable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_classification() {
        assert!(Error::StorageUnavailable("down".into()).is_storage());
        assert!(Error::Io(io::Error::new(io::ErrorKind::Other, "disk")).is_storage());
        assert!(!Error::InvalidInput("reps".into()).is_storage());
        assert!(!Error::Session("busy".into()).is_storage());
    }
}
