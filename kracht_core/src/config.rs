//! Configuration file support for Kracht.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/kracht/config.toml`.

use crate::gamification::DEFAULT_XP_PER_WORKOUT;
use crate::session::SessionSettings;
use crate::{Error, Result, DEFAULT_REST_SECONDS};
use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub progress: ProgressConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Which persistence backend to use
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Local,
    Remote,
}

/// Persistence backend selection
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: Backend,

    #[serde(default)]
    pub remote: RemoteConfig,
}

/// Remote REST backend settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    /// Bearer token of the signed-in user; falls back to the api key
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            access_token: None,
            user_id: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Session timing configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_rest_seconds")]
    pub default_rest_seconds: u32,

    #[serde(default = "default_rest_grace_ms")]
    pub rest_grace_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_rest_seconds: default_rest_seconds(),
            rest_grace_ms: default_rest_grace_ms(),
        }
    }
}

impl SessionConfig {
    pub fn settings(&self) -> SessionSettings {
        SessionSettings {
            default_rest_seconds: self.default_rest_seconds,
            rest_grace: Duration::from_millis(self.rest_grace_ms),
        }
    }
}

/// Largest accepted `progress.xp_per_workout`
pub const MAX_XP_PER_WORKOUT: u64 = 1_000_000;

/// Progress and gamification parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_week_start")]
    pub week_start: Weekday,

    #[serde(default = "default_xp_per_workout")]
    pub xp_per_workout: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            week_start: default_week_start(),
            xp_per_workout: default_xp_per_workout(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("kracht")
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_rest_seconds() -> u32 {
    DEFAULT_REST_SECONDS
}

fn default_rest_grace_ms() -> u64 {
    500
}

fn default_week_start() -> Weekday {
    Weekday::Mon
}

fn default_xp_per_workout() -> u64 {
    DEFAULT_XP_PER_WORKOUT
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("kracht").join("config.toml")
    }

    /// Check cross-field requirements
    pub fn validate(&self) -> Result<()> {
        if self.storage.backend == Backend::Remote {
            if self.storage.remote.base_url.trim().is_empty() {
                return Err(Error::Config(
                    "storage.remote.base_url is required for the remote backend".into(),
                ));
            }
            if self.storage.remote.api_key.trim().is_empty() {
                return Err(Error::Config(
                    "storage.remote.api_key is required for the remote backend".into(),
                ));
            }
        }
        if self.progress.xp_per_workout == 0 {
            return Err(Error::Config("progress.xp_per_workout must be positive".into()));
        }
        if self.progress.xp_per_workout > MAX_XP_PER_WORKOUT {
            return Err(Error::Config(format!(
                "progress.xp_per_workout must be at most {}",
                MAX_XP_PER_WORKOUT
            )));
        }
        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
