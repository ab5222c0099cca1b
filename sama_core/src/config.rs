//! Configuration file support for Sama.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/sama/config.toml`.

use crate::phase::{CycleProfile, DEFAULT_CYCLE_LENGTH, DEFAULT_MENSTRUAL_LENGTH};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub cycle: CycleConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_habits_file")]
    pub habits_file: String,

    #[serde(default = "default_medications_file")]
    pub medications_file: String,

    #[serde(default = "default_period_file")]
    pub period_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            habits_file: default_habits_file(),
            medications_file: default_medications_file(),
            period_file: default_period_file(),
        }
    }
}

impl DataConfig {
    pub fn habits_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.habits_file)
    }

    pub fn medications_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.medications_file)
    }

    pub fn period_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.period_file)
    }
}

/// Default cycle profile used when the caller gives none
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CycleConfig {
    #[serde(default = "default_cycle_length")]
    pub cycle_length: u32,

    #[serde(default = "default_menstrual_length")]
    pub menstrual_length: u32,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            cycle_length: default_cycle_length(),
            menstrual_length: default_menstrual_length(),
        }
    }
}

impl CycleConfig {
    pub fn profile(&self) -> CycleProfile {
        CycleProfile::new(self.cycle_length, self.menstrual_length)
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("sama")
}

fn default_habits_file() -> String {
    "habits.csv".into()
}

fn default_medications_file() -> String {
    "medications.csv".into()
}

fn default_period_file() -> String {
    "periods.csv".into()
}

fn default_cycle_length() -> u32 {
    DEFAULT_CYCLE_LENGTH
}

fn default_menstrual_length() -> u32 {
    DEFAULT_MENSTRUAL_LENGTH
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from a specific path
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
        base.join("sama").join("config.toml")
    }

    /// Check file names and cycle ranges
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("habits_file", &self.data.habits_file),
            ("medications_file", &self.data.medications_file),
            ("period_file", &self.data.period_file),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("data.{} must not be empty", key)));
            }
        }

        self.cycle
            .profile()
            .validate()
            .map_err(|e| Error::Config(e.to_string()))
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
