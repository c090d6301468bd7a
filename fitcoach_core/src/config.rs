//! Configuration file support for FitCoach.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/fitcoach/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub progression: ProgressionConfig,
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

/// Exercise catalog source
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// CSV file to load instead of the bundled catalog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Difficulty adjustment parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// How many recent feedback entries are considered
    #[serde(default = "default_feedback_window")]
    pub feedback_window: usize,

    /// Mean score that must be strictly exceeded to change tier
    #[serde(default = "default_promote_threshold")]
    pub promote_threshold: f64,

    /// Good/too_easy answers needed for progressive overload
    #[serde(default = "default_success_threshold")]
    pub success_threshold: usize,

    /// Multiplier for time and reps under progressive overload
    #[serde(default = "default_boost_factor")]
    pub boost_factor: f64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            feedback_window: default_feedback_window(),
            promote_threshold: default_promote_threshold(),
            success_threshold: default_success_threshold(),
            boost_factor: default_boost_factor(),
        }
    }
}

impl ProgressionConfig {
    /// Reject parameter combinations that make adjustment meaningless
    pub fn validate(&self) -> Result<()> {
        if self.feedback_window == 0 {
            return Err(Error::Config("feedback_window must be at least 1".into()));
        }
        if !(0.0..1.0).contains(&self.promote_threshold) {
            return Err(Error::Config(format!(
                "promote_threshold must be in [0, 1), got {}",
                self.promote_threshold
            )));
        }
        if !self.boost_factor.is_finite() || self.boost_factor < 1.0 {
            return Err(Error::Config(format!(
                "boost_factor must be >= 1.0, got {}",
                self.boost_factor
            )));
        }
        Ok(())
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|| PathBuf::from("."))
    });
    base.join("fitcoach")
}

fn default_feedback_window() -> usize {
    5
}

fn default_promote_threshold() -> f64 {
    0.5
}

fn default_success_threshold() -> usize {
    3
}

fn default_boost_factor() -> f64 {
    1.1
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
        config.progression.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        base.join("fitcoach").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
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
