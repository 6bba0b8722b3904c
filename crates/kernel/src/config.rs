use std::path::Path;

use cadence_input::KeyBindings;
use cadence_physics::PhysicsSettings;
use serde::{Deserialize, Serialize};

use crate::{EntityTuning, MAX_FRAME_CAP, SchedulerConfig};

/// Errors from loading or validating an [`EngineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "cadence".into(),
            width: 1280,
            height: 720,
        }
    }
}

/// Everything tunable about an engine instance. Missing fields take their
/// defaults, so `{}` is a valid config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scheduler: SchedulerConfig,
    pub entity: EntityTuning,
    pub physics: PhysicsSettings,
    pub bindings: KeyBindings,
    pub window: WindowConfig,
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.frame_cap == 0 {
            return Err(ConfigError::Invalid("scheduler.frame_cap must be > 0".into()));
        }
        if self.scheduler.frame_cap > MAX_FRAME_CAP {
            return Err(ConfigError::Invalid(format!(
                "scheduler.frame_cap must be <= {MAX_FRAME_CAP}"
            )));
        }
        if self.scheduler.max_steps_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "scheduler.max_steps_per_frame must be > 0".into(),
            ));
        }
        if self.entity.max_lateral_speed < 0.0 || self.entity.max_vertical_speed < 0.0 {
            return Err(ConfigError::Invalid("entity speed limits must be >= 0".into()));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid("window size must be non-zero".into()));
        }
        Ok(())
    }
}
