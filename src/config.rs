//! Configuration parsing and management for kotoba3d

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::avatar::{ExpressionCatalog, VisemeCatalog};
use crate::error::{ConfigError, Kotoba3dError};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub audio: AudioConfig,
    /// Expression-preset catalogue; replace wholesale for another rig
    pub expressions: ExpressionCatalog,
    /// Viseme catalogue; replace wholesale for another rig
    pub visemes: VisemeCatalog,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Kotoba3dError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::ReadFile(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(s: &str) -> Result<Self, Kotoba3dError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()).into())
    }

    /// Load configuration from default paths
    pub fn load() -> Result<Self, Kotoba3dError> {
        let paths = [
            PathBuf::from("config.toml"),
            PathBuf::from("config/default.toml"),
        ];

        for path in &paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Kotoba3dError> {
        for (field, rate) in [
            ("engine.expression_rate", self.engine.expression_rate),
            ("engine.blink_rate", self.engine.blink_rate),
            ("engine.viseme_rate", self.engine.viseme_rate),
        ] {
            if !(rate > 0.0 && rate <= 1.0) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: "Blend rate must be in (0, 1]".to_string(),
                }
                .into());
            }
        }

        if self.engine.fade_duration < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.fade_duration".to_string(),
                message: "Fade duration must not be negative".to_string(),
            }
            .into());
        }

        if self.engine.clip_time_scale <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.clip_time_scale".to_string(),
                message: "Time scale must be greater than 0".to_string(),
            }
            .into());
        }

        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(ConfigError::InvalidValue {
                field: "audio.volume".to_string(),
                message: "Volume must be between 0.0 and 1.0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Blending-engine tuning and channel/clip naming
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Expression blend rate per frame
    pub expression_rate: f32,
    /// Blink blend rate per frame (faster, so blinks read snappy)
    pub blink_rate: f32,
    /// Viseme blend rate per frame
    pub viseme_rate: f32,
    /// Crossfade duration for clip transitions, in seconds
    pub fade_duration: f32,
    /// Playback speed applied to every requested clip
    pub clip_time_scale: f32,
    /// Clip the controller returns to
    pub idle_clip: String,
    /// Clip used when a message names none
    pub default_clip: String,
    /// Expression used when a message names none
    pub default_expression: String,
    /// Left/right blink channel names
    pub blink_left_channel: String,
    pub blink_right_channel: String,
    /// Mouth channel names driven by lip sync
    pub mouth_open_channel: String,
    pub mouth_smile_channel: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            expression_rate: 0.1,
            blink_rate: 0.5,
            viseme_rate: 0.2,
            fade_duration: 0.5,
            clip_time_scale: 0.5,
            idle_clip: "Idle".to_string(),
            default_clip: "Talking_1".to_string(),
            default_expression: "smile".to_string(),
            blink_left_channel: "eyeBlinkLeft".to_string(),
            blink_right_channel: "eyeBlinkRight".to_string(),
            mouth_open_channel: "mouthOpen".to_string(),
            mouth_smile_channel: "mouthSmile".to_string(),
        }
    }
}

/// Audio output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Open an output device for audible playback
    pub enabled: bool,
    /// Playback volume (0.0 - 1.0)
    pub volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 1.0,
        }
    }
}
