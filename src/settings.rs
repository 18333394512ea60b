//! Global settings shared by every game
//!
//! Persisted as a JSON blob under `gameSettings`. Stored values are merged
//! over the defaults, so older or partial blobs still load.

use serde::{Deserialize, Serialize};

use crate::consts::SETTINGS_KEY;
use crate::error::ArcadeError;
use crate::platform::KeyValueStore;

/// Allowed range for the speed and size multipliers
pub const MULTIPLIER_MIN: f32 = 0.5;
pub const MULTIPLIER_MAX: f32 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Scales ball, puck, tank and bullet speeds
    pub game_speed: f32,
    /// Scales paddle and mallet dimensions
    pub paddle_size: f32,
    /// Sound effects on/off
    #[serde(rename = "soundFX")]
    pub sound_fx: bool,
    /// Vibrate on game over
    pub vibration: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            game_speed: 1.0,
            paddle_size: 1.0,
            sound_fx: true,
            vibration: true,
        }
    }
}

fn clamp_multiplier(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(MULTIPLIER_MIN, MULTIPLIER_MAX)
    } else {
        1.0
    }
}

impl Settings {
    /// Multipliers forced into range
    pub fn sanitized(mut self) -> Self {
        self.game_speed = clamp_multiplier(self.game_speed);
        self.paddle_size = clamp_multiplier(self.paddle_size);
        self
    }

    pub fn set_game_speed(&mut self, value: f32) {
        self.game_speed = clamp_multiplier(value);
    }

    pub fn set_paddle_size(&mut self, value: f32) {
        self.paddle_size = clamp_multiplier(value);
    }

    pub fn from_json(json: &str) -> Result<Self, ArcadeError> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Load from the store, falling back to defaults on a missing or corrupt blob
    pub fn load(store: &dyn KeyValueStore) -> Self {
        if let Some(json) = store.get(SETTINGS_KEY) {
            match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring stored settings: {e}"),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), ArcadeError> {
        let json = serde_json::to_string(self)?;
        store.set(SETTINGS_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
