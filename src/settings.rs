//! Game tuning and preferences
//!
//! Persisted as JSON (LocalStorage on web, `ski_settings.json` on native).

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Tuning knobs for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Rules ===
    /// Seconds of Active play before the run is lost
    pub time_limit_secs: f32,
    /// Seconds spent in Limbo after a crash
    pub recovery_delay_secs: f32,
    /// Points for one gate, before the multiplier
    pub gate_points: i64,
    /// Gate scoring multiplier (minimum 1)
    pub gate_multiplier: i64,

    // === Controls ===
    /// Horizontal drag that re-anchors the touch
    pub regrip_threshold: f32,
    /// Drag distance per unit of movement
    pub steer_scale: f32,

    // === Skier ===
    pub appear_secs: f32,
    pub crash_slide_distance: f32,
    pub crash_slide_secs: f32,

    // === Frame ===
    /// Largest delta time accepted by one update
    pub max_frame_dt: f32,

    // === Camera ===
    /// Fixed horizontal camera position (slope centre line)
    pub camera_x: f32,
    /// Camera sits this far below the skier
    pub camera_lead_y: f32,
    /// Screen shake on crashes
    pub screen_shake: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_limit_secs: TIME_LIMIT_SECS,
            recovery_delay_secs: RECOVERY_DELAY_SECS,
            gate_points: GATE_POINTS,
            gate_multiplier: MIN_GATE_MULTIPLIER,

            regrip_threshold: REGRIP_THRESHOLD,
            steer_scale: STEER_SCALE,

            appear_secs: APPEAR_SECS,
            crash_slide_distance: CRASH_SLIDE_DISTANCE,
            crash_slide_secs: CRASH_SLIDE_SECS,

            max_frame_dt: MAX_FRAME_DT,

            camera_x: 0.0,
            camera_lead_y: CAMERA_LEAD_Y,
            screen_shake: true,
        }
    }
}

impl Settings {
    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Points awarded for one gate
    pub fn gate_award(&self) -> i64 {
        self.gate_points * self.gate_multiplier
    }

    /// Reject values the game cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("time_limit_secs", self.time_limit_secs),
            ("regrip_threshold", self.regrip_threshold),
            ("steer_scale", self.steer_scale),
            ("max_frame_dt", self.max_frame_dt),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidSetting {
                    name,
                    value: value as f64,
                });
            }
        }

        let non_negative = [
            ("recovery_delay_secs", self.recovery_delay_secs),
            ("appear_secs", self.appear_secs),
            ("crash_slide_secs", self.crash_slide_secs),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidSetting {
                    name,
                    value: value as f64,
                });
            }
        }

        if self.gate_points <= 0 {
            return Err(ConfigError::InvalidSetting {
                name: "gate_points",
                value: self.gate_points as f64,
            });
        }
        if self.gate_multiplier < MIN_GATE_MULTIPLIER {
            return Err(ConfigError::InvalidSetting {
                name: "gate_multiplier",
                value: self.gate_multiplier as f64,
            });
        }
        Ok(())
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "ski_slalom_settings";

    /// Settings file next to the executable's working directory
    #[cfg(not(target_arch = "wasm32"))]
    const SETTINGS_FILE: &'static str = "ski_settings.json";

    #[cfg(target_arch = "wasm32")]
    fn local_storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }

    /// Load settings from LocalStorage, falling back to defaults
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let stored = Self::local_storage()
            .and_then(|storage| storage.get_item(Self::STORAGE_KEY).ok().flatten());
        match stored.as_deref().map(Self::from_json) {
            Some(Ok(settings)) => {
                log::info!("Loaded settings from LocalStorage");
                settings
            }
            Some(Err(err)) => {
                log::warn!("Ignoring stored settings: {}", err);
                Self::default()
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let Some(storage) = Self::local_storage() else {
            log::warn!("LocalStorage unavailable, settings not saved");
            return;
        };
        match serde_json::to_string(self) {
            Ok(json) => match storage.set_item(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(err) => log::warn!("LocalStorage refused settings: {:?}", err),
            },
            Err(err) => log::warn!("Failed to encode settings: {}", err),
        }
    }

    /// Load settings from `ski_settings.json`, falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        match std::fs::read_to_string(Self::SETTINGS_FILE) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", Self::SETTINGS_FILE);
                    settings
                }
                Err(err) => {
                    log::warn!("Ignoring {}: {}", Self::SETTINGS_FILE, err);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(err) = std::fs::write(Self::SETTINGS_FILE, json) {
                    log::warn!("Failed to save settings: {}", err);
                } else {
                    log::info!("Settings saved");
                }
            }
            Err(err) => log::warn!("Failed to encode settings: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.gate_award(), 100);
        assert_eq!(settings.recovery_delay_secs, 4.0);
        assert_eq!(settings.time_limit_secs, 60.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json(r#"{ "gate_multiplier": 3 }"#).unwrap();
        assert_eq!(settings.gate_multiplier, 3);
        assert_eq!(settings.gate_award(), 300);
        assert_eq!(settings.regrip_threshold, REGRIP_THRESHOLD);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let settings = Settings {
            gate_multiplier: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidSetting { name: "gate_multiplier", .. })
        ));

        let settings = Settings {
            max_frame_dt: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidSetting { name: "max_frame_dt", .. })
        ));

        let settings = Settings {
            recovery_delay_secs: -1.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
