//! Ski Slalom - A downhill slalom arcade game
//!
//! Core modules:
//! - `sim`: Gameplay state (scene and player state machines, contacts, scheduling)
//! - `input`: Pointer events to steering / scene requests
//! - `score`: Gate scoring with persistence
//! - `persistence`: Score repositories (memory, file, LocalStorage)
//! - `host`: Collaborator traits and effect dispatch
//! - `settings`: Data-driven tuning

pub mod error;
pub mod host;
pub mod input;
pub mod persistence;
pub mod score;
pub mod settings;
pub mod sim;

pub use error::{Anomaly, ConfigError, PersistenceError};
pub use score::ScoreTracker;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Seconds of Active play before the run is lost
    pub const TIME_LIMIT_SECS: f32 = 60.0;
    /// Crash recovery delay (seconds in Limbo)
    pub const RECOVERY_DELAY_SECS: f32 = 4.0;
    /// Horizontal drag distance that forces a re-grip
    pub const REGRIP_THRESHOLD: f32 = 100.0;
    /// Divisor mapping drag distance to a movement vector
    pub const STEER_SCALE: f32 = 100.0;
    /// Base points for passing a gate
    pub const GATE_POINTS: i64 = 100;
    /// Lowest gate scoring multiplier
    pub const MIN_GATE_MULTIPLIER: i64 = 1;
    /// Distance the skier slides downhill while crashed
    pub const CRASH_SLIDE_DISTANCE: f32 = 48.0;
    /// Duration of the crash slide (seconds)
    pub const CRASH_SLIDE_SECS: f32 = 1.0;
    /// Spawn animation length before the skier takes input
    pub const APPEAR_SECS: f32 = 0.5;
    /// Frame delta clamp (one 60 Hz frame)
    pub const MAX_FRAME_DT: f32 = 1.0 / 60.0;

    /// Skier speeds (units/s)
    pub const DOWNHILL_SPEED: f32 = 90.0;
    pub const STEER_SPEED: f32 = 120.0;

    /// Camera sits this far below the skier
    pub const CAMERA_LEAD_Y: f32 = 60.0;
    /// Camera jolt amplitude during a crash
    pub const CAMERA_JOLT: f32 = 2.0;
}

/// Persisted key for a player's score
#[inline]
pub fn score_key(player_id: u32) -> String {
    format!("player{}_score", player_id)
}

/// Format seconds as `m:ss` for the HUD
pub fn format_clock(elapsed_secs: f32) -> String {
    let total = elapsed_secs.max(0.0) as u32;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_key_layout() {
        assert_eq!(score_key(1), "player1_score");
        assert_eq!(score_key(12), "player12_score");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(9.9), "0:09");
        assert_eq!(format_clock(61.0), "1:01");
        assert_eq!(format_clock(-3.0), "0:00");
    }
}
