//! Error and anomaly types
//!
//! `ConfigError` and `PersistenceError` are real errors returned through `Result`.
//! `Anomaly` records runtime oddities (stray input, unmatched contacts) that are
//! logged and otherwise ignored.

use core::fmt;

use crate::sim::{CollisionCategory, EntityState, SceneEvent, SceneState};

/// Construction-time problems. Fatal: the scene or entity is not built.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    MissingComponent {
        entity: &'static str,
        component: &'static str,
    },
    InvalidSetting {
        name: &'static str,
        value: f64,
    },
    PlayerAlreadySpawned {
        player_id: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingComponent { entity, component } => {
                write!(f, "a {entity} must have a {component} component")
            }
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid setting `{name}`: {value}")
            }
            Self::PlayerAlreadySpawned { player_id } => {
                write!(f, "player {player_id} is already in the scene")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Storage failures from file or browser backed repositories
#[derive(Debug)]
pub enum PersistenceError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Unavailable(&'static str),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "storage i/o failed: {err}"),
            Self::Json(err) => write!(f, "storage json invalid: {err}"),
            Self::Unavailable(what) => write!(f, "storage unavailable: {what}"),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Non-fatal runtime anomalies, kept so hosts and tests can inspect them
#[derive(Clone, Debug, PartialEq)]
pub enum Anomaly {
    /// Movement arrived while the skier was not taking input
    MovementRejected { state: EntityState },
    /// Pointer event with nothing to act on in the current scene state
    InputIgnored { state: SceneState },
    /// Contact pair not covered by any rule
    UnmatchedContact {
        a: CollisionCategory,
        b: CollisionCategory,
    },
    /// Scene event with no entry in the transition table
    TransitionRejected { state: SceneState, event: SceneEvent },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MovementRejected { state } => {
                write!(f, "movement ignored while player is {state:?}")
            }
            Self::InputIgnored { state } => write!(f, "pointer input ignored in {state:?}"),
            Self::UnmatchedContact { a, b } => write!(f, "no contact rule for {a:?}/{b:?}"),
            Self::TransitionRejected { state, event } => {
                write!(f, "{event:?} has no transition from {state:?}")
            }
        }
    }
}
