//! Per-player state machine

use serde::{Deserialize, Serialize};

/// What the skier is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EntityState {
    /// Spawn animation playing
    #[default]
    Appearing,
    /// Steering with player input
    InputControlled,
    /// Fallen over, waiting for recovery
    Crashed,
    /// Crossed the finish line
    ReachedFinish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityEvent {
    SpawnComplete,
    ObstacleContact,
    RecoveryComplete,
    FinishContact,
    Reset,
}

/// Transition table for the skier
pub fn transition(state: EntityState, event: EntityEvent) -> Option<EntityState> {
    use EntityEvent as E;
    use EntityState as S;

    match (state, event) {
        (_, E::Reset) => Some(S::Appearing),
        (S::Appearing, E::SpawnComplete) => Some(S::InputControlled),
        (S::InputControlled, E::ObstacleContact) => Some(S::Crashed),
        (S::Crashed, E::RecoveryComplete) => Some(S::InputControlled),
        (S::InputControlled, E::FinishContact) => Some(S::ReachedFinish),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStateMachine {
    state: EntityState,
    time_in_state: f32,
    /// Spawn animation length
    appear_secs: f32,
}

impl EntityStateMachine {
    pub fn new(appear_secs: f32) -> Self {
        Self {
            state: EntityState::Appearing,
            time_in_state: 0.0,
            appear_secs,
        }
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }

    /// Only InputControlled consumes movement
    pub fn accepts_movement(&self) -> bool {
        self.state == EntityState::InputControlled
    }

    pub fn handle(&mut self, event: EntityEvent) -> Option<EntityState> {
        match transition(self.state, event) {
            Some(next) => {
                log::debug!("Player {:?} -> {:?} ({:?})", self.state, next, event);
                self.state = next;
                self.time_in_state = 0.0;
                Some(next)
            }
            None => {
                log::debug!("Player ignored {:?} while {:?}", event, self.state);
                None
            }
        }
    }

    /// Advance timers; finishes the spawn animation once it has played out.
    /// Returns the new state if one was entered.
    pub fn update(&mut self, dt: f32) -> Option<EntityState> {
        self.time_in_state += dt;
        if self.state == EntityState::Appearing && self.time_in_state >= self.appear_secs {
            return self.handle(EntityEvent::SpawnComplete);
        }
        None
    }
}
