//! Scene-level state machine
//!
//! The table in [`transition`] is the single source of truth for which scene
//! events are legal in which state. Each accepted transition also names the entry
//! hooks the scene controller runs after switching.

use serde::{Deserialize, Serialize};

/// Slack for the time limit check against accumulated frame time
const CLOCK_EPSILON: f64 = 1e-6;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SceneState {
    /// Title screen, waiting for the first tap
    #[default]
    Initial,
    /// Skiing; the clock runs
    Active,
    /// Paused until dismissed
    Paused,
    /// Crash recovery in progress
    Limbo,
    /// Crossed the finish line
    Won,
    /// Ran out of time
    Lost,
}

impl SceneState {
    /// Won and Lost only leave on an explicit restart
    pub fn is_final(self) -> bool {
        matches!(self, SceneState::Won | SceneState::Lost)
    }
}

/// Things that can move the scene between states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneEvent {
    FirstTap,
    FinishContact,
    ObstacleContact,
    TimeExpired,
    RecoveryElapsed,
    Pause,
    DismissTap,
    Restart,
}

/// Work the scene does on entering a state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneHook {
    ResetClock,
    ClearMovement,
    StopMovement,
    PlayStartSound,
    RespawnPlayer,
}

/// Target state plus entry hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneTransition {
    pub from: SceneState,
    pub to: SceneState,
    pub event: SceneEvent,
    pub hooks: &'static [SceneHook],
}

/// Transition table: `None` means the event is not accepted in `state`
pub fn transition(state: SceneState, event: SceneEvent) -> Option<(SceneState, &'static [SceneHook])> {
    use SceneEvent as E;
    use SceneHook as H;
    use SceneState as S;

    match (state, event) {
        (S::Initial, E::FirstTap) => Some((
            S::Active,
            &[H::ResetClock, H::ClearMovement, H::PlayStartSound],
        )),
        (S::Active, E::FinishContact) => Some((S::Won, &[H::StopMovement])),
        (S::Active, E::ObstacleContact) => Some((S::Limbo, &[])),
        (S::Active, E::TimeExpired) => Some((S::Lost, &[H::StopMovement])),
        (S::Active, E::Pause) => Some((S::Paused, &[])),
        (S::Limbo, E::RecoveryElapsed) => Some((S::Active, &[H::ClearMovement])),
        (S::Paused, E::DismissTap) => Some((S::Active, &[])),
        (S::Won | S::Lost, E::Restart) => Some((S::Initial, &[H::ResetClock, H::RespawnPlayer])),
        _ => None,
    }
}

/// Scene state plus the game clock
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneStateMachine {
    state: SceneState,
    /// Seconds spent in the current state
    time_in_state: f32,
    /// Play time; advances only while Active. Summed in f64 so 60 Hz frames
    /// land on whole seconds.
    elapsed_secs: f64,
}

impl SceneStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn time_in_state(&self) -> f32 {
        self.time_in_state
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed_secs as f32
    }

    pub fn reset_clock(&mut self) {
        self.elapsed_secs = 0.0;
    }

    /// Feed an event through the table. Rejected events leave the state as is.
    pub fn handle(&mut self, event: SceneEvent) -> Option<SceneTransition> {
        let (to, hooks) = transition(self.state, event)?;
        let from = self.state;
        self.state = to;
        self.time_in_state = 0.0;
        log::info!("Scene {:?} -> {:?} ({:?})", from, to, event);
        Some(SceneTransition {
            from,
            to,
            event,
            hooks,
        })
    }

    /// Advance timers
    pub fn update(&mut self, dt: f32) {
        self.time_in_state += dt;
        if self.state == SceneState::Active {
            self.elapsed_secs += f64::from(dt);
        }
    }

    pub fn time_expired(&self, limit_secs: f32) -> bool {
        self.state == SceneState::Active
            && self.elapsed_secs + CLOCK_EPSILON >= f64::from(limit_secs)
    }
}
