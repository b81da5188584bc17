//! Pointer input translation
//!
//! Touches act like a floating joystick: the press point is the anchor and the
//! drag offset from it (scaled by `steer_scale`) is the movement vector. Dragging
//! sideways past the re-grip threshold moves the anchor instead of steering.

use glam::Vec2;

use crate::consts::{REGRIP_THRESHOLD, STEER_SCALE};
use crate::sim::SceneState;

/// Raw pointer event in scene coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Begin(Vec2),
    Move(Vec2),
    End,
}

/// What a tap means in the current scene state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapMode {
    StartGame,
    Steer,
    DismissPause,
    Restart,
    Ignore,
}

impl TapMode {
    pub fn for_state(state: SceneState) -> Self {
        match state {
            SceneState::Initial => TapMode::StartGame,
            SceneState::Active => TapMode::Steer,
            SceneState::Paused => TapMode::DismissPause,
            SceneState::Won | SceneState::Lost => TapMode::Restart,
            SceneState::Limbo => TapMode::Ignore,
        }
    }
}

/// Result of translating one pointer event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    StartGameRequest,
    SteerBegin(Vec2),
    DismissPauseRequest,
    RestartRequest,
    /// New movement vector
    Steer(Vec2),
    /// Drag went past the threshold; anchor moved, no movement this frame
    Regrip(Vec2),
    /// Finger lifted; last movement stays in effect
    Release,
    /// Nothing to do in this state
    Ignored,
}

#[derive(Debug, Clone)]
pub struct InputTranslator {
    anchor: Option<Vec2>,
    regrip_threshold: f32,
    steer_scale: f32,
}

impl Default for InputTranslator {
    fn default() -> Self {
        Self::new(REGRIP_THRESHOLD, STEER_SCALE)
    }
}

impl InputTranslator {
    pub fn new(regrip_threshold: f32, steer_scale: f32) -> Self {
        Self {
            anchor: None,
            regrip_threshold,
            steer_scale,
        }
    }

    pub fn anchor(&self) -> Option<Vec2> {
        self.anchor
    }

    /// Forget the current touch
    pub fn clear(&mut self) {
        self.anchor = None;
    }

    pub fn translate(&mut self, event: PointerEvent, state: SceneState) -> InputAction {
        let mode = TapMode::for_state(state);
        match event {
            PointerEvent::Begin(pos) => match mode {
                TapMode::StartGame => InputAction::StartGameRequest,
                TapMode::Steer => {
                    self.anchor = Some(pos);
                    InputAction::SteerBegin(pos)
                }
                TapMode::DismissPause => InputAction::DismissPauseRequest,
                TapMode::Restart => InputAction::RestartRequest,
                TapMode::Ignore => InputAction::Ignored,
            },
            PointerEvent::Move(pos) => {
                if mode != TapMode::Steer {
                    return InputAction::Ignored;
                }
                let Some(anchor) = self.anchor else {
                    return InputAction::Ignored;
                };
                let delta = pos - anchor;
                if delta.x.abs() >= self.regrip_threshold {
                    self.anchor = Some(pos);
                    return InputAction::Regrip(pos);
                }
                // Unclamped; |x| < threshold / scale but y is unbounded
                InputAction::Steer(delta / self.steer_scale)
            }
            PointerEvent::End => {
                if self.anchor.take().is_some() {
                    InputAction::Release
                } else {
                    InputAction::Ignored
                }
            }
        }
    }
}
