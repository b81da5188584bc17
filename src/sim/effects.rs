//! Commands the simulation emits for rendering, physics and audio collaborators
//!
//! The sim never talks to those systems directly; it appends `Effect`s that the
//! host drains after each frame (see `crate::host::dispatch`).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::category::BodyMask;

/// Opaque handle for a world object owned by the renderer / physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// What kind of node to place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Player,
    /// Floating score popup
    ScoreLabel { text: String },
}

/// HUD labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HudLabel {
    Score,
    Time,
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Run started
    Start,
    /// Crossed the finish line
    Finish,
}

/// Skier animation sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnimationState {
    #[default]
    Idle,
    Left,
    Right,
    Crash,
}

/// A command for one collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    PlaceNode {
        node: NodeId,
        kind: NodeKind,
        position: Vec2,
    },
    RemoveNode(NodeId),
    SetPosition {
        node: NodeId,
        position: Vec2,
    },
    /// Texture animation for the node's current state
    RunAnimation {
        node: NodeId,
        animation: AnimationState,
    },
    SetCollisionMask {
        node: NodeId,
        mask: BodyMask,
    },
    SetCameraPosition(Vec2),
    SetLabelText {
        label: HudLabel,
        text: String,
    },
    PlaySound(SoundEffect),
}
