//! Contact resolution
//!
//! The physics collaborator reports each new contact between two tagged bodies
//! once (begin-contact semantics; a sustained overlap is not re-reported). The
//! resolver turns each contact into a list of commands for the scene to carry
//! out. It holds no state of its own.
//!
//! Within a frame contacts are resolved finish first, then crashes, then gates,
//! and every rule requires an Active scene. A finish and a crash in the same
//! frame therefore always ends in Won.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::category::CollisionCategory;
use super::effects::{Effect, NodeId, SoundEffect};
use super::entity::{EntityEvent, EntityState};
use super::phase::{SceneEvent, SceneState};
use crate::error::Anomaly;
use crate::settings::Settings;

/// One side of a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    pub category: CollisionCategory,
    pub node: NodeId,
}

impl Body {
    pub fn new(category: CollisionCategory, node: NodeId) -> Self {
        Self { category, node }
    }
}

/// A new contact between two bodies, reported by physics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactEvent {
    pub a: Body,
    pub b: Body,
    /// World position of the contact
    pub position: Vec2,
}

impl ContactEvent {
    pub fn new(a: Body, b: Body, position: Vec2) -> Self {
        Self { a, b, position }
    }

    /// Which rule applies, and the non-player body. Accepts either order.
    pub fn classify(&self) -> Option<(ContactRule, Body)> {
        let other = if self.a.category == CollisionCategory::Player {
            self.b
        } else if self.b.category == CollisionCategory::Player {
            self.a
        } else {
            return None;
        };

        let rule = match other.category {
            CollisionCategory::Finish => ContactRule::Finish,
            CollisionCategory::Gate => ContactRule::Gate,
            category if category.is_obstacle() => ContactRule::Crash,
            _ => return None,
        };
        Some((rule, other))
    }

    /// Sort key: lower resolves first
    pub fn priority(&self) -> u8 {
        match self.classify() {
            Some((rule, _)) => rule.priority(),
            None => u8::MAX,
        }
    }
}

/// Contact rules in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactRule {
    Finish,
    Crash,
    Gate,
}

impl ContactRule {
    pub fn priority(self) -> u8 {
        match self {
            ContactRule::Finish => 0,
            ContactRule::Crash => 1,
            ContactRule::Gate => 2,
        }
    }
}

/// Actions deferred by the crash sequence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Deferred {
    /// Offset the camera from its follow position
    CameraJolt(Vec2),
    /// Crash over: clear the obstacle, undo the slide, hand control back
    Recover { obstacle: NodeId },
}

/// A single instruction for the scene
#[derive(Debug, Clone, PartialEq)]
pub enum ContactCommand {
    Scene(SceneEvent),
    Entity(EntityEvent),
    AddScore(i64),
    StopMovement,
    /// Turn off every player mask so nothing else registers mid-crash
    DisablePlayerBody,
    /// Slide the player by `offset` over `duration` seconds
    Slide { offset: Vec2, duration: f32 },
    SpawnScoreLabel { position: Vec2, text: String },
    Effect(Effect),
    Schedule(Vec<(f32, Deferred)>),
}

/// What the resolver needs to know about the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactContext {
    pub scene: SceneState,
    pub player: Option<NodeId>,
    /// Skier state; finish and crash need a skier under control
    pub entity: EntityState,
}

/// Contact rule parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactResolver {
    pub gate_award: i64,
    pub recovery_delay_secs: f32,
    pub crash_slide_distance: f32,
    pub crash_slide_secs: f32,
    pub camera_jolt: f32,
    pub screen_shake: bool,
}

impl Default for ContactResolver {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl ContactResolver {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            gate_award: settings.gate_award(),
            recovery_delay_secs: settings.recovery_delay_secs,
            crash_slide_distance: settings.crash_slide_distance,
            crash_slide_secs: settings.crash_slide_secs,
            camera_jolt: crate::consts::CAMERA_JOLT,
            screen_shake: settings.screen_shake,
        }
    }

    /// Order a frame's contacts for resolution (stable within a rule)
    pub fn prioritize(events: &mut [ContactEvent]) {
        events.sort_by_key(|e| e.priority());
    }

    /// Commands for one contact. Unmatched pairs come back as an anomaly;
    /// matched contacts outside Active resolve to nothing.
    pub fn resolve(
        &self,
        event: &ContactEvent,
        ctx: &ContactContext,
    ) -> Result<Vec<ContactCommand>, Anomaly> {
        let Some((rule, other)) = event.classify() else {
            return Err(Anomaly::UnmatchedContact {
                a: event.a.category,
                b: event.b.category,
            });
        };

        if ctx.player.is_none() {
            log::debug!("Dropping {:?} contact: no player in scene", rule);
            return Ok(Vec::new());
        }

        if ctx.scene != SceneState::Active {
            log::debug!("Dropping {:?} contact while {:?}", rule, ctx.scene);
            return Ok(Vec::new());
        }

        if rule != ContactRule::Gate && ctx.entity != EntityState::InputControlled {
            log::debug!("Dropping {:?} contact: skier is {:?}", rule, ctx.entity);
            return Ok(Vec::new());
        }

        let commands = match rule {
            ContactRule::Finish => vec![
                ContactCommand::Scene(SceneEvent::FinishContact),
                ContactCommand::Entity(EntityEvent::FinishContact),
                ContactCommand::Effect(Effect::PlaySound(SoundEffect::Finish)),
                ContactCommand::StopMovement,
            ],
            ContactRule::Gate => vec![
                ContactCommand::AddScore(self.gate_award),
                ContactCommand::SpawnScoreLabel {
                    position: event.position,
                    text: format!("+{}", self.gate_award),
                },
            ],
            ContactRule::Crash => self.crash(other.node),
        };
        Ok(commands)
    }

    fn crash(&self, obstacle: NodeId) -> Vec<ContactCommand> {
        let mut commands = vec![
            ContactCommand::Entity(EntityEvent::ObstacleContact),
            ContactCommand::Scene(SceneEvent::ObstacleContact),
            ContactCommand::DisablePlayerBody,
            ContactCommand::Slide {
                offset: Vec2::new(0.0, -self.crash_slide_distance),
                duration: self.crash_slide_secs,
            },
        ];
        if self.screen_shake {
            commands.push(ContactCommand::Schedule(self.camera_jolt_steps()));
        }
        commands.push(ContactCommand::Schedule(vec![(
            self.recovery_delay_secs,
            Deferred::Recover { obstacle },
        )]));
        commands
    }

    /// Five up/down jolts with growing pauses, then settle
    fn camera_jolt_steps(&self) -> Vec<(f32, Deferred)> {
        let up = Vec2::new(0.0, -self.camera_jolt);
        let down = Vec2::new(0.0, self.camera_jolt);
        let mut steps = Vec::with_capacity(11);
        let mut wait = 0.0;
        for pause in [0.10, 0.15, 0.20, 0.25, 0.30] {
            steps.push((wait, Deferred::CameraJolt(up)));
            steps.push((0.05, Deferred::CameraJolt(down)));
            wait = pause;
        }
        steps.push((wait, Deferred::CameraJolt(Vec2::ZERO)));
        steps
    }
}
