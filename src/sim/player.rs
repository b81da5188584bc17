//! The skier entity and its components
//!
//! The player owns each component by value. `PlayerBuilder` is the only way to
//! assemble one, and refuses to build without the components the scene relies on.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::category::BodyMask;
use super::effects::{AnimationState, NodeId};
use super::entity::{EntityEvent, EntityState, EntityStateMachine};
use crate::consts::*;
use crate::error::{Anomaly, ConfigError};

/// Position of the skier's node in the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderComponent {
    pub node: NodeId,
    pub position: Vec2,
}

/// Texture and sprite geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteComponent {
    pub texture: String,
    pub size: Vec2,
    pub anchor: Vec2,
}

impl Default for SpriteComponent {
    fn default() -> Self {
        Self {
            texture: "idle__00".to_string(),
            size: Vec2::new(16.0, 19.0),
            anchor: Vec2::new(0.5, 0.2),
        }
    }
}

/// Which animation set is running
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimationComponent {
    current: AnimationState,
}

impl AnimationComponent {
    pub fn current(&self) -> AnimationState {
        self.current
    }

    /// Switch animation; returns the new one if it changed
    pub fn select(&mut self, next: AnimationState) -> Option<AnimationState> {
        if self.current == next {
            return None;
        }
        self.current = next;
        Some(next)
    }

    /// Animation matching a steering direction
    pub fn for_movement(movement: Vec2) -> AnimationState {
        if movement.x <= -0.1 {
            AnimationState::Left
        } else if movement.x >= 0.1 {
            AnimationState::Right
        } else {
            AnimationState::Idle
        }
    }
}

/// Physics body masks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsComponent {
    pub mask: BodyMask,
}

impl Default for PhysicsComponent {
    fn default() -> Self {
        Self {
            mask: BodyMask::player_spawn(),
        }
    }
}

/// Steering vector and speeds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveComponent {
    pub movement: Vec2,
    pub downhill_speed: f32,
    pub steer_speed: f32,
}

impl Default for MoveComponent {
    fn default() -> Self {
        Self {
            movement: Vec2::ZERO,
            downhill_speed: DOWNHILL_SPEED,
            steer_speed: STEER_SPEED,
        }
    }
}

impl MoveComponent {
    /// Displacement over `dt`: constant downhill run plus lateral steering
    pub fn displacement(&self, dt: f32) -> Vec2 {
        Vec2::new(self.movement.x * self.steer_speed, -self.downhill_speed) * dt
    }
}

/// The skier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerEntity {
    pub player_id: u32,
    /// Mirrors the persisted score
    pub score: i64,
    /// Seconds since spawn
    pub elapsed_time: f32,
    pub render: RenderComponent,
    pub sprite: SpriteComponent,
    pub animation: AnimationComponent,
    pub physics: PhysicsComponent,
    pub movement: MoveComponent,
    pub state: EntityStateMachine,
    /// Movement inputs refused outside InputControlled
    rejected_inputs: u32,
}

impl PlayerEntity {
    pub fn builder(player_id: u32) -> PlayerBuilder {
        PlayerBuilder::new(player_id)
    }

    pub fn node(&self) -> NodeId {
        self.render.node
    }

    pub fn position(&self) -> Vec2 {
        self.render.position
    }

    pub fn entity_state(&self) -> EntityState {
        self.state.state()
    }

    pub fn is_crashed(&self) -> bool {
        self.state.state() == EntityState::Crashed
    }

    pub fn reached_finish_line(&self) -> bool {
        self.state.state() == EntityState::ReachedFinish
    }

    pub fn rejected_inputs(&self) -> u32 {
        self.rejected_inputs
    }

    /// Store a steering vector. Only an InputControlled skier listens.
    pub fn steer(&mut self, movement: Vec2) -> Result<(), Anomaly> {
        if !self.state.accepts_movement() {
            self.rejected_inputs += 1;
            log::debug!(
                "Player {} ignored movement {:?} while {:?}",
                self.player_id,
                movement,
                self.state.state()
            );
            return Err(Anomaly::MovementRejected {
                state: self.state.state(),
            });
        }
        self.movement.movement = movement;
        Ok(())
    }

    /// Zero the stored movement regardless of state
    pub fn stop(&mut self) {
        self.movement.movement = Vec2::ZERO;
    }

    /// Route an event to the state machine and apply entry side effects.
    /// Returns the animation to start, if it changed.
    pub fn apply(&mut self, event: EntityEvent) -> Option<AnimationState> {
        let next = self.state.handle(event)?;
        self.on_enter(next)
    }

    /// Per-frame update: timers, spawn completion, skiing.
    /// Returns the animation to start, if it changed.
    pub fn update(&mut self, dt: f32, skiing: bool) -> Option<AnimationState> {
        self.elapsed_time += dt;
        let mut started = self.state.update(dt).and_then(|s| self.on_enter(s));

        if skiing && self.state.accepts_movement() {
            self.render.position += self.movement.displacement(dt);
            let wanted = AnimationComponent::for_movement(self.movement.movement);
            started = self.animation.select(wanted).or(started);
        }
        started
    }

    fn on_enter(&mut self, state: EntityState) -> Option<AnimationState> {
        match state {
            EntityState::Appearing | EntityState::InputControlled => {
                self.animation.select(AnimationState::Idle)
            }
            EntityState::Crashed => {
                self.stop();
                self.animation.select(AnimationState::Crash)
            }
            EntityState::ReachedFinish => {
                self.stop();
                self.animation.select(AnimationState::Idle)
            }
        }
    }
}

/// Assembles a `PlayerEntity`, checking required components
#[derive(Debug, Clone)]
pub struct PlayerBuilder {
    player_id: u32,
    score: i64,
    appear_secs: f32,
    render: Option<RenderComponent>,
    sprite: Option<SpriteComponent>,
    physics: Option<PhysicsComponent>,
    movement: Option<MoveComponent>,
}

impl PlayerBuilder {
    pub fn new(player_id: u32) -> Self {
        Self {
            player_id,
            score: 0,
            appear_secs: APPEAR_SECS,
            render: None,
            sprite: None,
            physics: None,
            movement: None,
        }
    }

    pub fn render(mut self, node: NodeId, position: Vec2) -> Self {
        self.render = Some(RenderComponent { node, position });
        self
    }

    pub fn sprite(mut self, sprite: SpriteComponent) -> Self {
        self.sprite = Some(sprite);
        self
    }

    pub fn physics(mut self, physics: PhysicsComponent) -> Self {
        self.physics = Some(physics);
        self
    }

    pub fn movement(mut self, movement: MoveComponent) -> Self {
        self.movement = Some(movement);
        self
    }

    /// Score carried over from storage
    pub fn score(mut self, score: i64) -> Self {
        self.score = score;
        self
    }

    pub fn appear_secs(mut self, secs: f32) -> Self {
        self.appear_secs = secs;
        self
    }

    /// Sprite, physics and movement fall back to defaults; render is required
    pub fn build(self) -> Result<PlayerEntity, ConfigError> {
        let render = self.render.ok_or(ConfigError::MissingComponent {
            entity: "PlayerEntity",
            component: "RenderComponent",
        })?;

        Ok(PlayerEntity {
            player_id: self.player_id,
            score: self.score.max(0),
            elapsed_time: 0.0,
            render,
            sprite: self.sprite.unwrap_or_default(),
            animation: AnimationComponent::default(),
            physics: self.physics.unwrap_or_default(),
            movement: self.movement.unwrap_or_default(),
            state: EntityStateMachine::new(self.appear_secs),
            rejected_inputs: 0,
        })
    }
}
