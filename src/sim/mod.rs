//! Gameplay simulation
//!
//! All gameplay state lives here. No rendering, physics or audio code: the sim
//! consumes contacts and input and produces `Effect` commands.

pub mod category;
pub mod contact;
pub mod effects;
pub mod entity;
pub mod phase;
pub mod player;
pub mod scene;
pub mod schedule;

pub use category::{BodyMask, CategoryMask, CollisionCategory};
pub use contact::{Body, ContactCommand, ContactContext, ContactEvent, ContactResolver, ContactRule, Deferred};
pub use effects::{AnimationState, Effect, HudLabel, NodeId, NodeKind, SoundEffect};
pub use entity::{EntityEvent, EntityState, EntityStateMachine};
pub use phase::{SceneEvent, SceneHook, SceneState, SceneStateMachine, SceneTransition};
pub use player::{
    AnimationComponent, MoveComponent, PhysicsComponent, PlayerBuilder, PlayerEntity,
    RenderComponent, SpriteComponent,
};
pub use scene::Scene;
pub use schedule::Scheduler;
