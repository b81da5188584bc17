//! Collaborator interfaces
//!
//! The scene speaks to the outside world only through `Effect`s. A host
//! implements these traits for its renderer, physics world and audio engine and
//! hands the drained effects to [`dispatch`].

use glam::Vec2;

use crate::sim::{AnimationState, BodyMask, Effect, HudLabel, NodeId, NodeKind, SoundEffect};

/// Scene graph / sprite side
pub trait Renderer {
    fn place_node(&mut self, node: NodeId, kind: &NodeKind, position: Vec2);
    fn remove_node(&mut self, node: NodeId);
    fn set_node_position(&mut self, node: NodeId, position: Vec2);
    fn run_animation(&mut self, node: NodeId, animation: AnimationState);
    fn set_camera_position(&mut self, point: Vec2);
    fn set_label_text(&mut self, label: HudLabel, text: &str);
}

/// Physics world side. Contacts flow the other way, through `Scene::queue_contact`.
pub trait PhysicsBodies {
    fn set_collision_mask(&mut self, node: NodeId, mask: &BodyMask);
}

pub trait Audio {
    fn play(&mut self, sound: SoundEffect);
}

/// Apply effects in order
pub fn dispatch<H>(effects: impl IntoIterator<Item = Effect>, host: &mut H)
where
    H: Renderer + PhysicsBodies + Audio,
{
    for effect in effects {
        match effect {
            Effect::PlaceNode {
                node,
                kind,
                position,
            } => host.place_node(node, &kind, position),
            Effect::RemoveNode(node) => host.remove_node(node),
            Effect::SetPosition { node, position } => host.set_node_position(node, position),
            Effect::RunAnimation { node, animation } => host.run_animation(node, animation),
            Effect::SetCollisionMask { node, mask } => host.set_collision_mask(node, &mask),
            Effect::SetCameraPosition(point) => host.set_camera_position(point),
            Effect::SetLabelText { label, text } => host.set_label_text(label, &text),
            Effect::PlaySound(sound) => host.play(sound),
        }
    }
}

/// Host that only logs what it is asked to do
#[derive(Debug, Default)]
pub struct LogHost {
    pub commands: usize,
}

impl Renderer for LogHost {
    fn place_node(&mut self, node: NodeId, kind: &NodeKind, position: Vec2) {
        self.commands += 1;
        log::info!("place {:?} {:?} at ({:.1}, {:.1})", node, kind, position.x, position.y);
    }

    fn remove_node(&mut self, node: NodeId) {
        self.commands += 1;
        log::info!("remove {:?}", node);
    }

    fn set_node_position(&mut self, node: NodeId, position: Vec2) {
        self.commands += 1;
        log::debug!("move {:?} to ({:.1}, {:.1})", node, position.x, position.y);
    }

    fn run_animation(&mut self, node: NodeId, animation: AnimationState) {
        self.commands += 1;
        log::info!("animate {:?}: {:?}", node, animation);
    }

    fn set_camera_position(&mut self, point: Vec2) {
        self.commands += 1;
        log::trace!("camera ({:.1}, {:.1})", point.x, point.y);
    }

    fn set_label_text(&mut self, label: HudLabel, text: &str) {
        self.commands += 1;
        log::debug!("{:?} label = {}", label, text);
    }
}

impl PhysicsBodies for LogHost {
    fn set_collision_mask(&mut self, node: NodeId, mask: &BodyMask) {
        self.commands += 1;
        log::info!("mask {:?}: {:?}", node, mask);
    }
}

impl Audio for LogHost {
    fn play(&mut self, sound: SoundEffect) {
        self.commands += 1;
        log::info!("play {:?}", sound);
    }
}
