//! Scene controller
//!
//! Owns the run: scene state machine, the skier, scores, input, deferred
//! sequences and camera. Hosts feed it pointer events and contacts, call
//! `update(dt)` once per frame, then drain the effects it produced.
//!
//! Frame order inside `update`:
//! 1. resolve queued contacts (finish, crash, gate)
//! 2. advance deferred sequences (camera jolt, crash recovery)
//! 3. tick scene clock and skier
//! 4. time limit, camera, HUD labels

use glam::Vec2;

use super::category::BodyMask;
use super::contact::{ContactCommand, ContactContext, ContactEvent, ContactResolver, Deferred};
use super::effects::{AnimationState, Effect, HudLabel, NodeId, NodeKind, SoundEffect};
use super::entity::EntityEvent;
use super::phase::{SceneEvent, SceneHook, SceneState, SceneStateMachine, SceneTransition};
use super::player::PlayerEntity;
use super::schedule::Scheduler;
use crate::error::{Anomaly, ConfigError};
use crate::format_clock;
use crate::input::{InputAction, InputTranslator, PointerEvent};
use crate::persistence::ScoreRepository;
use crate::score::ScoreTracker;
use crate::settings::Settings;

/// Where the skier enters the slope
#[derive(Debug, Clone, Copy, PartialEq)]
struct SpawnPoint {
    player_id: u32,
    position: Vec2,
}

/// Follow camera with a jolt offset
#[derive(Debug, Clone, Default)]
struct CameraRig {
    jolt: Vec2,
    last: Option<Vec2>,
}

/// Crash slide in progress. `applied` is what recovery undoes.
#[derive(Debug, Clone, Copy, Default)]
struct CrashSlide {
    offset: Vec2,
    duration: f32,
    elapsed: f32,
    applied: Vec2,
}

impl CrashSlide {
    fn new(offset: Vec2, duration: f32) -> Self {
        Self {
            offset,
            duration,
            ..Default::default()
        }
    }

    /// Advance by `dt`; returns the displacement for this frame
    fn advance(&mut self, dt: f32) -> Vec2 {
        if self.elapsed >= self.duration {
            return Vec2::ZERO;
        }
        self.elapsed = (self.elapsed + dt).min(self.duration);
        if self.duration - self.elapsed < 1e-4 {
            self.elapsed = self.duration;
        }
        let target = self.offset * (self.elapsed / self.duration);
        let step = target - self.applied;
        self.applied = target;
        step
    }
}

/// Last text sent to each HUD label
#[derive(Debug, Clone, Default)]
struct HudCache {
    score: Option<String>,
    time: Option<String>,
}

pub struct Scene<R: ScoreRepository> {
    settings: Settings,
    phase: SceneStateMachine,
    player: Option<PlayerEntity>,
    spawn: Option<SpawnPoint>,
    scores: ScoreTracker<R>,
    input: InputTranslator,
    resolver: ContactResolver,
    scheduler: Scheduler<Deferred>,
    contacts: Vec<ContactEvent>,
    camera: CameraRig,
    slide: CrashSlide,
    hud: HudCache,
    effects: Vec<Effect>,
    anomalies: Vec<Anomaly>,
    /// Next node ID handed out for nodes the scene creates
    next_node: u32,
}

impl<R: ScoreRepository> Scene<R> {
    /// Node IDs the scene allocates start here; lower IDs belong to the level
    pub const FIRST_SCENE_NODE: u32 = 1 << 20;

    pub fn new(settings: Settings, repo: R) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            input: InputTranslator::new(settings.regrip_threshold, settings.steer_scale),
            resolver: ContactResolver::from_settings(&settings),
            settings,
            phase: SceneStateMachine::new(),
            player: None,
            spawn: None,
            scores: ScoreTracker::new(repo),
            scheduler: Scheduler::new(),
            contacts: Vec::new(),
            camera: CameraRig::default(),
            slide: CrashSlide::default(),
            hud: HudCache::default(),
            effects: Vec::new(),
            anomalies: Vec::new(),
            next_node: Self::FIRST_SCENE_NODE,
        })
    }

    // === Accessors ===

    pub fn state(&self) -> SceneState {
        self.phase.state()
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.phase.elapsed_secs()
    }

    pub fn player(&self) -> Option<&PlayerEntity> {
        self.player.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn scores(&self) -> &ScoreTracker<R> {
        &self.scores
    }

    pub fn input(&self) -> &InputTranslator {
        &self.input
    }

    /// Deferred sequences still running
    pub fn pending_sequences(&self) -> usize {
        self.scheduler.pending()
    }

    /// Take the effects produced since the last drain
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Take the anomalies recorded since the last drain
    pub fn drain_anomalies(&mut self) -> Vec<Anomaly> {
        std::mem::take(&mut self.anomalies)
    }

    // === Setup ===

    /// Place the skier at the level's start tile
    pub fn spawn_player(&mut self, player_id: u32, position: Vec2) -> Result<NodeId, ConfigError> {
        if let Some(player) = &self.player {
            return Err(ConfigError::PlayerAlreadySpawned {
                player_id: player.player_id,
            });
        }
        self.spawn = Some(SpawnPoint {
            player_id,
            position,
        });
        self.place_player(player_id, position)
    }

    fn place_player(&mut self, player_id: u32, position: Vec2) -> Result<NodeId, ConfigError> {
        let node = self.alloc_node();
        let score = self.scores.load(player_id);
        let player = PlayerEntity::builder(player_id)
            .render(node, position)
            .score(score)
            .appear_secs(self.settings.appear_secs)
            .build()?;

        self.effects.push(Effect::PlaceNode {
            node,
            kind: NodeKind::Player,
            position,
        });
        self.effects.push(Effect::SetCollisionMask {
            node,
            mask: player.physics.mask,
        });
        self.effects.push(Effect::RunAnimation {
            node,
            animation: AnimationState::Idle,
        });
        log::info!("Player {} spawned at {:?} with score {}", player_id, position, score);
        self.player = Some(player);
        self.update_camera();
        Ok(node)
    }

    fn alloc_node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    /// Host finished playing the spawn animation before `appear_secs` ran out
    pub fn spawn_animation_finished(&mut self) {
        self.apply_entity(EntityEvent::SpawnComplete);
    }

    // === Input ===

    /// Feed one pointer event
    pub fn handle_pointer(&mut self, event: PointerEvent) -> InputAction {
        let state = self.phase.state();
        let action = self.input.translate(event, state);
        match action {
            InputAction::StartGameRequest => {
                self.send(SceneEvent::FirstTap);
            }
            InputAction::DismissPauseRequest => {
                self.send(SceneEvent::DismissTap);
            }
            InputAction::RestartRequest => {
                self.restart();
            }
            InputAction::Steer(movement) => {
                self.steer(movement);
            }
            InputAction::SteerBegin(_) | InputAction::Regrip(_) | InputAction::Release => {}
            InputAction::Ignored => {
                if !matches!(event, PointerEvent::End) {
                    log::debug!("Pointer {:?} ignored while {:?}", event, state);
                    self.anomalies.push(Anomaly::InputIgnored { state });
                }
            }
        }
        action
    }

    /// Forward a movement vector to the skier
    pub fn steer(&mut self, movement: Vec2) {
        if let Some(player) = &mut self.player {
            if let Err(anomaly) = player.steer(movement) {
                self.anomalies.push(anomaly);
            }
        }
    }

    /// Pause an Active run (focus loss, menu button)
    pub fn pause(&mut self) -> bool {
        self.send(SceneEvent::Pause).is_some()
    }

    /// Start over from a finished run
    pub fn restart(&mut self) -> bool {
        self.send(SceneEvent::Restart).is_some()
    }

    /// Zero the player's stored score
    pub fn reset_score(&mut self) {
        if let Some(player) = &mut self.player {
            self.scores.reset(player.player_id);
            player.score = 0;
        }
    }

    // === Contacts ===

    /// Queue a contact reported by physics; resolved on the next `update`
    pub fn queue_contact(&mut self, event: ContactEvent) {
        self.contacts.push(event);
    }

    fn resolve_contacts(&mut self) {
        if self.contacts.is_empty() {
            return;
        }
        let mut events = std::mem::take(&mut self.contacts);
        ContactResolver::prioritize(&mut events);

        for event in &events {
            let ctx = ContactContext {
                scene: self.phase.state(),
                player: self.player.as_ref().map(|p| p.node()),
                entity: self
                    .player
                    .as_ref()
                    .map(|p| p.entity_state())
                    .unwrap_or_default(),
            };
            match self.resolver.resolve(event, &ctx) {
                Ok(commands) => {
                    for command in commands {
                        self.execute(command);
                    }
                }
                Err(anomaly) => {
                    log::debug!("{}", anomaly);
                    self.anomalies.push(anomaly);
                }
            }
        }
    }

    fn execute(&mut self, command: ContactCommand) {
        match command {
            ContactCommand::Scene(event) => {
                self.send(event);
            }
            ContactCommand::Entity(event) => self.apply_entity(event),
            ContactCommand::AddScore(amount) => {
                if let Some(player) = &mut self.player {
                    player.score = self.scores.increment(player.player_id, amount);
                }
            }
            ContactCommand::StopMovement => self.stop_movement(),
            ContactCommand::DisablePlayerBody => self.set_player_mask(BodyMask::DISABLED),
            ContactCommand::Slide { offset, duration } => {
                if duration > 0.0 {
                    self.slide = CrashSlide::new(offset, duration);
                } else if let Some(player) = &mut self.player {
                    player.render.position += offset;
                    self.slide = CrashSlide {
                        applied: offset,
                        ..Default::default()
                    };
                }
            }
            ContactCommand::SpawnScoreLabel { position, text } => {
                let node = self.alloc_node();
                self.effects.push(Effect::PlaceNode {
                    node,
                    kind: NodeKind::ScoreLabel { text },
                    position,
                });
            }
            ContactCommand::Effect(effect) => self.effects.push(effect),
            ContactCommand::Schedule(steps) => self.scheduler.run(steps),
        }
    }

    fn run_deferred(&mut self, action: Deferred) {
        match action {
            Deferred::CameraJolt(offset) => self.camera.jolt = offset,
            Deferred::Recover { obstacle } => {
                self.effects.push(Effect::RemoveNode(obstacle));
                self.stop_movement();
                let slide = std::mem::take(&mut self.slide);
                if let Some(player) = &mut self.player {
                    player.render.position -= slide.applied;
                }
                self.set_player_mask(BodyMask::player_recovered());
                self.apply_entity(EntityEvent::RecoveryComplete);
                self.send(SceneEvent::RecoveryElapsed);
            }
        }
    }

    // === State plumbing ===

    fn send(&mut self, event: SceneEvent) -> Option<SceneTransition> {
        let Some(transition) = self.phase.handle(event) else {
            let state = self.phase.state();
            log::debug!("Scene ignored {:?} while {:?}", event, state);
            self.anomalies.push(Anomaly::TransitionRejected { state, event });
            return None;
        };
        for hook in transition.hooks {
            self.run_hook(*hook);
        }
        Some(transition)
    }

    fn run_hook(&mut self, hook: SceneHook) {
        match hook {
            SceneHook::ResetClock => self.phase.reset_clock(),
            SceneHook::ClearMovement | SceneHook::StopMovement => self.stop_movement(),
            SceneHook::PlayStartSound => self.effects.push(Effect::PlaySound(SoundEffect::Start)),
            SceneHook::RespawnPlayer => self.respawn(),
        }
    }

    fn respawn(&mut self) {
        let Some(spawn) = self.spawn else {
            return;
        };
        if let Some(old) = self.player.take() {
            self.effects.push(Effect::RemoveNode(old.node()));
        }
        self.input.clear();
        self.contacts.clear();
        self.camera = CameraRig::default();
        self.slide = CrashSlide::default();
        // Builder only fails on a missing render component, which place_player always sets
        if let Err(err) = self.place_player(spawn.player_id, spawn.position) {
            log::warn!("Respawn failed: {}", err);
        }
    }

    fn apply_entity(&mut self, event: EntityEvent) {
        if let Some(player) = &mut self.player {
            if let Some(anim) = player.apply(event) {
                self.effects.push(Effect::RunAnimation {
                    node: player.node(),
                    animation: anim,
                });
            }
        }
    }

    fn stop_movement(&mut self) {
        self.input.clear();
        if let Some(player) = &mut self.player {
            player.stop();
        }
    }

    fn set_player_mask(&mut self, mask: BodyMask) {
        if let Some(player) = &mut self.player {
            player.physics.mask = mask;
            self.effects.push(Effect::SetCollisionMask {
                node: player.node(),
                mask,
            });
        }
    }

    // === Frame ===

    /// Advance the scene by one frame. A non-finite `dt` counts as zero.
    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.settings.max_frame_dt)
        } else {
            log::debug!("Ignoring non-finite frame time {}", dt);
            0.0
        };
        let start = self.player.as_ref().map(|p| p.position());

        self.resolve_contacts();

        if self.phase.state() == SceneState::Paused {
            return;
        }

        for action in self.scheduler.advance(dt) {
            self.run_deferred(action);
        }

        self.phase.update(dt);

        let skiing = self.phase.state() == SceneState::Active;
        let slide = self.slide.advance(dt);
        if let Some(player) = &mut self.player {
            player.render.position += slide;
            if let Some(anim) = player.update(dt, skiing) {
                self.effects.push(Effect::RunAnimation {
                    node: player.node(),
                    animation: anim,
                });
            }
            if start != Some(player.position()) {
                self.effects.push(Effect::SetPosition {
                    node: player.node(),
                    position: player.position(),
                });
            }
        }

        if self.phase.time_expired(self.settings.time_limit_secs) {
            log::info!("Time limit of {}s reached", self.settings.time_limit_secs);
            self.send(SceneEvent::TimeExpired);
        }

        self.update_camera();
        self.update_hud();
    }

    fn update_camera(&mut self) {
        let Some(player) = &self.player else {
            return;
        };
        let target = Vec2::new(
            self.settings.camera_x,
            player.position().y - self.settings.camera_lead_y,
        ) + self.camera.jolt;
        if self.camera.last != Some(target) {
            self.camera.last = Some(target);
            self.effects.push(Effect::SetCameraPosition(target));
        }
    }

    fn update_hud(&mut self) {
        let score = self.player.as_ref().map(|p| p.score).unwrap_or(0).to_string();
        if self.hud.score.as_deref() != Some(score.as_str()) {
            self.effects.push(Effect::SetLabelText {
                label: HudLabel::Score,
                text: score.clone(),
            });
            self.hud.score = Some(score);
        }

        let time = format_clock(self.phase.elapsed_secs());
        if self.hud.time.as_deref() != Some(time.as_str()) {
            self.effects.push(Effect::SetLabelText {
                label: HudLabel::Time,
                text: time.clone(),
            });
            self.hud.time = Some(time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::sim::category::CollisionCategory;
    use crate::sim::contact::Body;
    use crate::sim::entity::EntityState;

    const TREE: NodeId = NodeId(10);
    const GATE: NodeId = NodeId(11);
    const FINISH: NodeId = NodeId(12);

    /// Coarse frames so simulated time sums exactly
    fn test_settings() -> Settings {
        Settings {
            max_frame_dt: 0.5,
            appear_secs: 0.0,
            ..Default::default()
        }
    }

    /// Scene in Active with a skier taking input
    fn active_scene() -> Scene<MemoryStore> {
        let mut scene = Scene::new(test_settings(), MemoryStore::new()).unwrap();
        scene.spawn_player(1, Vec2::new(0.0, 0.0)).unwrap();
        scene.handle_pointer(PointerEvent::Begin(Vec2::ZERO));
        scene.update(0.0);
        assert_eq!(scene.state(), SceneState::Active);
        assert_eq!(scene.player().unwrap().entity_state(), EntityState::InputControlled);
        scene.drain_effects();
        scene
    }

    fn hit(scene: &mut Scene<MemoryStore>, category: CollisionCategory, node: NodeId) {
        let player = scene.player().unwrap().node();
        scene.queue_contact(ContactEvent::new(
            Body::new(category, node),
            Body::new(CollisionCategory::Player, player),
            Vec2::new(5.0, -40.0),
        ));
    }

    #[test]
    fn test_first_tap_starts_and_resets_clock() {
        let mut scene = Scene::new(test_settings(), MemoryStore::new()).unwrap();
        scene.spawn_player(1, Vec2::ZERO).unwrap();
        scene.update(0.5);
        assert_eq!(scene.elapsed_secs(), 0.0);

        assert_eq!(
            scene.handle_pointer(PointerEvent::Begin(Vec2::ZERO)),
            InputAction::StartGameRequest
        );
        assert_eq!(scene.state(), SceneState::Active);
        assert!(scene.drain_effects().contains(&Effect::PlaySound(SoundEffect::Start)));
    }

    #[test]
    fn test_gate_scores_and_persists() {
        let mut scene = active_scene();
        hit(&mut scene, CollisionCategory::Gate, GATE);
        scene.update(0.0);

        assert_eq!(scene.state(), SceneState::Active);
        assert_eq!(scene.player().unwrap().score, 100);
        assert_eq!(scene.scores().repository().get_int("player1_score"), Some(100));

        let effects = scene.drain_effects();
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::PlaceNode { kind: NodeKind::ScoreLabel { text }, position, .. }
                if text == "+100" && *position == Vec2::new(5.0, -40.0)
        )));
        assert!(effects.contains(&Effect::SetLabelText {
            label: HudLabel::Score,
            text: "100".to_string()
        }));
    }

    #[test]
    fn test_crash_recovers_after_exactly_four_seconds() {
        let mut scene = active_scene();
        let before = scene.player().unwrap().position();
        hit(&mut scene, CollisionCategory::Tree, TREE);
        scene.update(0.0);

        assert_eq!(scene.state(), SceneState::Limbo);
        let player = scene.player().unwrap();
        assert!(player.is_crashed());
        assert!(player.physics.mask.is_disabled());
        assert_eq!(player.position(), before);
        let node = player.node();
        let effects = scene.drain_effects();
        assert!(effects.contains(&Effect::SetCollisionMask {
            node,
            mask: BodyMask::DISABLED
        }));

        // The slide plays out over one second
        scene.update(0.5);
        assert_eq!(scene.player().unwrap().position(), before + Vec2::new(0.0, -24.0));
        scene.update(0.5);
        let slid = before + Vec2::new(0.0, -48.0);
        assert_eq!(scene.player().unwrap().position(), slid);
        assert!(scene.drain_effects().contains(&Effect::SetPosition {
            node,
            position: slid
        }));

        // 3.5 seconds: still down
        for _ in 0..5 {
            scene.update(0.5);
        }
        assert_eq!(scene.state(), SceneState::Limbo);
        assert!(!scene.drain_effects().contains(&Effect::RemoveNode(TREE)));

        scene.update(0.5);
        assert_eq!(scene.state(), SceneState::Active);
        let player = scene.player().unwrap();
        assert_eq!(player.entity_state(), EntityState::InputControlled);
        assert_eq!(player.physics.mask, BodyMask::player_recovered());
        assert_eq!(player.movement.movement, Vec2::ZERO);
        assert_eq!(player.position(), before);
        let effects = scene.drain_effects();
        assert!(effects.contains(&Effect::RemoveNode(TREE)));
        assert!(effects.contains(&Effect::SetPosition {
            node,
            position: before
        }));
    }

    #[test]
    fn test_recovery_on_frame_240_at_sixty_hertz() {
        let mut scene = active_scene();
        hit(&mut scene, CollisionCategory::Tree, TREE);
        scene.update(0.0);
        assert_eq!(scene.state(), SceneState::Limbo);

        let mut frames = 0;
        while scene.state() == SceneState::Limbo && frames < 300 {
            scene.update(1.0 / 60.0);
            frames += 1;
        }
        assert_eq!(frames, 240);
        assert_eq!(scene.state(), SceneState::Active);
    }

    #[test]
    fn test_time_limit_on_frame_3600_at_sixty_hertz() {
        let mut scene = active_scene();
        for _ in 0..3599 {
            scene.update(1.0 / 60.0);
        }
        assert_eq!(scene.state(), SceneState::Active);
        scene.update(1.0 / 60.0);
        assert_eq!(scene.state(), SceneState::Lost);
    }

    #[test]
    fn test_skiing_reports_player_position() {
        let mut scene = active_scene();
        let node = scene.player().unwrap().node();
        scene.update(1.0 / 60.0);
        let position = scene.player().unwrap().position();
        assert!(position.y < 0.0);
        assert!(scene
            .drain_effects()
            .contains(&Effect::SetPosition { node, position }));

        // Standing still in Initial reports nothing
        let mut idle = Scene::new(test_settings(), MemoryStore::new()).unwrap();
        idle.spawn_player(1, Vec2::ZERO).unwrap();
        idle.drain_effects();
        idle.update(0.5);
        assert!(!idle
            .drain_effects()
            .iter()
            .any(|e| matches!(e, Effect::SetPosition { .. })));
    }

    #[test]
    fn test_non_finite_frame_time_is_ignored() {
        let mut scene = active_scene();
        hit(&mut scene, CollisionCategory::Rock, TREE);
        scene.update(f32::NAN);
        assert_eq!(scene.state(), SceneState::Limbo);
        scene.update(f32::INFINITY);
        assert_eq!(scene.elapsed_secs(), 0.0);
        assert_eq!(scene.state(), SceneState::Limbo);

        for _ in 0..8 {
            scene.update(0.5);
        }
        assert_eq!(scene.state(), SceneState::Active);
        for _ in 0..120 {
            scene.update(0.5);
        }
        assert_eq!(scene.state(), SceneState::Lost);
        assert_eq!(scene.elapsed_secs(), 60.0);
    }

    #[test]
    fn test_reset_score_clears_storage() {
        let mut scene = active_scene();
        hit(&mut scene, CollisionCategory::Gate, GATE);
        scene.update(0.0);
        assert_eq!(scene.player().unwrap().score, 100);

        scene.reset_score();
        assert_eq!(scene.player().unwrap().score, 0);
        assert_eq!(scene.scores().repository().get_int("player1_score"), Some(0));
    }

    #[test]
    fn test_clock_frozen_during_limbo() {
        let mut scene = active_scene();
        scene.update(0.5);
        hit(&mut scene, CollisionCategory::Rock, TREE);
        scene.update(0.0);
        scene.update(0.5);
        scene.update(0.5);
        assert_eq!(scene.elapsed_secs(), 0.5);
    }

    #[test]
    fn test_second_crash_during_limbo_is_ignored() {
        let mut scene = active_scene();
        hit(&mut scene, CollisionCategory::Tree, TREE);
        scene.update(0.0);
        hit(&mut scene, CollisionCategory::Rock, NodeId(99));
        scene.update(0.5);
        assert_eq!(scene.pending_sequences(), 2);
        for _ in 0..8 {
            scene.update(0.5);
        }
        assert_eq!(scene.state(), SceneState::Active);
        assert!(scene.drain_effects().iter().all(|e| *e != Effect::RemoveNode(NodeId(99))));
    }

    #[test]
    fn test_finish_beats_crash_in_same_frame() {
        let mut scene = active_scene();
        hit(&mut scene, CollisionCategory::Tree, TREE);
        hit(&mut scene, CollisionCategory::Finish, FINISH);
        scene.update(0.0);

        assert_eq!(scene.state(), SceneState::Won);
        let player = scene.player().unwrap();
        assert!(player.reached_finish_line());
        assert!(!player.physics.mask.is_disabled());
        assert_eq!(scene.pending_sequences(), 0);
        assert!(scene.drain_effects().contains(&Effect::PlaySound(SoundEffect::Finish)));
    }

    #[test]
    fn test_crash_beats_gate_in_same_frame() {
        let mut scene = active_scene();
        hit(&mut scene, CollisionCategory::Gate, GATE);
        hit(&mut scene, CollisionCategory::Rock, TREE);
        scene.update(0.0);
        assert_eq!(scene.state(), SceneState::Limbo);
        assert_eq!(scene.player().unwrap().score, 0);
    }

    #[test]
    fn test_movement_ignored_while_crashed() {
        let mut scene = active_scene();
        hit(&mut scene, CollisionCategory::Tree, TREE);
        scene.update(0.0);
        scene.drain_anomalies();

        scene.steer(Vec2::new(0.7, 0.0));
        assert_eq!(scene.player().unwrap().movement.movement, Vec2::ZERO);
        assert_eq!(
            scene.drain_anomalies(),
            vec![Anomaly::MovementRejected {
                state: EntityState::Crashed
            }]
        );
    }

    #[test]
    fn test_time_limit_loses() {
        let mut scene = active_scene();
        for _ in 0..119 {
            scene.update(0.5);
        }
        assert_eq!(scene.state(), SceneState::Active);
        scene.update(0.5);
        assert_eq!(scene.state(), SceneState::Lost);
        assert!(scene.drain_effects().contains(&Effect::SetLabelText {
            label: HudLabel::Time,
            text: "1:00".to_string()
        }));
    }

    #[test]
    fn test_won_absorbs_and_restart_respawns() {
        let mut store = MemoryStore::new();
        store.set_int("player1_score", 300).unwrap();
        let mut scene = Scene::new(test_settings(), store).unwrap();
        let first = scene.spawn_player(1, Vec2::new(4.0, 0.0)).unwrap();
        assert_eq!(scene.player().unwrap().score, 300);
        scene.handle_pointer(PointerEvent::Begin(Vec2::ZERO));
        scene.update(0.5);

        hit(&mut scene, CollisionCategory::Finish, FINISH);
        scene.update(0.0);
        assert_eq!(scene.state(), SceneState::Won);

        assert!(!scene.pause());
        hit(&mut scene, CollisionCategory::Tree, TREE);
        scene.update(0.5);
        assert_eq!(scene.state(), SceneState::Won);
        scene.drain_effects();

        assert_eq!(
            scene.handle_pointer(PointerEvent::Begin(Vec2::ZERO)),
            InputAction::RestartRequest
        );
        assert_eq!(scene.state(), SceneState::Initial);
        assert_eq!(scene.elapsed_secs(), 0.0);
        let player = scene.player().unwrap();
        assert_ne!(player.node(), first);
        assert_eq!(player.position(), Vec2::new(4.0, 0.0));
        assert_eq!(player.entity_state(), EntityState::Appearing);
        assert_eq!(player.score, 300);
        assert!(scene.drain_effects().contains(&Effect::RemoveNode(first)));
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut scene = active_scene();
        scene.update(0.5);
        let pos = scene.player().unwrap().position();
        assert!(scene.pause());
        scene.update(0.5);
        assert_eq!(scene.elapsed_secs(), 0.5);
        assert_eq!(scene.player().unwrap().position(), pos);

        assert_eq!(
            scene.handle_pointer(PointerEvent::Begin(Vec2::ZERO)),
            InputAction::DismissPauseRequest
        );
        assert_eq!(scene.state(), SceneState::Active);
    }

    #[test]
    fn test_regrip_through_scene() {
        let mut scene = active_scene();
        scene.handle_pointer(PointerEvent::Begin(Vec2::ZERO));
        scene.handle_pointer(PointerEvent::Move(Vec2::new(150.0, 0.0)));
        assert_eq!(scene.player().unwrap().movement.movement, Vec2::ZERO);
        assert_eq!(scene.input().anchor(), Some(Vec2::new(150.0, 0.0)));

        scene.handle_pointer(PointerEvent::Move(Vec2::new(160.0, 0.0)));
        let movement = scene.player().unwrap().movement.movement;
        assert!((movement - Vec2::new(0.1, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_unmatched_contact_recorded() {
        let mut scene = active_scene();
        scene.queue_contact(ContactEvent::new(
            Body::new(CollisionCategory::Tree, TREE),
            Body::new(CollisionCategory::Gate, GATE),
            Vec2::ZERO,
        ));
        scene.update(0.0);
        assert_eq!(scene.state(), SceneState::Active);
        assert_eq!(
            scene.drain_anomalies(),
            vec![Anomaly::UnmatchedContact {
                a: CollisionCategory::Tree,
                b: CollisionCategory::Gate
            }]
        );
    }

    #[test]
    fn test_spawn_twice_is_an_error() {
        let mut scene = Scene::new(test_settings(), MemoryStore::new()).unwrap();
        scene.spawn_player(1, Vec2::ZERO).unwrap();
        assert_eq!(
            scene.spawn_player(1, Vec2::ZERO),
            Err(ConfigError::PlayerAlreadySpawned { player_id: 1 })
        );
    }

    #[test]
    fn test_invalid_settings_abort() {
        let settings = Settings {
            steer_scale: 0.0,
            ..Default::default()
        };
        assert!(Scene::new(settings, MemoryStore::new()).is_err());
    }

    #[test]
    fn test_host_can_end_spawn_animation_early() {
        let mut scene = Scene::new(Settings::default(), MemoryStore::new()).unwrap();
        scene.spawn_player(1, Vec2::ZERO).unwrap();
        assert_eq!(scene.player().unwrap().entity_state(), EntityState::Appearing);
        scene.spawn_animation_finished();
        assert_eq!(scene.player().unwrap().entity_state(), EntityState::InputControlled);
        // Only once
        scene.spawn_animation_finished();
        assert_eq!(scene.player().unwrap().entity_state(), EntityState::InputControlled);
    }

    #[test]
    fn test_camera_follows_with_lead() {
        let mut scene = active_scene();
        scene.update(0.5);
        let y = scene.player().unwrap().position().y;
        assert!(scene
            .drain_effects()
            .contains(&Effect::SetCameraPosition(Vec2::new(0.0, y - 60.0))));
    }
}
