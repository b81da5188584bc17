//! Ski Slalom entry point
//!
//! The native build runs a headless demo descent: a scripted skier on a short
//! slope, with a toy contact check standing in for the physics engine and a
//! logging host standing in for renderer and audio.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::collections::HashSet;

    use glam::Vec2;

    use ski_slalom::Settings;
    use ski_slalom::host::{LogHost, dispatch};
    use ski_slalom::input::PointerEvent;
    use ski_slalom::persistence::FileStore;
    use ski_slalom::sim::{Body, CollisionCategory, ContactEvent, NodeId, Scene, SceneState};

    const SCORE_FILE: &str = "ski_scores.json";
    const FRAME_DT: f32 = 1.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 90;
    /// Contact radius for the toy overlap test
    const TOUCH_RADIUS: f32 = 12.0;

    /// A static body on the slope
    struct Scenery {
        body: Body,
        position: Vec2,
    }

    fn slope() -> Vec<Scenery> {
        let mut id = 0;
        let mut place = |category, x: f32, y: f32| {
            id += 1;
            Scenery {
                body: Body::new(category, NodeId(id)),
                position: Vec2::new(x, y),
            }
        };
        vec![
            place(CollisionCategory::Gate, 0.0, -180.0),
            place(CollisionCategory::Tree, 30.0, -400.0),
            place(CollisionCategory::Gate, 30.0, -700.0),
            place(CollisionCategory::Rock, -40.0, -1000.0),
            place(CollisionCategory::Gate, 0.0, -1300.0),
            place(CollisionCategory::Finish, 0.0, -1700.0),
        ]
    }

    /// Steering script: drift toward the next scenery x position
    fn drag_for(player_x: f32, target_x: f32) -> Vec2 {
        let dx = (target_x - player_x).clamp(-60.0, 60.0);
        Vec2::new(dx, 0.0)
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let settings = Settings::load();
        let store = FileStore::open(SCORE_FILE)?;
        let mut scene = Scene::new(settings, store)?;
        let mut host = LogHost::default();

        let scenery = slope();
        let mut touched: HashSet<NodeId> = HashSet::new();

        scene.spawn_player(1, Vec2::ZERO)?;
        scene.handle_pointer(PointerEvent::Begin(Vec2::ZERO));

        for frame in 0..MAX_FRAMES {
            let Some((pos, node, reporting)) = scene
                .player()
                .map(|p| (p.position(), p.node(), !p.physics.mask.is_disabled()))
            else {
                break;
            };

            // Toy physics: report each body once when the skier gets close.
            // The finish is a line across the slope.
            if reporting {
                for item in &scenery {
                    let touching = match item.body.category {
                        CollisionCategory::Finish => pos.y <= item.position.y,
                        _ => pos.distance(item.position) <= TOUCH_RADIUS,
                    };
                    if touching && touched.insert(item.body.node) {
                        scene.queue_contact(ContactEvent::new(
                            item.body,
                            Body::new(CollisionCategory::Player, node),
                            item.position,
                        ));
                    }
                }
            }

            // Steer toward whatever is next downhill, a touch at a time
            if scene.state() == SceneState::Active && frame % 20 == 0 {
                let next_x = scenery
                    .iter()
                    .find(|s| s.position.y < pos.y && !touched.contains(&s.body.node))
                    .map(|s| s.position.x)
                    .unwrap_or(0.0);
                scene.handle_pointer(PointerEvent::Begin(Vec2::ZERO));
                scene.handle_pointer(PointerEvent::Move(drag_for(pos.x, next_x)));
                scene.handle_pointer(PointerEvent::End);
            }

            scene.update(FRAME_DT);
            dispatch(scene.drain_effects(), &mut host);
            for anomaly in scene.drain_anomalies() {
                log::debug!("anomaly: {}", anomaly);
            }

            if scene.state().is_final() {
                break;
            }
        }

        let score = scene.player().map(|p| p.score).unwrap_or(0);
        log::info!(
            "Run finished: {:?} after {:.1}s, score {} ({} host commands)",
            scene.state(),
            scene.elapsed_secs(),
            score,
            host.commands
        );
        println!("{:?} - score {}", scene.state(), score);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Ski Slalom (native) starting headless demo...");

    if let Err(err) = demo::run() {
        log::error!("Demo failed: {}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Web builds embed the library; there is no standalone entry point
}
