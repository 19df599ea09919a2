//! Physics playground
//!
//! Headless attractor demo: a cloud of balls around a central attractor that
//! flips between pulling and pushing, a lamp post whose light rides on the
//! lamp head, and a camera. The simulation runs a fixed number of ticks and
//! logs a summary as it goes.
//!
//! An optional first argument names a `.toml` or `.ron` engine config.

use rand::Rng;
use scene_engine::backend::headless::HeadlessPhysics;
use scene_engine::core::config::{Config, ConfigError, EngineConfig, PhysicsConfig};
use scene_engine::foundation::logging;
use scene_engine::prelude::*;

// Scene layout
const NUM_BALLS: usize = 40;
const SPAWN_HALF_EXTENT: f32 = 12.0;
const BALL_SIZE: f32 = 0.5;
const ATTRACTOR_STRENGTH: f32 = 25.0;
const ATTRACTOR_RADIUS: f32 = 10.0;

// Simulation
const TICKS: u32 = 600;
const DT: f32 = 1.0 / 60.0;
const FLIP_EVERY: u32 = 120;
const SUMMARY_EVERY: u32 = 60;

/// Errors that end the playground early
#[derive(Debug, thiserror::Error)]
enum PlaygroundError {
    /// Config file could not be read
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// Engine refused a request
    #[error("engine: {0}")]
    Engine(#[from] EngineError),
}

struct Playground {
    engine: Engine,
    attractor: GameObjectId,
    balls: Vec<GameObjectId>,
}

impl Playground {
    fn new(config: EngineConfig) -> Result<Self, PlaygroundError> {
        // Bring physics up over a few polls to exercise the async path
        let mut engine = Engine::new(config, EngineServices::headless(), HeadlessPhysics::deferred_loader(3))?;

        engine.physics_system_mut().on_initialised.subscribe(|_| {
            log::info!("Physics backend is up");
        });
        engine.physics_system_mut().on_bodies_bound.subscribe(|report| {
            log::info!("Bound {} bodies ({} failed)", report.bound.len(), report.failed.len());
            for (id, reason) in &report.failed {
                log::warn!("  {:?}: {}", id, reason);
            }
        });

        pollster::block_on(engine.wait_until_ready())?;
        engine.set_glow_enabled(true);

        let attractor = Self::spawn_ball(&mut engine, Vec3::zeros(), 2.0 * BALL_SIZE)?;
        engine.add_component(attractor, PhysicsAttractor::new(ATTRACTOR_STRENGTH, ATTRACTOR_RADIUS))?;
        engine.add_component(attractor, Component::custom(DebugTransform::new(3.0)))?;

        let mut rng = rand::thread_rng();
        let balls = (0..NUM_BALLS)
            .map(|_| {
                let position = Vec3::new(
                    rng.gen_range(-SPAWN_HALF_EXTENT..SPAWN_HALF_EXTENT),
                    rng.gen_range(-SPAWN_HALF_EXTENT..SPAWN_HALF_EXTENT),
                    rng.gen_range(-SPAWN_HALF_EXTENT..SPAWN_HALF_EXTENT),
                );
                Self::spawn_ball(&mut engine, position, BALL_SIZE)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::spawn_lamp_post(&mut engine, Vec3::new(-SPAWN_HALF_EXTENT, -SPAWN_HALF_EXTENT, 0.0))?;
        engine.spawn_camera(
            "camera",
            TransformFactory::look_at(Vec3::new(0.0, 15.0, -40.0), Vec3::zeros(), Vec3::y()),
        )?;

        log::info!("Scene ready: {} objects", engine.world().len());
        Ok(Self {
            engine,
            attractor,
            balls,
        })
    }

    fn spawn_ball(engine: &mut Engine, position: Vec3, size: f32) -> Result<GameObjectId, EngineError> {
        let id = engine.spawn_shape(
            "ball",
            ShapeType::Sphere,
            TransformComponent::from_position(position).with_uniform_scale(size),
        )?;
        engine.add_component(
            id,
            PhysicsComponent::new()
                .with_shape(PhysicsShape::Sphere)
                .with_restitution(0.8),
        )?;
        Ok(id)
    }

    fn spawn_lamp_post(engine: &mut Engine, base: Vec3) -> Result<(), EngineError> {
        let post = engine.spawn_shape(
            "lamp post",
            ShapeType::Cylinder,
            TransformComponent::from_position(base).with_scale(Vec3::new(0.3, 4.0, 0.3)),
        )?;
        let head = engine.spawn_shape(
            "lamp head",
            ShapeType::Sphere,
            TransformComponent::from_position(Vec3::new(0.0, 4.0, 0.0)),
        )?;
        let light = engine.services_mut().lights.create_light(&LightDesc {
            name: "lamp".into(),
            light_type: LightType::Spot,
            position: base + Vec3::new(0.0, 4.0, 0.0),
            direction: -Vec3::y(),
            colour: Vec3::new(1.0, 0.85, 0.6),
            intensity: 4.0,
        })?;
        engine.add_component(head, LightComponent::new(light, LightType::Spot))?;
        engine.add_child(post, head)?;
        Ok(())
    }

    fn run(&mut self) {
        for tick in 1..=TICKS {
            let applied = self.engine.tick(DT);
            if applied > 0 {
                log::debug!("Tick {}: applied {} commands", tick, applied);
            }

            if tick % FLIP_EVERY == 0 {
                if let Some(attractor) = self
                    .engine
                    .world_mut()
                    .get_mut(self.attractor)
                    .and_then(GameObject::attractor_mut)
                {
                    attractor.flip();
                    log::info!("Tick {}: attractor strength now {}", tick, attractor.strength);
                }
            }

            if tick % SUMMARY_EVERY == 0 {
                self.log_summary(tick);
            }
        }
    }

    fn log_summary(&self, tick: u32) {
        let world = self.engine.world();
        let distances: Vec<f32> = self
            .balls
            .iter()
            .filter_map(|&id| world.get(id))
            .map(|ball| ball.transform().position().norm())
            .collect();
        let mean = if distances.is_empty() {
            0.0
        } else {
            distances.iter().sum::<f32>() / distances.len() as f32
        };
        let inside = distances.iter().filter(|&&d| d <= ATTRACTOR_RADIUS).count();
        let physics = self.engine.physics_system().last_stats();
        let stats = self.engine.stats();

        log::info!(
            "Tick {}: mean distance {:.2}, {} of {} inside radius, {} forces, avg tick {:?} (max {:?})",
            tick,
            mean,
            inside,
            distances.len(),
            physics.forces_applied,
            stats.average(),
            stats.longest()
        );
    }
}

fn load_config() -> Result<EngineConfig, PlaygroundError> {
    match std::env::args().nth(1) {
        Some(path) => Ok(EngineConfig::load_from_file(path)?),
        None => Ok(EngineConfig::new().with_physics(PhysicsConfig::default())),
    }
}

fn main() -> Result<(), PlaygroundError> {
    let config = load_config()?;
    logging::init_with_level(&config.log_level);

    log::info!("Starting physics playground");
    let mut playground = Playground::new(config)?;
    playground.run();

    let stats = playground.engine.stats();
    log::info!(
        "Finished {} ticks ({:.1}s simulated)",
        stats.ticks(),
        stats.simulated_secs()
    );
    Ok(())
}
