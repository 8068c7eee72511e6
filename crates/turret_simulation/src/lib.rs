//! Turret Simulation Core
//!
//! ECS-симуляция многоствольной турели на Bevy 0.16 (headless)
//!
//! Архитектура:
//! - turret: наведение корпуса + выбор ствола + решение о выстреле
//! - projectile: physics collaborator (Rapier bodies, lifetime, фильтр коллизий)
//! - Хост (движок/рендер/ввод) шлёт SetTurretActive / ToggleActivation
//!   и слушает BarrelFired / FireSoundCue

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod config;
pub mod logger;
pub mod projectile;
pub mod turret;

pub use config::{ConfigError, ProjectileConfig, TurretConfig};
pub use projectile::{
    DespawnAfter, FireSoundCue, HeadingStabilizer, Projectile, ProjectilePhysicsPlugin, ProjectilePlugin,
    ProjectileSystems,
};
pub use turret::{
    spawn_turret, ActivationSwitch, Barrel, BarrelFired, BarrelPose, BarrelSelection, ConfigurationError,
    FireEvent, FiringCadence, SetTurretActive, TickOutcome, ToggleActivation, Turret, TurretController,
    TurretError, TurretPlugin, TurretSpawn, TurretSystems,
};

/// Seed по умолчанию (если хост не вставил свой DeterministicRng)
pub const DEFAULT_SEED: u64 = 42;

/// Главный plugin симуляции (турели + снаряды, без Rapier step)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Fixed timestep 60Hz для simulation tick
        app.insert_resource(Time::<Fixed>::from_hz(60.0));

        // Хост мог вставить RNG со своим seed: не перетираем
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(DEFAULT_SEED));
        }

        app.add_plugins((TurretPlugin, ProjectilePlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// TransformPlugin нужен для GlobalTransform цели.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins((MinimalPlugins, TransformPlugin))
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
