//! Headless симуляция турели
//!
//! Трёхствольная турель стреляет по кружащей вокруг неё цели.
//! Конфиг: первый аргумент (RON), иначе дефолт.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use turret_simulation::{
    create_headless_app, logger, spawn_turret, BarrelFired, ProjectilePhysicsPlugin, SimulationPlugin,
    TurretConfig, TurretSpawn,
};

/// Цель-дрон, летает по окружности
#[derive(Component)]
struct OrbitingTarget {
    radius: f32,
    height: f32,
    angular_speed: f32,
}

fn orbit_target(time: Res<Time>, mut targets: Query<(&OrbitingTarget, &mut Transform)>) {
    let t = time.elapsed_secs();
    for (orbit, mut transform) in targets.iter_mut() {
        let angle = t * orbit.angular_speed;
        transform.translation = Vec3::new(
            orbit.radius * angle.cos(),
            orbit.height,
            orbit.radius * angle.sin(),
        );
    }
}

#[derive(Resource, Default)]
struct ShotCounter(usize);

fn count_shots(mut fired: EventReader<BarrelFired>, mut counter: ResMut<ShotCounter>) {
    counter.0 += fired.read().count();
}

fn main() {
    let seed = 42;
    let config = match std::env::args().nth(1) {
        Some(path) => match TurretConfig::load_from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Failed to load {}: {}", path, err);
                std::process::exit(1);
            }
        },
        None => TurretConfig {
            start_active: true,
            ..default()
        },
    };

    println!("Starting turret headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins((SimulationPlugin, ProjectilePhysicsPlugin))
        // Шаг ровно в один fixed tick: симуляция не зависит от скорости машины
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)))
        .init_resource::<ShotCounter>()
        .add_systems(FixedUpdate, (orbit_target, count_shots));

    let target = app
        .world_mut()
        .spawn((
            OrbitingTarget {
                radius: 6.0,
                height: 1.5,
                angular_speed: 0.4,
            },
            Transform::from_xyz(6.0, 1.5, 0.0),
        ))
        .id();

    let spawned = spawn_turret(
        app.world_mut(),
        TurretSpawn {
            transform: Transform::from_xyz(0.0, 1.0, 0.0),
            barrel_mounts: vec![
                Transform::from_xyz(-0.25, 0.0, -0.4),
                Transform::from_xyz(0.0, 0.25, -0.4),
                Transform::from_xyz(0.25, 0.0, -0.4),
            ],
            target,
            config,
        },
    );

    if let Err(err) = spawned {
        eprintln!("Turret spawn failed: {}", err);
        std::process::exit(1);
    }

    // 1000 тиков симуляции
    for tick in 0..1000 {
        app.update();

        if tick % 100 == 0 {
            let shots = app.world().resource::<ShotCounter>().0;
            logger::log_info(&format!("Tick {}: {} shots fired", tick, shots));
        }
    }

    println!("Simulation complete!");
}
