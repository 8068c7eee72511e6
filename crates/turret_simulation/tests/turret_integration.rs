//! Turret integration test
//!
//! Полный headless App (SimulationPlugin) с ручным шагом времени:
//! каждый app.update() = ровно один FixedUpdate tick (кроме первого).
//!
//! Проверяем:
//! - alignment режим: стволы по очереди, выстрел только после наведения
//! - periodic режим: каденс по таймеру
//! - активация через переключатель
//! - ограничение скорости поворота
//! - снаряды и звуковые cue на каждый выстрел, деспавн по lifetime

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use turret_simulation::turret::aim::angle_degrees;
use turret_simulation::*;

const TICK: f64 = 1.0 / 60.0;

#[derive(Resource, Default)]
struct FiredLog(Vec<usize>);

#[derive(Resource, Default)]
struct SoundLog(usize);

fn record_fired(mut events: EventReader<BarrelFired>, mut log: ResMut<FiredLog>) {
    log.0.extend(events.read().map(|fired| fired.barrel_index));
}

fn record_sounds(mut events: EventReader<FireSoundCue>, mut log: ResMut<SoundLog>) {
    log.0 += events.read().count();
}

/// Helper: App с турелями, снарядами и ручным временем
fn create_turret_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(TICK)))
        .init_resource::<FiredLog>()
        .init_resource::<SoundLog>()
        .add_systems(
            FixedUpdate,
            (record_fired, record_sounds).after(ProjectileSystems),
        );
    app
}

fn spawn_target(app: &mut App, position: Vec3) -> Entity {
    app.world_mut().spawn(Transform::from_translation(position)).id()
}

fn spawn(app: &mut App, mounts: Vec<Transform>, target: Entity, config: TurretConfig) -> Entity {
    spawn_turret(
        app.world_mut(),
        TurretSpawn {
            transform: Transform::default(),
            barrel_mounts: mounts,
            target,
            config,
        },
    )
    .expect("turret spawn must succeed")
}

fn side_by_side_barrels() -> Vec<Transform> {
    vec![
        Transform::from_xyz(-0.3, 0.0, 0.0),
        Transform::from_xyz(0.0, 0.0, 0.0),
        Transform::from_xyz(0.3, 0.0, 0.0),
    ]
}

fn run(app: &mut App, updates: usize) {
    for _ in 0..updates {
        app.update();
    }
}

#[test]
fn test_sequential_turret_cycles_barrels() {
    let mut app = create_turret_app(42);
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -20.0));
    spawn(
        &mut app,
        side_by_side_barrels(),
        target,
        TurretConfig {
            selection: BarrelSelection::Sequential,
            start_active: true,
            ..default()
        },
    );

    run(&mut app, 120);

    let fired = &app.world().resource::<FiredLog>().0;
    assert!(fired.len() >= 6, "only {} shots: {:?}", fired.len(), fired);
    for (shot, &barrel) in fired.iter().enumerate() {
        assert_eq!(barrel, shot % 3, "sequence broken: {:?}", fired);
    }
}

#[test]
fn test_random_turret_never_repeats_barrel() {
    let mut app = create_turret_app(7);
    let target = spawn_target(&mut app, Vec3::new(4.0, 2.0, -15.0));
    spawn(
        &mut app,
        side_by_side_barrels(),
        target,
        TurretConfig {
            selection: BarrelSelection::RandomBumpOnRepeat,
            start_active: true,
            ..default()
        },
    );

    run(&mut app, 240);

    let fired = &app.world().resource::<FiredLog>().0;
    assert!(fired.len() >= 4, "only {} shots", fired.len());
    for pair in fired.windows(2) {
        assert_ne!(pair[0], pair[1], "barrel repeated: {:?}", fired);
    }
}

#[test]
fn test_alignment_waits_for_rotation() {
    let mut app = create_turret_app(42);
    // Цель сзади: 180° при 100°/с: ~1.8 с до первого выстрела
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, 20.0));
    spawn(
        &mut app,
        side_by_side_barrels(),
        target,
        TurretConfig {
            selection: BarrelSelection::Sequential,
            start_active: true,
            ..default()
        },
    );

    run(&mut app, 90);
    assert!(app.world().resource::<FiredLog>().0.is_empty());

    run(&mut app, 120);
    assert!(!app.world().resource::<FiredLog>().0.is_empty());
}

#[test]
fn test_single_barrel_fires_periodically() {
    let mut app = create_turret_app(42);
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, 20.0));
    spawn(
        &mut app,
        vec![Transform::default()],
        target,
        TurretConfig {
            fire_interval_seconds: 0.5,
            start_active: true,
            ..default()
        },
    );

    // 180 fixed ticks = 3 секунды
    run(&mut app, 181);

    let fired = &app.world().resource::<FiredLog>().0;
    // Выстрелы около 0.52, 1.03, 1.55, 2.07, 2.58: цель сзади, но таймеру всё равно
    assert!((4..=6).contains(&fired.len()), "shots = {}", fired.len());
    assert!(fired.iter().all(|&barrel| barrel == 0));
}

#[test]
fn test_every_shot_spawns_projectile_and_sound() {
    let mut app = create_turret_app(42);
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -10.0));
    spawn(
        &mut app,
        vec![Transform::default()],
        target,
        TurretConfig {
            fire_interval_seconds: 0.5,
            start_active: true,
            ..default()
        },
    );

    run(&mut app, 70);

    let shots = app.world().resource::<FiredLog>().0.len();
    let sounds = app.world().resource::<SoundLog>().0;
    assert!(shots >= 1);
    assert_eq!(shots, sounds);

    let world = app.world_mut();
    let projectiles = world.query::<&Projectile>().iter(world).count();
    assert_eq!(projectiles, shots);
}

#[test]
fn test_projectiles_expire_after_lifetime() {
    let mut app = create_turret_app(42);
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -10.0));
    let mut config = TurretConfig {
        fire_interval_seconds: 0.25,
        start_active: true,
        ..default()
    };
    config.projectile.lifetime_seconds = 0.3;
    spawn(&mut app, vec![Transform::default()], target, config);

    run(&mut app, 300);

    let shots = app.world().resource::<FiredLog>().0.len();
    assert!(shots >= 10, "shots = {}", shots);

    // lifetime 0.3 при интервале ~0.27: одновременно живут максимум 2
    let world = app.world_mut();
    let alive = world.query::<&Projectile>().iter(world).count();
    assert!(alive <= 2, "alive = {}", alive);
}

#[test]
fn test_inactive_turret_does_nothing_until_switched() {
    let mut app = create_turret_app(42);
    let target = spawn_target(&mut app, Vec3::new(5.0, 0.0, -5.0));
    let turret = spawn(&mut app, side_by_side_barrels(), target, TurretConfig::default());
    let switch = app.world_mut().spawn(ActivationSwitch::new([turret])).id();

    run(&mut app, 60);

    assert!(app.world().resource::<FiredLog>().0.is_empty());
    assert_eq!(app.world().get::<Transform>(turret).unwrap().rotation, Quat::IDENTITY);

    app.world_mut().send_event(ToggleActivation { switch });
    run(&mut app, 120);

    assert!(app.world().get::<Turret>(turret).unwrap().controller.is_active());
    assert!(!app.world().resource::<FiredLog>().0.is_empty());

    // Выключаем: выстрелы прекращаются
    app.world_mut().send_event(SetTurretActive { turret, enabled: false });
    run(&mut app, 2);
    let shots = app.world().resource::<FiredLog>().0.len();
    let rotation = app.world().get::<Transform>(turret).unwrap().rotation;

    run(&mut app, 60);
    assert_eq!(app.world().resource::<FiredLog>().0.len(), shots);
    assert_eq!(app.world().get::<Transform>(turret).unwrap().rotation, rotation);
}

#[test]
fn test_rotation_speed_is_respected() {
    let mut app = create_turret_app(42);
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, 20.0));
    let turret = spawn(
        &mut app,
        side_by_side_barrels(),
        target,
        TurretConfig {
            rotate_speed: 60.0,
            start_active: true,
            ..default()
        },
    );

    let mut previous = Quat::IDENTITY;
    for _ in 0..60 {
        app.update();
        let rotation = app.world().get::<Transform>(turret).unwrap().rotation;
        // 60°/с × 1/60 с = 1° на tick
        let step = angle_degrees(previous, rotation);
        assert!(step <= 1.0 + 1e-3, "step = {}", step);
        previous = rotation;
    }

    let elapsed = app.world().resource::<Time<Fixed>>().elapsed_secs();
    let turned = angle_degrees(Quat::IDENTITY, previous);
    assert!(turned <= 60.0 * elapsed + 1e-2, "turned {} in {} s", turned, elapsed);
    assert!(turned > 50.0, "turned only {}", turned);
}

/// Хост переставляет цель внутри FixedUpdate, до тика турелей
#[derive(Component)]
struct TeleportTo(Vec3);

fn teleport_targets(mut targets: Query<(&TeleportTo, &mut Transform)>) {
    for (teleport, mut transform) in targets.iter_mut() {
        transform.translation = teleport.0;
    }
}

#[test]
fn test_target_moved_in_fixed_update_is_aimed_same_tick() {
    let mut app = create_turret_app(42);
    app.add_systems(FixedUpdate, teleport_targets.before(TurretSystems));

    let target = app
        .world_mut()
        .spawn((Transform::from_xyz(0.0, 0.0, -10.0), TeleportTo(Vec3::new(10.0, 0.0, 0.0))))
        .id();
    let turret = spawn(
        &mut app,
        vec![Transform::default()],
        target,
        TurretConfig {
            // Поворот за один tick без ограничения
            rotate_speed: 100_000.0,
            start_active: true,
            ..default()
        },
    );

    // Первый update без fixed tick, второй: ровно один
    run(&mut app, 2);

    let forward = app.world().get::<Transform>(turret).unwrap().forward();
    assert!(
        (*forward - Vec3::X).length() < 1e-3,
        "turret aimed at stale position, forward = {:?}",
        forward
    );
}

#[test]
fn test_missing_target_is_skipped() {
    let mut app = create_turret_app(42);
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -10.0));
    let turret = spawn(
        &mut app,
        vec![Transform::default()],
        target,
        TurretConfig {
            fire_interval_seconds: 0.1,
            start_active: true,
            ..default()
        },
    );

    app.world_mut().despawn(target);
    run(&mut app, 60);

    assert!(app.world().resource::<FiredLog>().0.is_empty());
    assert!(app.world().get::<Turret>(turret).is_some());
}

#[test]
fn test_spawn_rejects_empty_barrels() {
    let mut app = create_turret_app(42);
    let target = spawn_target(&mut app, Vec3::ZERO);
    let result = spawn_turret(
        app.world_mut(),
        TurretSpawn {
            transform: Transform::default(),
            barrel_mounts: Vec::new(),
            target,
            config: TurretConfig::default(),
        },
    );

    assert!(matches!(
        result,
        Err(TurretError::Configuration(ConfigurationError::NoBarrels))
    ));
}
