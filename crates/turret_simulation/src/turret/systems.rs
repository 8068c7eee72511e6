//! Turret systems: spawn, per-tick наведение, активация

use bevy::prelude::*;

use super::components::{ActivationSwitch, Barrel, BarrelFired, SetTurretActive, ToggleActivation, Turret};
use super::controller::{BarrelPose, TurretController};
use super::error::{ConfigurationError, TurretError};
use crate::config::TurretConfig;
use crate::DeterministicRng;

/// Описание турели для spawn
#[derive(Debug, Clone)]
pub struct TurretSpawn {
    /// World transform корпуса (корпус: root entity)
    pub transform: Transform,

    /// Local transform каждого ствола относительно корпуса (mount offset)
    pub barrel_mounts: Vec<Transform>,

    pub target: Entity,

    pub config: TurretConfig,
}

/// Spawn турели: корпус + стволы детьми
///
/// Ошибка если стволов нет, конфиг невалиден или target без Transform.
/// В мире ничего не создаётся, если вернулась ошибка.
pub fn spawn_turret(world: &mut World, spawn: TurretSpawn) -> Result<Entity, TurretError> {
    if spawn.barrel_mounts.is_empty() {
        crate::logger::log_error("Turret spawn rejected: barrel list is empty");
        return Err(ConfigurationError::NoBarrels.into());
    }

    if world.get::<Transform>(spawn.target).is_none() {
        crate::logger::log_error(&format!(
            "Turret spawn rejected: target {:?} has no Transform",
            spawn.target
        ));
        return Err(TurretError::MissingTarget(spawn.target));
    }

    // tick_turrets живёт в FixedUpdate: дедлайны считаем по тому же clock
    let now = world
        .get_resource::<Time<Fixed>>()
        .map(|time| time.elapsed_secs())
        .or_else(|| world.get_resource::<Time>().map(|time| time.elapsed_secs()))
        .unwrap_or(0.0);

    let controller = {
        let mut rng = world.get_resource_or_insert_with(|| DeterministicRng::new(crate::DEFAULT_SEED));
        TurretController::from_config(spawn.barrel_mounts.len(), &spawn.config, now, &mut rng.rng)?
    };

    let turret = world.spawn(spawn.transform).id();

    let barrels: Vec<Entity> = spawn
        .barrel_mounts
        .iter()
        .enumerate()
        .map(|(index, mount)| {
            world
                .spawn((Barrel { turret, index }, *mount, ChildOf(turret)))
                .id()
        })
        .collect();

    crate::logger::log_info(&format!(
        "Turret {:?} spawned: {} barrel(s), {} mode, target {:?}",
        turret,
        barrels.len(),
        if controller.is_periodic() { "periodic" } else { "alignment" },
        spawn.target
    ));

    world.entity_mut(turret).insert(Turret {
        controller,
        barrels,
        target: spawn.target,
        projectile: spawn.config.projectile,
    });

    Ok(turret)
}

/// World-поза ствола: корпус ∘ local mount
fn barrel_pose(body: &Transform, mount: &Transform) -> BarrelPose {
    let world = body.mul_transform(*mount);
    BarrelPose {
        rotation: world.rotation,
        position: world.translation,
    }
}

/// System: один tick наведения и стрельбы для каждой турели
///
/// Поза ствола берётся из живого local Transform (хост может его анимировать).
/// Позиция root-цели тоже из Transform: хост может двигать её в FixedUpdate,
/// а GlobalTransform обновится только в PostUpdate. Для цели-ребёнка
/// остаётся GlobalTransform (отстаёт на один tick). Другая турель целью быть не может.
pub fn tick_turrets(
    time: Res<Time>,
    mut rng: ResMut<DeterministicRng>,
    mut turrets: Query<(Entity, &mut Turret, &mut Transform), Without<Barrel>>,
    mounts: Query<&Transform, With<Barrel>>,
    targets: Query<(&Transform, &GlobalTransform, Has<ChildOf>), Without<Turret>>,
    mut fired_events: EventWriter<BarrelFired>,
) {
    let now = time.elapsed_secs();
    let delta = time.delta_secs();

    for (entity, mut turret, mut body) in turrets.iter_mut() {
        if !turret.controller.is_active() {
            continue;
        }

        let Ok((target_local, target_global, nested)) = targets.get(turret.target) else {
            crate::logger::log_warning(&format!(
                "Turret {:?}: target {:?} is gone or is itself a turret, skipping tick",
                entity, turret.target
            ));
            continue;
        };

        let target_position = if nested {
            target_global.translation()
        } else {
            target_local.translation
        };

        let barrel_entity = turret.selected_barrel_entity();
        let Ok(mount) = mounts.get(barrel_entity) else {
            crate::logger::log_warning(&format!(
                "Turret {:?}: barrel {:?} has no Transform",
                entity, barrel_entity
            ));
            continue;
        };

        let pose = barrel_pose(&body, mount);
        let outcome = turret.controller.tick(
            now,
            delta,
            body.rotation,
            pose,
            target_position,
            &mut rng.rng,
        );

        body.rotation = outcome.body_rotation;

        let Some(fire) = outcome.fire else {
            continue;
        };

        let fired_barrel = turret.barrels[fire.barrel_index];
        let Ok(fired_mount) = mounts.get(fired_barrel) else {
            continue;
        };

        // Поза после поворота корпуса: оттуда и вылетает снаряд
        let fired_pose = barrel_pose(&body, fired_mount);

        fired_events.write(BarrelFired {
            turret: entity,
            barrel: fired_barrel,
            barrel_index: fire.barrel_index,
            position: fired_pose.position,
            rotation: fired_pose.rotation,
        });

        crate::logger::log(&format!(
            "Turret {:?} fired barrel #{} at t={:.3}",
            entity, fire.barrel_index, now
        ));
    }
}

/// System: SetTurretActive → set_active
pub fn apply_set_turret_active(
    mut events: EventReader<SetTurretActive>,
    mut turrets: Query<&mut Turret>,
) {
    for event in events.read() {
        let Ok(mut turret) = turrets.get_mut(event.turret) else {
            crate::logger::log_warning(&format!(
                "SetTurretActive: {:?} is not a turret",
                event.turret
            ));
            continue;
        };

        turret.controller.set_active(event.enabled);
    }
}

/// System: ToggleActivation → toggle всех подписчиков переключателя
pub fn apply_activation_toggles(
    mut events: EventReader<ToggleActivation>,
    switches: Query<&ActivationSwitch>,
    mut turrets: Query<&mut Turret>,
) {
    for event in events.read() {
        let Ok(switch) = switches.get(event.switch) else {
            crate::logger::log_warning(&format!(
                "ToggleActivation: {:?} has no ActivationSwitch",
                event.switch
            ));
            continue;
        };

        for &subscriber in switch.subscribers() {
            match turrets.get_mut(subscriber) {
                Ok(mut turret) => {
                    turret.controller.toggle_active();
                    crate::logger::log_info(&format!(
                        "Turret {:?} {}",
                        subscriber,
                        if turret.controller.is_active() { "activated" } else { "deactivated" }
                    ));
                }
                Err(_) => crate::logger::log_warning(&format!(
                    "ToggleActivation: subscriber {:?} is not a turret, skipped",
                    subscriber
                )),
            }
        }
    }
}
