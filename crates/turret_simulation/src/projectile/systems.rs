//! Projectile systems: spawn по BarrelFired, lifetime, ориентация, фильтр коллизий

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::components::{DespawnAfter, FireSoundCue, HeadingStabilizer, Projectile};
use crate::config::ProjectileConfig;
use crate::turret::aim::look_rotation;
use crate::turret::{BarrelFired, Turret};

/// Rapier компоненты снаряда
///
/// Dynamic body без гравитации, CCD (быстрые снаряды не пролетают сквозь стены),
/// упругий capsule collider, импульс вдоль forward оси ствола.
fn projectile_physics(config: &ProjectileConfig, forward: Vec3) -> impl Bundle {
    (
        RigidBody::Dynamic,
        Collider::capsule_y(config.half_height, config.radius),
        GravityScale(0.0),
        Ccd::enabled(),
        Restitution::coefficient(config.restitution),
        Velocity::default(),
        ExternalImpulse {
            impulse: forward * config.force,
            torque_impulse: Vec3::ZERO,
        },
        ActiveHooks::FILTER_CONTACT_PAIRS | ActiveHooks::FILTER_INTERSECTION_PAIR,
        ActiveEvents::COLLISION_EVENTS,
    )
}

/// System: BarrelFired → spawn снаряда + звуковой cue
pub fn spawn_projectiles(
    mut commands: Commands,
    time: Res<Time>,
    mut fired_events: EventReader<BarrelFired>,
    turrets: Query<&Turret>,
    mut sound_events: EventWriter<FireSoundCue>,
) {
    let now = time.elapsed_secs();

    for fired in fired_events.read() {
        let Ok(turret) = turrets.get(fired.turret) else {
            crate::logger::log_warning(&format!(
                "BarrelFired from {:?}, but it is not a turret anymore",
                fired.turret
            ));
            continue;
        };

        let config = &turret.projectile;
        let mesh_correction = config.mesh_correction();

        let projectile = commands
            .spawn((
                Projectile {
                    turret: fired.turret,
                    owner_barrel: fired.barrel,
                },
                Transform::from_translation(fired.position)
                    .with_rotation(fired.rotation * mesh_correction),
                HeadingStabilizer::new(mesh_correction),
                DespawnAfter {
                    despawn_time: now + config.lifetime_seconds,
                },
                projectile_physics(config, fired.forward()),
            ))
            .id();

        sound_events.write(FireSoundCue {
            turret: fired.turret,
            barrel: fired.barrel,
            position: fired.position,
        });

        crate::logger::log(&format!(
            "Projectile {:?} spawned from barrel #{} at {:?}",
            projectile, fired.barrel_index, fired.position
        ));
    }
}

/// System: деспавн entities с истёкшим DespawnAfter
pub fn despawn_after_timeout(
    mut commands: Commands,
    query: Query<(Entity, &DespawnAfter)>,
    time: Res<Time>,
) {
    let current_time = time.elapsed_secs();

    for (entity, despawn_after) in query.iter() {
        if current_time >= despawn_after.despawn_time {
            commands.entity(entity).despawn();
        }
    }
}

/// System: контакт начался → стабилизация выключена, закончился → включена
pub fn track_projectile_contacts(
    mut collision_events: EventReader<CollisionEvent>,
    mut stabilizers: Query<&mut HeadingStabilizer>,
) {
    for event in collision_events.read() {
        let (first, second, enabled) = match *event {
            CollisionEvent::Started(first, second, _) => (first, second, false),
            CollisionEvent::Stopped(first, second, _) => (first, second, true),
        };

        for entity in [first, second] {
            if let Ok(mut stabilizer) = stabilizers.get_mut(entity) {
                stabilizer.enabled = enabled;
            }
        }
    }
}

/// System: снаряд смотрит вдоль своей скорости (если стабилизация включена)
pub fn stabilize_projectile_heading(
    mut projectiles: Query<(&HeadingStabilizer, &Velocity, &mut Transform)>,
) {
    for (stabilizer, velocity, mut transform) in projectiles.iter_mut() {
        if !stabilizer.enabled {
            continue;
        }

        // Стоящий снаряд не разворачиваем
        let Some(heading) = look_rotation(velocity.linvel) else {
            continue;
        };

        transform.rotation = heading * stabilizer.mesh_correction;
    }
}

/// Rapier physics hooks: снаряд не сталкивается со своим стволом
#[derive(SystemParam)]
pub struct ProjectileCollisionFilter<'w, 's> {
    projectiles: Query<'w, 's, &'static Projectile>,
}

impl ProjectileCollisionFilter<'_, '_> {
    fn ignores_pair(&self, first: Entity, second: Entity) -> bool {
        let ignores = |projectile: Entity, other: Entity| {
            self.projectiles
                .get(projectile)
                .is_ok_and(|projectile| projectile.ignores(other))
        };
        ignores(first, second) || ignores(second, first)
    }
}

impl BevyPhysicsHooks for ProjectileCollisionFilter<'_, '_> {
    fn filter_contact_pair(&self, context: PairFilterContextView) -> Option<SolverFlags> {
        if self.ignores_pair(context.collider1(), context.collider2()) {
            None
        } else {
            Some(SolverFlags::COMPUTE_IMPULSES)
        }
    }

    fn filter_intersection_pair(&self, context: PairFilterContextView) -> bool {
        !self.ignores_pair(context.collider1(), context.collider2())
    }
}
