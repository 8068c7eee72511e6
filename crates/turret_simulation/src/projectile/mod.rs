//! Projectile domain: physics collaborator турели
//!
//! Турель решает КОГДА и КУДА стрелять (BarrelFired), здесь: что из этого
//! получается в мире:
//! - spawn dynamic rigid body в позе ствола + импульс вдоль forward
//! - снаряд не сталкивается со своим стволом (ProjectileCollisionFilter)
//! - деспавн через lifetime
//! - после рикошета снаряд разворачивается по скорости
//!
//! Сам Rapier step подключается отдельно через ProjectilePhysicsPlugin:
//! headless тесты обходятся без него.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

pub mod components;
pub mod systems;


pub use components::{DespawnAfter, FireSoundCue, HeadingStabilizer, Projectile};
pub use systems::ProjectileCollisionFilter;

use crate::turret::TurretSystems;

/// Все projectile системы
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectileSystems;

/// Projectile Plugin (без Rapier step)
///
/// Порядок в FixedUpdate (после TurretSystems):
/// 1. spawn_projectiles: BarrelFired → снаряд + FireSoundCue
/// 2. track_projectile_contacts: CollisionEvent → HeadingStabilizer
/// 3. stabilize_projectile_heading
/// 4. despawn_after_timeout
pub struct ProjectilePlugin;

impl Plugin for ProjectilePlugin {
    fn build(&self, app: &mut App) {
        // CollisionEvent регистрирует и Rapier; повторная регистрация: no-op
        app.add_event::<FireSoundCue>().add_event::<CollisionEvent>();

        app.add_systems(
            FixedUpdate,
            (
                systems::spawn_projectiles,
                systems::track_projectile_contacts,
                systems::stabilize_projectile_heading,
                systems::despawn_after_timeout,
            )
                .chain()
                .in_set(ProjectileSystems)
                .after(TurretSystems),
        );
    }
}

/// Rapier physics с фильтром "снаряд vs свой ствол"
pub struct ProjectilePhysicsPlugin;

impl Plugin for ProjectilePhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(RapierPhysicsPlugin::<ProjectileCollisionFilter>::default().in_fixed_schedule());
    }
}
