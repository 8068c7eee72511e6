//! Turret domain: наведение многоствольной турели и решение о выстреле
//!
//! Содержит:
//! - aim: look rotation / rotate towards / угол между поворотами
//! - selection: политика выбора следующего ствола
//! - controller: TurretController (чистая логика, без ECS)
//! - components + systems: ECS обвязка (spawn, tick, активация)
//!
//! Снаряды, звук и физика: снаружи: турель только публикует BarrelFired.

use bevy::prelude::*;

pub mod aim;
pub mod components;
pub mod controller;
pub mod error;
pub mod selection;
pub mod systems;


pub use components::{ActivationSwitch, Barrel, BarrelFired, SetTurretActive, ToggleActivation, Turret};
pub use controller::{
    BarrelPose, FireEvent, FiringCadence, TickOutcome, TurretController, ALIGNMENT_TOLERANCE_DEGREES,
};
pub use error::{ConfigurationError, TurretError};
pub use selection::BarrelSelection;
pub use systems::{spawn_turret, TurretSpawn};

/// Все turret системы (projectile collaborator идёт после них)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TurretSystems;

/// Turret Plugin
///
/// Порядок в FixedUpdate:
/// 1. apply_set_turret_active: прямое включение/выключение
/// 2. apply_activation_toggles: переключатели с подписчиками
/// 3. tick_turrets: поворот корпуса + BarrelFired
pub struct TurretPlugin;

impl Plugin for TurretPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<BarrelFired>()
            .add_event::<SetTurretActive>()
            .add_event::<ToggleActivation>();

        app.add_systems(
            FixedUpdate,
            (
                systems::apply_set_turret_active,
                systems::apply_activation_toggles,
                systems::tick_turrets,
            )
                .chain()
                .in_set(TurretSystems),
        );
    }
}
