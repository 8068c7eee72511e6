//! ECS компоненты и события турели
//!
//! Иерархия:
//! - Turret entity (корпус, root): вращается контроллером
//! - Barrel entities: дети корпуса, local Transform = mount offset
//! - Target: любая entity с GlobalTransform

use bevy::prelude::*;

use super::controller::TurretController;
use crate::config::ProjectileConfig;

/// Корпус турели
///
/// Инвариант: `barrels` непустой, порядок = индексы контроллера,
/// список не меняется после spawn.
#[derive(Component, Debug, Clone)]
pub struct Turret {
    pub controller: TurretController,

    /// Стволы по индексу
    pub barrels: Vec<Entity>,

    /// Куда целимся (read-only каждый tick)
    pub target: Entity,

    /// Параметры снаряда для projectile collaborator
    pub projectile: ProjectileConfig,
}

impl Turret {
    /// Entity ствола, по которому сейчас наводимся
    pub fn selected_barrel_entity(&self) -> Entity {
        self.barrels[self.controller.selected_barrel()]
    }
}

/// Ствол турели (child entity корпуса)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub struct Barrel {
    /// Корпус-владелец
    pub turret: Entity,
    /// Индекс в `Turret::barrels`
    pub index: usize,
}

/// Event: ствол выстрелил (Turret → projectile collaborator)
///
/// Поза: world-поза ствола сразу после поворота корпуса в этом tick.
#[derive(Event, Debug, Clone)]
pub struct BarrelFired {
    pub turret: Entity,
    pub barrel: Entity,
    pub barrel_index: usize,
    pub position: Vec3,
    pub rotation: Quat,
}

impl BarrelFired {
    /// Forward ось ствола (-Z), вдоль неё летит снаряд
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }
}

/// Event: включить/выключить конкретную турель
#[derive(Event, Debug, Clone, Copy)]
pub struct SetTurretActive {
    pub turret: Entity,
    pub enabled: bool,
}

/// Переключатель активации (кнопка, контроллер VR, UI)
///
/// Явный список подписчиков вместо рассылки по всей сцене.
#[derive(Component, Debug, Clone, Default)]
pub struct ActivationSwitch {
    subscribers: Vec<Entity>,
}

impl ActivationSwitch {
    pub fn new(subscribers: impl IntoIterator<Item = Entity>) -> Self {
        let mut switch = Self::default();
        for turret in subscribers {
            switch.subscribe(turret);
        }
        switch
    }

    /// Подписать турель (повторная подписка игнорируется)
    pub fn subscribe(&mut self, turret: Entity) {
        if !self.subscribers.contains(&turret) {
            self.subscribers.push(turret);
        }
    }

    pub fn unsubscribe(&mut self, turret: Entity) {
        self.subscribers.retain(|&subscriber| subscriber != turret);
    }

    pub fn subscribers(&self) -> &[Entity] {
        &self.subscribers
    }
}

/// Event: переключатель нажат: toggle всех его подписчиков
#[derive(Event, Debug, Clone, Copy)]
pub struct ToggleActivation {
    pub switch: Entity,
}
