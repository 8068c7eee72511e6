//! Projectile компоненты и события

use bevy::prelude::*;

/// Снаряд турели
#[derive(Component, Debug, Clone, Copy, Reflect)]
pub struct Projectile {
    /// Турель, которая выстрелила
    pub turret: Entity,
    /// Ствол-источник: с его коллайдером снаряд не сталкивается
    pub owner_barrel: Entity,
}

impl Projectile {
    /// Игнорировать ли контакт этого снаряда с `other`
    pub fn ignores(&self, other: Entity) -> bool {
        other == self.owner_barrel
    }
}

/// Разворот снаряда по скорости после выхода из контакта
///
/// Пока снаряд касается чего-то (и до окончания первого контакта)
/// ориентация не трогается: рикошет не должен закручивать меш.
#[derive(Component, Debug, Clone, Copy, Reflect)]
pub struct HeadingStabilizer {
    pub enabled: bool,
    /// Поправка pivot'а меша, применяется после look rotation
    pub mesh_correction: Quat,
}

impl HeadingStabilizer {
    pub fn new(mesh_correction: Quat) -> Self {
        Self {
            enabled: false,
            mesh_correction,
        }
    }
}

/// Деспавн entity после указанного времени
#[derive(Component, Debug, Clone, Copy, Reflect)]
pub struct DespawnAfter {
    /// Время деспавна (в секундах от старта симуляции)
    pub despawn_time: f32,
}

/// Event: звук выстрела (воспроизведение: забота хоста)
#[derive(Event, Debug, Clone)]
pub struct FireSoundCue {
    pub turret: Entity,
    pub barrel: Entity,
    pub position: Vec3,
}
