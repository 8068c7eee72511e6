//! TurretController: контур наведения и стрельбы
//!
//! Каждый tick:
//! 1. Поворачиваем корпус так, чтобы активный ствол смотрел на цель
//!    (с поправкой на relative rotation ствола относительно корпуса)
//! 2. Решаем, стрелять ли: по таймеру (один ствол) или по совмещению
//!    ствола с прицельным поворотом (несколько стволов)
//!
//! Контроллер ничего не знает про ECS: позы стволов и цели передаются
//! в `tick` снаружи, наружу уходит новый поворот корпуса и `FireEvent`.

use bevy::prelude::*;
use rand::Rng;

use super::aim::{angle_degrees, look_rotation, rotate_towards};
use super::error::ConfigurationError;
use super::selection::BarrelSelection;
use crate::config::TurretConfig;

/// Допуск совмещения ствола с прицельным поворотом (градусы), не настраивается
pub const ALIGNMENT_TOLERANCE_DEGREES: f32 = 0.1;

/// Живая world-поза ствола на момент tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarrelPose {
    pub rotation: Quat,
    pub position: Vec3,
}

/// Решение "стрелять сейчас" из конкретного ствола
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireEvent {
    pub barrel_index: usize,
}

/// Режим стрельбы (фиксируется при initialize)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum FiringCadence {
    /// Один ствол: стреляем по таймеру, независимо от наведения
    Periodic {
        /// Раньше этого времени (секунды симуляции) не стреляем
        next_fire_time: f32,
    },

    /// Несколько стволов: стреляем, когда активный ствол навёлся, затем переключаемся
    AlignmentCycling {
        /// Активный ствол, всегда < barrel_count
        selected: usize,
        policy: BarrelSelection,
    },
}

/// Результат одного tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// Новый поворот корпуса (не изменился, если tick был no-op)
    pub body_rotation: Quat,
    pub fire: Option<FireEvent>,
}

#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct TurretController {
    active: bool,
    /// Градусы в секунду
    rotate_speed: f32,
    fire_interval_seconds: f32,
    barrel_count: usize,
    cadence: FiringCadence,
}

impl TurretController {
    /// Создать контроллер
    ///
    /// Пустой список стволов: ошибка, а не тихий дефолт.
    /// Стартовый ствол выбирается политикой из состояния "не выбран".
    pub fn initialize<R: Rng + ?Sized>(
        barrel_count: usize,
        rotate_speed: f32,
        fire_interval_seconds: f32,
        policy: BarrelSelection,
        now: f32,
        rng: &mut R,
    ) -> Result<Self, ConfigurationError> {
        if barrel_count == 0 {
            return Err(ConfigurationError::NoBarrels);
        }
        if !(rotate_speed.is_finite() && rotate_speed > 0.0) {
            return Err(ConfigurationError::InvalidRotateSpeed(rotate_speed));
        }
        if !(fire_interval_seconds.is_finite() && fire_interval_seconds > 0.0) {
            return Err(ConfigurationError::InvalidFireInterval(fire_interval_seconds));
        }

        let selected = policy.next_index(None, barrel_count, rng);

        let cadence = if barrel_count == 1 {
            FiringCadence::Periodic {
                next_fire_time: now + fire_interval_seconds,
            }
        } else {
            FiringCadence::AlignmentCycling { selected, policy }
        };

        Ok(Self {
            active: false,
            rotate_speed,
            fire_interval_seconds,
            barrel_count,
            cadence,
        })
    }

    /// Создать контроллер из `TurretConfig` (start_active учитывается)
    pub fn from_config<R: Rng + ?Sized>(
        barrel_count: usize,
        config: &TurretConfig,
        now: f32,
        rng: &mut R,
    ) -> Result<Self, ConfigurationError> {
        let mut controller = Self::initialize(
            barrel_count,
            config.rotate_speed,
            config.fire_interval_seconds,
            config.selection,
            now,
            rng,
        )?;
        controller.set_active(config.start_active);
        Ok(controller)
    }

    pub fn set_active(&mut self, enabled: bool) {
        self.active = enabled;
    }

    pub fn toggle_active(&mut self) {
        self.active = !self.active;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn barrel_count(&self) -> usize {
        self.barrel_count
    }

    pub fn cadence(&self) -> &FiringCadence {
        &self.cadence
    }

    pub fn is_periodic(&self) -> bool {
        matches!(self.cadence, FiringCadence::Periodic { .. })
    }

    /// Индекс ствола, по которому сейчас наводимся
    pub fn selected_barrel(&self) -> usize {
        match self.cadence {
            FiringCadence::Periodic { .. } => 0,
            FiringCadence::AlignmentCycling { selected, .. } => selected,
        }
    }

    /// Один шаг симуляции
    ///
    /// `barrel`: живая поза ствола `selected_barrel()`, `body_rotation`:
    /// текущий world-поворот корпуса. Неактивный контроллер ничего не меняет.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        now: f32,
        delta: f32,
        body_rotation: Quat,
        barrel: BarrelPose,
        target_position: Vec3,
        rng: &mut R,
    ) -> TickOutcome {
        if !self.active {
            return TickOutcome {
                body_rotation,
                fire: None,
            };
        }

        // Смещение ствола относительно корпуса пересчитывается каждый tick:
        // mount ствола может анимироваться хостом
        let relative = body_rotation.inverse() * barrel.rotation;

        // Направление от ствола (не от корпуса) на цель
        let look = look_rotation(target_position - barrel.position);

        let new_body_rotation = match look {
            Some(look) => rotate_towards(
                body_rotation,
                look * relative.inverse(),
                self.rotate_speed * delta,
            ),
            None => {
                crate::logger::log(&format!(
                    "Turret target coincides with barrel {} at {:?}, skipping rotation",
                    self.selected_barrel(),
                    barrel.position
                ));
                body_rotation
            }
        };

        let fire_interval = self.fire_interval_seconds;
        let barrel_count = self.barrel_count;

        let fire = match &mut self.cadence {
            FiringCadence::Periodic { next_fire_time } => {
                if now > *next_fire_time {
                    *next_fire_time = now + fire_interval;
                    Some(FireEvent { barrel_index: 0 })
                } else {
                    None
                }
            }
            FiringCadence::AlignmentCycling { selected, policy } => {
                // Вырожденное направление гасит только поворот: совмещение
                // проверяем против identity, стрельба не блокируется
                let aim = look.unwrap_or(Quat::IDENTITY);
                let barrel_rotation = new_body_rotation * relative;
                if angle_degrees(barrel_rotation, aim) < ALIGNMENT_TOLERANCE_DEGREES {
                    let fired = *selected;
                    *selected = policy.next_index(Some(fired), barrel_count, rng);
                    Some(FireEvent { barrel_index: fired })
                } else {
                    None
                }
            }
        };

        TickOutcome {
            body_rotation: new_body_rotation,
            fire,
        }
    }
}
