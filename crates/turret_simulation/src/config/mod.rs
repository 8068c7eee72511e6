//! Конфигурация турели (задаётся один раз, снаружи)
//!
//! Формат файлов: RON. Barrel list и target: это entity references,
//! они передаются в `spawn_turret`, а не хранятся в файле.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::turret::BarrelSelection;

/// Параметры турели
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct TurretConfig {
    /// Скорость поворота корпуса (градусы/сек)
    pub rotate_speed: f32,

    /// Интервал periodic стрельбы (секунды), используется только при одном стволе
    pub fire_interval_seconds: f32,

    /// Как выбирается следующий ствол
    pub selection: BarrelSelection,

    /// Активна ли турель сразу после spawn
    pub start_active: bool,

    pub projectile: ProjectileConfig,
}

impl Default for TurretConfig {
    fn default() -> Self {
        Self {
            rotate_speed: 100.0,
            fire_interval_seconds: 1.0,
            selection: BarrelSelection::default(),
            start_active: false,
            projectile: ProjectileConfig::default(),
        }
    }
}

/// Параметры снаряда (physics collaborator)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Импульс вдоль forward оси ствола
    pub force: f32,

    /// Время жизни (секунды) до деспавна
    pub lifetime_seconds: f32,

    /// Capsule collider: радиус (метры)
    pub radius: f32,

    /// Capsule collider: половина высоты цилиндрической части (метры)
    pub half_height: f32,

    /// Упругость (снаряды отскакивают от стен)
    pub restitution: f32,

    /// Поправка ориентации меша (Euler XYZ, градусы): pivot из DCC пакета
    pub mesh_correction_degrees: Vec3,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            force: 100.0,
            lifetime_seconds: 1.2,
            radius: 0.02,
            half_height: 0.1,
            restitution: 0.9,
            mesh_correction_degrees: Vec3::ZERO,
        }
    }
}

impl ProjectileConfig {
    /// Поправка меша как кватернион
    pub fn mesh_correction(&self) -> Quat {
        let radians = self.mesh_correction_degrees * std::f32::consts::PI / 180.0;
        Quat::from_euler(EulerRot::XYZ, radians.x, radians.y, radians.z)
    }
}

impl TurretConfig {
    /// Загрузить конфиг из `.ron` файла
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        if !path.ends_with(".ron") {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Распарсить и провалидировать RON строку
    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self =
            ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Числовые инварианты (скорости и интервалы строго положительные)
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("rotate_speed", self.rotate_speed)?;
        require_positive("fire_interval_seconds", self.fire_interval_seconds)?;

        // Всё, что уходит в Rapier collider / impulse
        let projectile = &self.projectile;
        require_positive("projectile.lifetime_seconds", projectile.lifetime_seconds)?;
        require_positive("projectile.force", projectile.force)?;
        require_positive("projectile.radius", projectile.radius)?;
        require_positive("projectile.half_height", projectile.half_height)?;
        if !(projectile.restitution.is_finite() && projectile.restitution >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "projectile.restitution must be >= 0, got {}",
                projectile.restitution
            )));
        }
        Ok(())
    }
}

fn require_positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{} must be > 0, got {}", field, value)))
    }
}

/// Ошибки загрузки конфигурации
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Значения вне допустимого диапазона
    #[error("Invalid config: {0}")]
    Invalid(String),
}
