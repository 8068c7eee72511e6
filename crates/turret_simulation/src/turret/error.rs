//! Ошибки турели
//!
//! Единственный настоящий отказ: невалидная конфигурация при spawn.
//! Вырожденная геометрия (цель в точке ствола) ошибкой не считается.

/// Ошибка конфигурации турели
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Пустой список стволов: нельзя вывести ни одного индекса
    #[error("turret must have at least one barrel")]
    NoBarrels,

    #[error("rotate speed must be a positive number of degrees per second, got {0}")]
    InvalidRotateSpeed(f32),

    #[error("fire interval must be a positive number of seconds, got {0}")]
    InvalidFireInterval(f32),
}

/// Ошибки создания турели в ECS мире
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TurretError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Target entity не существует или без Transform
    #[error("target entity {0:?} has no transform")]
    MissingTarget(bevy::prelude::Entity),
}
