//! Кватернионная математика прицеливания
//!
//! Соглашение Bevy: forward = -Z, up = +Y.

use bevy::prelude::*;

/// Поворот, у которого forward (-Z) смотрит вдоль `direction` (up = +Y)
///
/// `None` если направление вырождено (нулевое или NaN/inf).
/// Сколь угодно короткое ненулевое направление валидно.
pub fn look_rotation(direction: Vec3) -> Option<Quat> {
    let forward = Dir3::new(direction).ok()?;
    Some(Transform::IDENTITY.looking_to(forward, Dir3::Y).rotation)
}

/// Угловое расстояние между двумя ориентациями (градусы, 0..=180)
///
/// Через atan2 по векторной части относительного поворота:
/// acos(dot) теряет точность у малых углов, а нам важны доли градуса.
pub fn angle_degrees(from: Quat, to: Quat) -> f32 {
    let delta = from.inverse() * to;
    let half = delta.xyz().length().atan2(delta.w.abs());
    (2.0 * half).to_degrees()
}

/// Поворот `from` в сторону `to` не более чем на `max_degrees`
///
/// Никогда не перелетает цель: если остаток меньше шага: возвращаем `to`.
pub fn rotate_towards(from: Quat, to: Quat, max_degrees: f32) -> Quat {
    let max_degrees = max_degrees.max(0.0);
    let angle = angle_degrees(from, to);

    if angle <= max_degrees {
        return to;
    }

    from.slerp(to, max_degrees / angle).normalize()
}
