//! Instant arc swings (Whip)

use bevy::prelude::*;

use crate::enemies::Enemy;

/// Whether `enemy` lies inside a swing of `range` and `arc` radians centred on `facing`.
///
/// An enemy standing exactly on the origin is always inside.
pub fn in_arc(origin: Vec2, facing: Vec2, range: f32, arc: f32, enemy: &Enemy) -> bool {
    let offset = enemy.position - origin;
    let distance = offset.length();
    if distance > range {
        return false;
    }
    if distance <= f32::EPSILON {
        return true;
    }
    let facing = facing.normalize_or(Vec2::X);
    let cos = facing.dot(offset / distance).clamp(-1.0, 1.0);
    cos.acos() <= arc / 2.0 + 1e-5
}
