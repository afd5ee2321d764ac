//! Enemy steering per behavior archetype

use bevy::prelude::*;

use super::Enemy;
use crate::config::EnemyBehavior;

/// Whether a phasing enemy is intangible at session time `now_ms`
pub fn in_phase_window(now_ms: u64, interval_ms: u64, duration_ms: u64) -> bool {
    interval_ms > 0 && now_ms % interval_ms < duration_ms
}

/// Recompute one enemy's velocity for this frame.
///
/// Order matters: the phasing window is refreshed first (so a stunned ghost
/// still blinks), then an active knockback owns the velocity, then a movement
/// lock pins the enemy, and only then does the behavior steer.
pub fn update_ai(enemy: &mut Enemy, player: Vec2, now_ms: u64) {
    if !enemy.is_targetable() {
        return;
    }

    if let EnemyBehavior::Phasing {
        interval_ms,
        duration_ms,
    } = enemy.behavior
    {
        enemy.phasing = in_phase_window(now_ms, interval_ms, duration_ms);
    }

    if let Some(until) = enemy.knockback_until_ms {
        if now_ms < until {
            return;
        }
        enemy.knockback_until_ms = None;
        enemy.velocity = Vec2::ZERO;
    }

    if enemy.movement_locked {
        enemy.velocity = Vec2::ZERO;
        return;
    }

    let to_player = player - enemy.position;
    let distance = to_player.length();
    let direction = to_player.normalize_or_zero();

    enemy.velocity = match enemy.behavior {
        EnemyBehavior::Chase => direction * enemy.speed,
        EnemyBehavior::Phasing { .. } => {
            if enemy.phasing {
                Vec2::ZERO
            } else {
                direction * enemy.speed
            }
        }
        EnemyBehavior::Flying { kite_distance } => {
            if distance > kite_distance {
                direction * enemy.speed
            } else {
                // Strafe around the player instead of closing in
                direction.perp() * enemy.speed
            }
        }
        EnemyBehavior::Circling { radius } => {
            let radial = if radius > 0.0 {
                ((distance - radius) / radius).clamp(-1.0, 1.0)
            } else {
                1.0
            };
            (direction.perp() + direction * radial).normalize_or_zero() * enemy.speed
        }
        EnemyBehavior::Stationary => Vec2::ZERO,
    };

    if enemy.velocity.x != 0.0 {
        enemy.facing_left = enemy.velocity.x < 0.0;
    }
}
