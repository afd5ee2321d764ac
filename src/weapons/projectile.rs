//! In-flight projectiles
//!
//! A projectile travels in a straight line from where it was fired until it
//! either exhausts its pierce budget or travels past its range. Returning
//! projectiles (Throwing Axe) instead turn back toward the player after
//! [`RETURN_DELAY_MS`] and are caught when they reach the player.

use bevy::prelude::*;
use smallvec::{smallvec, SmallVec};

use super::HitPayload;
use crate::config::{Pierce, WeaponDefinition, WeaponType};
use crate::enemies::{Enemy, EnemyId, ENEMY_RADIUS};

pub const PROJECTILE_RADIUS: f32 = 8.0;
pub const RETURN_DELAY_MS: u64 = 1000;
pub const RETURN_SPEED: f32 = 300.0;
/// Distance from the player at which a returning projectile is caught
pub const CATCH_RADIUS: f32 = 24.0;
/// A returning projectile that never reaches the player is retired after this
pub const RETURN_TIMEOUT_MS: u64 = 3000;
/// Visual spin for `rotates` weapons, radians per second
pub const SPIN_RATE: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(pub u64);

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: ProjectileId,
    pub weapon: WeaponType,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Spawn point, for the range cutoff
    pub origin: Vec2,
    pub range: f32,
    pub pierce: Pierce,
    pub payload: HitPayload,
    /// Distinct enemies already struck
    pub hit_enemies: SmallVec<[EnemyId; 4]>,
    pub spawned_ms: u64,
    pub returns_to_player: bool,
    pub returning_since_ms: Option<u64>,
    pub rotates: bool,
    pub rotation: f32,
    pub active: bool,
}

impl Projectile {
    pub fn new(
        id: ProjectileId,
        weapon: WeaponType,
        definition: &WeaponDefinition,
        origin: Vec2,
        angle: f32,
        now_ms: u64,
    ) -> Self {
        Self {
            id,
            weapon,
            position: origin,
            velocity: Vec2::from_angle(angle) * definition.speed,
            origin,
            range: definition.range,
            pierce: definition.pierce,
            payload: HitPayload::from_definition(definition),
            hit_enemies: SmallVec::new(),
            spawned_ms: now_ms,
            returns_to_player: definition.returns_to_player,
            returning_since_ms: None,
            rotates: definition.rotates,
            rotation: 0.0,
            active: true,
        }
    }

    pub fn travelled(&self) -> f32 {
        self.position.distance(self.origin)
    }

    pub fn is_returning(&self) -> bool {
        self.returning_since_ms.is_some()
    }

    /// Move one step and apply the retirement rules
    pub fn advance(&mut self, now_ms: u64, dt_secs: f32, player: Vec2) {
        if !self.active {
            return;
        }

        if self.returns_to_player {
            if self.returning_since_ms.is_none() && now_ms.saturating_sub(self.spawned_ms) >= RETURN_DELAY_MS {
                self.returning_since_ms = Some(now_ms);
            }
            if let Some(since) = self.returning_since_ms {
                self.velocity = (player - self.position).normalize_or_zero() * RETURN_SPEED;
                if now_ms.saturating_sub(since) >= RETURN_TIMEOUT_MS {
                    self.active = false;
                    return;
                }
            }
        }

        self.position += self.velocity * dt_secs;
        if self.rotates {
            self.rotation = (self.rotation + SPIN_RATE * dt_secs) % std::f32::consts::TAU;
        }

        if self.is_returning() {
            if self.position.distance(player) <= CATCH_RADIUS {
                self.active = false;
            }
        } else if !self.returns_to_player && self.travelled() > self.range {
            self.active = false;
        }
    }

    /// Overlap test against one enemy, ignoring the pierce budget
    pub fn overlaps(&self, enemy: &Enemy) -> bool {
        self.position.distance(enemy.position) <= PROJECTILE_RADIUS + ENEMY_RADIUS
    }

    pub fn has_hit(&self, enemy: EnemyId) -> bool {
        self.hit_enemies.contains(&enemy)
    }

    /// Record a distinct hit; retires the projectile once pierce is exhausted
    pub fn register_hit(&mut self, enemy: EnemyId) {
        if self.has_hit(enemy) {
            return;
        }
        self.hit_enemies.push(enemy);
        if self.pierce.is_exhausted(self.hit_enemies.len()) {
            self.active = false;
        }
    }
}

/// Launch angles for one volley aimed at `aim`.
///
/// Cross patterns spread the volley evenly around the full circle; otherwise
/// projectiles fan across `spread_degrees` centred on the aim.
pub fn volley_angles(aim: f32, definition: &WeaponDefinition) -> SmallVec<[f32; 8]> {
    let count = definition.projectile_count.max(1);
    if count == 1 {
        return smallvec![aim];
    }

    if definition.cross_pattern {
        let step = std::f32::consts::TAU / count as f32;
        return (0..count).map(|i| aim + step * i as f32).collect();
    }

    let spread = definition.spread_degrees.to_radians();
    if spread <= 0.0 {
        return (0..count).map(|_| aim).collect();
    }
    let start = aim - spread / 2.0;
    let step = spread / (count - 1) as f32;
    (0..count).map(|i| start + step * i as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn definition(weapon: WeaponType) -> WeaponDefinition {
        GameConfig::builtin().unwrap().weapon(weapon).unwrap().clone()
    }

    #[test]
    fn test_projectile_retires_past_range() {
        let dagger = definition(WeaponType::Dagger);
        let mut projectile = Projectile::new(ProjectileId(1), WeaponType::Dagger, &dagger, Vec2::ZERO, 0.0, 0);
        // 300 u/s, range 200: still active at 0.6s, gone after 0.7s
        for step in 1..=6 {
            projectile.advance(step * 100, 0.1, Vec2::ZERO);
        }
        assert!(projectile.active);
        projectile.advance(700, 0.1, Vec2::ZERO);
        assert!(!projectile.active);
    }

    #[test]
    fn test_returning_projectile_is_caught_by_player() {
        let axe = definition(WeaponType::ThrowingAxe);
        let mut projectile = Projectile::new(ProjectileId(1), WeaponType::ThrowingAxe, &axe, Vec2::ZERO, 0.0, 0);
        let mut now = 0;
        while now < RETURN_DELAY_MS {
            now += 100;
            projectile.advance(now, 0.1, Vec2::ZERO);
        }
        assert!(projectile.is_returning());
        assert!(projectile.active, "returning projectiles ignore range");

        for _ in 0..10 {
            now += 100;
            projectile.advance(now, 0.1, Vec2::ZERO);
        }
        assert!(!projectile.active);
    }

    #[test]
    fn test_cross_pattern_covers_full_circle() {
        let cross = definition(WeaponType::HolyCross);
        let angles = volley_angles(0.0, &cross);
        assert_eq!(angles.len(), 4);
        assert!((angles[1] - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert!((angles[3] - 3.0 * std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_spread_is_centred_on_aim() {
        let wand = definition(WeaponType::MagicWand);
        let angles = volley_angles(1.0, &wand);
        assert_eq!(angles.len(), 3);
        assert!((angles[1] - 1.0).abs() < 1e-5);
        assert!((angles[2] - angles[0] - 30f32.to_radians()).abs() < 1e-5);
    }
}
