//! Orbiting weapon instances (Bible)
//!
//! A ring of orbiters evenly spaced around the player at [`ORBIT_RADIUS`].
//! Positions are recomputed from the player's current position every update,
//! so the ring follows a moving player. An orbiter may strike the same enemy
//! again once [`ORBIT_REHIT_MS`] has passed.

use bevy::prelude::*;
use smallvec::SmallVec;

use super::HitPayload;
use crate::config::{WeaponDefinition, WeaponType};
use crate::enemies::{Enemy, EnemyId, ENEMY_RADIUS};

pub const ORBIT_RADIUS: f32 = 50.0;
pub const ORBITER_RADIUS: f32 = 10.0;
pub const ORBIT_REHIT_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct Orbiter {
    pub angle: f32,
    pub position: Vec2,
    /// Last time each enemy was struck by this orbiter
    last_hits: SmallVec<[(EnemyId, u64); 8]>,
}

impl Orbiter {
    fn place(&mut self, center: Vec2) {
        self.position = center + Vec2::from_angle(self.angle) * ORBIT_RADIUS;
    }

    pub fn overlaps(&self, enemy: &Enemy) -> bool {
        self.position.distance(enemy.position) <= ORBITER_RADIUS + ENEMY_RADIUS
    }

    /// True if this orbiter may strike `enemy` now; records the hit when it may
    pub fn try_hit(&mut self, enemy: EnemyId, now_ms: u64) -> bool {
        match self.last_hits.iter_mut().find(|(id, _)| *id == enemy) {
            Some((_, last)) => {
                if now_ms.saturating_sub(*last) < ORBIT_REHIT_MS {
                    return false;
                }
                *last = now_ms;
            }
            None => self.last_hits.push((enemy, now_ms)),
        }
        true
    }

    /// Forget enemies that no longer exist
    fn prune(&mut self, live: &[Enemy]) {
        self.last_hits.retain(|(id, _)| live.iter().any(|e| e.id == *id));
    }
}

#[derive(Debug, Clone)]
pub struct OrbitRing {
    pub weapon: WeaponType,
    /// Angle advanced per update, radians
    pub step: f32,
    pub payload: HitPayload,
    pub orbiters: Vec<Orbiter>,
}

impl OrbitRing {
    pub fn new(weapon: WeaponType, definition: &WeaponDefinition, center: Vec2) -> Self {
        let count = definition.projectile_count.max(1);
        let spacing = std::f32::consts::TAU / count as f32;
        let orbiters = (0..count)
            .map(|i| {
                let mut orbiter = Orbiter {
                    angle: spacing * i as f32,
                    position: center,
                    last_hits: SmallVec::new(),
                };
                orbiter.place(center);
                orbiter
            })
            .collect();

        Self {
            weapon,
            step: definition.orbit_step(),
            payload: HitPayload::from_definition(definition),
            orbiters,
        }
    }

    pub fn advance(&mut self, center: Vec2) {
        for orbiter in &mut self.orbiters {
            orbiter.angle = (orbiter.angle + self.step) % std::f32::consts::TAU;
            orbiter.place(center);
        }
    }

    pub fn prune(&mut self, live: &[Enemy]) {
        for orbiter in &mut self.orbiters {
            orbiter.prune(live);
        }
    }
}
