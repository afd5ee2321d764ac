//! Persistent player-centred aura (Garlic)

use bevy::prelude::*;

use super::HitPayload;
use crate::config::{WeaponDefinition, WeaponType};
use crate::enemies::Enemy;

#[derive(Debug, Clone)]
pub struct Aura {
    pub weapon: WeaponType,
    pub center: Vec2,
    pub radius: f32,
    pub pulse_rate_ms: u64,
    pub last_pulse_ms: u64,
    pub payload: HitPayload,
}

impl Aura {
    /// The first pulse lands one pulse interval after creation
    pub fn new(weapon: WeaponType, definition: &WeaponDefinition, center: Vec2, now_ms: u64) -> Self {
        Self {
            weapon,
            center,
            radius: definition.range,
            pulse_rate_ms: definition.pulse_rate_ms(),
            last_pulse_ms: now_ms,
            payload: HitPayload::from_definition(definition),
        }
    }

    pub fn pulse_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_pulse_ms) >= self.pulse_rate_ms
    }

    pub fn covers(&self, enemy: &Enemy) -> bool {
        self.center.distance(enemy.position) <= self.radius
    }
}
