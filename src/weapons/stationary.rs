//! Fixed-position damage zones (Holy Water)
//!
//! A zone stays where the player stood when it was dropped. It pulses as soon
//! as it lands, then every pulse interval until its lifetime ends.

use bevy::prelude::*;

use super::HitPayload;
use crate::config::{WeaponDefinition, WeaponType};
use crate::enemies::Enemy;

#[derive(Debug, Clone)]
pub struct Zone {
    pub weapon: WeaponType,
    pub position: Vec2,
    pub radius: f32,
    pub pulse_rate_ms: u64,
    pub last_pulse_ms: Option<u64>,
    pub expires_ms: u64,
    pub payload: HitPayload,
}

impl Zone {
    pub fn new(weapon: WeaponType, definition: &WeaponDefinition, position: Vec2, now_ms: u64) -> Self {
        Self {
            weapon,
            position,
            radius: definition.range,
            pulse_rate_ms: definition.pulse_rate_ms(),
            last_pulse_ms: None,
            expires_ms: now_ms.saturating_add(definition.zone_duration_ms()),
            payload: HitPayload::from_definition(definition),
        }
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.expires_ms
    }

    pub fn pulse_due(&self, now_ms: u64) -> bool {
        match self.last_pulse_ms {
            Some(last) => now_ms.saturating_sub(last) >= self.pulse_rate_ms,
            None => true,
        }
    }

    pub fn covers(&self, enemy: &Enemy) -> bool {
        self.position.distance(enemy.position) <= self.radius
    }
}
