//! Weapon definitions
//!
//! Immutable weapon data loaded from `assets/config/weapons.ron`. A definition
//! describes what a weapon does when it fires; the mutable per-player state
//! (`last_fired`) lives on the equipped instance in the weapon engine.

use serde::{Deserialize, Serialize};

use crate::status::StatusKind;

/// Every weapon the game knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeaponType {
    Dagger,
    Bow,
    MagicWand,
    ThrowingAxe,
    HolyCross,
    Garlic,
    Whip,
    Bible,
    HolyWater,
}

impl WeaponType {
    pub fn all() -> &'static [WeaponType] {
        &[
            WeaponType::Dagger,
            WeaponType::Bow,
            WeaponType::MagicWand,
            WeaponType::ThrowingAxe,
            WeaponType::HolyCross,
            WeaponType::Garlic,
            WeaponType::Whip,
            WeaponType::Bible,
            WeaponType::HolyWater,
        ]
    }

    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            WeaponType::Dagger => "Dagger",
            WeaponType::Bow => "Bow",
            WeaponType::MagicWand => "Magic Wand",
            WeaponType::ThrowingAxe => "Throwing Axe",
            WeaponType::HolyCross => "Holy Cross",
            WeaponType::Garlic => "Garlic",
            WeaponType::Whip => "Whip",
            WeaponType::Bible => "Bible",
            WeaponType::HolyWater => "Holy Water",
        }
    }

    /// Parse a weapon name as written in headless configs ("Dagger", "MagicWand", "Magic Wand")
    pub fn parse(name: &str) -> Option<WeaponType> {
        let compact: String = name.chars().filter(|c| !c.is_whitespace() && *c != '_' && *c != '-').collect();
        WeaponType::all()
            .iter()
            .copied()
            .find(|w| format!("{:?}", w).eq_ignore_ascii_case(&compact))
    }
}

/// How a weapon behaves when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponBehavior {
    /// Spawns travelling projectiles aimed at the nearest enemy
    Projectile,
    /// Persistent aura around the player that pulses damage
    Area,
    /// Instances circling the player at a fixed radius
    Orbit,
    /// Instant arc-shaped hit in front of the player
    Melee,
    /// Fixed-position zone dropped where the player stood
    Stationary,
}

/// How many distinct enemies a single projectile may hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pierce {
    Limited(u32),
    Unlimited,
}

impl Default for Pierce {
    fn default() -> Self {
        Pierce::Limited(1)
    }
}

impl Pierce {
    /// True once `hits` distinct enemies have been struck
    pub fn is_exhausted(&self, hits: usize) -> bool {
        match self {
            Pierce::Limited(limit) => hits >= *limit as usize,
            Pierce::Unlimited => false,
        }
    }
}

/// Status effect carried by a weapon hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusPayload {
    pub kind: StatusKind,
    pub duration_ms: u64,
}

fn default_speed() -> f32 {
    200.0
}

fn default_range() -> f32 {
    200.0
}

fn default_projectile_count() -> u32 {
    1
}

/// Complete weapon configuration loaded from RON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponDefinition {
    pub behavior: WeaponBehavior,
    /// Damage per hit
    pub damage: f32,
    /// Time between fires in milliseconds
    pub cooldown_ms: u64,
    /// Projectile travel speed in units per second
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// Travel cutoff for projectiles, radius for auras, zones and melee arcs
    #[serde(default = "default_range")]
    pub range: f32,
    /// Projectiles per volley, or orbiters per ring
    #[serde(default = "default_projectile_count")]
    pub projectile_count: u32,
    #[serde(default)]
    pub pierce: Pierce,
    /// Velocity impulse imparted away from the player on hit
    #[serde(default)]
    pub knockback: Option<f32>,
    #[serde(default)]
    pub status: Option<StatusPayload>,
    /// Fan angle for multi-projectile volleys
    #[serde(default)]
    pub spread_degrees: f32,
    /// Distribute the volley evenly around the full circle instead of aiming
    #[serde(default)]
    pub cross_pattern: bool,
    /// Projectile turns back toward the player instead of expiring at range
    #[serde(default)]
    pub returns_to_player: bool,
    /// Visual spin, presentation only
    #[serde(default)]
    pub rotates: bool,
    /// Damage cadence for auras and zones (defaults to the cooldown)
    #[serde(default)]
    pub pulse_rate_ms: Option<u64>,
    /// Melee swing arc (defaults to 90 degrees)
    #[serde(default)]
    pub arc_degrees: Option<f32>,
    /// Orbit angle advanced per update in radians (defaults to 0.02)
    #[serde(default)]
    pub orbit_step: Option<f32>,
    /// Lifetime of a stationary zone (defaults to 3000ms)
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

impl WeaponDefinition {
    /// Effective pulse cadence for auras and stationary zones
    pub fn pulse_rate_ms(&self) -> u64 {
        self.pulse_rate_ms.unwrap_or(self.cooldown_ms)
    }

    pub fn arc_radians(&self) -> f32 {
        self.arc_degrees.unwrap_or(90.0).to_radians()
    }

    pub fn orbit_step(&self) -> f32 {
        self.orbit_step.unwrap_or(0.02)
    }

    pub fn zone_duration_ms(&self) -> u64 {
        self.duration_ms.unwrap_or(3000)
    }

    /// Check the semantic constraints serde cannot express
    pub fn validate(&self) -> Result<(), String> {
        if !self.damage.is_finite() || self.damage < 0.0 {
            return Err(format!("damage must be non-negative, got {}", self.damage));
        }
        if self.cooldown_ms == 0 {
            return Err("cooldown_ms must be positive".to_string());
        }
        if !self.range.is_finite() || self.range <= 0.0 {
            return Err(format!("range must be positive, got {}", self.range));
        }
        if let Some(knockback) = self.knockback {
            if !knockback.is_finite() || knockback < 0.0 {
                return Err(format!("knockback must be non-negative, got {}", knockback));
            }
        }
        if let Pierce::Limited(0) = self.pierce {
            return Err("pierce must allow at least one hit".to_string());
        }
        match self.behavior {
            WeaponBehavior::Projectile => {
                if self.projectile_count == 0 {
                    return Err("projectile weapons need projectile_count >= 1".to_string());
                }
                if !self.speed.is_finite() || self.speed <= 0.0 {
                    return Err(format!("projectile speed must be positive, got {}", self.speed));
                }
            }
            WeaponBehavior::Orbit => {
                if self.projectile_count == 0 {
                    return Err("orbit weapons need projectile_count >= 1".to_string());
                }
            }
            WeaponBehavior::Area | WeaponBehavior::Stationary => {
                if self.pulse_rate_ms() == 0 {
                    return Err("pulse_rate_ms must be positive".to_string());
                }
            }
            WeaponBehavior::Melee => {}
        }
        Ok(())
    }
}
