//! Enemy archetypes
//!
//! Immutable per-archetype stats loaded from `assets/config/enemies.ron`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnemyType {
    Skeleton,
    Bat,
    Bee,
    BigWorm,
    Eyeball,
    FemaleSlash,
    Ghost,
    ManEaterFlower,
    Princess,
    AladdinCarpet,
}

impl EnemyType {
    pub fn name(&self) -> &'static str {
        match self {
            EnemyType::Skeleton => "Skeleton",
            EnemyType::Bat => "Bat",
            EnemyType::Bee => "Bee",
            EnemyType::BigWorm => "Big Worm",
            EnemyType::Eyeball => "Eyeball",
            EnemyType::FemaleSlash => "Female Slash",
            EnemyType::Ghost => "Ghost",
            EnemyType::ManEaterFlower => "Man-Eater Flower",
            EnemyType::Princess => "Princess",
            EnemyType::AladdinCarpet => "Aladdin Carpet",
        }
    }
}

fn default_phase_interval() -> u64 {
    3000
}

fn default_phase_duration() -> u64 {
    1000
}

fn default_kite_distance() -> f32 {
    200.0
}

fn default_circle_radius() -> f32 {
    150.0
}

/// Movement and targeting pattern of an enemy archetype
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemyBehavior {
    /// Walk straight at the player
    Chase,
    /// Chase, but spend `duration_ms` of every `interval_ms` intangible and motionless
    Phasing {
        #[serde(default = "default_phase_interval")]
        interval_ms: u64,
        #[serde(default = "default_phase_duration")]
        duration_ms: u64,
    },
    /// Chase from afar, strafe around the player once inside `kite_distance`
    Flying {
        #[serde(default = "default_kite_distance")]
        kite_distance: f32,
    },
    /// Hold a ring of `radius` around the player
    Circling {
        #[serde(default = "default_circle_radius")]
        radius: f32,
    },
    /// Never moves
    Stationary,
}

impl EnemyBehavior {
    pub fn phasing() -> Self {
        EnemyBehavior::Phasing {
            interval_ms: default_phase_interval(),
            duration_ms: default_phase_duration(),
        }
    }

    pub fn flying() -> Self {
        EnemyBehavior::Flying {
            kite_distance: default_kite_distance(),
        }
    }

    pub fn circling() -> Self {
        EnemyBehavior::Circling {
            radius: default_circle_radius(),
        }
    }
}

fn default_enemy_speed() -> f32 {
    100.0
}

fn default_attack_range() -> f32 {
    50.0
}

fn default_attack_cooldown() -> u64 {
    1000
}

fn default_spawn_weight() -> f32 {
    1.0
}

/// Base stats for one enemy archetype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyArchetype {
    pub health: f32,
    #[serde(default = "default_enemy_speed")]
    pub speed: f32,
    pub behavior: EnemyBehavior,
    #[serde(default = "default_attack_range")]
    pub attack_range: f32,
    pub attack_damage: f32,
    #[serde(default = "default_attack_cooldown")]
    pub attack_cooldown_ms: u64,
    /// Experience awarded on kill
    pub experience: u32,
    /// Relative weight for the spawner (0 = never spawned naturally)
    #[serde(default = "default_spawn_weight")]
    pub spawn_weight: f32,
}

impl EnemyArchetype {
    pub fn validate(&self) -> Result<(), String> {
        if !self.health.is_finite() || self.health <= 0.0 {
            return Err(format!("health must be positive, got {}", self.health));
        }
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(format!("speed must be non-negative, got {}", self.speed));
        }
        if !self.attack_range.is_finite() || self.attack_range < 0.0 {
            return Err(format!("attack_range must be non-negative, got {}", self.attack_range));
        }
        if !self.attack_damage.is_finite() || self.attack_damage < 0.0 {
            return Err(format!("attack_damage must be non-negative, got {}", self.attack_damage));
        }
        if !self.spawn_weight.is_finite() || self.spawn_weight < 0.0 {
            return Err(format!("spawn_weight must be non-negative, got {}", self.spawn_weight));
        }
        if let EnemyBehavior::Phasing {
            interval_ms,
            duration_ms,
        } = self.behavior
        {
            if interval_ms == 0 || duration_ms >= interval_ms {
                return Err(format!(
                    "phasing duration ({}ms) must be shorter than its interval ({}ms)",
                    duration_ms, interval_ms
                ));
            }
        }
        Ok(())
    }
}
