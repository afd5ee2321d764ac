//! Session-wide tunable constants

use serde::{Deserialize, Serialize};

use super::weapons::WeaponType;
use crate::world::WorldBounds;

/// Player base stats at the start of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerTuning {
    pub max_health: f32,
    /// Movement speed in units per second
    pub speed: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            speed: 200.0,
        }
    }
}

/// Experience curve and level-up rewards
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressionRules {
    /// Experience needed to go from level 1 to level 2
    pub first_threshold: u32,
    /// Threshold growth per level
    pub threshold_multiplier: f64,
    /// Health restored on level-up (capped at the pre-level max)
    pub level_up_heal: f32,
    /// Max health gained on level-up
    pub level_up_max_health: f32,
}

impl Default for ProgressionRules {
    fn default() -> Self {
        Self {
            first_threshold: 100,
            threshold_multiplier: 1.2,
            level_up_heal: 20.0,
            level_up_max_health: 10.0,
        }
    }
}

/// Per-level multipliers applied to newly spawned enemies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyScaling {
    pub health_multiplier: f32,
    pub damage_multiplier: f32,
    pub spawn_rate_multiplier: f32,
}

impl DifficultyScaling {
    fn factor(base: f32, level: u32) -> f32 {
        base.powi(level.saturating_sub(1).min(i32::MAX as u32) as i32)
    }

    pub fn health_factor(&self, level: u32) -> f32 {
        Self::factor(self.health_multiplier, level)
    }

    pub fn damage_factor(&self, level: u32) -> f32 {
        Self::factor(self.damage_multiplier, level)
    }

    /// Spawn interval at `level`, never shorter than 1ms
    pub fn spawn_interval_ms(&self, base_ms: u64, level: u32) -> u64 {
        let scaled = base_ms as f64 / Self::factor(self.spawn_rate_multiplier, level) as f64;
        (scaled.round() as u64).max(1)
    }
}

fn default_initial_spawn_delay() -> u64 {
    1000
}

fn default_score_per_kill() -> u32 {
    10
}

/// Tunable constants supplied at session start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    pub spawn_interval_ms: u64,
    #[serde(default = "default_initial_spawn_delay")]
    pub initial_spawn_delay_ms: u64,
    pub max_enemies: usize,
    /// Radius of the spawn ring around the player
    pub spawn_distance: f32,
    pub world: WorldBounds,
    #[serde(default)]
    pub player: PlayerTuning,
    #[serde(default)]
    pub progression: ProgressionRules,
    #[serde(default = "default_score_per_kill")]
    pub score_per_kill: u32,
    pub starting_weapons: Vec<WeaponType>,
    #[serde(default)]
    pub difficulty: Option<DifficultyScaling>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            spawn_interval_ms: 2000,
            initial_spawn_delay_ms: default_initial_spawn_delay(),
            max_enemies: 50,
            spawn_distance: 400.0,
            world: WorldBounds::default(),
            player: PlayerTuning::default(),
            progression: ProgressionRules::default(),
            score_per_kill: default_score_per_kill(),
            starting_weapons: vec![WeaponType::Dagger],
            difficulty: None,
        }
    }
}

impl Tuning {
    pub fn validate(&self) -> Result<(), String> {
        if self.spawn_interval_ms == 0 {
            return Err("spawn_interval_ms must be positive".to_string());
        }
        if !self.spawn_distance.is_finite() || self.spawn_distance <= 0.0 {
            return Err(format!("spawn_distance must be positive, got {}", self.spawn_distance));
        }
        if !(self.world.width > 0.0 && self.world.height > 0.0)
            || !self.world.width.is_finite()
            || !self.world.height.is_finite()
        {
            return Err(format!(
                "world bounds must be positive, got {}x{}",
                self.world.width, self.world.height
            ));
        }
        if !self.player.max_health.is_finite() || self.player.max_health <= 0.0 {
            return Err("player max_health must be positive".to_string());
        }
        if !self.player.speed.is_finite() || self.player.speed < 0.0 {
            return Err("player speed must be non-negative".to_string());
        }
        if self.progression.first_threshold == 0 {
            return Err("progression first_threshold must be positive".to_string());
        }
        if !(self.progression.threshold_multiplier >= 1.0) {
            return Err(format!(
                "progression threshold_multiplier must be >= 1.0, got {}",
                self.progression.threshold_multiplier
            ));
        }
        if let Some(difficulty) = &self.difficulty {
            let all_positive = [
                difficulty.health_multiplier,
                difficulty.damage_multiplier,
                difficulty.spawn_rate_multiplier,
            ]
            .iter()
            .all(|m| m.is_finite() && *m > 0.0);
            if !all_positive {
                return Err("difficulty multipliers must be positive".to_string());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_is_neutral_at_level_one() {
        let scaling = DifficultyScaling {
            health_multiplier: 1.1,
            damage_multiplier: 1.05,
            spawn_rate_multiplier: 1.1,
        };
        assert_eq!(scaling.health_factor(1), 1.0);
        assert_eq!(scaling.damage_factor(1), 1.0);
        assert_eq!(scaling.spawn_interval_ms(2000, 1), 2000);
    }

    #[test]
    fn test_difficulty_compounds_per_level() {
        let scaling = DifficultyScaling {
            health_multiplier: 1.1,
            damage_multiplier: 1.05,
            spawn_rate_multiplier: 1.1,
        };
        assert!((scaling.health_factor(3) - 1.21).abs() < 1e-5);
        assert_eq!(scaling.spawn_interval_ms(2000, 2), 1818);
    }
}
