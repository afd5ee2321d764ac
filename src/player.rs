//! Player state and progression
//!
//! The orchestrator is the only writer of health, experience and level.
//! [`Progression`] is plain serde data so a presentation layer can save it and
//! hand it back through `Session::restore_progression`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{PlayerTuning, ProgressionRules};
use crate::world::WorldBounds;

/// Health, level and experience curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    pub health: f32,
    pub max_health: f32,
    pub level: u32,
    pub experience: u32,
    pub next_level_exp: u32,
}

impl Progression {
    pub fn new(max_health: f32, first_threshold: u32) -> Self {
        Self {
            health: max_health,
            max_health,
            level: 1,
            experience: 0,
            next_level_exp: first_threshold,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn ready_to_level(&self) -> bool {
        self.experience >= self.next_level_exp
    }

    /// Add experience without checking the threshold
    pub fn grant_experience(&mut self, amount: u32) {
        self.experience = self.experience.saturating_add(amount);
    }

    /// Add experience and level up in the same call if the threshold is reached
    pub fn add_experience(&mut self, amount: u32, rules: &ProgressionRules) -> bool {
        self.grant_experience(amount);
        if self.ready_to_level() {
            self.level_up(rules);
            return true;
        }
        false
    }

    /// Heal (capped at the old max), raise max health, reset experience and
    /// grow the threshold. Leftover experience is discarded.
    pub fn level_up(&mut self, rules: &ProgressionRules) {
        self.health = (self.health + rules.level_up_heal).min(self.max_health);
        self.max_health += rules.level_up_max_health;
        self.level += 1;
        self.experience = 0;
        // Nudge before flooring so 100 * 1.2 lands on 120, not 119
        let next = (self.next_level_exp as f64 * rules.threshold_multiplier + 1e-9).floor();
        self.next_level_exp = (next as u32).max(1);
    }

    /// Subtract damage, flooring health at zero. Returns the damage taken.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let before = self.health;
        self.health = (self.health - amount.max(0.0)).max(0.0);
        before - self.health
    }

    /// Reject saved state that could not have come from a real run
    pub fn validate(&self) -> Result<(), String> {
        if !self.max_health.is_finite() || self.max_health <= 0.0 {
            return Err(format!("max_health must be positive, got {}", self.max_health));
        }
        if !self.health.is_finite() || self.health <= 0.0 || self.health > self.max_health {
            return Err(format!(
                "health must be in (0, {}], got {}",
                self.max_health, self.health
            ));
        }
        if self.level == 0 {
            return Err("level must be at least 1".to_string());
        }
        if self.next_level_exp == 0 {
            return Err("next_level_exp must be positive".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Unit vector of the last non-zero movement intent
    pub facing: Vec2,
    pub speed: f32,
    pub progression: Progression,
}

impl Player {
    pub fn new(tuning: &PlayerTuning, rules: &ProgressionRules, position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            facing: Vec2::X,
            speed: tuning.speed,
            progression: Progression::new(tuning.max_health, rules.first_threshold),
        }
    }

    /// Move by a movement intent (expected normalized; longer vectors are clamped to unit length)
    pub fn apply_input(&mut self, intent: Vec2, dt_secs: f32) {
        let intent = if intent.is_finite() {
            intent.clamp_length_max(1.0)
        } else {
            Vec2::ZERO
        };
        self.velocity = intent * self.speed;
        self.position += self.velocity * dt_secs;
        if intent != Vec2::ZERO {
            self.facing = intent.normalize_or(self.facing);
        }
    }

    pub fn clamp_to(&mut self, bounds: WorldBounds) {
        self.position = bounds.clamp(self.position);
    }

    pub fn facing_left(&self) -> bool {
        self.facing.x < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_growth_over_several_levels() {
        let rules = ProgressionRules::default();
        let mut progression = Progression::new(100.0, 100);
        let mut thresholds = Vec::new();
        for _ in 0..3 {
            progression.level_up(&rules);
            thresholds.push(progression.next_level_exp);
        }
        assert_eq!(thresholds, vec![120, 144, 172]);
        assert_eq!(progression.max_health, 130.0);
    }

    #[test]
    fn test_below_threshold_does_not_level() {
        let rules = ProgressionRules::default();
        let mut progression = Progression::new(100.0, 100);
        assert!(!progression.add_experience(99, &rules));
        assert_eq!(progression.level, 1);
        assert!(progression.add_experience(1, &rules));
        assert_eq!(progression.level, 2);
    }

    #[test]
    fn test_damage_floors_at_zero() {
        let mut progression = Progression::new(50.0, 100);
        assert_eq!(progression.take_damage(80.0), 50.0);
        assert_eq!(progression.health, 0.0);
        assert!(progression.is_dead());
    }

    #[test]
    fn test_facing_follows_last_nonzero_intent() {
        let mut player = Player::new(&PlayerTuning::default(), &ProgressionRules::default(), Vec2::ZERO);
        player.apply_input(Vec2::new(-1.0, 0.0), 0.5);
        assert_eq!(player.position, Vec2::new(-100.0, 0.0));
        player.apply_input(Vec2::ZERO, 0.5);
        assert!(player.facing_left());
    }
}
