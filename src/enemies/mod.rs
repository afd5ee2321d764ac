//! Enemy Engine
//!
//! Owns the live enemy collection: timed spawning on a ring around the player,
//! per-frame AI steering and movement, contact-attack cooldowns and death.
//!
//! ## Usage
//! ```ignore
//! let mut enemies = EnemyEngine::new(&config, GameRng::from_seed(7));
//! if let Some(enemy) = enemies.try_spawn(now_ms, player.position, level, bounds) {
//!     debug!("{} spawned", enemy.kind.name());
//! }
//! enemies.update(now_ms, dt_secs, player.position, bounds);
//! for (id, damage) in enemies.resolve_attacks(now_ms, player.position) { /* ... */ }
//! ```
//!
//! Dead enemies stay in the collection (flagged `is_dead`) until the
//! orchestrator calls [`EnemyEngine::remove_dead`] at the end of the frame, so
//! iteration order is never disturbed mid-frame.

pub mod ai;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{DifficultyScaling, EnemyArchetype, EnemyBehavior, EnemyType, ValidatedConfig};
use crate::rng::GameRng;
use crate::world::WorldBounds;

/// Collision radius of every enemy body
pub const ENEMY_RADIUS: f32 = 12.0;

/// Stable identity of an enemy for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(pub u64);

/// A live (or just-killed) enemy
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyType,
    pub position: Vec2,
    pub velocity: Vec2,
    pub health: f32,
    pub max_health: f32,
    /// Current speed, possibly reduced by a slow
    pub speed: f32,
    pub behavior: EnemyBehavior,
    pub attack_range: f32,
    pub attack_damage: f32,
    pub attack_cooldown_ms: u64,
    pub experience: u32,
    /// None until the first attack lands, so a fresh enemy may attack at once
    pub last_attack_ms: Option<u64>,
    pub is_dead: bool,
    /// Inside a phasing window: intangible and motionless
    pub phasing: bool,
    pub frozen: bool,
    /// Held by a stun or freeze
    pub movement_locked: bool,
    /// Speed before the active slow was applied
    pub slow_baseline: Option<f32>,
    /// Knockback impulse owns the velocity until this deadline
    pub knockback_until_ms: Option<u64>,
    pub facing_left: bool,
    pub spawned_ms: u64,
}

impl Enemy {
    pub fn from_archetype(
        id: EnemyId,
        kind: EnemyType,
        archetype: &EnemyArchetype,
        position: Vec2,
        now_ms: u64,
    ) -> Self {
        Self {
            id,
            kind,
            position,
            velocity: Vec2::ZERO,
            health: archetype.health,
            max_health: archetype.health,
            speed: archetype.speed,
            behavior: archetype.behavior,
            attack_range: archetype.attack_range,
            attack_damage: archetype.attack_damage,
            attack_cooldown_ms: archetype.attack_cooldown_ms,
            experience: archetype.experience,
            last_attack_ms: None,
            is_dead: false,
            phasing: false,
            frozen: false,
            movement_locked: false,
            slow_baseline: None,
            knockback_until_ms: None,
            facing_left: false,
            spawned_ms: now_ms,
        }
    }

    /// Alive and above zero health. Anything else is skipped by AI and collisions.
    pub fn is_targetable(&self) -> bool {
        !self.is_dead && self.health > 0.0
    }

    /// Can be struck by weapons and deal contact damage
    pub fn is_tangible(&self) -> bool {
        self.is_targetable() && !self.phasing
    }

    /// Contact attack check; on success records the attack time.
    pub fn try_attack(&mut self, now_ms: u64, player: Vec2) -> bool {
        if !self.is_tangible() {
            return false;
        }
        if self.position.distance(player) > self.attack_range {
            return false;
        }
        if let Some(last) = self.last_attack_ms {
            if now_ms.saturating_sub(last) < self.attack_cooldown_ms {
                return false;
            }
        }
        self.last_attack_ms = Some(now_ms);
        true
    }

    fn apply_difficulty(&mut self, scaling: &DifficultyScaling, level: u32) {
        self.health *= scaling.health_factor(level);
        self.max_health = self.health;
        self.attack_damage *= scaling.damage_factor(level);
    }
}

/// Nearest live enemy to `origin`; ties keep the first found.
pub fn find_nearest(origin: Vec2, enemies: &[Enemy]) -> Option<&Enemy> {
    let mut nearest: Option<(&Enemy, f32)> = None;
    for enemy in enemies.iter().filter(|e| e.is_targetable()) {
        let distance = enemy.position.distance_squared(origin);
        match nearest {
            Some((_, best)) if distance >= best => {}
            _ => nearest = Some((enemy, distance)),
        }
    }
    nearest.map(|(enemy, _)| enemy)
}

pub struct EnemyEngine {
    config: ValidatedConfig,
    enemies: Vec<Enemy>,
    next_id: u64,
    next_spawn_ms: u64,
    /// Archetypes eligible for natural spawning, with their weights
    roster: Vec<EnemyType>,
    weights: Vec<f32>,
    rng: GameRng,
}

impl EnemyEngine {
    pub fn new(config: &ValidatedConfig, rng: GameRng) -> Self {
        let (roster, weights) = config
            .enemies
            .iter()
            .filter(|(_, archetype)| archetype.spawn_weight > 0.0)
            .map(|(kind, archetype)| (*kind, archetype.spawn_weight))
            .unzip();

        Self {
            config: config.clone(),
            enemies: Vec::new(),
            next_id: 1,
            next_spawn_ms: config.tuning.initial_spawn_delay_ms,
            roster,
            weights,
            rng,
        }
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn live_count(&self) -> usize {
        self.enemies.iter().filter(|e| !e.is_dead).count()
    }

    pub fn next_spawn_ms(&self) -> u64 {
        self.next_spawn_ms
    }

    pub fn find_nearest(&self, origin: Vec2) -> Option<&Enemy> {
        find_nearest(origin, &self.enemies)
    }

    fn spawn_due(&self, now_ms: u64) -> bool {
        now_ms >= self.next_spawn_ms && self.live_count() < self.config.tuning.max_enemies
    }

    /// Spawn on the ring around the player at a random angle, if the timer and
    /// population cap allow it.
    pub fn try_spawn(&mut self, now_ms: u64, player: Vec2, level: u32, bounds: WorldBounds) -> Option<&Enemy> {
        if !self.spawn_due(now_ms) {
            return None;
        }
        let angle = self.rng.random_angle();
        self.try_spawn_at_angle(now_ms, angle, player, level, bounds)
    }

    /// Same as [`Self::try_spawn`] with a caller-chosen ring angle.
    ///
    /// A candidate outside the world is rejected without touching the spawn
    /// timer, so the next eligible frame retries.
    pub fn try_spawn_at_angle(
        &mut self,
        now_ms: u64,
        angle: f32,
        player: Vec2,
        level: u32,
        bounds: WorldBounds,
    ) -> Option<&Enemy> {
        if !self.spawn_due(now_ms) {
            return None;
        }

        let candidate = player + Vec2::from_angle(angle) * self.config.tuning.spawn_distance;
        if !bounds.contains(candidate) {
            debug!(
                "Rejected spawn candidate ({:.1}, {:.1}) outside {}x{} world",
                candidate.x, candidate.y, bounds.width, bounds.height
            );
            return None;
        }

        let index = self.rng.weighted_index(&self.weights)?;
        let kind = self.roster[index];
        let id = self.insert(kind, candidate, now_ms, level)?;

        let base_interval = self.config.tuning.spawn_interval_ms;
        let interval = match &self.config.tuning.difficulty {
            Some(scaling) => scaling.spawn_interval_ms(base_interval, level),
            None => base_interval,
        };
        self.next_spawn_ms = now_ms + interval;

        self.get(id)
    }

    /// Place a specific archetype directly, bypassing the timer and cap.
    /// Returns None when the archetype has no definition.
    pub fn spawn_at(&mut self, kind: EnemyType, position: Vec2, now_ms: u64) -> Option<EnemyId> {
        self.insert(kind, position, now_ms, 1)
    }

    fn insert(&mut self, kind: EnemyType, position: Vec2, now_ms: u64, level: u32) -> Option<EnemyId> {
        let archetype = self.config.archetype(kind)?;
        let id = EnemyId(self.next_id);
        self.next_id += 1;

        let mut enemy = Enemy::from_archetype(id, kind, archetype, position, now_ms);
        if let Some(scaling) = &self.config.tuning.difficulty {
            enemy.apply_difficulty(scaling, level);
        }
        debug!(
            "Spawned {} #{} at ({:.0}, {:.0}) with {:.0} HP",
            kind.name(),
            id.0,
            position.x,
            position.y,
            enemy.health
        );
        self.enemies.push(enemy);
        Some(id)
    }

    /// Steer every live enemy and integrate its movement
    pub fn update(&mut self, now_ms: u64, dt_secs: f32, player: Vec2, bounds: WorldBounds) {
        for enemy in self.enemies.iter_mut().filter(|e| e.is_targetable()) {
            ai::update_ai(enemy, player, now_ms);
            enemy.position = bounds.clamp(enemy.position + enemy.velocity * dt_secs);
        }
    }

    /// Enemies whose contact attack lands this frame, with the damage to apply
    pub fn resolve_attacks(&mut self, now_ms: u64, player: Vec2) -> Vec<(EnemyId, f32)> {
        self.enemies
            .iter_mut()
            .filter_map(|enemy| {
                enemy
                    .try_attack(now_ms, player)
                    .then_some((enemy.id, enemy.attack_damage))
            })
            .collect()
    }

    /// Mark an enemy dead. Returns false if it was already dead or unknown.
    pub fn kill(&mut self, id: EnemyId) -> bool {
        match self.get_mut(id) {
            Some(enemy) if !enemy.is_dead => {
                enemy.is_dead = true;
                enemy.velocity = Vec2::ZERO;
                enemy.knockback_until_ms = None;
                true
            }
            _ => false,
        }
    }

    /// Remove an enemy immediately without a kill
    pub fn despawn(&mut self, id: EnemyId) -> bool {
        let before = self.enemies.len();
        self.enemies.retain(|e| e.id != id);
        self.enemies.len() != before
    }

    /// Drop dead enemies from the collection, returning their ids
    pub fn remove_dead(&mut self) -> Vec<EnemyId> {
        let removed: Vec<EnemyId> = self.enemies.iter().filter(|e| e.is_dead).map(|e| e.id).collect();
        if !removed.is_empty() {
            self.enemies.retain(|e| !e.is_dead);
        }
        removed
    }

    pub fn clear(&mut self) {
        self.enemies.clear();
    }
}
