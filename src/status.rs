//! Status Effect Engine
//!
//! Tracks timed effects per enemy. At most one instance of each kind exists
//! per enemy; re-applying a kind overwrites its window instead of stacking.
//!
//! Per-kind behavior while active:
//! - Burn: 5 damage every 500ms
//! - Poison: 3 damage every 1000ms
//! - Slow: speed held at half of the pre-slow baseline
//! - Stun / Freeze: velocity held at zero (Freeze also sets the frozen marker)
//!
//! Damage ticks are gated on "time since last tick >= interval", so a long
//! frame produces at most one tick per effect rather than a catch-up burst.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

use crate::enemies::{Enemy, EnemyId};

pub const BURN_TICK_MS: u64 = 500;
pub const BURN_TICK_DAMAGE: f32 = 5.0;
pub const POISON_TICK_MS: u64 = 1000;
pub const POISON_TICK_DAMAGE: f32 = 3.0;
pub const SLOW_MULTIPLIER: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StatusKind {
    Burn,
    Slow,
    Poison,
    Stun,
    Freeze,
}

impl StatusKind {
    /// (interval, damage) for damage-over-time kinds
    pub fn periodic_damage(&self) -> Option<(u64, f32)> {
        match self {
            StatusKind::Burn => Some((BURN_TICK_MS, BURN_TICK_DAMAGE)),
            StatusKind::Poison => Some((POISON_TICK_MS, POISON_TICK_DAMAGE)),
            _ => None,
        }
    }

    /// Whether this kind pins the enemy in place
    pub fn locks_movement(&self) -> bool {
        matches!(self, StatusKind::Stun | StatusKind::Freeze)
    }
}

/// One active effect on one enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusInstance {
    pub kind: StatusKind,
    pub started_ms: u64,
    pub ends_ms: u64,
    pub last_tick_ms: u64,
}

impl StatusInstance {
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.ends_ms
    }
}

/// Something the status pass did that the orchestrator may want to report
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusOutcome {
    Ticked {
        enemy: EnemyId,
        kind: StatusKind,
        damage: f32,
    },
    Expired {
        enemy: EnemyId,
        kind: StatusKind,
    },
}

pub type StatusList = SmallVec<[StatusInstance; 4]>;

#[derive(Debug, Default)]
pub struct StatusEngine {
    effects: HashMap<EnemyId, StatusList>,
}

impl StatusEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite the (enemy, kind) instance.
    ///
    /// Returns true when the kind was not already active (a fresh application
    /// rather than a refresh).
    pub fn apply(&mut self, enemy: &mut Enemy, kind: StatusKind, duration_ms: u64, now_ms: u64) -> bool {
        if !enemy.is_targetable() {
            return false;
        }

        let instance = StatusInstance {
            kind,
            started_ms: now_ms,
            ends_ms: now_ms.saturating_add(duration_ms),
            last_tick_ms: now_ms,
        };

        let list = self.effects.entry(enemy.id).or_default();
        let fresh = match list.iter_mut().find(|i| i.kind == kind) {
            Some(existing) => {
                *existing = instance;
                false
            }
            None => {
                list.push(instance);
                true
            }
        };

        match kind {
            StatusKind::Slow => {
                // Capture the baseline once so a refresh never compounds the multiplier
                let baseline = *enemy.slow_baseline.get_or_insert(enemy.speed);
                enemy.speed = baseline * SLOW_MULTIPLIER;
            }
            StatusKind::Stun => {
                enemy.velocity = bevy::math::Vec2::ZERO;
                enemy.movement_locked = true;
            }
            StatusKind::Freeze => {
                enemy.velocity = bevy::math::Vec2::ZERO;
                enemy.movement_locked = true;
                enemy.frozen = true;
            }
            StatusKind::Burn | StatusKind::Poison => {}
        }

        fresh
    }

    /// Advance every active effect: expire, then apply per-kind behavior.
    pub fn tick(&mut self, now_ms: u64, enemies: &mut [Enemy]) -> Vec<StatusOutcome> {
        let mut outcomes = Vec::new();

        // Effects on enemies that no longer exist or already died are dropped
        self.effects.retain(|id, _| {
            enemies
                .iter()
                .any(|e| e.id == *id && !e.is_dead)
        });

        for enemy in enemies.iter_mut() {
            let Some(list) = self.effects.get_mut(&enemy.id) else {
                continue;
            };

            let mut expired: SmallVec<[StatusKind; 4]> = SmallVec::new();
            list.retain(|instance| {
                if instance.is_expired(now_ms) {
                    expired.push(instance.kind);
                    false
                } else {
                    true
                }
            });
            for kind in expired {
                revert(enemy, kind, list);
                outcomes.push(StatusOutcome::Expired {
                    enemy: enemy.id,
                    kind,
                });
            }

            // Enemies brought to zero health this frame take no further ticks
            if enemy.health <= 0.0 {
                continue;
            }

            for instance in list.iter_mut() {
                if let Some((interval, damage)) = instance.kind.periodic_damage() {
                    if now_ms.saturating_sub(instance.last_tick_ms) >= interval {
                        enemy.health -= damage;
                        instance.last_tick_ms = now_ms;
                        outcomes.push(StatusOutcome::Ticked {
                            enemy: enemy.id,
                            kind: instance.kind,
                            damage,
                        });
                    }
                    continue;
                }
                match instance.kind {
                    StatusKind::Slow => {
                        if let Some(baseline) = enemy.slow_baseline {
                            enemy.speed = baseline * SLOW_MULTIPLIER;
                        }
                    }
                    StatusKind::Stun | StatusKind::Freeze => {
                        enemy.velocity = bevy::math::Vec2::ZERO;
                    }
                    StatusKind::Burn | StatusKind::Poison => {}
                }
            }
        }

        self.effects.retain(|_, list| !list.is_empty());
        outcomes
    }

    /// Remove one effect early and restore what it changed. No-op when absent.
    pub fn remove(&mut self, enemy: &mut Enemy, kind: StatusKind) -> bool {
        let Some(list) = self.effects.get_mut(&enemy.id) else {
            return false;
        };
        let before = list.len();
        list.retain(|i| i.kind != kind);
        if list.len() == before {
            return false;
        }
        revert(enemy, kind, list);
        if list.is_empty() {
            self.effects.remove(&enemy.id);
        }
        true
    }

    /// Drop every effect on an enemy. Used when the enemy is destroyed.
    pub fn purge(&mut self, enemy: EnemyId) -> bool {
        self.effects.remove(&enemy).is_some()
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }

    pub fn instance(&self, enemy: EnemyId, kind: StatusKind) -> Option<&StatusInstance> {
        self.effects.get(&enemy)?.iter().find(|i| i.kind == kind)
    }

    pub fn has(&self, enemy: EnemyId, kind: StatusKind) -> bool {
        self.instance(enemy, kind).is_some()
    }

    /// Active kinds on an enemy, in application order
    pub fn active_kinds(&self, enemy: EnemyId) -> SmallVec<[StatusKind; 4]> {
        self.effects
            .get(&enemy)
            .map(|list| list.iter().map(|i| i.kind).collect())
            .unwrap_or_default()
    }

    /// Number of enemies carrying at least one effect
    pub fn tracked_enemies(&self) -> usize {
        self.effects.len()
    }
}

/// Undo the modifiers of `kind`. `remaining` is the enemy's list after removal,
/// so a lock held by another effect survives.
fn revert(enemy: &mut Enemy, kind: StatusKind, remaining: &StatusList) {
    match kind {
        StatusKind::Slow => {
            if let Some(baseline) = enemy.slow_baseline.take() {
                enemy.speed = baseline;
            }
        }
        StatusKind::Freeze => {
            enemy.frozen = false;
            enemy.movement_locked = remaining.iter().any(|i| i.kind.locks_movement());
        }
        StatusKind::Stun => {
            enemy.movement_locked = remaining.iter().any(|i| i.kind.locks_movement());
        }
        StatusKind::Burn | StatusKind::Poison => {}
    }
}
