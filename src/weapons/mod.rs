//! Weapon Engine
//!
//! Owns the player's equipped weapons and every live weapon instance:
//! projectiles, orbit rings, auras and stationary zones. Each frame the
//! orchestrator calls, in order:
//!
//! 1. [`WeaponEngine::fire_due`] - fire every weapon whose cooldown has elapsed
//! 2. [`WeaponEngine::advance`] - move projectiles and orbiters, expire zones
//! 3. [`WeaponEngine::detect_collisions`] - brute-force overlap checks against
//!    the enemy collection, producing [`WeaponHit`]s
//!
//! and then applies each hit with [`resolve_collision`]. The engine only reads
//! enemies; damage, knockback and status are applied by the orchestrator.

pub mod aura;
pub mod melee;
pub mod orbit;
pub mod projectile;
pub mod stationary;

use bevy::prelude::*;
use std::collections::HashMap;

use crate::config::{StatusPayload, WeaponBehavior, WeaponDefinition, WeaponType};
use crate::enemies::{find_nearest, Enemy, EnemyId};
use crate::player::Player;
use crate::status::{StatusEngine, StatusKind};
use crate::world::WorldBounds;

pub use aura::Aura;
pub use orbit::{OrbitRing, Orbiter};
pub use projectile::{Projectile, ProjectileId};
pub use stationary::Zone;

/// How long a knockback impulse owns an enemy's velocity
pub const KNOCKBACK_DURATION_MS: u64 = 100;

/// What a single hit carries to its target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitPayload {
    pub damage: f32,
    pub knockback: Option<f32>,
    pub status: Option<StatusPayload>,
}

impl HitPayload {
    pub fn from_definition(definition: &WeaponDefinition) -> Self {
        Self {
            damage: definition.damage,
            knockback: definition.knockback,
            status: definition.status,
        }
    }
}

/// Which weapon instance produced a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitSource {
    Projectile(ProjectileId),
    Orbiter,
    Aura,
    Melee,
    Zone,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponHit {
    pub weapon: WeaponType,
    pub source: HitSource,
    pub enemy: EnemyId,
    pub payload: HitPayload,
}

/// Emitted when a weapon fires and something came of it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireEvent {
    pub weapon: WeaponType,
    pub behavior: WeaponBehavior,
    pub origin: Vec2,
    /// Aim angle in radians (facing angle for melee)
    pub angle: f32,
    /// Projectiles, orbiters, auras or zones created
    pub spawned: usize,
}

/// A weapon the player holds, with its own cooldown
#[derive(Debug, Clone, PartialEq)]
pub struct EquippedWeapon {
    pub weapon: WeaponType,
    pub definition: WeaponDefinition,
    /// None until the first fire, so a new weapon fires immediately
    pub last_fired_ms: Option<u64>,
}

impl EquippedWeapon {
    pub fn new(weapon: WeaponType, definition: WeaponDefinition) -> Self {
        Self {
            weapon,
            definition,
            last_fired_ms: None,
        }
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        match self.last_fired_ms {
            Some(last) => now_ms.saturating_sub(last) >= self.definition.cooldown_ms,
            None => true,
        }
    }
}

/// Result of applying one hit to one enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOutcome {
    pub damage: f32,
    /// The hit brought the enemy to zero health
    pub lethal: bool,
    /// Status kind newly applied (refreshes are not reported)
    pub status_applied: Option<StatusKind>,
}

/// Apply damage, knockback and status from one hit.
///
/// Returns None when the enemy is already dead, so a stale hit never lands twice.
pub fn resolve_collision(
    payload: &HitPayload,
    enemy: &mut Enemy,
    player: Vec2,
    now_ms: u64,
    statuses: &mut StatusEngine,
) -> Option<HitOutcome> {
    if !enemy.is_targetable() {
        return None;
    }

    enemy.health -= payload.damage;

    if let Some(knockback) = payload.knockback.filter(|k| *k > 0.0) {
        let away = (enemy.position - player).normalize_or(Vec2::X);
        enemy.velocity = away * knockback;
        enemy.knockback_until_ms = Some(now_ms + KNOCKBACK_DURATION_MS);
    }

    let lethal = enemy.health <= 0.0;
    let mut status_applied = None;
    if let Some(status) = payload.status.filter(|_| !lethal) {
        if statuses.apply(enemy, status.kind, status.duration_ms, now_ms) {
            status_applied = Some(status.kind);
        }
    }

    Some(HitOutcome {
        damage: payload.damage,
        lethal,
        status_applied,
    })
}

/// Keep `hit` only if its target is still alive in the predicted health map
fn record_hit(hit: WeaponHit, hits: &mut Vec<WeaponHit>, predicted: &mut HashMap<EnemyId, f32>) -> bool {
    match predicted.get_mut(&hit.enemy) {
        Some(health) if *health > 0.0 => {
            *health -= hit.payload.damage;
            hits.push(hit);
            true
        }
        _ => false,
    }
}

#[derive(Debug, Default)]
pub struct WeaponEngine {
    equipped: Vec<EquippedWeapon>,
    projectiles: Vec<Projectile>,
    rings: Vec<OrbitRing>,
    auras: Vec<Aura>,
    zones: Vec<Zone>,
    /// Melee hits decided at fire time, handed out by the next collision pass
    pending_hits: Vec<WeaponHit>,
    next_projectile_id: u64,
}

impl WeaponEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a weapon to the end of the loadout. Duplicates fire independently.
    pub fn equip(&mut self, weapon: WeaponType, definition: WeaponDefinition) {
        self.equipped.push(EquippedWeapon::new(weapon, definition));
    }

    pub fn equipped(&self) -> &[EquippedWeapon] {
        &self.equipped
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn rings(&self) -> &[OrbitRing] {
        &self.rings
    }

    pub fn auras(&self) -> &[Aura] {
        &self.auras
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Fire every weapon whose cooldown has elapsed at `now_ms`
    pub fn fire_due(
        &mut self,
        now_ms: u64,
        player: &Player,
        enemies: &[Enemy],
        bounds: WorldBounds,
    ) -> Vec<FireEvent> {
        let origin = bounds.clamp(player.position);
        let mut fired = Vec::new();

        for index in 0..self.equipped.len() {
            if !self.equipped[index].is_due(now_ms) {
                continue;
            }
            self.equipped[index].last_fired_ms = Some(now_ms);
            let weapon = self.equipped[index].weapon;
            let definition = self.equipped[index].definition.clone();

            let (angle, spawned) = match definition.behavior {
                WeaponBehavior::Projectile => {
                    let aim = find_nearest(origin, enemies)
                        .map(|target| {
                            let offset = target.position - origin;
                            offset.y.atan2(offset.x)
                        })
                        .unwrap_or(0.0);
                    let angles = projectile::volley_angles(aim, &definition);
                    for angle in &angles {
                        let id = ProjectileId(self.next_projectile_id);
                        self.next_projectile_id += 1;
                        self.projectiles
                            .push(Projectile::new(id, weapon, &definition, origin, *angle, now_ms));
                    }
                    (aim, angles.len())
                }
                WeaponBehavior::Area => {
                    if self.auras.iter().any(|a| a.weapon == weapon) {
                        continue;
                    }
                    self.auras.push(Aura::new(weapon, &definition, origin, now_ms));
                    (0.0, 1)
                }
                WeaponBehavior::Orbit => {
                    if self.rings.iter().any(|r| r.weapon == weapon) {
                        continue;
                    }
                    let ring = OrbitRing::new(weapon, &definition, origin);
                    let count = ring.orbiters.len();
                    self.rings.push(ring);
                    (0.0, count)
                }
                WeaponBehavior::Melee => {
                    let arc = definition.arc_radians();
                    let payload = HitPayload::from_definition(&definition);
                    let before = self.pending_hits.len();
                    for enemy in enemies.iter().filter(|e| e.is_tangible()) {
                        if melee::in_arc(origin, player.facing, definition.range, arc, enemy) {
                            self.pending_hits.push(WeaponHit {
                                weapon,
                                source: HitSource::Melee,
                                enemy: enemy.id,
                                payload,
                            });
                        }
                    }
                    // A swing that connects with nothing still spends the cooldown
                    if self.pending_hits.len() == before {
                        continue;
                    }
                    (player.facing.y.atan2(player.facing.x), 0)
                }
                WeaponBehavior::Stationary => {
                    self.zones.push(Zone::new(weapon, &definition, origin, now_ms));
                    (0.0, 1)
                }
            };

            fired.push(FireEvent {
                weapon,
                behavior: definition.behavior,
                origin,
                angle,
                spawned,
            });
        }

        fired
    }

    /// Move projectiles, re-centre orbiters and auras, expire zones
    pub fn advance(&mut self, now_ms: u64, dt_secs: f32, player: Vec2, enemies: &[Enemy]) {
        for projectile in &mut self.projectiles {
            projectile.advance(now_ms, dt_secs, player);
        }
        self.projectiles.retain(|p| p.active);

        for ring in &mut self.rings {
            ring.advance(player);
            ring.prune(enemies);
        }
        for aura in &mut self.auras {
            aura.center = player;
        }
        self.zones.retain(|z| !z.is_expired(now_ms));
    }

    /// O(N x M) overlap pass between every weapon instance and every enemy.
    ///
    /// Health is predicted per enemy as hits accumulate, so an enemy already
    /// brought to zero earlier in the pass is not struck again this frame.
    pub fn detect_collisions(&mut self, now_ms: u64, enemies: &[Enemy]) -> Vec<WeaponHit> {
        let mut predicted: HashMap<EnemyId, f32> = enemies
            .iter()
            .filter(|e| e.is_tangible())
            .map(|e| (e.id, e.health))
            .collect();

        let mut hits = Vec::new();

        for hit in std::mem::take(&mut self.pending_hits) {
            record_hit(hit, &mut hits, &mut predicted);
        }

        for projectile in self.projectiles.iter_mut() {
            for enemy in enemies {
                if !projectile.active {
                    break;
                }
                if projectile.has_hit(enemy.id) || !projectile.overlaps(enemy) {
                    continue;
                }
                let hit = WeaponHit {
                    weapon: projectile.weapon,
                    source: HitSource::Projectile(projectile.id),
                    enemy: enemy.id,
                    payload: projectile.payload,
                };
                if record_hit(hit, &mut hits, &mut predicted) {
                    projectile.register_hit(enemy.id);
                }
            }
        }
        self.projectiles.retain(|p| p.active);

        for ring in self.rings.iter_mut() {
            let (weapon, payload) = (ring.weapon, ring.payload);
            for orbiter in ring.orbiters.iter_mut() {
                for enemy in enemies {
                    if !orbiter.overlaps(enemy) || !predicted.get(&enemy.id).is_some_and(|h| *h > 0.0) {
                        continue;
                    }
                    if orbiter.try_hit(enemy.id, now_ms) {
                        let hit = WeaponHit {
                            weapon,
                            source: HitSource::Orbiter,
                            enemy: enemy.id,
                            payload,
                        };
                        record_hit(hit, &mut hits, &mut predicted);
                    }
                }
            }
        }

        for aura in self.auras.iter_mut() {
            if !aura.pulse_due(now_ms) {
                continue;
            }
            aura.last_pulse_ms = now_ms;
            for enemy in enemies.iter().filter(|e| aura.covers(e)) {
                let hit = WeaponHit {
                    weapon: aura.weapon,
                    source: HitSource::Aura,
                    enemy: enemy.id,
                    payload: aura.payload,
                };
                record_hit(hit, &mut hits, &mut predicted);
            }
        }

        for zone in self.zones.iter_mut() {
            if !zone.pulse_due(now_ms) {
                continue;
            }
            zone.last_pulse_ms = Some(now_ms);
            for enemy in enemies.iter().filter(|e| zone.covers(e)) {
                let hit = WeaponHit {
                    weapon: zone.weapon,
                    source: HitSource::Zone,
                    enemy: enemy.id,
                    payload: zone.payload,
                };
                record_hit(hit, &mut hits, &mut predicted);
            }
        }

        hits
    }

    /// Drop every live weapon instance and the loadout
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
