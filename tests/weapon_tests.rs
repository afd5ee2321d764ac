//! Integration tests for the weapon engine
//!
//! These tests verify that:
//! - Cooldowns gate firing with a `>=` comparison
//! - Projectiles respect their pierce budget and range
//! - Area, orbit, melee and stationary archetypes hit what they should

use bevy::math::Vec2;
use survivorsim::config::{
    EnemyArchetype, EnemyBehavior, EnemyType, GameConfig, Pierce, WeaponBehavior, WeaponDefinition, WeaponType,
};
use survivorsim::enemies::{Enemy, EnemyId};
use survivorsim::player::Player;
use survivorsim::status::{StatusEngine, StatusKind};
use survivorsim::weapons::{resolve_collision, HitSource, WeaponEngine, WeaponHit};
use survivorsim::world::WorldBounds;

fn config() -> GameConfig {
    GameConfig::builtin().expect("builtin config")
}

fn definition(weapon: WeaponType) -> WeaponDefinition {
    config().weapon(weapon).unwrap().clone()
}

fn player_at(x: f32, y: f32) -> Player {
    let config = config();
    Player::new(&config.tuning.player, &config.tuning.progression, Vec2::new(x, y))
}

/// A motionless enemy so positions stay put between frames
fn dummy(id: u64, x: f32, y: f32, health: f32) -> Enemy {
    let archetype = EnemyArchetype {
        health,
        speed: 0.0,
        behavior: EnemyBehavior::Stationary,
        attack_range: 50.0,
        attack_damage: 10.0,
        attack_cooldown_ms: 1000,
        experience: 10,
        spawn_weight: 1.0,
    };
    Enemy::from_archetype(EnemyId(id), EnemyType::Skeleton, &archetype, Vec2::new(x, y), 0)
}

fn apply(hits: &[WeaponHit], enemies: &mut [Enemy], player: Vec2, now: u64, statuses: &mut StatusEngine) {
    for hit in hits {
        if let Some(enemy) = enemies.iter_mut().find(|e| e.id == hit.enemy) {
            resolve_collision(&hit.payload, enemy, player, now, statuses);
        }
    }
}

// =============================================================================
// Cooldown Tests
// =============================================================================

#[test]
fn test_cooldown_gates_second_fire() {
    let mut engine = WeaponEngine::new();
    engine.equip(WeaponType::Dagger, definition(WeaponType::Dagger));
    let player = player_at(800.0, 600.0);
    let bounds = WorldBounds::default();

    assert_eq!(engine.fire_due(1000, &player, &[], bounds).len(), 1, "first fire is immediate");
    assert!(engine.fire_due(1499, &player, &[], bounds).is_empty(), "C - 1 must not fire");
    assert_eq!(engine.fire_due(1500, &player, &[], bounds).len(), 1, "C exactly fires");
    assert_eq!(engine.equipped()[0].last_fired_ms, Some(1500));
}

#[test]
fn test_duplicate_weapons_fire_independently() {
    let mut engine = WeaponEngine::new();
    engine.equip(WeaponType::Dagger, definition(WeaponType::Dagger));
    engine.equip(WeaponType::Dagger, definition(WeaponType::Dagger));
    let fired = engine.fire_due(0, &player_at(800.0, 600.0), &[], WorldBounds::default());
    assert_eq!(fired.len(), 2);
    assert_eq!(engine.projectiles().len(), 2);
}

#[test]
fn test_projectile_defaults_to_angle_zero_without_targets() {
    let mut engine = WeaponEngine::new();
    engine.equip(WeaponType::Dagger, definition(WeaponType::Dagger));
    let fired = engine.fire_due(0, &player_at(800.0, 600.0), &[], WorldBounds::default());

    assert_eq!(fired[0].angle, 0.0);
    let velocity = engine.projectiles()[0].velocity;
    assert!(velocity.x > 0.0 && velocity.y.abs() < 1e-4);
}

#[test]
fn test_projectile_spawns_from_clamped_player_position() {
    let mut engine = WeaponEngine::new();
    engine.equip(WeaponType::Dagger, definition(WeaponType::Dagger));
    let player = player_at(-50.0, 2000.0);
    engine.fire_due(0, &player, &[], WorldBounds::default());
    assert_eq!(engine.projectiles()[0].origin, Vec2::new(0.0, 1200.0));
}

// =============================================================================
// Projectile Tests
// =============================================================================

#[test]
fn test_dagger_scenario_hits_once_then_retires() {
    let mut engine = WeaponEngine::new();
    engine.equip(WeaponType::Dagger, definition(WeaponType::Dagger));
    let player = player_at(100.0, 100.0);
    let bounds = WorldBounds::default();
    let mut statuses = StatusEngine::new();
    let mut enemies = vec![dummy(1, 150.0, 100.0, 100.0), dummy(2, 175.0, 100.0, 100.0)];

    let fired = engine.fire_due(0, &player, &enemies, bounds);
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].angle, 0.0, "aimed along +x at the nearest enemy");

    let dt = 1.0 / 60.0;
    let mut first_hit_ms = None;
    let mut total_hits = 0;
    for frame in 1..=24u64 {
        let now = frame * 1000 / 60;
        engine.advance(now, dt, player.position, &enemies);
        let hits = engine.detect_collisions(now, &enemies);
        if !hits.is_empty() && first_hit_ms.is_none() {
            first_hit_ms = Some(now);
        }
        total_hits += hits.len();
        apply(&hits, &mut enemies, player.position, now, &mut statuses);
    }

    let first_hit_ms = first_hit_ms.expect("dagger should connect");
    assert!(first_hit_ms <= 200, "hit at {}ms", first_hit_ms);
    assert_eq!(total_hits, 1);
    assert_eq!(enemies[0].health, 90.0);
    assert_eq!(enemies[1].health, 100.0, "pierce 1: enemies behind take nothing");
    assert!(engine.projectiles().is_empty(), "retired after its only hit");
}

#[test]
fn test_pierce_limits_distinct_enemies() {
    let mut bow = definition(WeaponType::Bow);
    bow.pierce = Pierce::Limited(2);
    let mut engine = WeaponEngine::new();
    engine.equip(WeaponType::Bow, bow);

    let player = player_at(100.0, 100.0);
    let enemies = vec![
        dummy(1, 115.0, 100.0, 100.0),
        dummy(2, 115.0, 100.0, 100.0),
        dummy(3, 115.0, 100.0, 100.0),
    ];

    engine.fire_due(0, &player, &enemies, WorldBounds::default());
    engine.advance(0, 0.0, player.position, &enemies);
    let hits = engine.detect_collisions(0, &enemies);

    assert_eq!(hits.len(), 2);
    assert_ne!(hits[0].enemy, hits[1].enemy);
    assert!(!hits.iter().any(|h| h.enemy == EnemyId(3)), "third overlapping enemy is untouched");
    assert!(engine.projectiles().is_empty());
}

#[test]
fn test_unlimited_pierce_hits_each_enemy_once() {
    let mut engine = WeaponEngine::new();
    engine.equip(WeaponType::HolyCross, definition(WeaponType::HolyCross));
    let player = player_at(100.0, 100.0);
    let enemies = vec![dummy(1, 110.0, 100.0, 100.0), dummy(2, 110.0, 100.0, 100.0)];

    engine.fire_due(0, &player, &enemies, WorldBounds::default());
    engine.advance(0, 0.0, player.position, &enemies);
    let first = engine.detect_collisions(0, &enemies);
    let second = engine.detect_collisions(16, &enemies);

    // Four projectiles in a cross, all overlapping both enemies at spawn
    assert_eq!(first.len(), 8);
    assert!(second.is_empty(), "hit-sets prevent repeat hits");
}

#[test]
fn test_hits_stop_once_enemy_is_predicted_dead() {
    let mut engine = WeaponEngine::new();
    engine.equip(WeaponType::Dagger, definition(WeaponType::Dagger));
    engine.equip(WeaponType::Dagger, definition(WeaponType::Dagger));
    let player = player_at(100.0, 100.0);
    let enemies = vec![dummy(1, 110.0, 100.0, 10.0)];

    engine.fire_due(0, &player, &enemies, WorldBounds::default());
    engine.advance(0, 0.0, player.position, &enemies);
    let hits = engine.detect_collisions(0, &enemies);

    assert_eq!(hits.len(), 1, "second dagger must not strike a dead enemy");
    assert_eq!(engine.projectiles().len(), 1, "the unused dagger keeps flying");
}

// =============================================================================
// Area / Orbit / Melee / Stationary Tests
// =============================================================================

#[test]
fn test_aura_created_once_and_pulses_on_cadence() {
    let mut engine = WeaponEngine::new();
    engine.equip(WeaponType::Garlic, definition(WeaponType::Garlic));
    let player = player_at(400.0, 400.0);
    let bounds = WorldBounds::default();
    let mut statuses = StatusEngine::new();
    let mut enemies = vec![dummy(1, 450.0, 400.0, 100.0), dummy(2, 600.0, 400.0, 100.0)];

    engine.fire_due(0, &player, &enemies, bounds);
    engine.fire_due(500, &player, &enemies, bounds);
    assert_eq!(engine.auras().len(), 1, "never re-created while active");

    engine.advance(499, 0.0, player.position, &enemies);
    assert!(engine.detect_collisions(499, &enemies).is_empty());

    engine.advance(500, 0.0, player.position, &enemies);
    let hits = engine.detect_collisions(500, &enemies);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].source, HitSource::Aura);
    apply(&hits, &mut enemies, player.position, 500, &mut statuses);

    assert_eq!(enemies[0].health, 95.0);
    assert!(statuses.has(EnemyId(1), StatusKind::Poison));
    assert_eq!(enemies[1].health, 100.0, "outside the radius");
}

#[test]
fn test_aura_follows_player() {
    let mut engine = WeaponEngine::new();
    engine.equip(WeaponType::Garlic, definition(WeaponType::Garlic));
    let mut player = player_at(400.0, 400.0);
    engine.fire_due(0, &player, &[], WorldBounds::default());

    player.position = Vec2::new(700.0, 300.0);
    engine.advance(16, 0.016, player.position, &[]);
    assert_eq!(engine.auras()[0].center, player.position);
}

#[test]
fn test_orbiters_rehit_after_interval() {
    let mut engine = WeaponEngine::new();
    let mut bible = definition(WeaponType::Bible);
    bible.projectile_count = 1;
    bible.orbit_step = Some(0.0);
    engine.equip(WeaponType::Bible, bible);

    let player = player_at(400.0, 400.0);
    // The lone orbiter sits at angle 0, 50 units right of the player
    let enemies = vec![dummy(1, 450.0, 400.0, 1000.0)];
    engine.fire_due(0, &player, &enemies, WorldBounds::default());
    assert_eq!(engine.rings().len(), 1);

    let mut hit_times = Vec::new();
    for now in (0..=1100).step_by(100) {
        engine.advance(now, 0.1, player.position, &enemies);
        if !engine.detect_collisions(now, &enemies).is_empty() {
            hit_times.push(now);
        }
    }
    assert_eq!(hit_times, vec![0, 500, 1000]);
}

#[test]
fn test_melee_hits_in_facing_direction_only() {
    let mut engine = WeaponEngine::new();
    engine.equip(WeaponType::Whip, definition(WeaponType::Whip));
    let mut player = player_at(400.0, 400.0);
    player.facing = Vec2::NEG_X;
    let enemies = vec![dummy(1, 300.0, 400.0, 100.0), dummy(2, 500.0, 400.0, 100.0)];

    let fired = engine.fire_due(0, &player, &enemies, WorldBounds::default());
    assert_eq!(fired[0].behavior, WeaponBehavior::Melee);
    assert_eq!(fired[0].spawned, 0, "melee leaves no persistent entity");

    let hits = engine.detect_collisions(0, &enemies);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].enemy, EnemyId(1));
    assert_eq!(hits[0].source, HitSource::Melee);
}

#[test]
fn test_melee_miss_fires_no_event_but_spends_cooldown() {
    let mut engine = WeaponEngine::new();
    engine.equip(WeaponType::Whip, definition(WeaponType::Whip));
    let mut player = player_at(400.0, 400.0);
    player.facing = Vec2::X;
    let enemies = vec![dummy(1, 300.0, 400.0, 100.0)];

    assert!(engine.fire_due(0, &player, &enemies, WorldBounds::default()).is_empty());
    assert!(engine.detect_collisions(0, &enemies).is_empty());
    assert_eq!(engine.equipped()[0].last_fired_ms, Some(0));

    // Turning around before the cooldown ends does not allow a second swing
    player.facing = Vec2::NEG_X;
    assert!(engine.fire_due(16, &player, &enemies, WorldBounds::default()).is_empty());
}

#[test]
fn test_stationary_zone_stays_put_and_expires() {
    let mut engine = WeaponEngine::new();
    engine.equip(WeaponType::HolyWater, definition(WeaponType::HolyWater));
    let mut player = player_at(400.0, 400.0);
    let enemies = vec![dummy(1, 420.0, 400.0, 100.0)];

    engine.fire_due(0, &player, &enemies, WorldBounds::default());
    player.position = Vec2::new(900.0, 900.0);
    engine.advance(16, 0.016, player.position, &enemies);
    assert_eq!(engine.zones()[0].position, Vec2::new(400.0, 400.0));

    let hits = engine.detect_collisions(16, &enemies);
    assert_eq!(hits.len(), 1, "zone pulses as soon as it lands");
    assert_eq!(hits[0].payload.status.map(|s| s.kind), Some(StatusKind::Burn));

    engine.advance(2500, 0.016, player.position, &enemies);
    assert!(engine.zones().is_empty());
}
