//! Integration tests for the enemy engine
//!
//! These tests verify that:
//! - The spawn timer and population cap gate spawning
//! - Out-of-bounds candidates are rejected without consuming the spawn slot
//! - Behavior archetypes steer as described and phasing grants immunity
//! - Contact attacks respect their cooldown

use bevy::math::Vec2;
use survivorsim::config::{EnemyBehavior, EnemyType, GameConfig, ValidatedConfig};
use survivorsim::enemies::ai::{in_phase_window, update_ai};
use survivorsim::enemies::{Enemy, EnemyEngine, EnemyId};
use survivorsim::rng::GameRng;
use survivorsim::world::WorldBounds;

fn validated(config: GameConfig) -> ValidatedConfig {
    config.validated().expect("config should validate")
}

fn engine_with(config: GameConfig) -> EnemyEngine {
    EnemyEngine::new(&validated(config), GameRng::from_seed(7))
}

fn builtin() -> GameConfig {
    GameConfig::builtin().unwrap()
}

fn enemy_of(kind: EnemyType, position: Vec2) -> Enemy {
    let config = builtin();
    Enemy::from_archetype(EnemyId(1), kind, config.archetype(kind).unwrap(), position, 0)
}

// =============================================================================
// Spawning Tests
// =============================================================================

#[test]
fn test_initial_spawn_delay() {
    let mut engine = engine_with(builtin());
    let bounds = WorldBounds::default();
    let player = bounds.center();

    assert!(engine.try_spawn(999, player, 1, bounds).is_none());
    assert!(engine.try_spawn(1000, player, 1, bounds).is_some());
    assert_eq!(engine.live_count(), 1);
}

#[test]
fn test_out_of_bounds_candidate_keeps_spawn_slot() {
    let mut engine = engine_with(builtin());
    let bounds = WorldBounds::default();
    let player = Vec2::new(100.0, 100.0);

    // 400 units to the left lands at x = -300
    let rejected = engine.try_spawn_at_angle(1000, std::f32::consts::PI, player, 1, bounds);
    assert!(rejected.is_none());
    assert_eq!(engine.live_count(), 0);
    assert_eq!(engine.next_spawn_ms(), 1000, "timer is not reset on rejection");

    // The very next attempt may spawn
    let spawned = engine
        .try_spawn_at_angle(1016, 0.0, player, 1, bounds)
        .map(|e| e.position)
        .expect("in-bounds candidate spawns");
    assert_eq!(spawned, Vec2::new(500.0, 100.0));
    assert_eq!(engine.next_spawn_ms(), 1016 + 2000);
}

#[test]
fn test_population_cap() {
    let mut config = builtin();
    config.tuning.max_enemies = 2;
    config.tuning.spawn_interval_ms = 100;
    config.tuning.difficulty = None;
    let mut engine = engine_with(config);
    let bounds = WorldBounds::default();
    let player = bounds.center();

    assert!(engine.try_spawn_at_angle(1000, 0.0, player, 1, bounds).is_some());
    assert!(engine.try_spawn_at_angle(1100, 0.0, player, 1, bounds).is_some());
    assert!(engine.try_spawn_at_angle(1200, 0.0, player, 1, bounds).is_none());
    assert_eq!(engine.live_count(), 2);

    // A death frees a slot
    let first = engine.enemies()[0].id;
    assert!(engine.kill(first));
    assert!(engine.try_spawn_at_angle(1300, 0.0, player, 1, bounds).is_some());
}

#[test]
fn test_spawn_weights_select_archetypes() {
    let mut config = builtin();
    for (kind, archetype) in config.enemies.iter_mut() {
        archetype.spawn_weight = if *kind == EnemyType::Bat { 1.0 } else { 0.0 };
    }
    config.tuning.spawn_interval_ms = 10;
    config.tuning.difficulty = None;
    let mut engine = engine_with(config);
    let bounds = WorldBounds::default();
    let player = bounds.center();

    for step in 0..20 {
        engine.try_spawn(1000 + step * 10, player, 1, bounds);
    }
    assert_eq!(engine.live_count(), 20);
    assert!(engine.enemies().iter().all(|e| e.kind == EnemyType::Bat));
}

#[test]
fn test_difficulty_scales_spawned_health() {
    let config = builtin();
    let mut engine = engine_with(config.clone());
    let bounds = WorldBounds::default();

    let enemy = engine
        .try_spawn_at_angle(1000, 0.0, bounds.center(), 3, bounds)
        .cloned()
        .unwrap();
    let base = config.archetype(enemy.kind).unwrap().health;
    assert!((enemy.health - base * 1.21).abs() < 1e-3);
    assert_eq!(enemy.max_health, enemy.health);
}

#[test]
fn test_same_seed_spawns_same_sequence() {
    let bounds = WorldBounds::default();
    let player = bounds.center();
    let run = || {
        let mut engine = engine_with(builtin());
        let mut spawned = Vec::new();
        for now in (1000..20_000).step_by(500) {
            if let Some(enemy) = engine.try_spawn(now, player, 1, bounds) {
                spawned.push((enemy.kind, enemy.position));
            }
        }
        spawned
    };
    assert_eq!(run(), run());
}

#[test]
fn test_kill_is_idempotent() {
    let mut engine = engine_with(builtin());
    let id = engine.spawn_at(EnemyType::Skeleton, Vec2::new(200.0, 200.0), 0).unwrap();

    assert!(engine.kill(id));
    assert!(!engine.kill(id));
    assert_eq!(engine.remove_dead(), vec![id]);
    assert!(engine.get(id).is_none());
    assert!(!engine.kill(id), "unknown enemy");
}

#[test]
fn test_despawn_removes_without_kill() {
    let mut engine = engine_with(builtin());
    let id = engine.spawn_at(EnemyType::Bee, Vec2::new(200.0, 200.0), 0).unwrap();

    assert!(engine.despawn(id));
    assert!(!engine.despawn(id));
    assert_eq!(engine.live_count(), 0);
    assert!(engine.remove_dead().is_empty(), "despawned enemies never die");
}

// =============================================================================
// Behavior Tests
// =============================================================================

#[test]
fn test_enemies_stay_inside_world() {
    let mut engine = engine_with(builtin());
    let bounds = WorldBounds::default();
    engine.spawn_at(EnemyType::Skeleton, Vec2::new(5.0, 5.0), 0).unwrap();

    // Player off the top-left corner drags the chaser into the edge
    for frame in 0..60u64 {
        engine.update(frame * 16, 0.016, Vec2::new(-500.0, -500.0), bounds);
    }
    assert_eq!(engine.enemies()[0].position, Vec2::ZERO);
}

#[test]
fn test_phase_window_boundary() {
    assert!(in_phase_window(0, 5000, 2000));
    assert!(in_phase_window(1999, 5000, 2000));
    assert!(!in_phase_window(2000, 5000, 2000));
    assert!(in_phase_window(5000, 5000, 2000));
}

#[test]
fn test_phasing_enemy_cannot_attack_or_be_targeted() {
    let player = Vec2::new(400.0, 400.0);
    let mut ghost = enemy_of(EnemyType::Ghost, Vec2::new(420.0, 400.0));
    assert!(matches!(ghost.behavior, EnemyBehavior::Phasing { .. }));

    update_ai(&mut ghost, player, 1000);
    assert!(ghost.phasing);
    assert!(!ghost.is_tangible());
    assert_eq!(ghost.velocity, Vec2::ZERO);
    assert!(!ghost.try_attack(1000, player));

    update_ai(&mut ghost, player, 2000);
    assert!(!ghost.phasing);
    assert!(ghost.velocity.x < 0.0, "resumes chasing");
    assert!(ghost.try_attack(2000, player));
}

#[test]
fn test_attack_cooldown() {
    let player = Vec2::new(400.0, 400.0);
    let mut skeleton = enemy_of(EnemyType::Skeleton, Vec2::new(430.0, 400.0));

    assert!(skeleton.try_attack(0, player), "first attack is immediate");
    assert!(!skeleton.try_attack(999, player));
    assert!(skeleton.try_attack(1000, player));
}

#[test]
fn test_attack_out_of_range() {
    let player = Vec2::new(400.0, 400.0);
    let mut skeleton = enemy_of(EnemyType::Skeleton, Vec2::new(451.0, 400.0));
    assert!(!skeleton.try_attack(0, player));
    assert_eq!(skeleton.last_attack_ms, None);
}

#[test]
fn test_flower_attacks_from_range_without_moving() {
    let player = Vec2::new(400.0, 400.0);
    let mut flower = enemy_of(EnemyType::ManEaterFlower, Vec2::new(540.0, 400.0));

    update_ai(&mut flower, player, 0);
    assert_eq!(flower.velocity, Vec2::ZERO);
    assert!(flower.try_attack(0, player));
}

#[test]
fn test_resolve_attacks_reports_damage() {
    let mut engine = engine_with(builtin());
    let player = Vec2::new(400.0, 400.0);
    let near = engine.spawn_at(EnemyType::Skeleton, Vec2::new(420.0, 400.0), 0).unwrap();
    engine.spawn_at(EnemyType::Skeleton, Vec2::new(800.0, 400.0), 0).unwrap();

    let attacks = engine.resolve_attacks(0, player);
    assert_eq!(attacks, vec![(near, 10.0)]);
    assert!(engine.resolve_attacks(500, player).is_empty());
}
