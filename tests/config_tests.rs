//! Integration tests for the RON configuration tables
//!
//! These tests verify that:
//! - The shipped tables parse and validate
//! - Optional fields fall back to their documented defaults
//! - Malformed or inconsistent tables are rejected before a session exists

use std::path::Path;
use survivorsim::config::{
    ConfigError, EnemyBehavior, EnemyType, GameConfig, Pierce, WeaponBehavior, WeaponType,
};

const WEAPONS: &str = include_str!("../assets/config/weapons.ron");
const ENEMIES: &str = include_str!("../assets/config/enemies.ron");
const TUNING: &str = include_str!("../assets/config/tuning.ron");

#[test]
fn test_builtin_tables_validate() {
    let config = GameConfig::builtin().expect("builtin tables parse");
    assert_eq!(config.weapons.len(), WeaponType::all().len());
    assert_eq!(config.enemies.len(), 10);
    assert!(config.validated().is_ok());
}

#[test]
fn test_asset_directory_matches_builtin() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/config");
    let loaded = GameConfig::load_from_dir(&dir).expect("asset directory loads");
    assert_eq!(loaded, GameConfig::builtin().unwrap());
}

#[test]
fn test_missing_directory_is_io_error() {
    let err = GameConfig::load_from_dir(Path::new("/definitely/not/here")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_weapon_defaults() {
    let weapons = r#"(
        weapons: {
            Dagger: (behavior: Projectile, damage: 10.0, cooldown_ms: 500),
        },
    )"#;
    let config = GameConfig::from_ron_strs(weapons, ENEMIES, TUNING).unwrap();
    let dagger = config.weapon(WeaponType::Dagger).unwrap();

    assert_eq!(dagger.behavior, WeaponBehavior::Projectile);
    assert_eq!(dagger.speed, 200.0);
    assert_eq!(dagger.range, 200.0);
    assert_eq!(dagger.projectile_count, 1);
    assert_eq!(dagger.pierce, Pierce::Limited(1));
    assert_eq!(dagger.knockback, None);
    assert_eq!(dagger.pulse_rate_ms(), 500, "pulse falls back to the cooldown");
}

#[test]
fn test_weapon_missing_damage_fails_to_parse() {
    let weapons = r#"(weapons: { Dagger: (behavior: Projectile, cooldown_ms: 500) })"#;
    let err = GameConfig::from_ron_strs(weapons, ENEMIES, TUNING).unwrap_err();
    match err {
        ConfigError::Parse { file, .. } => assert_eq!(file, "weapons.ron"),
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_enemy_defaults() {
    let enemies = r#"(
        enemies: {
            Skeleton: (health: 100.0, behavior: Chase, attack_damage: 10.0, experience: 10),
        },
    )"#;
    let config = GameConfig::from_ron_strs(WEAPONS, enemies, TUNING).unwrap();
    let skeleton = config.archetype(EnemyType::Skeleton).unwrap();

    assert_eq!(skeleton.speed, 100.0);
    assert_eq!(skeleton.attack_range, 50.0);
    assert_eq!(skeleton.attack_cooldown_ms, 1000);
    assert_eq!(skeleton.spawn_weight, 1.0);
}

#[test]
fn test_phasing_must_be_shorter_than_interval() {
    let mut config = GameConfig::builtin().unwrap();
    config.enemies.get_mut(&EnemyType::Ghost).unwrap().behavior = EnemyBehavior::Phasing {
        interval_ms: 2000,
        duration_ms: 2000,
    };
    let err = config.validated().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
    assert!(err.to_string().contains("Ghost"));
}

#[test]
fn test_empty_roster_is_rejected() {
    let mut config = GameConfig::builtin().unwrap();
    for archetype in config.enemies.values_mut() {
        archetype.spawn_weight = 0.0;
    }
    assert!(config.validate().is_err());

    config.enemies.clear();
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_cooldown_is_rejected() {
    let mut config = GameConfig::builtin().unwrap();
    config.weapons.get_mut(&WeaponType::Whip).unwrap().cooldown_ms = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_starting_loadout_by_name() {
    let names = vec!["garlic".to_string(), "Magic Wand".to_string()];
    let config = GameConfig::builtin().unwrap().with_starting_weapons(&names).unwrap();
    assert_eq!(
        config.tuning.starting_weapons,
        vec![WeaponType::Garlic, WeaponType::MagicWand]
    );

    let err = GameConfig::builtin()
        .unwrap()
        .with_starting_weapons(&["Laser".to_string()])
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnknownWeapon(name) if name == "Laser"));
}

#[test]
fn test_starting_weapon_needs_definition() {
    let mut config = GameConfig::builtin().unwrap();
    config.weapons.remove(&WeaponType::Dagger);
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Dagger"));
}

#[test]
fn test_weapon_name_round_trip() {
    for weapon in WeaponType::all() {
        assert_eq!(WeaponType::parse(weapon.name()), Some(*weapon));
    }
}
