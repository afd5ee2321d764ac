//! Data-Driven Game Configuration
//!
//! Weapon definitions, enemy archetypes and tunable constants are plain data
//! loaded from RON tables. The default tables live in `assets/config/` and are
//! embedded into the binary; a directory with the same three files can be
//! loaded instead to rebalance without recompiling.
//!
//! ## Usage
//! ```ignore
//! let config = GameConfig::builtin()?.validated()?;
//! let session = Session::new(config, Some(42));
//! ```
//!
//! The core never touches the filesystem: loading happens here, before a
//! session exists, and a session can only be built from a [`ValidatedConfig`].

pub mod enemies;
pub mod tuning;
pub mod weapons;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

pub use enemies::{EnemyArchetype, EnemyBehavior, EnemyType};
pub use tuning::{DifficultyScaling, PlayerTuning, ProgressionRules, Tuning};
pub use weapons::{Pierce, StatusPayload, WeaponBehavior, WeaponDefinition, WeaponType};

const BUILTIN_WEAPONS: &str = include_str!("../../assets/config/weapons.ron");
const BUILTIN_ENEMIES: &str = include_str!("../../assets/config/enemies.ron");
const BUILTIN_TUNING: &str = include_str!("../../assets/config/tuning.ron");

/// Errors raised while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {file}: {message}")]
    Parse { file: String, message: String },
    #[error("Invalid {subject}: {message}")]
    Invalid { subject: String, message: String },
    #[error("Unknown weapon '{0}'")]
    UnknownWeapon(String),
}

/// Root structure for the weapons.ron file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponsConfig {
    pub weapons: BTreeMap<WeaponType, WeaponDefinition>,
}

/// Root structure for the enemies.ron file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemiesConfig {
    pub enemies: BTreeMap<EnemyType, EnemyArchetype>,
}

/// Everything a session needs, as immutable data
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub weapons: BTreeMap<WeaponType, WeaponDefinition>,
    pub enemies: BTreeMap<EnemyType, EnemyArchetype>,
    pub tuning: Tuning,
}

fn parse_ron<T: for<'de> Deserialize<'de>>(file: &str, contents: &str) -> Result<T, ConfigError> {
    ron::from_str(contents).map_err(|e| ConfigError::Parse {
        file: file.to_string(),
        message: e.to_string(),
    })
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

impl GameConfig {
    /// Parse the three RON tables from strings
    pub fn from_ron_strs(weapons: &str, enemies: &str, tuning: &str) -> Result<Self, ConfigError> {
        let weapons: WeaponsConfig = parse_ron("weapons.ron", weapons)?;
        let enemies: EnemiesConfig = parse_ron("enemies.ron", enemies)?;
        let tuning: Tuning = parse_ron("tuning.ron", tuning)?;
        Ok(Self {
            weapons: weapons.weapons,
            enemies: enemies.enemies,
            tuning,
        })
    }

    /// The tables shipped with the game
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_ron_strs(BUILTIN_WEAPONS, BUILTIN_ENEMIES, BUILTIN_TUNING)
    }

    /// Load `weapons.ron`, `enemies.ron` and `tuning.ron` from a directory
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let weapons = read_file(&dir.join("weapons.ron"))?;
        let enemies = read_file(&dir.join("enemies.ron"))?;
        let tuning = read_file(&dir.join("tuning.ron"))?;
        let config = Self::from_ron_strs(&weapons, &enemies, &tuning)?;
        info!(
            "Loaded {} weapon and {} enemy definitions from {}",
            config.weapons.len(),
            config.enemies.len(),
            dir.display()
        );
        Ok(config)
    }

    pub fn weapon(&self, weapon: WeaponType) -> Option<&WeaponDefinition> {
        self.weapons.get(&weapon)
    }

    pub fn archetype(&self, enemy: EnemyType) -> Option<&EnemyArchetype> {
        self.enemies.get(&enemy)
    }

    /// Replace the starting loadout by weapon name
    pub fn with_starting_weapons(mut self, names: &[String]) -> Result<Self, ConfigError> {
        let loadout = names
            .iter()
            .map(|name| WeaponType::parse(name).ok_or_else(|| ConfigError::UnknownWeapon(name.clone())))
            .collect::<Result<Vec<_>, _>>()?;
        self.tuning.starting_weapons = loadout;
        Ok(self)
    }

    /// Check every table and the references between them
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (weapon, definition) in &self.weapons {
            definition.validate().map_err(|message| ConfigError::Invalid {
                subject: format!("weapon {:?}", weapon),
                message,
            })?;
        }

        if self.enemies.is_empty() {
            return Err(ConfigError::Invalid {
                subject: "enemies".to_string(),
                message: "at least one enemy archetype is required".to_string(),
            });
        }
        for (enemy, archetype) in &self.enemies {
            archetype.validate().map_err(|message| ConfigError::Invalid {
                subject: format!("enemy {:?}", enemy),
                message,
            })?;
        }
        if !self.enemies.values().any(|a| a.spawn_weight > 0.0) {
            return Err(ConfigError::Invalid {
                subject: "enemies".to_string(),
                message: "at least one archetype needs a positive spawn_weight".to_string(),
            });
        }

        self.tuning.validate().map_err(|message| ConfigError::Invalid {
            subject: "tuning".to_string(),
            message,
        })?;

        for weapon in &self.tuning.starting_weapons {
            if !self.weapons.contains_key(weapon) {
                return Err(ConfigError::Invalid {
                    subject: "tuning".to_string(),
                    message: format!("starting weapon {:?} has no definition", weapon),
                });
            }
        }

        Ok(())
    }

    /// Validate and freeze the configuration for use by sessions
    pub fn validated(self) -> Result<ValidatedConfig, ConfigError> {
        self.validate()?;
        Ok(ValidatedConfig(Arc::new(self)))
    }
}

/// A configuration that passed [`GameConfig::validate`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ValidatedConfig(Arc<GameConfig>);

impl Deref for ValidatedConfig {
    type Target = GameConfig;

    fn deref(&self) -> &GameConfig {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_parse_and_validate() {
        let config = GameConfig::builtin().expect("builtin tables should parse");
        assert_eq!(config.weapons.len(), WeaponType::all().len());
        assert!(config.enemies.contains_key(&EnemyType::Skeleton));
        config.validate().expect("builtin tables should validate");
    }

    #[test]
    fn test_unknown_starting_weapon_is_rejected() {
        let config = GameConfig::builtin().unwrap();
        let err = config
            .with_starting_weapons(&["Chainsaw".to_string()])
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownWeapon(name) if name == "Chainsaw"));
    }
}
