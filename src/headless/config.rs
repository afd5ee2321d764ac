//! JSON configuration parsing for headless mode
//!
//! Parses JSON run configurations and resolves the game tables they refer to.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::autopilot::AutopilotStrategy;
use crate::config::{GameConfig, ValidatedConfig, WeaponType};

/// Headless run configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadlessRunConfig {
    /// Random seed for deterministic run reproduction.
    /// If provided, the run will use a seeded RNG for reproducible results
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Maximum run duration in seconds (default: 300)
    #[serde(default = "default_max_duration")]
    pub max_duration_secs: f32,
    /// How the player moves (default: Kite)
    #[serde(default)]
    pub autopilot: AutopilotStrategy,
    /// Weapon names replacing the starting loadout (empty = tuning default)
    #[serde(default)]
    pub starting_weapons: Vec<String>,
    /// Directory with weapons.ron, enemies.ron and tuning.ron (default: built-in tables)
    #[serde(default)]
    pub game_config_dir: Option<String>,
    /// Custom output path for the run report (optional)
    #[serde(default)]
    pub output_path: Option<String>,
}

/// Longest run a config may ask for (24 hours of simulated time)
pub const MAX_RUN_DURATION_SECS: f32 = 86_400.0;

fn default_max_duration() -> f32 {
    300.0
}

impl Default for HeadlessRunConfig {
    fn default() -> Self {
        Self {
            random_seed: None,
            max_duration_secs: default_max_duration(),
            autopilot: AutopilotStrategy::default(),
            starting_weapons: Vec::new(),
            game_config_dir: None,
            output_path: None,
        }
    }
}

impl HeadlessRunConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: HeadlessRunConfig = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse JSON: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.max_duration_secs.is_finite() || self.max_duration_secs <= 0.0 {
            return Err("max_duration_secs must be positive".to_string());
        }
        if self.max_duration_secs > MAX_RUN_DURATION_SECS {
            return Err(format!(
                "max_duration_secs must be at most {:.0} ({} given)",
                MAX_RUN_DURATION_SECS, self.max_duration_secs
            ));
        }

        for name in &self.starting_weapons {
            if WeaponType::parse(name).is_none() {
                let valid: Vec<&str> = WeaponType::all().iter().map(|w| w.name()).collect();
                return Err(format!(
                    "Unknown weapon: '{}'. Valid weapons: {}",
                    name,
                    valid.join(", ")
                ));
            }
        }

        Ok(())
    }

    /// Load the game tables (built-in or from `game_config_dir`), apply the
    /// loadout override and validate the result
    pub fn load_game_config(&self) -> Result<ValidatedConfig, String> {
        let mut config = match &self.game_config_dir {
            Some(dir) => GameConfig::load_from_dir(Path::new(dir)),
            None => GameConfig::builtin(),
        }
        .map_err(|e| e.to_string())?;

        if !self.starting_weapons.is_empty() {
            config = config
                .with_starting_weapons(&self.starting_weapons)
                .map_err(|e| e.to_string())?;
        }

        config.validated().map_err(|e| e.to_string())
    }
}
