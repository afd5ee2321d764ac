//! Command-line interface for survivorsim
//!
//! Runs a headless session from a JSON config, or from defaults when none is given.

use clap::Parser;
use std::path::PathBuf;

use crate::headless::{AutopilotStrategy, HeadlessRunConfig};

/// Headless survivors-style combat simulator
#[derive(Parser, Debug)]
#[command(name = "survivorsim")]
#[command(about = "Headless survivors-style combat simulator")]
#[command(version)]
pub struct Args {
    /// Run with the specified JSON config file (defaults apply when omitted)
    #[arg(long, value_name = "CONFIG_FILE")]
    pub headless: Option<PathBuf>,

    /// Directory containing weapons.ron, enemies.ron and tuning.ron
    #[arg(long, value_name = "DIR")]
    pub game_config: Option<PathBuf>,

    /// Output path for the run report
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub output: Option<PathBuf>,

    /// Maximum run duration in seconds
    #[arg(long)]
    pub max_duration: Option<f32>,

    /// Random seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Autopilot strategy: idle, circle or kite
    #[arg(long, value_parser = parse_autopilot)]
    pub autopilot: Option<AutopilotStrategy>,
}

fn parse_autopilot(value: &str) -> Result<AutopilotStrategy, String> {
    match value.to_ascii_lowercase().as_str() {
        "idle" => Ok(AutopilotStrategy::Idle),
        "circle" => Ok(AutopilotStrategy::Circle),
        "kite" => Ok(AutopilotStrategy::Kite),
        _ => Err(format!("Unknown autopilot '{}'. Valid: idle, circle, kite", value)),
    }
}

impl Args {
    /// Build the run configuration: the JSON file (if any), then command-line overrides
    pub fn run_config(&self) -> Result<HeadlessRunConfig, String> {
        let mut config = match &self.headless {
            Some(path) => HeadlessRunConfig::load_from_file(path)?,
            None => HeadlessRunConfig::default(),
        };

        if let Some(dir) = &self.game_config {
            config.game_config_dir = Some(dir.to_string_lossy().to_string());
        }
        if let Some(output) = &self.output {
            config.output_path = Some(output.to_string_lossy().to_string());
        }
        if let Some(max_duration) = self.max_duration {
            config.max_duration_secs = max_duration;
        }
        if let Some(seed) = self.seed {
            config.random_seed = Some(seed);
        }
        if let Some(autopilot) = self.autopilot {
            config.autopilot = autopilot;
        }

        config.validate()?;
        Ok(config)
    }
}

pub fn parse_args() -> Args {
    Args::parse()
}
