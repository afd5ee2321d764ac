//! Headless mode for automated runs
//!
//! This module provides functionality to run survivor sessions without any
//! graphical output, suitable for automated testing, balance sweeps and
//! deterministic reproduction by seed.
//!
//! ## Usage
//!
//! ```bash
//! # Run a headless session
//! cargo run --release -- --headless run_config.json
//! ```
//!
//! ## JSON Configuration
//!
//! ```json
//! {
//!   "random_seed": 42,
//!   "max_duration_secs": 120,
//!   "autopilot": "Kite",
//!   "starting_weapons": ["Dagger", "Garlic"],
//!   "output_path": "run_report.json"
//! }
//! ```

pub mod autopilot;
pub mod config;
pub mod runner;

pub use autopilot::AutopilotStrategy;
pub use config::HeadlessRunConfig;
pub use runner::{run_headless, simulate, RunReport};
