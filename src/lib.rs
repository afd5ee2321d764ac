//! survivorsim - headless combat core for a survivors-style action game
//!
//! A player auto-attacks waves of spawning enemies with a roster of weapons
//! (projectile, area, orbit, melee, stationary) while status effects modulate
//! combat and kills feed a levelling curve. Rendering, input and audio are
//! left to a presentation layer that reads snapshots and listens to events.
//!
//! This library exposes the core game modules for testing and reuse.

pub mod cli;
pub mod combat;
pub mod config;
pub mod enemies;
pub mod headless;
pub mod player;
pub mod rng;
pub mod session;
pub mod status;
pub mod weapons;
pub mod world;

// Re-export commonly used types
pub use combat::log::{CombatLog, CombatLogEventType};
pub use combat::{MovementIntent, SessionSet, SimulationSpeed, SurvivorsPlugin};
pub use config::{ConfigError, GameConfig, ValidatedConfig};
pub use headless::HeadlessRunConfig;
pub use session::{Session, SessionError, SessionSnapshot, SessionState};
