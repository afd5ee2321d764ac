//! Headless run execution
//!
//! Runs a session without any graphical output, suitable for automated
//! testing and balance sweeps. Two drivers share the same session code:
//!
//! - [`run_headless`] builds a Bevy app (`MinimalPlugins`, fixed simulated
//!   timestep, autopilot system) and runs it until the run ends
//! - [`simulate`] steps a session directly in a plain loop, with no app at all

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::autopilot::AutopilotStrategy;
use super::config::HeadlessRunConfig;
use crate::combat::log::CombatLog;
use crate::combat::{MovementIntent, SessionSet, SurvivorsPlugin};
use crate::config::ValidatedConfig;
use crate::session::{Session, SessionState};

/// Fixed simulated frame length for headless runs
pub const HEADLESS_TIMESTEP: Duration = Duration::from_nanos(16_666_667);

/// Result of a completed headless run
///
/// This struct provides programmatic access to run results for testing and analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Random seed used (if deterministic mode)
    pub random_seed: Option<u64>,
    pub autopilot: AutopilotStrategy,
    /// True if the player died, false if the run hit its time limit
    pub game_over: bool,
    pub elapsed_secs: f32,
    pub score: u32,
    pub level: u32,
    pub kills: u32,
    pub final_health: f32,
    pub max_health: f32,
    pub damage_taken: f32,
    /// Total damage dealt per weapon display name
    pub damage_by_weapon: BTreeMap<String, f32>,
    pub enemies_alive: usize,
    pub loadout: Vec<String>,
}

impl RunReport {
    /// Build the report from the current session and its combat log
    pub fn from_session(session: &Session, seed: Option<u64>, autopilot: AutopilotStrategy) -> Self {
        let log = session.combat_log();
        let progression = session.player().progression;
        let final_report = session.final_report();

        Self {
            random_seed: seed,
            autopilot,
            game_over: final_report.is_some(),
            elapsed_secs: final_report
                .map(|r| r.elapsed_secs)
                .unwrap_or_else(|| session.elapsed_secs()),
            score: session.score(),
            level: progression.level,
            kills: session.kills(),
            final_health: progression.health,
            max_health: progression.max_health,
            damage_taken: log.damage_taken(),
            damage_by_weapon: log
                .damage_by_weapon()
                .into_iter()
                .map(|(weapon, amount)| (weapon.name().to_string(), amount))
                .collect(),
            enemies_alive: session.enemies().live_count(),
            loadout: session
                .config()
                .tuning
                .starting_weapons
                .iter()
                .map(|w| w.name().to_string())
                .collect(),
        }
    }
}

/// Everything written to the output file
#[derive(Serialize)]
struct RunOutput<'a> {
    report: &'a RunReport,
    combat_log: &'a CombatLog,
}

/// Save the report and combat log as JSON
pub fn save_run_output(report: &RunReport, log: &CombatLog, path: &str) -> Result<(), String> {
    let output = RunOutput {
        report,
        combat_log: log,
    };
    let json = serde_json::to_string_pretty(&output).map_err(|e| format!("Failed to serialize run output: {}", e))?;
    std::fs::write(path, json).map_err(|e| format!("Failed to write {}: {}", path, e))
}

fn start_session(session: &mut Session) -> Result<(), String> {
    if session.state() == SessionState::Loading {
        session.finish_loading().map_err(|e| e.to_string())?;
    }
    session.start_run().map_err(|e| e.to_string())
}

/// Step a session to completion without a Bevy app
pub fn simulate(game_config: ValidatedConfig, run: &HeadlessRunConfig) -> Result<(RunReport, CombatLog), String> {
    run.validate()?;
    let mut session = Session::new(game_config, run.random_seed);
    start_session(&mut session)?;

    let max_duration = Duration::try_from_secs_f32(run.max_duration_secs)
        .map_err(|e| format!("Invalid max duration: {}", e))?;
    while session.state() == SessionState::Playing {
        if Duration::from_millis(session.now_ms()) >= max_duration {
            break;
        }
        let intent = run.autopilot.intent(&session);
        session.advance(HEADLESS_TIMESTEP, intent);
    }

    let report = RunReport::from_session(&session, run.random_seed, run.autopilot);
    Ok((report, session.combat_log().clone()))
}

/// Resource to track headless run state
#[derive(Resource)]
pub struct HeadlessRunState {
    pub max_duration_secs: f32,
    pub autopilot: AutopilotStrategy,
    pub random_seed: Option<u64>,
    /// Custom output path for the run report
    pub output_path: Option<String>,
    pub run_complete: bool,
    /// Shared with the caller, since `App::run` consumes the app
    pub result: Arc<Mutex<Option<RunReport>>>,
}

/// Plugin for headless run execution
pub struct HeadlessPlugin {
    pub config: HeadlessRunConfig,
    pub result: Arc<Mutex<Option<RunReport>>>,
}

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(HeadlessRunState {
            max_duration_secs: self.config.max_duration_secs,
            autopilot: self.config.autopilot,
            random_seed: self.config.random_seed,
            output_path: self.config.output_path.clone(),
            run_complete: false,
            result: self.result.clone(),
        })
        .add_systems(Startup, headless_start_run)
        .add_systems(Update, headless_autopilot.in_set(SessionSet::Input))
        .add_systems(Update, headless_check_run_end.after(SessionSet::Report))
        .add_systems(PostUpdate, headless_exit_on_complete);
    }
}

fn headless_start_run(mut session: ResMut<Session>, headless_state: Res<HeadlessRunState>) {
    match headless_state.random_seed {
        Some(seed) => info!("Using deterministic RNG with seed: {}", seed),
        None => info!("Using non-deterministic RNG (no seed provided)"),
    }
    if let Err(e) = start_session(&mut session) {
        error!("Failed to start headless run: {}", e);
    }
}

fn headless_autopilot(
    session: Res<Session>,
    headless_state: Res<HeadlessRunState>,
    mut intent: ResMut<MovementIntent>,
) {
    intent.0 = headless_state.autopilot.intent(&session);
}

/// Check if the run has ended (player died, or time limit)
fn headless_check_run_end(session: Res<Session>, mut headless_state: ResMut<HeadlessRunState>) {
    if headless_state.run_complete {
        return;
    }

    let timed_out = session.elapsed_secs() >= headless_state.max_duration_secs;
    let died = session.final_report().is_some();
    let stuck = !matches!(session.state(), SessionState::Playing | SessionState::GameOver);
    if !timed_out && !died && !stuck {
        return;
    }

    if timed_out && !died {
        info!("Run reached its {:.0}s limit", headless_state.max_duration_secs);
    }

    let report = RunReport::from_session(&session, headless_state.random_seed, headless_state.autopilot);
    if let Some(path) = &headless_state.output_path {
        match save_run_output(&report, session.combat_log(), path) {
            Ok(()) => info!("Run report saved to: {}", path),
            Err(e) => error!("Failed to save run report: {}", e),
        }
    }

    match headless_state.result.lock() {
        Ok(mut slot) => *slot = Some(report),
        Err(e) => error!("Run result slot poisoned: {}", e),
    }
    headless_state.run_complete = true;
}

/// Exit the app when the run is complete
fn headless_exit_on_complete(headless_state: Res<HeadlessRunState>, mut exit: EventWriter<AppExit>) {
    if headless_state.run_complete {
        exit.send(AppExit::Success);
    }
}

/// Run a headless session with the given configuration
pub fn run_headless(config: HeadlessRunConfig, game_config: ValidatedConfig) -> Result<RunReport, String> {
    config.validate()?;

    println!("Starting headless run...");
    println!("  Autopilot: {:?}", config.autopilot);
    println!("  Loadout: {:?}", game_config.tuning.starting_weapons);
    println!("  Max duration: {:.0}s", config.max_duration_secs);

    let result = Arc::new(Mutex::new(None));
    let seed = config.random_seed;

    App::new()
        // Minimal plugins - no window, no rendering; step as fast as possible
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::ZERO)))
        .add_plugins(LogPlugin::default())
        // Every update advances simulated time by exactly one frame
        .insert_resource(TimeUpdateStrategy::ManualDuration(HEADLESS_TIMESTEP))
        .add_plugins(SurvivorsPlugin {
            config: game_config,
            seed,
        })
        .add_plugins(HeadlessPlugin {
            config,
            result: result.clone(),
        })
        .run();

    let report = result
        .lock()
        .map_err(|e| format!("Run result slot poisoned: {}", e))?
        .take();
    report.ok_or_else(|| "Headless run ended without a report".to_string())
}
