//! Combat frame driver
//!
//! Bevy wiring around the [`Session`]: the plugin inserts the session and its
//! input/output resources, and runs one `Session::advance` per app update.
//!
//! - [`MovementIntent`] is the input feed, written by whatever drives the player
//!   (keyboard layer, autopilot) during [`SessionSet::Input`]
//! - [`SimulationSpeed`] scales the frame delta (0.0 holds the clock still)
//! - [`SessionSnapshot`] is the render feed, refreshed in [`SessionSet::Report`]

use bevy::prelude::*;

pub mod clock;
pub mod events;
pub mod log;

use crate::config::ValidatedConfig;
use crate::session::{Session, SessionSnapshot};

/// Per-frame ordering of the survivors schedule
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionSet {
    /// Movement intent is written
    Input,
    /// The session advances one frame
    Simulate,
    /// Render feed and run bookkeeping read the result
    Report,
}

/// Normalized movement direction for the current frame
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct MovementIntent(pub Vec2);

/// Controls the speed of the simulation
#[derive(Resource)]
pub struct SimulationSpeed {
    /// Speed multiplier (0.0 = paused, 0.5 = half speed, 1.0 = normal, 2.0 = double)
    pub multiplier: f32,
}

impl Default for SimulationSpeed {
    fn default() -> Self {
        Self { multiplier: 1.0 }
    }
}

impl SimulationSpeed {
    pub fn pause(&mut self) {
        self.multiplier = 0.0;
    }

    pub fn half_speed(&mut self) {
        self.multiplier = 0.5;
    }

    pub fn normal_speed(&mut self) {
        self.multiplier = 1.0;
    }

    pub fn double_speed(&mut self) {
        self.multiplier = 2.0;
    }

    pub fn is_paused(&self) -> bool {
        self.multiplier == 0.0
    }
}

/// Plugin for the combat core
pub struct SurvivorsPlugin {
    pub config: ValidatedConfig,
    pub seed: Option<u64>,
}

impl Plugin for SurvivorsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Session::new(self.config.clone(), self.seed))
            .init_resource::<MovementIntent>()
            .init_resource::<SimulationSpeed>()
            .init_resource::<SessionSnapshot>()
            .configure_sets(
                Update,
                (SessionSet::Input, SessionSet::Simulate, SessionSet::Report).chain(),
            )
            .add_systems(Update, advance_session.in_set(SessionSet::Simulate))
            .add_systems(Update, publish_snapshot.in_set(SessionSet::Report));
    }
}

/// Advance the session by the (speed-scaled) frame delta
pub fn advance_session(
    time: Res<Time>,
    speed: Res<SimulationSpeed>,
    intent: Res<MovementIntent>,
    mut session: ResMut<Session>,
) {
    if speed.is_paused() {
        return;
    }
    let delta = time.delta().mul_f32(speed.multiplier.max(0.0));
    session.advance(delta, intent.0);
}

pub fn publish_snapshot(session: Res<Session>, mut snapshot: ResMut<SessionSnapshot>) {
    *snapshot = session.snapshot();
}
