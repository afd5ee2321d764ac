//! Scripted movement for headless runs
//!
//! Stands in for the keyboard layer: each frame it turns the current session
//! state into a normalized movement intent.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::enemies::find_nearest;
use crate::session::Session;

/// Enemies closer than this make the kiting player back off
pub const KITE_TRIGGER_DISTANCE: f32 = 250.0;
/// Angular rate of the circling path, radians per second
pub const CIRCLE_RATE: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AutopilotStrategy {
    /// Stand still
    Idle,
    /// Walk a wide circle
    Circle,
    /// Back away from the nearest enemy, drifting toward the arena centre
    #[default]
    Kite,
}

impl AutopilotStrategy {
    pub fn intent(&self, session: &Session) -> Vec2 {
        let player = session.player().position;
        match self {
            AutopilotStrategy::Idle => Vec2::ZERO,
            AutopilotStrategy::Circle => Vec2::from_angle(session.elapsed_secs() * CIRCLE_RATE),
            AutopilotStrategy::Kite => {
                let bounds = session.config().tuning.world;
                let to_center = bounds.center() - player;
                // Lean toward the centre harder the closer the player gets to an edge
                let edge_pull = (to_center.length() / (bounds.width.min(bounds.height) * 0.5)).min(1.0);

                let flee = find_nearest(player, session.enemies().enemies())
                    .map(|enemy| player - enemy.position)
                    .filter(|away| away.length() < KITE_TRIGGER_DISTANCE)
                    .map(|away| away.normalize_or_zero())
                    .unwrap_or(Vec2::ZERO);

                if flee == Vec2::ZERO {
                    return Vec2::ZERO;
                }
                (flee + to_center.normalize_or_zero() * edge_pull).normalize_or_zero()
            }
        }
    }
}
