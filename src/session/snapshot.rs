//! Render feed
//!
//! A read-only copy of everything a presentation layer draws, taken after an
//! advance. Building one never mutates the session.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{Session, SessionState};
use crate::config::{EnemyType, WeaponType};
use crate::enemies::EnemyId;
use crate::status::StatusKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub position: (f32, f32),
    pub facing_left: bool,
    pub health: f32,
    pub max_health: f32,
    pub level: u32,
    pub experience: u32,
    pub next_level_exp: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: EnemyId,
    pub kind: EnemyType,
    pub position: (f32, f32),
    pub facing_left: bool,
    pub health: f32,
    pub max_health: f32,
    /// Drawn translucent
    pub phasing: bool,
    pub frozen: bool,
    /// Active status kinds, for tinting
    pub statuses: SmallVec<[StatusKind; 4]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponInstanceView {
    pub weapon: WeaponType,
    pub position: (f32, f32),
    /// Visual rotation for spinning projectiles, radius for areas
    pub extent: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Resource)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub time_ms: u64,
    pub elapsed_secs: f32,
    pub score: u32,
    pub kills: u32,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<WeaponInstanceView>,
    pub orbiters: Vec<WeaponInstanceView>,
    pub areas: Vec<WeaponInstanceView>,
}

fn xy(v: Vec2) -> (f32, f32) {
    (v.x, v.y)
}

impl SessionSnapshot {
    pub fn capture(session: &Session) -> Self {
        let player = session.player();
        let progression = &player.progression;
        let statuses = session.statuses();
        let weapons = session.weapons();

        let enemies = session
            .enemies()
            .enemies()
            .iter()
            .filter(|e| !e.is_dead)
            .map(|e| EnemyView {
                id: e.id,
                kind: e.kind,
                position: xy(e.position),
                facing_left: e.facing_left,
                health: e.health.max(0.0),
                max_health: e.max_health,
                phasing: e.phasing,
                frozen: e.frozen,
                statuses: statuses.active_kinds(e.id),
            })
            .collect();

        let projectiles = weapons
            .projectiles()
            .iter()
            .map(|p| WeaponInstanceView {
                weapon: p.weapon,
                position: xy(p.position),
                extent: p.rotation,
            })
            .collect();

        let orbiters = weapons
            .rings()
            .iter()
            .flat_map(|ring| {
                ring.orbiters.iter().map(move |o| WeaponInstanceView {
                    weapon: ring.weapon,
                    position: xy(o.position),
                    extent: o.angle,
                })
            })
            .collect();

        let areas = weapons
            .auras()
            .iter()
            .map(|a| WeaponInstanceView {
                weapon: a.weapon,
                position: xy(a.center),
                extent: a.radius,
            })
            .chain(weapons.zones().iter().map(|z| WeaponInstanceView {
                weapon: z.weapon,
                position: xy(z.position),
                extent: z.radius,
            }))
            .collect();

        Self {
            state: session.state(),
            time_ms: session.now_ms(),
            elapsed_secs: session.elapsed_secs(),
            score: session.score(),
            kills: session.kills(),
            player: PlayerView {
                position: xy(player.position),
                facing_left: player.facing_left(),
                health: progression.health,
                max_health: progression.max_health,
                level: progression.level,
                experience: progression.experience,
                next_level_exp: progression.next_level_exp,
            },
            enemies,
            projectiles,
            orbiters,
            areas,
        }
    }
}
