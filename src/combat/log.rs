//! Combat logging
//!
//! Records gameplay events for display and post-run analysis. This is
//! separate from diagnostic logging: entries are typed and timestamped in
//! session time, and can be exported as JSON next to the run report.

use bevy::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::{EnemyType, WeaponType};
use crate::enemies::EnemyId;
use crate::status::StatusKind;

/// A single entry in the combat log
#[derive(Debug, Clone, Serialize)]
pub struct CombatLogEntry {
    /// Session time in milliseconds
    pub timestamp_ms: u64,
    pub event_type: CombatLogEventType,
    /// Human-readable description of the event
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<StructuredEventData>,
}

/// Types of combat log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CombatLogEventType {
    /// Weapon damage dealt to an enemy
    Damage,
    /// Periodic damage from burn or poison
    StatusDamage,
    StatusApplied,
    StatusExpired,
    EnemySpawned,
    /// Enemy died
    Death,
    /// Contact damage taken by the player
    PlayerDamage,
    LevelUp,
    /// Session event (start, pause, game over)
    SessionEvent,
}

/// Machine-readable details for entries that carry numbers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StructuredEventData {
    Damage {
        weapon: WeaponType,
        enemy: EnemyId,
        amount: f32,
        lethal: bool,
    },
    StatusDamage {
        kind: StatusKind,
        enemy: EnemyId,
        amount: f32,
    },
    Death {
        enemy: EnemyId,
        kind: EnemyType,
        experience: u32,
    },
    PlayerDamage {
        enemy: EnemyId,
        amount: f32,
        remaining_health: f32,
    },
}

/// The combat log storing every entry of the current run
#[derive(Debug, Resource, Default, Clone, Serialize)]
pub struct CombatLog {
    /// All log entries in chronological order
    pub entries: Vec<CombatLogEntry>,
    /// Current session time, stamped onto new entries
    pub session_time_ms: u64,
}

impl CombatLog {
    /// Clear the log for a new run
    pub fn clear(&mut self) {
        self.entries.clear();
        self.session_time_ms = 0;
    }

    /// Add a new entry to the log
    pub fn log(&mut self, event_type: CombatLogEventType, message: String) {
        self.push(event_type, message, None);
    }

    fn push(&mut self, event_type: CombatLogEventType, message: String, data: Option<StructuredEventData>) {
        self.entries.push(CombatLogEntry {
            timestamp_ms: self.session_time_ms,
            event_type,
            message,
            data,
        });
    }

    pub fn log_damage(&mut self, weapon: WeaponType, enemy: EnemyId, amount: f32, lethal: bool, message: String) {
        self.push(
            CombatLogEventType::Damage,
            message,
            Some(StructuredEventData::Damage {
                weapon,
                enemy,
                amount,
                lethal,
            }),
        );
    }

    pub fn log_status_damage(&mut self, kind: StatusKind, enemy: EnemyId, amount: f32, message: String) {
        self.push(
            CombatLogEventType::StatusDamage,
            message,
            Some(StructuredEventData::StatusDamage { kind, enemy, amount }),
        );
    }

    pub fn log_death(&mut self, enemy: EnemyId, kind: EnemyType, experience: u32, message: String) {
        self.push(
            CombatLogEventType::Death,
            message,
            Some(StructuredEventData::Death {
                enemy,
                kind,
                experience,
            }),
        );
    }

    pub fn log_player_damage(&mut self, enemy: EnemyId, amount: f32, remaining_health: f32, message: String) {
        self.push(
            CombatLogEventType::PlayerDamage,
            message,
            Some(StructuredEventData::PlayerDamage {
                enemy,
                amount,
                remaining_health,
            }),
        );
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: CombatLogEventType) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&CombatLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    /// Total weapon damage dealt, per weapon
    pub fn damage_by_weapon(&self) -> BTreeMap<WeaponType, f32> {
        let mut totals = BTreeMap::new();
        for entry in &self.entries {
            if let Some(StructuredEventData::Damage { weapon, amount, .. }) = &entry.data {
                *totals.entry(*weapon).or_insert(0.0) += amount;
            }
        }
        totals
    }

    /// Killing blows per weapon (status ticks that kill are not attributed)
    pub fn kills_by_weapon(&self) -> BTreeMap<WeaponType, u32> {
        let mut kills = BTreeMap::new();
        for entry in &self.entries {
            if let Some(StructuredEventData::Damage {
                weapon, lethal: true, ..
            }) = &entry.data
            {
                *kills.entry(*weapon).or_insert(0) += 1;
            }
        }
        kills
    }

    /// Number of enemy deaths recorded
    pub fn kill_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.event_type == CombatLogEventType::Death)
            .count()
    }

    /// Total contact damage the player took
    pub fn damage_taken(&self) -> f32 {
        self.entries
            .iter()
            .filter_map(|e| match &e.data {
                Some(StructuredEventData::PlayerDamage { amount, .. }) => Some(*amount),
                _ => None,
            })
            .sum()
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(&self.entries).map_err(|e| format!("Failed to serialize combat log: {}", e))
    }
}
