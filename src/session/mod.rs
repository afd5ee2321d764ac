//! Combat Orchestrator
//!
//! A [`Session`] owns one run: the clock, the player and the three engines.
//! It is a small state machine:
//!
//! ```text
//! Loading -> Menu -> Playing <-> Paused
//!                       |
//!                       v
//!                   GameOver -> Playing (fresh run)
//! ```
//!
//! Only `Playing` advances the simulation. While paused the clock does not
//! move, so cooldowns, status windows and spawn timers all hold still.
//!
//! ## Frame order
//!
//! [`Session::advance`] runs, in order: clock, player movement, spawn, enemy
//! AI and movement, enemy attacks (applied to the player), weapon fire,
//! weapon advance, collision detection, hit resolution, status tick, death
//! sweep (score and experience), removal of the dead, game-over check,
//! level-up check, and finally the player clamp to world bounds.

pub mod snapshot;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::combat::clock::SimClock;
use crate::combat::events::{EventChannel, GameEvent};
use crate::combat::log::{CombatLog, CombatLogEventType};
use crate::config::{ValidatedConfig, WeaponType};
use crate::enemies::{EnemyEngine, EnemyId};
use crate::player::{Player, Progression};
use crate::rng::GameRng;
use crate::status::{StatusEngine, StatusOutcome};
use crate::weapons::{resolve_collision, WeaponEngine};

pub use snapshot::SessionSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Loading,
    Menu,
    Playing,
    Paused,
    GameOver,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Cannot {action} while {from:?}")]
    InvalidTransition {
        from: SessionState,
        action: &'static str,
    },
    #[error("Invalid progression: {0}")]
    InvalidProgression(String),
    #[error("No definition for weapon {0:?}")]
    UnknownWeapon(WeaponType),
}

/// Final numbers reported once when a run ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameOverReport {
    pub score: u32,
    pub level: u32,
    pub kills: u32,
    pub elapsed_secs: f32,
}

/// What happened during one [`Session::advance`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSummary {
    pub now_ms: u64,
    pub spawned: Vec<EnemyId>,
    pub weapons_fired: usize,
    pub weapon_hits: usize,
    pub player_damage: f32,
    pub killed: Vec<EnemyId>,
    pub leveled_up: bool,
    pub game_over: Option<GameOverReport>,
}

#[derive(Resource)]
pub struct Session {
    config: ValidatedConfig,
    seed: Option<u64>,
    state: SessionState,
    clock: SimClock,
    player: Player,
    enemies: EnemyEngine,
    weapons: WeaponEngine,
    statuses: StatusEngine,
    events: EventChannel,
    log: CombatLog,
    score: u32,
    kills: u32,
    /// Progression to carry into the next run
    restored: Option<Progression>,
    final_report: Option<GameOverReport>,
}

impl Session {
    /// A session starts in `Loading`. With a seed, every run is reproducible.
    pub fn new(config: ValidatedConfig, seed: Option<u64>) -> Self {
        let tuning = &config.tuning;
        let player = Player::new(&tuning.player, &tuning.progression, tuning.world.center());
        let enemies = EnemyEngine::new(&config, GameRng::from_optional_seed(seed));

        Self {
            config,
            seed,
            state: SessionState::Loading,
            clock: SimClock::new(),
            player,
            enemies,
            weapons: WeaponEngine::new(),
            statuses: StatusEngine::new(),
            events: EventChannel::new(),
            log: CombatLog::default(),
            score: 0,
            kills: 0,
            restored: None,
            final_report: None,
        }
    }

    fn transition(
        &mut self,
        allowed: &[SessionState],
        to: SessionState,
        action: &'static str,
    ) -> Result<SessionState, SessionError> {
        let from = self.state;
        if !allowed.contains(&from) {
            return Err(SessionError::InvalidTransition { from, action });
        }
        self.state = to;
        info!("Session {:?} -> {:?}", from, to);
        self.log
            .log(CombatLogEventType::SessionEvent, format!("{:?} -> {:?}", from, to));
        self.events.emit(GameEvent::SessionStateChanged { from, to });
        Ok(from)
    }

    pub fn finish_loading(&mut self) -> Result<(), SessionError> {
        self.transition(&[SessionState::Loading], SessionState::Menu, "finish loading")?;
        Ok(())
    }

    /// Begin a fresh run with new engines and the starting loadout
    pub fn start_run(&mut self) -> Result<(), SessionError> {
        if !matches!(self.state, SessionState::Menu | SessionState::GameOver) {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                action: "start a run",
            });
        }
        self.reset_run();
        self.transition(
            &[SessionState::Menu, SessionState::GameOver],
            SessionState::Playing,
            "start a run",
        )?;
        Ok(())
    }

    fn reset_run(&mut self) {
        let tuning = &self.config.tuning;
        self.clock.reset();
        self.player = Player::new(&tuning.player, &tuning.progression, tuning.world.center());
        if let Some(progression) = self.restored.take() {
            self.player.progression = progression;
        }
        self.enemies = EnemyEngine::new(&self.config, GameRng::from_optional_seed(self.seed));
        self.weapons = WeaponEngine::new();
        for weapon in &tuning.starting_weapons {
            // Validation guarantees every starting weapon has a definition
            if let Some(definition) = self.config.weapon(*weapon) {
                self.weapons.equip(*weapon, definition.clone());
            }
        }
        self.statuses.clear();
        self.log.clear();
        self.events.clear_queue();
        self.score = 0;
        self.kills = 0;
        self.final_report = None;
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        self.transition(&[SessionState::Playing], SessionState::Paused, "pause")?;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        self.transition(&[SessionState::Paused], SessionState::Playing, "resume")?;
        Ok(())
    }

    /// Leave a paused or finished run for the menu
    pub fn return_to_menu(&mut self) -> Result<(), SessionError> {
        self.transition(
            &[SessionState::Paused, SessionState::GameOver],
            SessionState::Menu,
            "return to menu",
        )?;
        self.teardown();
        Ok(())
    }

    fn teardown(&mut self) {
        self.enemies.clear();
        self.weapons.clear();
        self.statuses.clear();
    }

    /// Run one frame. Outside `Playing` this does nothing.
    pub fn advance(&mut self, delta: Duration, intent: Vec2) -> FrameSummary {
        if self.state != SessionState::Playing {
            return FrameSummary {
                now_ms: self.clock.now_ms(),
                ..default()
            };
        }

        self.clock.advance(delta);
        let now = self.clock.now_ms();
        let dt = self.clock.delta_secs();
        let bounds = self.config.tuning.world;
        self.log.session_time_ms = now;
        let mut summary = FrameSummary {
            now_ms: now,
            ..default()
        };

        self.player.apply_input(intent, dt);

        // Enemies: spawn, steer, attack
        let level = self.player.progression.level;
        if let Some(enemy) = self.enemies.try_spawn(now, self.player.position, level, bounds) {
            let (id, kind, position) = (enemy.id, enemy.kind, enemy.position);
            self.log.log(
                CombatLogEventType::EnemySpawned,
                format!("{} #{} spawned at ({:.0}, {:.0})", kind.name(), id.0, position.x, position.y),
            );
            self.events.emit(GameEvent::EnemySpawned {
                enemy: id,
                kind,
                position,
            });
            summary.spawned.push(id);
        }
        self.enemies.update(now, dt, self.player.position, bounds);

        for (enemy, damage) in self.enemies.resolve_attacks(now, self.player.position) {
            let taken = self.player.progression.take_damage(damage);
            let health = self.player.progression.health;
            summary.player_damage += taken;
            self.log.log_player_damage(
                enemy,
                taken,
                health,
                format!("Enemy #{} hits the player for {:.0} ({:.0} left)", enemy.0, taken, health),
            );
            self.events.emit(GameEvent::PlayerDamaged {
                enemy,
                amount: taken,
                health,
            });
        }

        // Weapons: fire, move, collide
        let fired = self
            .weapons
            .fire_due(now, &self.player, self.enemies.enemies(), bounds);
        summary.weapons_fired = fired.len();
        for event in fired {
            self.events.emit(GameEvent::WeaponFired {
                weapon: event.weapon,
                origin: event.origin,
                spawned: event.spawned,
            });
        }
        self.weapons
            .advance(now, dt, self.player.position, self.enemies.enemies());
        let hits = self.weapons.detect_collisions(now, self.enemies.enemies());

        for hit in hits {
            let Some(enemy) = self.enemies.get_mut(hit.enemy) else {
                continue;
            };
            let Some(outcome) =
                resolve_collision(&hit.payload, enemy, self.player.position, now, &mut self.statuses)
            else {
                continue;
            };
            summary.weapon_hits += 1;
            self.log.log_damage(
                hit.weapon,
                hit.enemy,
                outcome.damage,
                outcome.lethal,
                format!(
                    "{} hits {} #{} for {:.0}",
                    hit.weapon.name(),
                    enemy.kind.name(),
                    hit.enemy.0,
                    outcome.damage
                ),
            );
            if let Some(kind) = outcome.status_applied {
                self.log.log(
                    CombatLogEventType::StatusApplied,
                    format!("{:?} applied to #{}", kind, hit.enemy.0),
                );
                self.events.emit(GameEvent::StatusApplied {
                    enemy: hit.enemy,
                    kind,
                });
            }
        }

        // Status effects
        for outcome in self.statuses.tick(now, self.enemies.enemies_mut()) {
            match outcome {
                StatusOutcome::Ticked { enemy, kind, damage } => {
                    self.log.log_status_damage(
                        kind,
                        enemy,
                        damage,
                        format!("{:?} deals {:.0} to #{}", kind, damage, enemy.0),
                    );
                }
                StatusOutcome::Expired { enemy, kind } => {
                    self.log.log(
                        CombatLogEventType::StatusExpired,
                        format!("{:?} expired on #{}", kind, enemy.0),
                    );
                    self.events.emit(GameEvent::StatusExpired { enemy, kind });
                }
            }
        }

        // Death sweep
        let dying: Vec<EnemyId> = self
            .enemies
            .enemies()
            .iter()
            .filter(|e| !e.is_dead && e.health <= 0.0)
            .map(|e| e.id)
            .collect();
        for id in dying {
            if self.kill_enemy(id) {
                summary.killed.push(id);
            }
        }
        for id in self.enemies.remove_dead() {
            self.statuses.purge(id);
        }

        if self.player.progression.is_dead() {
            summary.game_over = self.end_run();
            return summary;
        }

        if self.player.progression.ready_to_level() {
            self.level_up();
            summary.leveled_up = true;
        }

        self.player.clamp_to(bounds);
        summary
    }

    /// Kill an enemy and award its score and experience.
    ///
    /// Idempotent: an enemy that is already dead (or unknown) yields no second
    /// award and no second event. Experience is granted without a level check;
    /// the frame's level-up step handles the threshold.
    pub fn kill_enemy(&mut self, id: EnemyId) -> bool {
        if !self.enemies.kill(id) {
            return false;
        }
        let Some(enemy) = self.enemies.get(id) else {
            return false;
        };
        let (kind, position, experience) = (enemy.kind, enemy.position, enemy.experience);

        self.score = self.score.saturating_add(self.config.tuning.score_per_kill);
        self.kills += 1;
        self.player.progression.grant_experience(experience);
        self.statuses.purge(id);

        debug!("{} #{} killed (+{} exp)", kind.name(), id.0, experience);
        self.log.log_death(
            id,
            kind,
            experience,
            format!("{} #{} dies", kind.name(), id.0),
        );
        self.events.emit(GameEvent::EnemyKilled {
            enemy: id,
            kind,
            position,
            experience,
        });
        true
    }

    /// Remove an enemy without a kill award, dropping its status effects with it
    pub fn despawn_enemy(&mut self, id: EnemyId) -> bool {
        if !self.enemies.despawn(id) {
            return false;
        }
        self.statuses.purge(id);
        debug!("Enemy #{} despawned", id.0);
        true
    }

    fn level_up(&mut self) {
        let rules = self.config.tuning.progression;
        self.player.progression.level_up(&rules);
        self.announce_level_up();
    }

    fn announce_level_up(&mut self) {
        let progression = self.player.progression;
        info!("Player reached level {}", progression.level);
        self.log.log(
            CombatLogEventType::LevelUp,
            format!(
                "Level {} ({:.0}/{:.0} HP, next at {} exp)",
                progression.level, progression.health, progression.max_health, progression.next_level_exp
            ),
        );
        self.events.emit(GameEvent::PlayerLeveledUp {
            level: progression.level,
            max_health: progression.max_health,
        });
    }

    /// Add experience directly, levelling up at once if the threshold is reached
    pub fn add_experience(&mut self, amount: u32) -> bool {
        let rules = self.config.tuning.progression;
        let leveled = self.player.progression.add_experience(amount, &rules);
        if leveled {
            self.announce_level_up();
        }
        leveled
    }

    fn end_run(&mut self) -> Option<GameOverReport> {
        if self.final_report.is_some() {
            return None;
        }
        let report = GameOverReport {
            score: self.score,
            level: self.player.progression.level,
            kills: self.kills,
            elapsed_secs: self.clock.elapsed_secs(),
        };
        info!(
            "Game over after {:.1}s: level {}, score {}, {} kills",
            report.elapsed_secs, report.level, report.score, report.kills
        );
        self.final_report = Some(report);
        self.teardown();
        if let Err(e) = self.transition(&[SessionState::Playing], SessionState::GameOver, "end the run") {
            error!("{}", e);
        }
        self.events.emit(GameEvent::GameOver(report));
        Some(report)
    }

    /// Add a weapon to the loadout by type
    pub fn equip_weapon(&mut self, weapon: WeaponType) -> Result<(), SessionError> {
        let definition = self
            .config
            .weapon(weapon)
            .ok_or(SessionError::UnknownWeapon(weapon))?
            .clone();
        self.weapons.equip(weapon, definition);
        Ok(())
    }

    /// Restore saved progression. Applies to the current run and carries into
    /// the next `start_run`.
    pub fn restore_progression(&mut self, progression: Progression) -> Result<(), SessionError> {
        progression.validate().map_err(SessionError::InvalidProgression)?;
        self.player.progression = progression;
        self.restored = Some(progression);
        Ok(())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.clock.elapsed_secs()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn kills(&self) -> u32 {
        self.kills
    }

    pub fn final_report(&self) -> Option<GameOverReport> {
        self.final_report
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn enemies(&self) -> &EnemyEngine {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut EnemyEngine {
        &mut self.enemies
    }

    pub fn weapons(&self) -> &WeaponEngine {
        &self.weapons
    }

    pub fn statuses(&self) -> &StatusEngine {
        &self.statuses
    }

    pub fn events(&mut self) -> &mut EventChannel {
        &mut self.events
    }

    pub fn combat_log(&self) -> &CombatLog {
        &self.log
    }
}
