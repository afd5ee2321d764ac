//! Core-emitted gameplay events
//!
//! The session owns one [`EventChannel`]. Presentation layers either register
//! listeners (audio cues, animation triggers) or poll the queue with
//! [`EventChannel::drain`]. Notification is synchronous and fire-and-forget:
//! the core never reads anything back from a listener, and a listener that
//! panics is logged and skipped without disturbing the others or the frame.

use bevy::prelude::*;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::config::{EnemyType, WeaponType};
use crate::enemies::EnemyId;
use crate::session::{GameOverReport, SessionState};
use crate::status::StatusKind;

/// Oldest queued events are dropped past this many undrained entries
pub const MAX_QUEUED_EVENTS: usize = 1024;

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    EnemySpawned {
        enemy: EnemyId,
        kind: EnemyType,
        position: Vec2,
    },
    EnemyKilled {
        enemy: EnemyId,
        kind: EnemyType,
        position: Vec2,
        experience: u32,
    },
    WeaponFired {
        weapon: WeaponType,
        origin: Vec2,
        spawned: usize,
    },
    PlayerDamaged {
        enemy: EnemyId,
        amount: f32,
        health: f32,
    },
    PlayerLeveledUp {
        level: u32,
        max_health: f32,
    },
    StatusApplied {
        enemy: EnemyId,
        kind: StatusKind,
    },
    StatusExpired {
        enemy: EnemyId,
        kind: StatusKind,
    },
    SessionStateChanged {
        from: SessionState,
        to: SessionState,
    },
    GameOver(GameOverReport),
}

impl GameEvent {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::EnemySpawned { .. } => "EnemySpawned",
            GameEvent::EnemyKilled { .. } => "EnemyKilled",
            GameEvent::WeaponFired { .. } => "WeaponFired",
            GameEvent::PlayerDamaged { .. } => "PlayerDamaged",
            GameEvent::PlayerLeveledUp { .. } => "PlayerLeveledUp",
            GameEvent::StatusApplied { .. } => "StatusApplied",
            GameEvent::StatusExpired { .. } => "StatusExpired",
            GameEvent::SessionStateChanged { .. } => "SessionStateChanged",
            GameEvent::GameOver(_) => "GameOver",
        }
    }
}

/// Handle returned by [`EventChannel::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&GameEvent) + Send + Sync>;

struct Registration {
    id: ListenerId,
    once: bool,
    listener: Listener,
}

#[derive(Default)]
pub struct EventChannel {
    listeners: Vec<Registration>,
    next_id: u64,
    queue: VecDeque<GameEvent>,
}

impl std::fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventChannel")
            .field("listeners", &self.listeners.len())
            .field("queued", &self.queue.len())
            .finish()
    }
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, once: bool, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Registration { id, once, listener });
        id
    }

    /// Call `listener` for every future event
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&GameEvent) + Send + Sync + 'static,
    {
        self.register(false, Box::new(listener))
    }

    /// Call `listener` for the next event only
    pub fn subscribe_once<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&GameEvent) + Send + Sync + 'static,
    {
        self.register(true, Box::new(listener))
    }

    /// Returns false if the listener was not registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|r| r.id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Notify every listener, then queue the event for polling
    pub fn emit(&mut self, event: GameEvent) {
        for registration in self.listeners.iter_mut() {
            let listener = &mut registration.listener;
            if catch_unwind(AssertUnwindSafe(|| listener(&event))).is_err() {
                warn!(
                    "Event listener {:?} panicked while handling {}; continuing",
                    registration.id,
                    event.name()
                );
            }
        }
        self.listeners.retain(|r| !r.once);

        if self.queue.len() >= MAX_QUEUED_EVENTS {
            self.queue.pop_front();
        }
        self.queue.push_back(event);
    }

    /// Take every queued event in emission order
    pub fn drain(&mut self) -> Vec<GameEvent> {
        self.queue.drain(..).collect()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Drop queued events, keeping listeners
    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }
}
