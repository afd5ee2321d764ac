//! Session simulation clock
//!
//! Every cooldown, status window and spawn timer is compared against this
//! clock. It only moves when the session advances while playing, so pausing
//! freezes all of them at once.

use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimClock {
    elapsed: Duration,
    delta: Duration,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
    }

    /// Milliseconds since the session started playing
    pub fn now_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Delta of the most recent advance, in seconds
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
