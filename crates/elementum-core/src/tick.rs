//! Server tick clock
//!
//! All timed behavior in the plugin core (cooldowns, mana regen, ability
//! durations, request expiry) is expressed in server ticks. A single clock is
//! advanced once per game-loop iteration and passed by value into the
//! managers; nothing in the core ever blocks or sleeps.

use serde::{Deserialize, Serialize};

/// Fixed server tick rate
pub const TICKS_PER_SECOND: u64 = 20;

/// Convert a duration in seconds to whole ticks (rounded up so short
/// cooldowns never collapse to zero)
pub fn secs_to_ticks(secs: f32) -> u64 {
    (secs * TICKS_PER_SECOND as f32).ceil().max(0.0) as u64
}

/// Convert a tick count to seconds
pub fn ticks_to_secs(ticks: u64) -> f32 {
    ticks as f32 / TICKS_PER_SECOND as f32
}

/// Monotonic tick counter for the whole server session
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TickClock {
    now: u64,
}

impl TickClock {
    /// Create a clock starting at tick zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock at a specific tick (tests)
    pub fn at(now: u64) -> Self {
        Self { now }
    }

    /// Current tick
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Advance by one tick and return the new value
    pub fn advance(&mut self) -> u64 {
        self.now += 1;
        self.now
    }

    /// Advance by several ticks at once (tests, catch-up)
    pub fn advance_by(&mut self, ticks: u64) -> u64 {
        self.now += ticks;
        self.now
    }
}
