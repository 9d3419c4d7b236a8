//! Game-time bookkeeping for periodic work
//!
//! The host drives the runtime once per simulation tick. The clock counts
//! those ticks and tells the runtime when a new in-game hour or day starts.

use serde::{Deserialize, Serialize};

/// A discrete tick identifier (logical time unit)
pub type Tick = u64;

/// Ticks in one in-game hour
pub const TICKS_PER_HOUR: Tick = 2_500;

/// Ticks in one in-game day
pub const TICKS_PER_DAY: Tick = 60_000;

/// Simulation clock state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    /// Current tick number
    pub tick: Tick,
}

impl Clock {
    /// Create a clock at tick 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock at a given tick, e.g. after loading a save
    pub fn at(tick: Tick) -> Self {
        Self { tick }
    }

    /// Advance to the next tick
    pub fn advance(&mut self) -> Tick {
        self.tick += 1;
        self.tick
    }

    /// Whether the current tick starts a new in-game hour
    pub fn is_hour_boundary(&self) -> bool {
        self.tick > 0 && self.tick % TICKS_PER_HOUR == 0
    }

    /// Whether the current tick starts a new in-game day
    pub fn is_day_boundary(&self) -> bool {
        self.tick > 0 && self.tick % TICKS_PER_DAY == 0
    }

    /// Whole days elapsed
    pub fn days(&self) -> u64 {
        self.tick / TICKS_PER_DAY
    }
}
