//! Fundamental identifier, geometry and time types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 2D position in stage space. The player sits at the origin.
pub type Position = glam::DVec2;

/// Stable identifier of a combat entity for its whole lifetime.
///
/// Ids are handed out in spawn order, so ascending id is also ascending spawn order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Seconds per tick at the default tick rate.
    pub fn dt(&self) -> f64 {
        crate::constants::DT
    }

    /// Advance by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
        self.elapsed_secs = self.tick as f64 * self.dt();
    }
}

/// Convert seconds to ticks at the simulation tick rate.
pub fn secs_to_ticks(secs: f64) -> u64 {
    (secs * crate::constants::TICK_RATE as f64).round() as u64
}
