//! Stage engine for TYPESTRIKE.
//!
//! Owns the hecs ECS world through the wave scheduler, routes one keystroke
//! per tick, and produces StageSnapshots for the frontend.

pub mod engine;
pub mod ledger;
pub mod player;
pub mod router;
pub mod scheduler;
pub mod session;
pub mod spawn;
pub mod stage;
pub mod stages;
pub mod systems;

pub use engine::StageEngine;
pub use session::{GameSession, PlayerIdentity};
pub use stage::{ConfigError, StageDefinition, WaveDefinition};
pub use typestrike_core as core;
