//! Session context passed into a stage run.
//!
//! Built by the caller at stage start and discarded at stage end. The engine
//! reads difficulty and seed from here instead of any process-wide state.

use serde::{Deserialize, Serialize};

use typestrike_core::enums::Difficulty;

/// Who is playing. Opaque to the simulation, carried for collaborators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub id: u64,
    pub name: String,
}

/// Configuration for one stage run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub difficulty: Difficulty,
    pub player: PlayerIdentity,
    /// RNG seed for determinism. Same seed, stage and input = same run.
    pub seed: u64,
}

impl Default for GameSession {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            player: PlayerIdentity::default(),
            seed: 42,
        }
    }
}

impl GameSession {
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        Self {
            difficulty,
            seed,
            ..Self::default()
        }
    }

    pub fn with_player(mut self, id: u64, name: impl Into<String>) -> Self {
        self.player = PlayerIdentity {
            id,
            name: name.into(),
        };
        self
    }
}
