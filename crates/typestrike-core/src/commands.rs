//! Player input sampled by the host, at most one per tick.
//!
//! There is no cross-tick queue: input not consumed on its tick is gone.

use serde::{Deserialize, Serialize};

/// All possible player inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerInput {
    /// A typed character.
    Key { ch: char },
    /// Drop the current target without penalty.
    SwitchTarget,
    /// Pause the stage.
    Pause,
    /// Resume a paused stage.
    Resume,
    /// Quit the stage (external abort).
    Quit,
}

impl PlayerInput {
    pub fn key(ch: char) -> Self {
        PlayerInput::Key { ch }
    }
}
