//! Enumeration types used throughout the simulation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Enemy kind. Every behavioral difference between enemies hangs off this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnemyVariant {
    /// Plain walker with one sentence.
    Normal,
    /// Approaches quickly; also used for boss projectiles.
    Fast,
    /// Faints on the first mistyped character.
    Kamikaze,
    /// Grows while alive and explodes when it bursts or dies without a bonus.
    Explosive,
    /// Carries several sentences and shrinks as it is typed.
    Deflatable,
    /// Freezes everyone else's approach while it dances.
    Dancing,
    /// Reverses a sibling's sentence while alive.
    Backward,
    /// Spawns as a pack; survivors enrage when a member falls.
    Horde,
    /// Slow multi-sentence enemy that fires projectiles.
    Boss,
}

impl EnemyVariant {
    pub const ALL: [EnemyVariant; 9] = [
        EnemyVariant::Normal,
        EnemyVariant::Fast,
        EnemyVariant::Kamikaze,
        EnemyVariant::Explosive,
        EnemyVariant::Deflatable,
        EnemyVariant::Dancing,
        EnemyVariant::Backward,
        EnemyVariant::Horde,
        EnemyVariant::Boss,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EnemyVariant::Normal => "Normal",
            EnemyVariant::Fast => "Fast",
            EnemyVariant::Kamikaze => "Kamikaze",
            EnemyVariant::Explosive => "Explosive",
            EnemyVariant::Deflatable => "Deflatable",
            EnemyVariant::Dancing => "Dancing",
            EnemyVariant::Backward => "Backward",
            EnemyVariant::Horde => "Horde",
            EnemyVariant::Boss => "Boss",
        }
    }
}

impl fmt::Display for EnemyVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a variant name is not one of the nine known kinds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown enemy variant `{0}`")]
pub struct UnknownVariant(pub String);

impl FromStr for EnemyVariant {
    type Err = UnknownVariant;

    /// Case-insensitive lookup by name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EnemyVariant::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Lifecycle state of a combat entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityState {
    #[default]
    Spawned,
    Approaching,
    Targeted,
    Defeated,
    ReachedPlayer,
    Fainted,
}

impl EntityState {
    /// Terminal states are entered exactly once and never left.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            EntityState::Defeated | EntityState::ReachedPlayer | EntityState::Fainted
        )
    }

    /// Non-terminal, i.e. still part of the fight.
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

/// Why an entity reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminalCause {
    /// Sentence(s) typed to completion.
    Typed,
    /// Explosive burst on its own.
    Burst,
    /// Caught in a neighbor's explosion.
    Chain,
    /// Kamikaze mistyped.
    Faint,
    /// Removed because its parent died (boss projectiles).
    Cleared,
    /// Approach completed.
    Reached,
}

/// Game difficulty, chosen for the whole session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// Multiplier applied to a stage's configured concurrency cap.
    pub fn cap_scale(self) -> f64 {
        match self {
            Difficulty::Easy => 0.75,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.25,
        }
    }

    /// Multiplier applied to every entity's approach speed.
    pub fn speed_scale(self) -> f64 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.25,
        }
    }

    pub fn starting_health(self) -> u32 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Normal => 4,
            Difficulty::Hard => 3,
        }
    }

    /// Scale a configured concurrency cap, never dropping below one slot.
    pub fn scale_cap(self, cap: usize) -> usize {
        ((cap as f64 * self.cap_scale()).round() as usize).max(1)
    }
}

/// Returned when a difficulty name is not easy, normal or hard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown difficulty `{0}`")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(UnknownDifficulty(s.to_string())),
        }
    }
}

/// Stage phase (top-level state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StagePhase {
    #[default]
    Running,
    Paused,
    /// Every wave has been cleared.
    Cleared,
    /// Player health reached zero.
    Defeated,
    /// Quit from outside the simulation.
    Aborted,
}

impl StagePhase {
    pub fn is_finished(self) -> bool {
        matches!(
            self,
            StagePhase::Cleared | StagePhase::Defeated | StagePhase::Aborted
        )
    }
}
