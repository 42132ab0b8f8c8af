//! Events emitted by the simulation for collaborators.
//!
//! Achievement tracking, leaderboard submission, screen transitions and
//! rendering feedback all consume these instead of polling counters.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::EntityId;

/// Scored kill of an entity typed to completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEvent {
    pub entity_id: EntityId,
    pub variant: EnemyVariant,
    pub base_score: u32,
    pub speed_bonus: u32,
    pub perfect_bonus: u32,
    pub is_speed_kill: bool,
    pub is_perfect_kill: bool,
    pub tick: u64,
}

impl ScoreEvent {
    pub fn total(&self) -> u32 {
        self.base_score + self.speed_bonus + self.perfect_bonus
    }
}

/// Running counters for the achievement collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub total_kills: u32,
    pub total_speed_kills: u32,
    pub total_perfect_kills: u32,
    pub speed_streak: u32,
    pub accuracy_streak: u32,
    /// Correct keystrokes in a row, across targets.
    pub clean_keystroke_streak: u32,
    pub current_wave: u32,
    pub survival_secs: f64,
}

/// Final figures for the leaderboard collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageSummary {
    pub outcome: StagePhase,
    pub final_score: u64,
    pub survival_secs: f64,
    pub waves_cleared: u32,
    pub total_kills: u32,
    pub accuracy: f64,
    pub words_per_minute: f64,
}

/// Everything a tick can report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CombatEvent {
    StageStarted { stage: String },
    WaveStarted { wave: u32, is_boss_wave: bool },
    WaveCleared { wave: u32 },
    EnemySpawned { id: EntityId, variant: EnemyVariant },
    /// A spawn waited because the concurrency cap was reached.
    SpawnDeferred { variant: EnemyVariant, queued: usize },
    TargetAcquired { id: EntityId },
    TargetReleased { id: EntityId },
    Keystroke { id: EntityId, correct: bool },
    SentenceCleared { id: EntityId, sentence: usize },
    Score(ScoreEvent),
    Progress(ProgressUpdate),
    EnemyFainted { id: EntityId, cause: TerminalCause },
    EnemyReachedPlayer { id: EntityId, variant: EnemyVariant },
    Explosion { id: EntityId, victims: Vec<EntityId> },
    PlayerDamaged { amount: u32, health: u32 },
    ExtraLifeGranted { health: u32 },
    PlayerDefeated,
    StageCleared,
    StageAborted,
    StageFinished(StageSummary),
}
