//! Stage snapshot: the complete read-only state handed to the renderer each tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::CombatEvent;
use crate::types::{EntityId, Position, SimTime};

/// Complete stage state produced after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageSnapshot {
    pub time: SimTime,
    pub phase: StagePhase,
    pub wave: WaveView,
    pub enemies: Vec<EnemyView>,
    pub player: PlayerView,
    pub score: ScoreView,
    pub events: Vec<CombatEvent>,
}

/// One active enemy on screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: EntityId,
    pub variant: EnemyVariant,
    pub wave: u32,
    pub position: Position,
    pub approach_progress: f64,
    pub size_factor: f64,
    pub typed_index: usize,
    pub sentence: String,
    pub sentence_index: usize,
    pub sentence_count: usize,
    pub state: EntityState,
    pub targeted: bool,
    pub frozen: bool,
    pub reversed: bool,
    pub projectile: bool,
}

/// Wave progress.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveView {
    /// 1-based wave number, 0 before the first wave starts.
    pub number: u32,
    pub total: u32,
    pub remaining_to_spawn: u32,
    pub pending: u32,
    pub is_boss_wave: bool,
    /// Ticks until the next wave starts during a break.
    pub break_remaining: u64,
}

/// Player health, combo and target.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerView {
    pub health: u32,
    pub max_health: u32,
    pub combo_meter: u32,
    pub combo_threshold: u32,
    pub current_target: Option<EntityId>,
}

/// Running score and streaks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreView {
    pub score: u64,
    pub total_kills: u32,
    pub total_speed_kills: u32,
    pub total_perfect_kills: u32,
    pub speed_streak: u32,
    pub accuracy_streak: u32,
    pub clean_keystroke_streak: u32,
    pub accuracy: f64,
}
