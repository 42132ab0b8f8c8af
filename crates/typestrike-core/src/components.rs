//! ECS components for hecs entities.
//!
//! Components are plain data. Transitions live in `typestrike-behavior`,
//! cross-entity effects are applied by the simulation's wave scheduler.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{EntityId, Position};

/// Typing state of one enemy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatEntity {
    pub id: EntityId,
    pub variant: EnemyVariant,
    /// Wave that spawned this entity.
    pub wave: u32,
    /// Sentences to type, in order. Never empty, no sentence is empty.
    pub sentences: Vec<String>,
    pub active_sentence: usize,
    /// Characters of the active sentence typed so far.
    pub typed_index: usize,
    pub mistake_count: u32,
    /// Visual scale. Explosive grows, Deflatable shrinks.
    pub size_factor: f64,
    pub state: EntityState,
    pub spawn_tick: u64,
    /// Tick of the first target acquisition.
    pub acquired_tick: Option<u64>,
    /// Tick the active sentence started being typed.
    pub sentence_started_tick: Option<u64>,
    /// Mistakes made on the active sentence.
    pub sentence_mistakes: u32,
    /// Sentences cleared inside the per-sentence speed window.
    pub fast_sentences: u32,
    /// Sentences cleared without a mistake.
    pub clean_sentences: u32,
    pub terminal_cause: Option<TerminalCause>,
    pub terminal_tick: Option<u64>,
    pub hook: HookState,
}

impl CombatEntity {
    pub fn current_sentence(&self) -> Option<&str> {
        self.sentences.get(self.active_sentence).map(String::as_str)
    }

    /// Next character the player has to type, if any.
    pub fn expected_char(&self) -> Option<char> {
        self.current_sentence()
            .and_then(|s| s.chars().nth(self.typed_index))
    }

    pub fn current_len(&self) -> usize {
        self.current_sentence().map_or(0, |s| s.chars().count())
    }

    pub fn is_last_sentence(&self) -> bool {
        self.active_sentence + 1 >= self.sentences.len()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

/// Per-variant bookkeeping owned by the entity itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum HookState {
    #[default]
    None,
    Dancing {
        freeze_imposed: bool,
    },
    Backward {
        /// Sibling whose sentence is currently reversed.
        reversing: Option<EntityId>,
    },
    Boss {
        /// Ticks until the next projectile.
        projectile_cooldown: u32,
    },
}

/// Progress toward the player.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Approach {
    /// Normalized progress in [0, 1]. 1 means the player was reached.
    pub progress: f64,
    /// Variant multiplier, possibly boosted by effects.
    pub speed_multiplier: f64,
    /// Where the entity entered the stage.
    pub spawn_point: Position,
}

/// Approach frozen by one or more living Dancing entities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheerFreeze {
    pub sources: BTreeSet<EntityId>,
}

/// Sentence reversed by a living Backward entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reversed {
    pub by: EntityId,
    pub sentence_index: usize,
    /// Text before reversal, restored when the reverser dies.
    pub original: String,
}

/// Marks a boss projectile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProjectileOf {
    pub parent: EntityId,
}

/// Marks a member of a Horde pack.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackMember {
    pub pack: u32,
}
