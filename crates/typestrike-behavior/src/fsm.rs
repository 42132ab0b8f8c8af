//! Typing-match finite state machine.
//!
//! Pure functions over `CombatEntity` and `Approach` data. No ECS dependency:
//! the simulation decides which entity a keystroke reaches, this module decides
//! what the keystroke does to it.

use typestrike_core::components::{Approach, CombatEntity};
use typestrike_core::constants::BASE_APPROACH_TICKS;
use typestrike_core::enums::{EntityState, TerminalCause};

use crate::profiles::{BehaviorProfile, ProgressHook};

/// Result of dispatching one keystroke to a targeted entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeystrokeOutcome {
    /// The entity was not targeted; nothing changed.
    Ignored,
    /// Correct character, sentence not finished yet.
    Correct,
    /// Correct character that finished a non-final sentence.
    SentenceCleared { sentence: usize },
    /// Correct character that finished the final sentence. Entity is `Defeated`.
    Completed,
    /// Wrong character, counted as a mistake.
    Mistake,
    /// Wrong character on a zero-tolerance entity. Entity is `Fainted`.
    Fainted,
}

impl KeystrokeOutcome {
    pub fn is_correct(self) -> bool {
        matches!(
            self,
            KeystrokeOutcome::Correct
                | KeystrokeOutcome::SentenceCleared { .. }
                | KeystrokeOutcome::Completed
        )
    }
}

/// Kill classification at the moment of defeat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KillClass {
    pub is_speed_kill: bool,
    pub is_perfect_kill: bool,
}

impl KillClass {
    pub fn earned_bonus(self) -> bool {
        self.is_speed_kill || self.is_perfect_kill
    }
}

/// `Spawned -> Approaching`, immediately on creation.
pub fn enter_stage(entity: &mut CombatEntity) {
    if entity.state == EntityState::Spawned {
        entity.state = EntityState::Approaching;
    }
}

/// `Approaching -> Targeted`. Returns false if the entity cannot be targeted.
///
/// The first acquisition starts the speed-kill clock; re-acquiring after a
/// target switch keeps the original tick.
pub fn acquire(entity: &mut CombatEntity, tick: u64) -> bool {
    if entity.state != EntityState::Approaching {
        return false;
    }
    entity.state = EntityState::Targeted;
    entity.acquired_tick.get_or_insert(tick);
    entity.sentence_started_tick.get_or_insert(tick);
    true
}

/// `Targeted -> Approaching`, keeping typed progress.
pub fn release(entity: &mut CombatEntity) -> bool {
    if entity.state != EntityState::Targeted {
        return false;
    }
    entity.state = EntityState::Approaching;
    true
}

/// Whether `key` is the next character an untargeted entity expects.
pub fn accepts_first(entity: &CombatEntity, key: char) -> bool {
    entity.state == EntityState::Approaching && entity.expected_char() == Some(key)
}

/// Apply one keystroke to a targeted entity.
pub fn on_keystroke(
    entity: &mut CombatEntity,
    profile: &BehaviorProfile,
    key: char,
    tick: u64,
) -> KeystrokeOutcome {
    debug_assert!(
        entity.is_active(),
        "keystroke dispatched to terminal entity {}",
        entity.id
    );
    if entity.state != EntityState::Targeted {
        return KeystrokeOutcome::Ignored;
    }

    if entity.expected_char() != Some(key) {
        if profile.faints_on_mistake(entity.mistake_count) {
            terminate(entity, EntityState::Fainted, TerminalCause::Faint, tick);
            return KeystrokeOutcome::Fainted;
        }
        entity.mistake_count += 1;
        entity.sentence_mistakes += 1;
        return KeystrokeOutcome::Mistake;
    }

    entity.typed_index += 1;
    if let Some(ProgressHook::Deflate {
        per_keystroke,
        min_size,
        ..
    }) = profile.on_progress
    {
        entity.size_factor = (entity.size_factor - per_keystroke).max(min_size);
    }

    if entity.typed_index < entity.current_len() {
        return KeystrokeOutcome::Correct;
    }

    tally_sentence(entity, profile, tick);

    if entity.is_last_sentence() {
        terminate(entity, EntityState::Defeated, TerminalCause::Typed, tick);
        return KeystrokeOutcome::Completed;
    }

    let cleared = entity.active_sentence;
    entity.active_sentence += 1;
    entity.typed_index = 0;
    entity.sentence_mistakes = 0;
    entity.sentence_started_tick = Some(tick);
    if let Some(ProgressHook::Deflate {
        per_sentence,
        min_size,
        ..
    }) = profile.on_progress
    {
        entity.size_factor = (entity.size_factor - per_sentence).max(min_size);
    }
    KeystrokeOutcome::SentenceCleared { sentence: cleared }
}

/// Record per-sentence speed and accuracy for the sentence just finished.
fn tally_sentence(entity: &mut CombatEntity, profile: &BehaviorProfile, tick: u64) {
    let started = entity
        .sentence_started_tick
        .or(entity.acquired_tick)
        .unwrap_or(tick);
    if tick.saturating_sub(started) < profile.sentence_speed_ticks {
        entity.fast_sentences += 1;
    }
    if entity.sentence_mistakes == 0 {
        entity.clean_sentences += 1;
    }
}

/// Classify a defeat at `tick`.
pub fn classify_kill(entity: &CombatEntity, profile: &BehaviorProfile, tick: u64) -> KillClass {
    let is_speed_kill = entity
        .acquired_tick
        .is_some_and(|acquired| tick.saturating_sub(acquired) < profile.speed_threshold_ticks);
    KillClass {
        is_speed_kill,
        is_perfect_kill: entity.mistake_count == 0,
    }
}

/// Move an entity into a terminal state. Returns false (and changes nothing)
/// if it already was terminal.
pub fn terminate(
    entity: &mut CombatEntity,
    state: EntityState,
    cause: TerminalCause,
    tick: u64,
) -> bool {
    debug_assert!(state.is_terminal(), "{state:?} is not a terminal state");
    if entity.state.is_terminal() {
        return false;
    }
    entity.state = state;
    entity.terminal_cause = Some(cause);
    entity.terminal_tick = Some(tick);
    true
}

/// Advance approach progress by one tick. Returns true when the player is reached.
///
/// A frozen entity's effective multiplier is zero; it keeps its progress.
pub fn advance_approach(approach: &mut Approach, frozen: bool, speed_scale: f64) -> bool {
    if !frozen {
        approach.progress += approach.speed_multiplier * speed_scale / BASE_APPROACH_TICKS;
    }
    if approach.progress >= 1.0 {
        approach.progress = 1.0;
        return true;
    }
    false
}
