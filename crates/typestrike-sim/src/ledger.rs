//! Score ledger: per-kill scoring, streaks and typing statistics.
//!
//! Owned by the engine, NOT stored in the ECS world. Mutated only through
//! `record_keystroke` and `record_kill`, which the engine calls while
//! resolving a tick's events.

use typestrike_behavior::fsm::KillClass;
use typestrike_behavior::profiles::BehaviorProfile;
use typestrike_core::constants::CHARS_PER_WORD;
use typestrike_core::enums::EnemyVariant;
use typestrike_core::events::{ProgressUpdate, ScoreEvent};
use typestrike_core::state::ScoreView;
use typestrike_core::types::EntityId;

/// A typed-to-completion defeat, as reported by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KillReport {
    pub entity_id: EntityId,
    pub variant: EnemyVariant,
    pub class: KillClass,
    /// Sentences cleared inside their speed window.
    pub fast_sentences: u32,
    /// Sentences cleared without a mistake.
    pub clean_sentences: u32,
    pub tick: u64,
}

/// Streak and kill counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreakCounters {
    pub speed_streak: u32,
    /// Consecutive perfect kills. Reset by any mismatch.
    pub accuracy_streak: u32,
    /// Consecutive correct keystrokes.
    pub clean_keystroke_streak: u32,
    pub best_speed_streak: u32,
    pub best_accuracy_streak: u32,
    pub total_kills: u32,
    pub total_speed_kills: u32,
    pub total_perfect_kills: u32,
}

/// Keystroke counts for accuracy and WPM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypingStats {
    pub correct_keystrokes: u32,
    pub wrong_keystrokes: u32,
}

impl TypingStats {
    /// Fraction of correct keystrokes. 1.0 before anything was typed.
    pub fn accuracy(&self) -> f64 {
        let total = self.correct_keystrokes + self.wrong_keystrokes;
        if total == 0 {
            return 1.0;
        }
        self.correct_keystrokes as f64 / total as f64
    }

    /// Words per minute over `elapsed_secs`, five characters to a word.
    pub fn words_per_minute(&self, elapsed_secs: f64) -> f64 {
        if elapsed_secs <= 0.0 {
            return 0.0;
        }
        (self.correct_keystrokes as f64 / CHARS_PER_WORD) / (elapsed_secs / 60.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScoreLedger {
    score: u64,
    counters: StreakCounters,
    typing: TypingStats,
}

impl ScoreLedger {
    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn counters(&self) -> &StreakCounters {
        &self.counters
    }

    pub fn typing(&self) -> TypingStats {
        self.typing
    }

    /// Count a keystroke that reached an entity.
    pub fn record_keystroke(&mut self, correct: bool) {
        let c = &mut self.counters;
        if correct {
            self.typing.correct_keystrokes += 1;
            c.clean_keystroke_streak += 1;
        } else {
            self.typing.wrong_keystrokes += 1;
            c.clean_keystroke_streak = 0;
            c.accuracy_streak = 0;
        }
    }

    /// Score a defeat and update streaks.
    ///
    /// Base score is awarded once. For multi-sentence variants the speed and
    /// perfect bonuses are paid per qualifying sentence.
    pub fn record_kill(&mut self, report: &KillReport, profile: &BehaviorProfile) -> ScoreEvent {
        let event = ScoreEvent {
            entity_id: report.entity_id,
            variant: report.variant,
            base_score: profile.base_score,
            speed_bonus: profile.speed_bonus * report.fast_sentences,
            perfect_bonus: profile.perfect_bonus * report.clean_sentences,
            is_speed_kill: report.class.is_speed_kill,
            is_perfect_kill: report.class.is_perfect_kill,
            tick: report.tick,
        };
        self.score += u64::from(event.total());

        let c = &mut self.counters;
        c.total_kills += 1;
        if event.is_speed_kill {
            c.total_speed_kills += 1;
            c.speed_streak += 1;
            c.best_speed_streak = c.best_speed_streak.max(c.speed_streak);
        } else {
            c.speed_streak = 0;
        }
        if event.is_perfect_kill {
            c.total_perfect_kills += 1;
            c.accuracy_streak += 1;
            c.best_accuracy_streak = c.best_accuracy_streak.max(c.accuracy_streak);
        } else {
            c.accuracy_streak = 0;
        }
        event
    }

    pub fn progress(&self, current_wave: u32, survival_secs: f64) -> ProgressUpdate {
        ProgressUpdate {
            total_kills: self.counters.total_kills,
            total_speed_kills: self.counters.total_speed_kills,
            total_perfect_kills: self.counters.total_perfect_kills,
            speed_streak: self.counters.speed_streak,
            accuracy_streak: self.counters.accuracy_streak,
            clean_keystroke_streak: self.counters.clean_keystroke_streak,
            current_wave,
            survival_secs,
        }
    }

    pub fn view(&self) -> ScoreView {
        ScoreView {
            score: self.score,
            total_kills: self.counters.total_kills,
            total_speed_kills: self.counters.total_speed_kills,
            total_perfect_kills: self.counters.total_perfect_kills,
            speed_streak: self.counters.speed_streak,
            accuracy_streak: self.counters.accuracy_streak,
            clean_keystroke_streak: self.counters.clean_keystroke_streak,
            accuracy: self.typing.accuracy(),
        }
    }
}
