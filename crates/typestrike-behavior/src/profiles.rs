//! Variant-specific behavioral profiles.
//!
//! This table is the only place where enemy kinds differ. Adding or retuning a
//! variant means editing one arm of `get_profile`.

use typestrike_core::constants::*;
use typestrike_core::enums::EnemyVariant;

/// Behavioral profile for an enemy variant.
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorProfile {
    /// Score for typing the entity to completion.
    pub base_score: u32,
    /// Bonus per speed-cleared sentence.
    pub speed_bonus: u32,
    /// Bonus per mistake-free sentence.
    pub perfect_bonus: u32,
    /// Entity-level speed-kill window, measured from acquisition.
    pub speed_threshold_ticks: u64,
    /// Per-sentence speed window. Equal to the entity window for one-sentence variants.
    pub sentence_speed_ticks: u64,
    /// Mistakes allowed before fainting. `None` means unbounded.
    pub mistake_tolerance: Option<u32>,
    pub approach_speed_multiplier: f64,
    pub sentence_count: usize,
    /// Damage dealt on reaching the player.
    pub contact_damage: u32,
    pub on_tick: Option<TickHook>,
    pub on_progress: Option<ProgressHook>,
    pub on_defeat: Option<DefeatHook>,
}

/// Hook run once per tick while the entity is alive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickHook {
    /// Grow `size_factor` every tick and burst at `burst_at`.
    Grow { per_tick: f64, burst_at: f64 },
    /// Freeze every other non-dancing entity while alive.
    CheerFreeze,
    /// Reverse one sibling's sentence while alive.
    ReverseSibling,
    /// Fire a projectile every `interval_ticks`.
    FireProjectiles { interval_ticks: u32 },
}

/// Hook run on correct keystrokes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressHook {
    /// Shrink on each keystroke and again per cleared sentence.
    Deflate {
        per_keystroke: f64,
        per_sentence: f64,
        min_size: f64,
    },
}

/// Hook run when the entity reaches a terminal state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefeatHook {
    /// Explode unless a bonus was earned.
    ChainExplosion,
    /// Lift the cheer freeze imposed on others.
    ReleaseFreeze,
    /// Undo the sibling reversal.
    RestoreSibling,
    /// Speed up the surviving pack.
    EnragePack { factor: f64 },
    /// Remove projectiles fired by this entity.
    ClearProjectiles,
}

impl BehaviorProfile {
    /// Zero-tolerance variants faint instead of counting mistakes.
    pub fn faints_on_mistake(&self, mistakes_so_far: u32) -> bool {
        self.mistake_tolerance
            .is_some_and(|tolerance| mistakes_so_far >= tolerance)
    }
}

/// Get the behavioral profile for a given variant.
pub fn get_profile(variant: EnemyVariant) -> BehaviorProfile {
    let single = |base: u32, bonus: u32, window: u64, speed: f64| BehaviorProfile {
        base_score: base,
        speed_bonus: bonus,
        perfect_bonus: bonus,
        speed_threshold_ticks: window,
        sentence_speed_ticks: window,
        mistake_tolerance: None,
        approach_speed_multiplier: speed,
        sentence_count: 1,
        contact_damage: 1,
        on_tick: None,
        on_progress: None,
        on_defeat: None,
    };

    match variant {
        EnemyVariant::Normal => single(100, 50, DEFAULT_SPEED_THRESHOLD_TICKS, 1.0),
        EnemyVariant::Fast => single(120, 60, 120, 1.8),
        EnemyVariant::Kamikaze => BehaviorProfile {
            mistake_tolerance: Some(0),
            contact_damage: 2,
            ..single(150, 75, 150, 1.4)
        },
        EnemyVariant::Explosive => BehaviorProfile {
            contact_damage: 2,
            on_tick: Some(TickHook::Grow {
                per_tick: EXPLOSIVE_GROWTH_PER_TICK,
                burst_at: EXPLOSIVE_BURST_SIZE,
            }),
            on_defeat: Some(DefeatHook::ChainExplosion),
            ..single(200, 100, 240, 0.75)
        },
        EnemyVariant::Deflatable => BehaviorProfile {
            speed_threshold_ticks: DEFAULT_SPEED_THRESHOLD_TICKS * DEFLATABLE_SENTENCES as u64,
            sentence_count: DEFLATABLE_SENTENCES,
            on_progress: Some(ProgressHook::Deflate {
                per_keystroke: DEFLATE_PER_KEYSTROKE,
                per_sentence: DEFLATE_PER_SENTENCE,
                min_size: MIN_SIZE_FACTOR,
            }),
            ..single(80, 40, DEFAULT_SPEED_THRESHOLD_TICKS, 0.6)
        },
        EnemyVariant::Dancing => BehaviorProfile {
            on_tick: Some(TickHook::CheerFreeze),
            on_defeat: Some(DefeatHook::ReleaseFreeze),
            ..single(150, 75, 240, 0.9)
        },
        EnemyVariant::Backward => BehaviorProfile {
            on_tick: Some(TickHook::ReverseSibling),
            on_defeat: Some(DefeatHook::RestoreSibling),
            ..single(150, 75, 240, 0.9)
        },
        EnemyVariant::Horde => BehaviorProfile {
            on_defeat: Some(DefeatHook::EnragePack {
                factor: HORDE_ENRAGE_FACTOR,
            }),
            ..single(60, 30, 120, 1.2)
        },
        EnemyVariant::Boss => BehaviorProfile {
            speed_threshold_ticks: 300 * BOSS_SENTENCES as u64,
            sentence_count: BOSS_SENTENCES,
            contact_damage: 3,
            on_tick: Some(TickHook::FireProjectiles {
                interval_ticks: BOSS_PROJECTILE_INTERVAL_TICKS,
            }),
            on_defeat: Some(DefeatHook::ClearProjectiles),
            ..single(1000, 200, 300, 0.35)
        },
    }
}
