//! Built-in stages, one per difficulty.
//!
//! Each stage defines wave composition, spawn cadence, the concurrency cap
//! and the sentence pools. Loaded stages use the same `StageDefinition`.

use std::collections::BTreeMap;

use typestrike_core::constants::DEFAULT_WAVE_BREAK_TICKS;
use typestrike_core::enums::{Difficulty, EnemyVariant};
use typestrike_core::types::secs_to_ticks;

use crate::stage::{StageDefinition, WaveDefinition};

const WORDS: &[&str] = &[
    "apple", "bridge", "candle", "dragon", "ember", "forest", "garden", "harbor", "island",
    "jungle", "kettle", "lantern", "meadow", "needle", "orbit", "pebble", "quiver", "river",
    "saddle", "timber", "umbrella", "velvet", "willow", "yonder", "zephyr",
];

const SHORT_WORDS: &[&str] = &[
    "ash", "bee", "cog", "dew", "elk", "fig", "gum", "hop", "ink", "jab", "kit", "log", "mud",
    "nap", "oak", "pun", "rye", "sip", "tug", "urn", "vex", "wax", "yak", "zip",
];

const PHRASES: &[&str] = &[
    "a quiet storm",
    "bright morning air",
    "cold iron gates",
    "deep blue water",
    "every little step",
    "far beyond the hills",
    "golden fields of wheat",
    "hold the line",
    "into the night",
    "keep moving forward",
    "lost in the fog",
    "march of the giants",
    "never look back",
    "over the mountain",
    "paint the sky red",
    "run for the border",
    "silver moon rising",
    "the tide turns",
    "under a pale sky",
    "wind in the reeds",
];

fn pool(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Sentence pools shared by every built-in stage.
fn variant_pools() -> BTreeMap<EnemyVariant, Vec<String>> {
    let mut pools = BTreeMap::new();
    pools.insert(EnemyVariant::Fast, pool(SHORT_WORDS));
    pools.insert(EnemyVariant::Kamikaze, pool(SHORT_WORDS));
    pools.insert(EnemyVariant::Horde, pool(SHORT_WORDS));
    pools.insert(EnemyVariant::Deflatable, pool(PHRASES));
    pools.insert(EnemyVariant::Boss, pool(PHRASES));
    pools
}

/// Build the built-in stage for a difficulty.
pub fn builtin(difficulty: Difficulty) -> StageDefinition {
    match difficulty {
        Difficulty::Easy => build_easy(),
        Difficulty::Normal => build_normal(),
        Difficulty::Hard => build_hard(),
    }
}

fn stage(name: &str, concurrency_cap: usize, waves: Vec<WaveDefinition>) -> StageDefinition {
    StageDefinition {
        name: name.to_string(),
        concurrency_cap,
        difficulty_multiplier: 1.0,
        wave_break_ticks: DEFAULT_WAVE_BREAK_TICKS,
        sentence_pool: pool(WORDS),
        variant_pools: variant_pools(),
        waves,
    }
}

/// Easy: "Warm Up"
/// 3 waves of plain and fast walkers, one Kamikaze at the end.
fn build_easy() -> StageDefinition {
    stage(
        "Warm Up",
        4,
        vec![
            WaveDefinition::new(secs_to_ticks(3.0), vec![(EnemyVariant::Normal, 4)]),
            WaveDefinition::new(
                secs_to_ticks(2.5),
                vec![(EnemyVariant::Normal, 4), (EnemyVariant::Fast, 2)],
            ),
            WaveDefinition::new(
                secs_to_ticks(2.5),
                vec![
                    (EnemyVariant::Normal, 3),
                    (EnemyVariant::Fast, 2),
                    (EnemyVariant::Kamikaze, 1),
                ],
            ),
        ],
    )
}

/// Normal: "Crossfire"
/// 5 waves introducing every special variant, ending on a boss.
fn build_normal() -> StageDefinition {
    stage(
        "Crossfire",
        6,
        vec![
            WaveDefinition::new(
                secs_to_ticks(2.0),
                vec![(EnemyVariant::Normal, 4), (EnemyVariant::Fast, 2)],
            ),
            WaveDefinition::new(
                secs_to_ticks(2.0),
                vec![
                    (EnemyVariant::Normal, 3),
                    (EnemyVariant::Kamikaze, 2),
                    (EnemyVariant::Explosive, 2),
                ],
            ),
            WaveDefinition::new(
                secs_to_ticks(2.0),
                vec![
                    (EnemyVariant::Deflatable, 2),
                    (EnemyVariant::Dancing, 1),
                    (EnemyVariant::Fast, 3),
                ],
            ),
            WaveDefinition::new(
                secs_to_ticks(1.5),
                vec![
                    (EnemyVariant::Backward, 2),
                    (EnemyVariant::Horde, 2),
                    (EnemyVariant::Normal, 3),
                ],
            ),
            WaveDefinition::new(
                secs_to_ticks(2.0),
                vec![(EnemyVariant::Boss, 1), (EnemyVariant::Normal, 2)],
            ),
        ],
    )
}

/// Hard: "Onslaught"
/// 7 waves, tight cadence, mixed specials in every wave, two boss waves.
fn build_hard() -> StageDefinition {
    stage(
        "Onslaught",
        8,
        vec![
            WaveDefinition::new(
                secs_to_ticks(1.5),
                vec![(EnemyVariant::Normal, 4), (EnemyVariant::Fast, 3)],
            ),
            WaveDefinition::new(
                secs_to_ticks(1.5),
                vec![
                    (EnemyVariant::Kamikaze, 3),
                    (EnemyVariant::Explosive, 3),
                    (EnemyVariant::Fast, 2),
                ],
            ),
            WaveDefinition::new(
                secs_to_ticks(1.5),
                vec![
                    (EnemyVariant::Dancing, 2),
                    (EnemyVariant::Deflatable, 2),
                    (EnemyVariant::Normal, 4),
                ],
            ),
            WaveDefinition::new(
                secs_to_ticks(1.0),
                vec![(EnemyVariant::Horde, 3), (EnemyVariant::Backward, 2)],
            ),
            WaveDefinition::new(
                secs_to_ticks(2.0),
                vec![(EnemyVariant::Boss, 1), (EnemyVariant::Fast, 3)],
            ),
            WaveDefinition::new(
                secs_to_ticks(1.0),
                vec![
                    (EnemyVariant::Explosive, 3),
                    (EnemyVariant::Dancing, 1),
                    (EnemyVariant::Horde, 2),
                    (EnemyVariant::Kamikaze, 3),
                ],
            ),
            WaveDefinition::new(
                secs_to_ticks(1.5),
                vec![
                    (EnemyVariant::Boss, 2),
                    (EnemyVariant::Backward, 1),
                    (EnemyVariant::Deflatable, 2),
                ],
            ),
        ],
    )
}
