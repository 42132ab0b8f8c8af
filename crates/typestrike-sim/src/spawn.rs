//! Entity spawn factories.
//!
//! Creates combat entities with the component bundle their variant needs.
//! Only the wave scheduler calls these; it decides when and what to spawn.

use std::collections::{BTreeMap, BTreeSet};

use glam::DVec2;
use hecs::World;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use typestrike_behavior::fsm;
use typestrike_behavior::hooks;
use typestrike_behavior::profiles::get_profile;
use typestrike_core::components::*;
use typestrike_core::constants::*;
use typestrike_core::enums::EnemyVariant;
use typestrike_core::types::{EntityId, Position};

use crate::stage::StageDefinition;

/// Rerolls allowed when a picked sentence starts with a letter already in play.
const SENTENCE_REROLLS: usize = 4;

/// Lateral spacing between members of one Horde pack (world units).
const PACK_SPACING: f64 = 5.0;

/// Sentence pools resolved from a stage definition.
#[derive(Debug, Clone, Default)]
pub struct SentencePools {
    default: Vec<String>,
    by_variant: BTreeMap<EnemyVariant, Vec<String>>,
}

impl SentencePools {
    pub fn from_stage(stage: &StageDefinition) -> Self {
        Self {
            default: stage.sentence_pool.clone(),
            by_variant: stage.variant_pools.clone(),
        }
    }

    pub fn pool(&self, variant: EnemyVariant) -> &[String] {
        self.by_variant
            .get(&variant)
            .map(Vec::as_slice)
            .unwrap_or(&self.default)
    }
}

/// Everything needed to create one entity.
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    pub id: EntityId,
    pub variant: EnemyVariant,
    pub wave: u32,
    pub tick: u64,
    pub sentences: Vec<String>,
    pub spawn_point: Position,
    pub pack: Option<u32>,
    pub projectile_of: Option<EntityId>,
    /// Dancers currently alive; non-dancing spawns start frozen by them.
    pub cheer_sources: BTreeSet<EntityId>,
}

/// Spawn a combat entity. It enters the stage as `Approaching` immediately.
pub fn spawn_entity(world: &mut World, request: SpawnRequest) -> hecs::Entity {
    let profile = get_profile(request.variant);

    let mut entity = CombatEntity {
        id: request.id,
        variant: request.variant,
        wave: request.wave,
        sentences: request.sentences,
        active_sentence: 0,
        typed_index: 0,
        mistake_count: 0,
        size_factor: 1.0,
        state: Default::default(),
        spawn_tick: request.tick,
        acquired_tick: None,
        sentence_started_tick: None,
        sentence_mistakes: 0,
        fast_sentences: 0,
        clean_sentences: 0,
        terminal_cause: None,
        terminal_tick: None,
        hook: hooks::initial_state(&profile),
    };
    fsm::enter_stage(&mut entity);

    let approach = Approach {
        progress: 0.0,
        speed_multiplier: profile.approach_speed_multiplier,
        spawn_point: request.spawn_point,
    };

    let handle = world.spawn((entity, approach));

    if let Some(pack) = request.pack {
        let _ = world.insert_one(handle, PackMember { pack });
    }
    if let Some(parent) = request.projectile_of {
        let _ = world.insert_one(handle, ProjectileOf { parent });
    }
    if request.variant != EnemyVariant::Dancing && !request.cheer_sources.is_empty() {
        let _ = world.insert_one(
            handle,
            CheerFreeze {
                sources: request.cheer_sources,
            },
        );
    }
    handle
}

/// Random point on the spawn arc in front of the player.
pub fn spawn_point(rng: &mut ChaCha8Rng) -> Position {
    let bearing: f64 = rng.gen_range(SPAWN_BEARING_MIN..SPAWN_BEARING_MAX);
    DVec2::from_angle(bearing) * SPAWN_DISTANCE
}

/// Spawn points for a pack, spread sideways around one arc point.
pub fn pack_points(rng: &mut ChaCha8Rng, size: usize) -> Vec<Position> {
    let center = spawn_point(rng);
    let lateral = center.perp().normalize_or_zero() * PACK_SPACING;
    let mid = (size as f64 - 1.0) / 2.0;
    (0..size)
        .map(|i| center + lateral * (i as f64 - mid))
        .collect()
}

/// Pick `count` sentences for a new entity.
///
/// The first sentence is rerolled a few times to avoid starting with a letter
/// another entity is already waiting on, which keeps acquisition unambiguous
/// where the pool allows it.
pub fn pick_sentences(
    rng: &mut ChaCha8Rng,
    pool: &[String],
    count: usize,
    taken_initials: &BTreeSet<char>,
) -> Vec<String> {
    let Some(mut first) = pool.choose(rng).cloned() else {
        return Vec::new();
    };
    for _ in 0..SENTENCE_REROLLS {
        let clashes = first
            .chars()
            .next()
            .is_some_and(|c| taken_initials.contains(&c));
        if !clashes {
            break;
        }
        if let Some(candidate) = pool.choose(rng) {
            first = candidate.clone();
        }
    }

    let mut sentences = Vec::with_capacity(count.max(1));
    sentences.push(first);
    while sentences.len() < count {
        if let Some(next) = pool.choose(rng) {
            sentences.push(next.clone());
        }
    }
    sentences
}
