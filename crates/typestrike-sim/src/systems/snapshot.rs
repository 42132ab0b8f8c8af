//! Snapshot system: queries the stage world and builds a complete StageSnapshot.
//!
//! This system is read-only; it never modifies the world.

use std::collections::BTreeMap;

use hecs::{Entity, World};

use typestrike_core::components::*;
use typestrike_core::enums::StagePhase;
use typestrike_core::events::CombatEvent;
use typestrike_core::state::*;
use typestrike_core::types::{EntityId, SimTime};

use super::approach;

/// Non-entity parts of the snapshot, gathered by the engine.
pub struct SnapshotFrame {
    pub time: SimTime,
    pub phase: StagePhase,
    pub wave: WaveView,
    pub player: PlayerView,
    pub score: ScoreView,
    pub events: Vec<CombatEvent>,
}

/// Build a complete StageSnapshot from the current world state.
pub fn build_snapshot(
    world: &World,
    index: &BTreeMap<EntityId, Entity>,
    frame: SnapshotFrame,
) -> StageSnapshot {
    let enemies = build_enemies(world, index, frame.time.tick, frame.player.current_target);
    StageSnapshot {
        time: frame.time,
        phase: frame.phase,
        wave: frame.wave,
        enemies,
        player: frame.player,
        score: frame.score,
        events: frame.events,
    }
}

/// Build EnemyView list from active entities, in spawn order.
fn build_enemies(
    world: &World,
    index: &BTreeMap<EntityId, Entity>,
    tick: u64,
    current_target: Option<EntityId>,
) -> Vec<EnemyView> {
    index
        .values()
        .filter_map(|&handle| {
            let mut query = world
                .query_one::<(
                    &CombatEntity,
                    &Approach,
                    Option<&CheerFreeze>,
                    Option<&Reversed>,
                    Option<&ProjectileOf>,
                )>(handle)
                .ok()?;
            let view = query
                .get()
                .filter(|(entity, ..)| entity.is_active())
                .map(|(entity, approach, freeze, reversed, projectile)| EnemyView {
                    id: entity.id,
                    variant: entity.variant,
                    wave: entity.wave,
                    position: approach::position(entity, approach, tick),
                    approach_progress: approach.progress,
                    size_factor: entity.size_factor,
                    typed_index: entity.typed_index,
                    sentence: entity.current_sentence().unwrap_or_default().to_string(),
                    sentence_index: entity.active_sentence,
                    sentence_count: entity.sentences.len(),
                    state: entity.state,
                    targeted: current_target == Some(entity.id),
                    frozen: freeze.is_some_and(|f| !f.sources.is_empty()),
                    reversed: reversed.is_some(),
                    projectile: projectile.is_some(),
                });
            view
        })
        .collect()
}
