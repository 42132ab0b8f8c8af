//! Approach system: moves every active entity toward the player.
//!
//! Progress is normalized; positions are derived from it for rendering and
//! for the chain-explosion radius.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use hecs::{Entity, World};

use typestrike_behavior::fsm;
use typestrike_core::components::{Approach, CheerFreeze, CombatEntity};
use typestrike_core::constants::{DANCE_SWAY_AMPLITUDE, DANCE_SWAY_PERIOD_TICKS};
use typestrike_core::enums::{EnemyVariant, EntityState, TerminalCause};
use typestrike_core::types::{EntityId, Position};

/// Advance approach progress in spawn order. Entities that reach the player
/// become `ReachedPlayer`.
pub fn run(world: &World, index: &BTreeMap<EntityId, Entity>, speed_scale: f64, tick: u64) {
    for &handle in index.values() {
        let Ok(mut query) =
            world.query_one::<(&mut CombatEntity, &mut Approach, Option<&CheerFreeze>)>(handle)
        else {
            continue;
        };
        let Some((entity, approach, freeze)) = query.get() else {
            continue;
        };
        if !entity.is_active() {
            continue;
        }
        let frozen = freeze.is_some_and(|f| !f.sources.is_empty());
        if fsm::advance_approach(approach, frozen, speed_scale) {
            fsm::terminate(entity, EntityState::ReachedPlayer, TerminalCause::Reached, tick);
        }
    }
}

/// Current position of an entity.
///
/// Straight line from the spawn point to the player at the origin. Dancers
/// sway sideways, fading out as they close in.
pub fn position(entity: &CombatEntity, approach: &Approach, tick: u64) -> Position {
    let base = approach.spawn_point.lerp(Position::ZERO, approach.progress);
    if entity.variant != EnemyVariant::Dancing {
        return base;
    }
    let age = tick.saturating_sub(entity.spawn_tick) as f64;
    let phase = (age / DANCE_SWAY_PERIOD_TICKS) * TAU;
    let lateral = approach.spawn_point.perp().normalize_or_zero();
    base + lateral * (phase.sin() * DANCE_SWAY_AMPLITUDE * (1.0 - approach.progress))
}
