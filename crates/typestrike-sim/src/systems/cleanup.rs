//! Cleanup system: removes entities that reached a terminal state.

use std::collections::BTreeMap;

use hecs::{Entity, World};

use typestrike_core::components::CombatEntity;
use typestrike_core::types::EntityId;

/// Despawn every terminal entity and drop it from the index.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(
    world: &mut World,
    index: &mut BTreeMap<EntityId, Entity>,
    despawn_buffer: &mut Vec<Entity>,
) {
    despawn_buffer.clear();

    for (handle, entity) in world.query_mut::<&CombatEntity>() {
        if entity.state.is_terminal() {
            despawn_buffer.push(handle);
            index.remove(&entity.id);
        }
    }

    for handle in despawn_buffer.drain(..) {
        let _ = world.despawn(handle);
    }
}
