//! Cross-entity effects.
//!
//! Hooks return `Effect` intents; these functions are how the scheduler
//! applies them to siblings. Every iteration goes through the id index so the
//! outcome does not depend on ECS storage order.

use std::collections::BTreeMap;

use hecs::{Entity, World};

use typestrike_behavior::fsm;
use typestrike_core::components::*;
use typestrike_core::constants::CHAIN_RADIUS;
use typestrike_core::enums::{EnemyVariant, EntityState, TerminalCause};
use typestrike_core::types::EntityId;

use super::approach;

/// Active entities other than `except`, in spawn order.
fn others(
    world: &World,
    index: &BTreeMap<EntityId, Entity>,
    except: EntityId,
) -> Vec<(EntityId, Entity)> {
    index
        .iter()
        .filter(|&(&id, _)| id != except)
        .filter(|&(_, &handle)| {
            world
                .get::<&CombatEntity>(handle)
                .is_ok_and(|e| e.is_active())
        })
        .map(|(&id, &handle)| (id, handle))
        .collect()
}

/// Freeze every other active non-dancing entity on behalf of `source`.
pub fn impose_freeze(world: &mut World, index: &BTreeMap<EntityId, Entity>, source: EntityId) {
    for (_, handle) in others(world, index, source) {
        let dancing = world
            .get::<&CombatEntity>(handle)
            .is_ok_and(|e| e.variant == EnemyVariant::Dancing);
        if dancing {
            continue;
        }
        if let Ok(mut freeze) = world.get::<&mut CheerFreeze>(handle) {
            freeze.sources.insert(source);
            continue;
        }
        let mut freeze = CheerFreeze::default();
        freeze.sources.insert(source);
        let _ = world.insert_one(handle, freeze);
    }
}

/// Lift `source`'s freeze. Entities with no remaining source thaw.
pub fn release_freeze(world: &mut World, source: EntityId) {
    let mut thawed = Vec::new();
    for (handle, freeze) in world.query_mut::<&mut CheerFreeze>() {
        freeze.sources.remove(&source);
        if freeze.sources.is_empty() {
            thawed.push(handle);
        }
    }
    for handle in thawed {
        let _ = world.remove_one::<CheerFreeze>(handle);
    }
}

/// Reverse the current sentence of the earliest eligible sibling.
///
/// Eligible: approaching (not targeted), nothing typed on the current
/// sentence, not already reversed, not itself a Backward.
pub fn reverse_sibling(
    world: &mut World,
    index: &BTreeMap<EntityId, Entity>,
    source: EntityId,
) -> Option<EntityId> {
    let (sibling, handle) = others(world, index, source)
        .into_iter()
        .find(|&(_, handle)| {
            let reversed = world.get::<&Reversed>(handle).is_ok();
            !reversed
                && world.get::<&CombatEntity>(handle).is_ok_and(|e| {
                    e.state == EntityState::Approaching
                        && e.typed_index == 0
                        && e.variant != EnemyVariant::Backward
                })
        })?;

    let marker = {
        let mut entity = world.get::<&mut CombatEntity>(handle).ok()?;
        let sentence_index = entity.active_sentence;
        let original = entity.sentences.get(sentence_index)?.clone();
        entity.sentences[sentence_index] = original.chars().rev().collect();
        Reversed {
            by: source,
            sentence_index,
            original,
        }
    };
    let _ = world.insert_one(handle, marker);

    if let Some(&source_handle) = index.get(&source) {
        if let Ok(mut reverser) = world.get::<&mut CombatEntity>(source_handle) {
            reverser.hook = HookState::Backward {
                reversing: Some(sibling),
            };
        }
    }
    Some(sibling)
}

/// Undo `source`'s reversal of `sibling`.
///
/// Text is restored only while the sibling has typed nothing on that
/// sentence; otherwise its typed prefix refers to the reversed text and stays.
pub fn restore_sibling(
    world: &mut World,
    index: &BTreeMap<EntityId, Entity>,
    source: EntityId,
    sibling: EntityId,
) {
    let Some(&handle) = index.get(&sibling) else {
        return;
    };
    let owned = world
        .get::<&Reversed>(handle)
        .is_ok_and(|r| r.by == source);
    if !owned {
        return;
    }
    let Ok(marker) = world.remove_one::<Reversed>(handle) else {
        return;
    };
    if let Ok(mut entity) = world.get::<&mut CombatEntity>(handle) {
        let untouched = entity.active_sentence == marker.sentence_index && entity.typed_index == 0;
        if entity.is_active() && untouched {
            entity.sentences[marker.sentence_index] = marker.original;
        }
    }
}

/// A reversed sibling left the fight: free its reverser to pick another.
pub fn unlink_reversal(world: &mut World, index: &BTreeMap<EntityId, Entity>, sibling: Entity) {
    let Ok(by) = world.get::<&Reversed>(sibling).map(|r| r.by) else {
        return;
    };
    let Some(&reverser) = index.get(&by) else {
        return;
    };
    if let Ok(mut entity) = world.get::<&mut CombatEntity>(reverser) {
        if matches!(entity.hook, HookState::Backward { reversing: Some(_) }) {
            entity.hook = HookState::Backward { reversing: None };
        }
    }
}

/// Speed up the surviving members of `source`'s pack.
pub fn enrage_pack(
    world: &mut World,
    index: &BTreeMap<EntityId, Entity>,
    source: EntityId,
    factor: f64,
) -> usize {
    let Some(pack) = index
        .get(&source)
        .and_then(|&h| world.get::<&PackMember>(h).ok().map(|m| m.pack))
    else {
        return 0;
    };
    let mut enraged = 0;
    for (_, handle) in others(world, index, source) {
        let Ok(mut query) = world.query_one::<(&PackMember, &mut Approach)>(handle) else {
            continue;
        };
        if let Some((member, approach)) = query.get() {
            if member.pack == pack {
                approach.speed_multiplier *= factor;
                enraged += 1;
            }
        }
    }
    enraged
}

/// Terminate every active projectile fired by `parent`.
pub fn clear_projectiles(
    world: &mut World,
    index: &BTreeMap<EntityId, Entity>,
    parent: EntityId,
    tick: u64,
) -> Vec<EntityId> {
    let mut cleared = Vec::new();
    for (id, handle) in others(world, index, parent) {
        let Ok(mut query) = world.query_one::<(&ProjectileOf, &mut CombatEntity)>(handle) else {
            continue;
        };
        if let Some((projectile, entity)) = query.get() {
            if projectile.parent == parent
                && fsm::terminate(entity, EntityState::Fainted, TerminalCause::Cleared, tick)
            {
                cleared.push(id);
            }
        }
    }
    cleared
}

/// Take out every active entity within the blast radius of `source`.
pub fn explode(
    world: &mut World,
    index: &BTreeMap<EntityId, Entity>,
    source: EntityId,
    tick: u64,
) -> Vec<EntityId> {
    let Some(center) = index.get(&source).and_then(|&h| {
        let mut query = world.query_one::<(&CombatEntity, &Approach)>(h).ok()?;
        let center = query
            .get()
            .map(|(entity, approach)| approach::position(entity, approach, tick));
        center
    }) else {
        return Vec::new();
    };

    let mut victims = Vec::new();
    for (id, handle) in others(world, index, source) {
        let Ok(mut query) = world.query_one::<(&mut CombatEntity, &Approach)>(handle) else {
            continue;
        };
        if let Some((entity, approach)) = query.get() {
            let distance = approach::position(entity, approach, tick).distance(center);
            if distance <= CHAIN_RADIUS
                && fsm::terminate(entity, EntityState::Defeated, TerminalCause::Chain, tick)
            {
                victims.push(id);
            }
        }
    }
    victims
}
