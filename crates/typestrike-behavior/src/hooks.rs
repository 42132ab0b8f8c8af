//! Variant hooks.
//!
//! Hooks only touch the entity they run on. Anything that concerns other
//! entities comes back as an `Effect` intent for the wave scheduler, the sole
//! owner of the active set, to apply.

use typestrike_core::components::{CombatEntity, HookState};
use typestrike_core::enums::TerminalCause;
use typestrike_core::types::EntityId;

use crate::fsm::KillClass;
use crate::profiles::{BehaviorProfile, DefeatHook, TickHook};

/// Cross-entity intent returned by a hook.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Freeze the approach of every other non-dancing entity.
    ImposeFreeze { source: EntityId },
    /// Lift the freeze imposed by `source`.
    ReleaseFreeze { source: EntityId },
    /// Reverse the sentence of one eligible sibling.
    ReverseSibling { source: EntityId },
    /// Undo the reversal `source` applied to `sibling`.
    RestoreSibling { source: EntityId, sibling: EntityId },
    /// The entity outgrew itself and bursts.
    Burst { source: EntityId },
    /// Damage the player and take out everything within the blast radius.
    ChainExplosion { source: EntityId },
    /// Spawn a projectile owned by `parent`.
    FireProjectile { parent: EntityId },
    /// Clear all projectiles owned by `parent`.
    ClearProjectiles { parent: EntityId },
    /// Multiply the approach speed of `source`'s surviving pack.
    EnragePack { source: EntityId, factor: f64 },
}

/// Initial hook bookkeeping for a freshly spawned entity.
pub fn initial_state(profile: &BehaviorProfile) -> HookState {
    match profile.on_tick {
        Some(TickHook::CheerFreeze) => HookState::Dancing {
            freeze_imposed: false,
        },
        Some(TickHook::ReverseSibling) => HookState::Backward { reversing: None },
        Some(TickHook::FireProjectiles { interval_ticks }) => HookState::Boss {
            projectile_cooldown: interval_ticks,
        },
        Some(TickHook::Grow { .. }) | None => HookState::None,
    }
}

/// Run the per-tick hook of an active entity.
pub fn on_tick(entity: &mut CombatEntity, profile: &BehaviorProfile) -> Option<Effect> {
    if !entity.is_active() {
        return None;
    }
    let source = entity.id;

    match (profile.on_tick?, &mut entity.hook) {
        (TickHook::Grow { per_tick, burst_at }, _) => {
            entity.size_factor += per_tick;
            (entity.size_factor >= burst_at).then_some(Effect::Burst { source })
        }
        (TickHook::CheerFreeze, HookState::Dancing { freeze_imposed }) => {
            if *freeze_imposed {
                return None;
            }
            *freeze_imposed = true;
            Some(Effect::ImposeFreeze { source })
        }
        (TickHook::ReverseSibling, HookState::Backward { reversing }) => {
            reversing.is_none().then_some(Effect::ReverseSibling { source })
        }
        (
            TickHook::FireProjectiles { interval_ticks },
            HookState::Boss {
                projectile_cooldown,
            },
        ) => {
            *projectile_cooldown = projectile_cooldown.saturating_sub(1);
            if *projectile_cooldown > 0 {
                return None;
            }
            *projectile_cooldown = interval_ticks;
            Some(Effect::FireProjectile { parent: source })
        }
        _ => None,
    }
}

/// Run the defeat hook of an entity that just reached a terminal state.
///
/// `class` is the kill classification when the entity was typed to completion.
pub fn on_defeat(
    entity: &CombatEntity,
    profile: &BehaviorProfile,
    class: Option<KillClass>,
) -> Option<Effect> {
    let source = entity.id;
    let cause = entity.terminal_cause?;

    match profile.on_defeat? {
        DefeatHook::ChainExplosion => {
            let explodes = match cause {
                TerminalCause::Typed => !class.unwrap_or_default().earned_bonus(),
                TerminalCause::Burst | TerminalCause::Chain => true,
                TerminalCause::Faint | TerminalCause::Cleared | TerminalCause::Reached => false,
            };
            explodes.then_some(Effect::ChainExplosion { source })
        }
        DefeatHook::ReleaseFreeze => Some(Effect::ReleaseFreeze { source }),
        DefeatHook::RestoreSibling => match entity.hook {
            HookState::Backward {
                reversing: Some(sibling),
            } => Some(Effect::RestoreSibling { source, sibling }),
            _ => None,
        },
        DefeatHook::EnragePack { factor } => {
            (cause == TerminalCause::Typed).then_some(Effect::EnragePack { source, factor })
        }
        DefeatHook::ClearProjectiles => Some(Effect::ClearProjectiles { parent: source }),
    }
}
