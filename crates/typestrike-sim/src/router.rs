//! Keystroke-to-target routing.
//!
//! The router holds only the id of the current target. It never touches
//! entity data: the scheduler supplies candidates and applies the decision.

use typestrike_core::types::EntityId;

/// What the router needs to know about one active entity.
#[derive(Debug, Clone, Copy)]
pub struct TargetCandidate {
    pub id: EntityId,
    pub spawn_tick: u64,
    /// First untyped character of the current sentence.
    pub expected: Option<char>,
    /// Approaching, i.e. eligible for acquisition.
    pub targetable: bool,
}

/// Where a keystroke goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Send the keystroke to the current target, match or not.
    Dispatch(EntityId),
    /// Acquire this entity; the keystroke is its first correct character.
    Acquire(EntityId),
    /// No current target and nothing matches.
    Drop,
}

#[derive(Debug, Clone, Default)]
pub struct TargetRouter {
    current: Option<EntityId>,
}

impl TargetRouter {
    pub fn current(&self) -> Option<EntityId> {
        self.current
    }

    /// Route one keystroke.
    ///
    /// A stale current target (not among the candidates) is forgotten and the
    /// keystroke goes through acquisition instead.
    pub fn route(&mut self, key: char, candidates: &[TargetCandidate]) -> RouteDecision {
        if let Some(id) = self.current {
            if candidates.iter().any(|c| c.id == id) {
                return RouteDecision::Dispatch(id);
            }
            self.current = None;
        }

        let chosen = candidates
            .iter()
            .filter(|c| c.targetable && c.expected == Some(key))
            .min_by_key(|c| (c.spawn_tick, c.id));

        match chosen {
            Some(candidate) => {
                self.current = Some(candidate.id);
                RouteDecision::Acquire(candidate.id)
            }
            None => RouteDecision::Drop,
        }
    }

    /// Explicit target switch. Returns the released target, if any.
    pub fn switch_target(&mut self) -> Option<EntityId> {
        self.current.take()
    }

    /// Drop the reference if `id` was the current target.
    pub fn forget(&mut self, id: EntityId) {
        if self.current == Some(id) {
            self.current = None;
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
