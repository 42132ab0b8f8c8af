//! Wave scheduler: sole owner of the active-entity set.
//!
//! Decides when and what to spawn, enforces the concurrency cap through a FIFO
//! pending queue, advances wave progression, and applies the cross-entity
//! effects that variant hooks ask for. Nothing else mutates the world.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use hecs::{Entity, World};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};

use typestrike_behavior::fsm::{self, KeystrokeOutcome};
use typestrike_behavior::hooks::{self, Effect};
use typestrike_behavior::profiles::get_profile;
use typestrike_core::components::{Approach, CombatEntity, ProjectileOf};
use typestrike_core::constants::HORDE_PACK_SIZE;
use typestrike_core::enums::{EnemyVariant, EntityState, TerminalCause};
use typestrike_core::events::CombatEvent;
use typestrike_core::state::WaveView;
use typestrike_core::types::{EntityId, Position};

use crate::ledger::KillReport;
use crate::router::TargetCandidate;
use crate::session::GameSession;
use crate::spawn::{self, SentencePools, SpawnRequest};
use crate::stage::{StageDefinition, WaveDefinition};
use crate::systems;

/// Why a spawn order exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOrigin {
    Wave,
    Pack(u32),
    /// Fired by a living boss.
    Projectile(EntityId),
}

/// A spawn waiting for a free slot.
#[derive(Debug, Clone)]
pub struct SpawnOrder {
    pub variant: EnemyVariant,
    pub wave: u32,
    pub origin: SpawnOrigin,
    /// Fixed spawn point. `None` picks one on the arc at spawn time.
    pub spawn_point: Option<Position>,
}

/// The wave currently spawning or being fought.
#[derive(Debug, Clone)]
struct Wave {
    number: u32,
    /// Composition units not yet spawned, in spawn order.
    queue: VecDeque<EnemyVariant>,
    spawn_interval: u64,
    next_spawn_tick: u64,
    is_boss_wave: bool,
}

/// Outcome of one entity's terminal transition, after its defeat hook ran.
#[derive(Debug, Clone)]
pub struct TerminalReport {
    pub id: EntityId,
    pub variant: EnemyVariant,
    pub state: EntityState,
    pub cause: TerminalCause,
    pub tick: u64,
    /// Present when the entity was typed to completion.
    pub kill: Option<KillReport>,
    /// Damage owed to the player for reaching it.
    pub contact_damage: u32,
    /// Entities taken out by this entity's explosion, if it exploded.
    pub explosion: Option<Vec<EntityId>>,
    pub projectile: bool,
}

pub struct WaveScheduler {
    world: World,
    /// Active entities by id. Ids are handed out in spawn order, so iterating
    /// this map visits entities by (spawn tick, id).
    index: BTreeMap<EntityId, Entity>,
    waves: Vec<WaveDefinition>,
    current: Option<Wave>,
    next_wave_index: usize,
    /// Tick at which the next wave may start.
    break_until: Option<u64>,
    wave_break_ticks: u64,
    waves_cleared: u32,
    pending: VecDeque<SpawnOrder>,
    cap: usize,
    speed_scale: f64,
    pools: SentencePools,
    rng: ChaCha8Rng,
    next_id: u32,
    next_pack: u32,
    /// Living dancers that imposed their freeze.
    cheer_sources: BTreeSet<EntityId>,
    despawn_buffer: Vec<Entity>,
}

impl WaveScheduler {
    pub fn new(stage: &StageDefinition, session: &GameSession) -> Self {
        let difficulty = session.difficulty;
        Self {
            world: World::new(),
            index: BTreeMap::new(),
            waves: stage.waves.clone(),
            current: None,
            next_wave_index: 0,
            break_until: Some(0),
            wave_break_ticks: stage.wave_break_ticks,
            waves_cleared: 0,
            pending: VecDeque::new(),
            cap: difficulty.scale_cap(stage.concurrency_cap),
            speed_scale: difficulty.speed_scale() * stage.difficulty_multiplier,
            pools: SentencePools::from_stage(stage),
            rng: ChaCha8Rng::seed_from_u64(session.seed),
            next_id: 0,
            next_pack: 0,
            cheer_sources: BTreeSet::new(),
            despawn_buffer: Vec::new(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn index(&self) -> &BTreeMap<EntityId, Entity> {
        &self.index
    }

    pub fn active_count(&self) -> usize {
        self.index.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn speed_scale(&self) -> f64 {
        self.speed_scale
    }

    pub fn waves_cleared(&self) -> u32 {
        self.waves_cleared
    }

    /// 1-based number of the latest wave started, 0 before the first.
    pub fn current_wave_number(&self) -> u32 {
        self.next_wave_index as u32
    }

    /// Every wave spawned and fought, nothing left alive or queued.
    pub fn is_complete(&self) -> bool {
        self.current.is_none()
            && self.next_wave_index >= self.waves.len()
            && self.index.is_empty()
            && self.pending.is_empty()
    }

    /// Copy of an entity's typing state.
    pub fn entity(&self, id: EntityId) -> Option<CombatEntity> {
        let handle = *self.index.get(&id)?;
        self.world
            .get::<&CombatEntity>(handle)
            .ok()
            .map(|e| (*e).clone())
    }

    pub fn approach(&self, id: EntityId) -> Option<Approach> {
        let handle = *self.index.get(&id)?;
        self.world.get::<&Approach>(handle).ok().map(|a| *a)
    }

    // --- Waves and spawning ---

    /// Start the next wave when its break is over, spawn due composition
    /// units, and admit pending spawns into free slots.
    pub fn advance_waves(&mut self, tick: u64, events: &mut Vec<CombatEvent>) {
        self.dispatch_pending(tick, events);

        if self.current.is_none() && self.break_until.is_some_and(|t| tick >= t) {
            self.start_next_wave(tick, events);
        }

        let Some(wave) = self.current.as_mut() else {
            return;
        };
        if wave.queue.is_empty() || tick < wave.next_spawn_tick {
            return;
        }
        let units = if wave.spawn_interval == 0 {
            wave.queue.len()
        } else {
            1
        };
        wave.next_spawn_tick = tick + wave.spawn_interval;
        let number = wave.number;
        let due: Vec<EnemyVariant> = wave.queue.drain(..units).collect();

        for variant in due {
            self.expand_unit(variant, number, tick, events);
        }
    }

    fn start_next_wave(&mut self, tick: u64, events: &mut Vec<CombatEvent>) {
        self.break_until = None;
        let Some(definition) = self.waves.get(self.next_wave_index) else {
            return;
        };
        self.next_wave_index += 1;
        let number = self.next_wave_index as u32;

        let mut units: Vec<EnemyVariant> = definition
            .composition
            .iter()
            .flat_map(|entry| std::iter::repeat(entry.variant).take(entry.count as usize))
            .collect();
        units.shuffle(&mut self.rng);

        let is_boss_wave = definition.is_boss_wave();
        info!(wave = number, units = units.len(), is_boss_wave, "wave started");
        events.push(CombatEvent::WaveStarted {
            wave: number,
            is_boss_wave,
        });
        self.current = Some(Wave {
            number,
            queue: units.into(),
            spawn_interval: definition.spawn_interval_ticks,
            next_spawn_tick: tick,
            is_boss_wave,
        });
    }

    /// Turn one composition unit into spawn orders. A Horde unit is a pack.
    fn expand_unit(
        &mut self,
        variant: EnemyVariant,
        wave: u32,
        tick: u64,
        events: &mut Vec<CombatEvent>,
    ) {
        if variant != EnemyVariant::Horde {
            let order = SpawnOrder {
                variant,
                wave,
                origin: SpawnOrigin::Wave,
                spawn_point: None,
            };
            self.admit(order, tick, events);
            return;
        }

        let pack = self.next_pack;
        self.next_pack += 1;
        for point in spawn::pack_points(&mut self.rng, HORDE_PACK_SIZE) {
            let order = SpawnOrder {
                variant,
                wave,
                origin: SpawnOrigin::Pack(pack),
                spawn_point: Some(point),
            };
            self.admit(order, tick, events);
        }
    }

    /// Spawn now if a slot is free and nobody is waiting, otherwise queue.
    fn admit(&mut self, order: SpawnOrder, tick: u64, events: &mut Vec<CombatEvent>) {
        if self.pending.is_empty() && self.index.len() < self.cap {
            self.spawn_order(order, tick, events);
            return;
        }
        let variant = order.variant;
        self.pending.push_back(order);
        trace!(%variant, queued = self.pending.len(), "spawn deferred at cap");
        events.push(CombatEvent::SpawnDeferred {
            variant,
            queued: self.pending.len(),
        });
    }

    /// Admit queued spawns in FIFO order while slots are free.
    fn dispatch_pending(&mut self, tick: u64, events: &mut Vec<CombatEvent>) {
        while self.index.len() < self.cap {
            let Some(order) = self.pending.pop_front() else {
                break;
            };
            self.spawn_order(order, tick, events);
        }
    }

    fn spawn_order(&mut self, order: SpawnOrder, tick: u64, events: &mut Vec<CombatEvent>) {
        debug_assert!(
            self.index.len() < self.cap,
            "spawn past concurrency cap {}",
            self.cap
        );
        let profile = get_profile(order.variant);
        let taken = self.taken_initials();
        let mut sentences = spawn::pick_sentences(
            &mut self.rng,
            self.pools.pool(order.variant),
            profile.sentence_count,
            &taken,
        );
        if sentences.is_empty() {
            sentences.push(order.variant.name().to_ascii_lowercase());
        }
        let spawn_point = match order.spawn_point {
            Some(point) => point,
            None => spawn::spawn_point(&mut self.rng),
        };
        let (pack, projectile_of) = match order.origin {
            SpawnOrigin::Wave => (None, None),
            SpawnOrigin::Pack(pack) => (Some(pack), None),
            SpawnOrigin::Projectile(parent) => (None, Some(parent)),
        };
        let request = SpawnRequest {
            id: EntityId(0),
            variant: order.variant,
            wave: order.wave,
            tick,
            sentences,
            spawn_point,
            pack,
            projectile_of,
            cheer_sources: BTreeSet::new(),
        };
        self.insert(request, events);
    }

    /// Assign an id, attach living dancers' freeze and spawn.
    fn insert(&mut self, mut request: SpawnRequest, events: &mut Vec<CombatEvent>) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        request.id = id;
        request.cheer_sources = self.cheer_sources.clone();
        let variant = request.variant;
        let wave = request.wave;

        let handle = spawn::spawn_entity(&mut self.world, request);
        self.index.insert(id, handle);
        debug!(%id, %variant, wave, "enemy spawned");
        events.push(CombatEvent::EnemySpawned { id, variant });
        id
    }

    /// First letters active, untargeted entities are waiting on.
    fn taken_initials(&self) -> BTreeSet<char> {
        self.index
            .values()
            .filter_map(|&h| self.world.get::<&CombatEntity>(h).ok())
            .filter(|e| e.state == EntityState::Approaching)
            .filter_map(|e| e.expected_char())
            .collect()
    }

    /// Close the current wave once everything it produced is gone.
    pub fn check_wave_cleared(&mut self, tick: u64, events: &mut Vec<CombatEvent>) {
        let Some(wave) = &self.current else {
            return;
        };
        if !wave.queue.is_empty() || !self.pending.is_empty() || !self.index.is_empty() {
            return;
        }
        let number = wave.number;
        self.current = None;
        self.waves_cleared += 1;
        info!(wave = number, "wave cleared");
        events.push(CombatEvent::WaveCleared { wave: number });

        if self.next_wave_index < self.waves.len() {
            self.break_until = Some(tick + self.wave_break_ticks);
        }
    }

    pub fn wave_view(&self, tick: u64) -> WaveView {
        WaveView {
            number: self.current_wave_number(),
            total: self.waves.len() as u32,
            remaining_to_spawn: self.current.as_ref().map_or(0, |w| w.queue.len() as u32),
            pending: self.pending.len() as u32,
            is_boss_wave: self.current.as_ref().is_some_and(|w| w.is_boss_wave),
            break_remaining: self
                .break_until
                .map_or(0, |until| until.saturating_sub(tick)),
        }
    }

    // --- Per-tick entity updates ---

    /// Run every active entity's tick hook in spawn order, applying the
    /// resulting effects immediately.
    pub fn run_tick_hooks(&mut self, tick: u64, events: &mut Vec<CombatEvent>) {
        let order: Vec<Entity> = self.index.values().copied().collect();
        for handle in order {
            let effect = {
                let Ok(mut entity) = self.world.get::<&mut CombatEntity>(handle) else {
                    continue;
                };
                let profile = get_profile(entity.variant);
                hooks::on_tick(&mut entity, &profile)
            };
            if let Some(effect) = effect {
                self.apply_effect(effect, tick, events);
            }
        }
    }

    pub fn advance_approach(&mut self, tick: u64) {
        systems::approach::run(&self.world, &self.index, self.speed_scale, tick);
    }

    /// Apply a hook's intent. Returns the victims when it was an explosion.
    fn apply_effect(
        &mut self,
        effect: Effect,
        tick: u64,
        events: &mut Vec<CombatEvent>,
    ) -> Option<Vec<EntityId>> {
        match effect {
            Effect::ImposeFreeze { source } => {
                self.cheer_sources.insert(source);
                systems::effects::impose_freeze(&mut self.world, &self.index, source);
                debug!(%source, "cheer freeze imposed");
            }
            Effect::ReleaseFreeze { source } => {
                if self.cheer_sources.remove(&source) {
                    debug!(%source, "cheer freeze released");
                }
                systems::effects::release_freeze(&mut self.world, source);
            }
            Effect::ReverseSibling { source } => {
                if let Some(sibling) =
                    systems::effects::reverse_sibling(&mut self.world, &self.index, source)
                {
                    debug!(%source, %sibling, "sentence reversed");
                }
            }
            Effect::RestoreSibling { source, sibling } => {
                systems::effects::restore_sibling(&mut self.world, &self.index, source, sibling);
            }
            Effect::Burst { source } => {
                if let Some(&handle) = self.index.get(&source) {
                    if let Ok(mut entity) = self.world.get::<&mut CombatEntity>(handle) {
                        if fsm::terminate(
                            &mut entity,
                            EntityState::Defeated,
                            TerminalCause::Burst,
                            tick,
                        ) {
                            debug!(%source, "explosive burst");
                        }
                    }
                }
            }
            Effect::ChainExplosion { source } => {
                let victims = systems::effects::explode(&mut self.world, &self.index, source, tick);
                debug!(%source, victims = victims.len(), "explosion");
                return Some(victims);
            }
            Effect::FireProjectile { parent } => {
                let Some(&handle) = self.index.get(&parent) else {
                    return None;
                };
                let origin = {
                    let Ok(mut query) = self.world.query_one::<(&CombatEntity, &Approach)>(handle)
                    else {
                        return None;
                    };
                    let origin = query.get().map(|(entity, approach)| {
                        (entity.wave, systems::approach::position(entity, approach, tick))
                    });
                    origin
                };
                if let Some((wave, point)) = origin {
                    let order = SpawnOrder {
                        variant: EnemyVariant::Fast,
                        wave,
                        origin: SpawnOrigin::Projectile(parent),
                        spawn_point: Some(point),
                    };
                    self.admit(order, tick, events);
                }
            }
            Effect::ClearProjectiles { parent } => {
                self.pending
                    .retain(|order| order.origin != SpawnOrigin::Projectile(parent));
                let cleared =
                    systems::effects::clear_projectiles(&mut self.world, &self.index, parent, tick);
                if !cleared.is_empty() {
                    debug!(%parent, cleared = cleared.len(), "projectiles cleared");
                }
            }
            Effect::EnragePack { source, factor } => {
                let enraged =
                    systems::effects::enrage_pack(&mut self.world, &self.index, source, factor);
                if enraged > 0 {
                    debug!(%source, enraged, factor, "pack enraged");
                }
            }
        }
        None
    }

    // --- Targeting ---

    /// Targeting view of every active entity, in spawn order.
    pub fn candidates(&self) -> Vec<TargetCandidate> {
        self.index
            .values()
            .filter_map(|&h| self.world.get::<&CombatEntity>(h).ok())
            .filter(|e| e.is_active())
            .map(|e| TargetCandidate {
                id: e.id,
                spawn_tick: e.spawn_tick,
                expected: e.expected_char(),
                targetable: e.state == EntityState::Approaching,
            })
            .collect()
    }

    pub fn acquire(&mut self, id: EntityId, tick: u64) -> bool {
        self.with_entity(id, |entity| fsm::acquire(entity, tick))
            .unwrap_or(false)
    }

    pub fn release(&mut self, id: EntityId) -> bool {
        self.with_entity(id, fsm::release).unwrap_or(false)
    }

    /// Deliver one keystroke. Terminal or unknown entities ignore it.
    pub fn dispatch_keystroke(&mut self, id: EntityId, key: char, tick: u64) -> KeystrokeOutcome {
        self.with_entity(id, |entity| {
            if !entity.is_active() {
                return KeystrokeOutcome::Ignored;
            }
            let profile = get_profile(entity.variant);
            fsm::on_keystroke(entity, &profile, key, tick)
        })
        .unwrap_or(KeystrokeOutcome::Ignored)
    }

    fn with_entity<R>(&mut self, id: EntityId, f: impl FnOnce(&mut CombatEntity) -> R) -> Option<R> {
        let handle = *self.index.get(&id)?;
        let mut entity = self.world.get::<&mut CombatEntity>(handle).ok()?;
        Some(f(&mut *entity))
    }

    // --- Terminal resolution ---

    /// Run defeat hooks for every entity that went terminal this tick,
    /// including those taken out by other entities' hooks, in spawn order.
    pub fn resolve_terminals(
        &mut self,
        tick: u64,
        events: &mut Vec<CombatEvent>,
    ) -> Vec<TerminalReport> {
        let mut reports = Vec::new();
        let mut resolved = BTreeSet::new();
        loop {
            let batch: Vec<(EntityId, Entity)> = self
                .index
                .iter()
                .filter(|(id, _)| !resolved.contains(*id))
                .filter(|&(_, &h)| {
                    self.world
                        .get::<&CombatEntity>(h)
                        .is_ok_and(|e| e.state.is_terminal())
                })
                .map(|(&id, &h)| (id, h))
                .collect();
            if batch.is_empty() {
                break;
            }
            for (id, handle) in batch {
                resolved.insert(id);
                if let Some(report) = self.resolve_one(handle, tick, events) {
                    reports.push(report);
                }
            }
        }
        reports
    }

    fn resolve_one(
        &mut self,
        handle: Entity,
        tick: u64,
        events: &mut Vec<CombatEvent>,
    ) -> Option<TerminalReport> {
        let entity = self
            .world
            .get::<&CombatEntity>(handle)
            .ok()
            .map(|e| (*e).clone())?;
        let cause = entity.terminal_cause?;
        let at = entity.terminal_tick.unwrap_or(tick);
        let profile = get_profile(entity.variant);

        let class = (entity.state == EntityState::Defeated && cause == TerminalCause::Typed)
            .then(|| fsm::classify_kill(&entity, &profile, at));
        let kill = class.map(|class| KillReport {
            entity_id: entity.id,
            variant: entity.variant,
            class,
            fast_sentences: entity.fast_sentences,
            clean_sentences: entity.clean_sentences,
            tick: at,
        });
        let contact_damage = match entity.state {
            EntityState::ReachedPlayer => profile.contact_damage,
            _ => 0,
        };
        let projectile = self.world.get::<&ProjectileOf>(handle).is_ok();
        debug!(
            id = %entity.id,
            variant = %entity.variant,
            state = ?entity.state,
            ?cause,
            "entity resolved"
        );

        systems::effects::unlink_reversal(&mut self.world, &self.index, handle);
        let explosion = hooks::on_defeat(&entity, &profile, class)
            .and_then(|effect| self.apply_effect(effect, tick, events));

        Some(TerminalReport {
            id: entity.id,
            variant: entity.variant,
            state: entity.state,
            cause,
            tick: at,
            kill,
            contact_damage,
            explosion,
            projectile,
        })
    }

    /// Despawn resolved terminal entities.
    pub fn cleanup(&mut self) {
        systems::cleanup::run(&mut self.world, &mut self.index, &mut self.despawn_buffer);
    }

    /// Stage abort: drop every entity and queued spawn without running hooks.
    pub fn abort(&mut self) {
        self.world.clear();
        self.index.clear();
        self.pending.clear();
        self.cheer_sources.clear();
        self.current = None;
        self.break_until = None;
    }

    /// Spawn an entity with fixed sentences outside any wave.
    #[cfg(test)]
    pub fn spawn_scripted(
        &mut self,
        variant: EnemyVariant,
        sentences: &[&str],
        tick: u64,
        events: &mut Vec<CombatEvent>,
    ) -> EntityId {
        let request = SpawnRequest {
            id: EntityId(0),
            variant,
            wave: self.current_wave_number().max(1),
            tick,
            sentences: sentences.iter().map(|s| s.to_string()).collect(),
            spawn_point: spawn::spawn_point(&mut self.rng),
            pack: None,
            projectile_of: None,
            cheer_sources: BTreeSet::new(),
        };
        self.insert(request, events)
    }

    /// Spawn a Horde pack with fixed sentences, one per member.
    #[cfg(test)]
    pub fn spawn_scripted_pack(
        &mut self,
        sentences: &[&str],
        tick: u64,
        events: &mut Vec<CombatEvent>,
    ) -> Vec<EntityId> {
        let pack = self.next_pack;
        self.next_pack += 1;
        let points = spawn::pack_points(&mut self.rng, sentences.len());
        sentences
            .iter()
            .zip(points)
            .map(|(sentence, spawn_point)| {
                self.insert(
                    SpawnRequest {
                        id: EntityId(0),
                        variant: EnemyVariant::Horde,
                        wave: 1,
                        tick,
                        sentences: vec![sentence.to_string()],
                        spawn_point,
                        pack: Some(pack),
                        projectile_of: None,
                        cheer_sources: BTreeSet::new(),
                    },
                    events,
                )
            })
            .collect()
    }

    /// Place an entity at a given approach progress.
    #[cfg(test)]
    pub fn set_progress(&mut self, id: EntityId, progress: f64) {
        if let Some(&handle) = self.index.get(&id) {
            if let Ok(mut approach) = self.world.get::<&mut Approach>(handle) {
                approach.progress = progress;
            }
        }
    }

    /// Move an entity's spawn point, keeping its progress.
    #[cfg(test)]
    pub fn set_spawn_point(&mut self, id: EntityId, point: Position) {
        if let Some(&handle) = self.index.get(&id) {
            if let Ok(mut approach) = self.world.get::<&mut Approach>(handle) {
                approach.spawn_point = point;
            }
        }
    }

    #[cfg(test)]
    pub fn set_cap(&mut self, cap: usize) {
        self.cap = cap;
    }
}
