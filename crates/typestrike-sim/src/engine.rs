//! Stage engine, the core of the game.
//!
//! `StageEngine` runs one stage for one `GameSession`: it samples at most one
//! input per tick, drives the wave scheduler, routes keystrokes, feeds the
//! score ledger and player state, and produces `StageSnapshot`s. Completely
//! headless, enabling deterministic testing.

use tracing::{debug, info, trace};

use typestrike_behavior::fsm::KeystrokeOutcome;
use typestrike_behavior::profiles::get_profile;
use typestrike_core::commands::PlayerInput;
use typestrike_core::constants::EXPLOSION_DAMAGE;
use typestrike_core::enums::{EntityState, StagePhase};
use typestrike_core::events::{CombatEvent, StageSummary};
use typestrike_core::state::StageSnapshot;
use typestrike_core::types::{EntityId, SimTime};

use crate::ledger::ScoreLedger;
use crate::player::{PlayerCombatState, PlayerEvent};
use crate::router::{RouteDecision, TargetRouter};
use crate::scheduler::{TerminalReport, WaveScheduler};
use crate::session::GameSession;
use crate::stage::{ConfigError, StageDefinition};
use crate::systems;
use crate::systems::snapshot::SnapshotFrame;

/// The stage engine. Owns every piece of per-stage state.
pub struct StageEngine<'s> {
    session: &'s GameSession,
    stage_name: String,
    time: SimTime,
    phase: StagePhase,
    scheduler: WaveScheduler,
    router: TargetRouter,
    ledger: ScoreLedger,
    player: PlayerCombatState,
    /// Events raised since the last snapshot.
    events: Vec<CombatEvent>,
    summary: Option<StageSummary>,
}

impl<'s> StageEngine<'s> {
    /// Validate `stage` and prepare a run. Nothing is spawned before the first tick.
    pub fn new(stage: &StageDefinition, session: &'s GameSession) -> Result<Self, ConfigError> {
        stage.validate()?;
        info!(
            stage = %stage.name,
            difficulty = ?session.difficulty,
            seed = session.seed,
            waves = stage.waves.len(),
            "stage started"
        );
        Ok(Self {
            session,
            stage_name: stage.name.clone(),
            time: SimTime::default(),
            phase: StagePhase::Running,
            scheduler: WaveScheduler::new(stage, session),
            router: TargetRouter::default(),
            ledger: ScoreLedger::default(),
            player: PlayerCombatState::new(session.difficulty),
            events: vec![CombatEvent::StageStarted {
                stage: stage.name.clone(),
            }],
            summary: None,
        })
    }

    /// Advance by one tick with at most one input and return the snapshot.
    ///
    /// Control inputs take effect before the tick runs. While paused or after
    /// the stage finished, time does not advance and keystrokes are dropped.
    pub fn tick(&mut self, input: Option<PlayerInput>) -> StageSnapshot {
        let mut combat_input = None;
        match input {
            Some(PlayerInput::Pause) => {
                if self.phase == StagePhase::Running {
                    self.phase = StagePhase::Paused;
                    info!(tick = self.time.tick, "stage paused");
                }
            }
            Some(PlayerInput::Resume) => {
                if self.phase == StagePhase::Paused {
                    self.phase = StagePhase::Running;
                    info!(tick = self.time.tick, "stage resumed");
                }
            }
            Some(PlayerInput::Quit) => {
                if !self.phase.is_finished() {
                    self.abort();
                    self.events.push(CombatEvent::StageAborted);
                    self.finish(StagePhase::Aborted);
                }
            }
            other => combat_input = other,
        }

        if self.phase == StagePhase::Running {
            let outcome = self.run_tick(combat_input);
            self.time.advance();
            if let Some(outcome) = outcome {
                self.finish(outcome);
            }
        }

        self.snapshot()
    }

    pub fn phase(&self) -> StagePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn session(&self) -> &GameSession {
        self.session
    }

    pub fn stage_name(&self) -> &str {
        &self.stage_name
    }

    pub fn current_target(&self) -> Option<EntityId> {
        self.router.current()
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn player(&self) -> &PlayerCombatState {
        &self.player
    }

    pub fn scheduler(&self) -> &WaveScheduler {
        &self.scheduler
    }

    /// Final figures, once the stage has finished.
    pub fn summary(&self) -> Option<&StageSummary> {
        self.summary.as_ref()
    }

    /// One running tick. Returns the outcome if the stage ended.
    fn run_tick(&mut self, input: Option<PlayerInput>) -> Option<StagePhase> {
        let tick = self.time.tick;

        // 1. Waves, spawns and the pending queue
        self.scheduler.advance_waves(tick, &mut self.events);
        // 2. Variant tick hooks
        self.scheduler.run_tick_hooks(tick, &mut self.events);
        // 3. Approach
        self.scheduler.advance_approach(tick);
        // 4. Input
        match input {
            Some(PlayerInput::Key { ch }) => self.route_key(ch, tick),
            Some(PlayerInput::SwitchTarget) => self.switch_target(),
            _ => {}
        }
        // 5. Defeat hooks, scoring, damage
        let reports = self.scheduler.resolve_terminals(tick, &mut self.events);
        self.apply_reports(reports);

        if self.player.is_defeated() {
            self.abort();
            return Some(StagePhase::Defeated);
        }

        // 6. Cleanup and wave progression
        self.scheduler.cleanup();
        self.scheduler.check_wave_cleared(tick, &mut self.events);
        if self.scheduler.is_complete() {
            info!(tick, "stage cleared");
            self.events.push(CombatEvent::StageCleared);
            return Some(StagePhase::Cleared);
        }
        None
    }

    fn route_key(&mut self, ch: char, tick: u64) {
        let candidates = self.scheduler.candidates();
        match self.router.route(ch, &candidates) {
            RouteDecision::Drop => {
                trace!(key = %ch, tick, "keystroke matched nothing");
            }
            RouteDecision::Acquire(id) => {
                if !self.scheduler.acquire(id, tick) {
                    self.router.forget(id);
                    return;
                }
                debug!(%id, tick, "target acquired");
                self.events.push(CombatEvent::TargetAcquired { id });
                self.dispatch_key(id, ch, tick);
            }
            RouteDecision::Dispatch(id) => self.dispatch_key(id, ch, tick),
        }
    }

    fn dispatch_key(&mut self, id: EntityId, ch: char, tick: u64) {
        let outcome = self.scheduler.dispatch_keystroke(id, ch, tick);
        if outcome == KeystrokeOutcome::Ignored {
            return;
        }
        let correct = outcome.is_correct();
        self.ledger.record_keystroke(correct);
        self.events.push(CombatEvent::Keystroke { id, correct });
        if let KeystrokeOutcome::SentenceCleared { sentence } = outcome {
            self.events
                .push(CombatEvent::SentenceCleared { id, sentence });
        }
    }

    fn switch_target(&mut self) {
        if let Some(id) = self.router.switch_target() {
            if self.scheduler.release(id) {
                debug!(%id, "target released");
                self.events.push(CombatEvent::TargetReleased { id });
            }
        }
    }

    /// Turn terminal transitions into score, damage and events.
    ///
    /// Once the player is defeated the rest of the tick's reports are
    /// discarded: a stage abort scores nothing.
    fn apply_reports(&mut self, reports: Vec<TerminalReport>) {
        for report in reports {
            self.router.forget(report.id);
            if self.player.is_defeated() {
                continue;
            }

            match report.state {
                EntityState::Defeated => {
                    if let Some(kill) = &report.kill {
                        let profile = get_profile(report.variant);
                        let score = self.ledger.record_kill(kill, &profile);
                        debug!(
                            id = %report.id,
                            variant = %report.variant,
                            points = score.total(),
                            speed = score.is_speed_kill,
                            perfect = score.is_perfect_kill,
                            "kill scored"
                        );
                        let perfect = score.is_perfect_kill;
                        self.events.push(CombatEvent::Score(score));
                        self.events.push(CombatEvent::Progress(self.ledger.progress(
                            self.scheduler.current_wave_number(),
                            self.time.elapsed_secs,
                        )));
                        if perfect {
                            self.player
                                .apply(PlayerEvent::ComboIncrement, &mut self.events);
                        }
                    }
                }
                EntityState::Fainted => {
                    debug!(id = %report.id, cause = ?report.cause, "enemy fainted");
                    self.events.push(CombatEvent::EnemyFainted {
                        id: report.id,
                        cause: report.cause,
                    });
                }
                EntityState::ReachedPlayer => {
                    debug!(id = %report.id, variant = %report.variant, "enemy reached player");
                    self.events.push(CombatEvent::EnemyReachedPlayer {
                        id: report.id,
                        variant: report.variant,
                    });
                    self.player.apply(
                        PlayerEvent::Damage {
                            amount: report.contact_damage,
                        },
                        &mut self.events,
                    );
                }
                EntityState::Spawned | EntityState::Approaching | EntityState::Targeted => {}
            }

            if let Some(victims) = report.explosion {
                self.events.push(CombatEvent::Explosion {
                    id: report.id,
                    victims,
                });
                self.player.apply(
                    PlayerEvent::Damage {
                        amount: EXPLOSION_DAMAGE,
                    },
                    &mut self.events,
                );
            }
        }
    }

    /// Drop all entities and queued spawns without hooks or scoring.
    fn abort(&mut self) {
        self.scheduler.abort();
        self.router.clear();
    }

    fn finish(&mut self, outcome: StagePhase) {
        self.phase = outcome;
        let typing = self.ledger.typing();
        let summary = StageSummary {
            outcome,
            final_score: self.ledger.score(),
            survival_secs: self.time.elapsed_secs,
            waves_cleared: self.scheduler.waves_cleared(),
            total_kills: self.ledger.counters().total_kills,
            accuracy: typing.accuracy(),
            words_per_minute: typing.words_per_minute(self.time.elapsed_secs),
        };
        info!(
            ?outcome,
            score = summary.final_score,
            waves_cleared = summary.waves_cleared,
            survival_secs = summary.survival_secs,
            "stage finished"
        );
        self.events.push(CombatEvent::StageFinished(summary.clone()));
        self.summary = Some(summary);
    }

    fn snapshot(&mut self) -> StageSnapshot {
        let frame = SnapshotFrame {
            time: self.time,
            phase: self.phase,
            wave: self.scheduler.wave_view(self.time.tick),
            player: self.player.view(self.router.current()),
            score: self.ledger.view(),
            events: std::mem::take(&mut self.events),
        };
        systems::snapshot::build_snapshot(self.scheduler.world(), self.scheduler.index(), frame)
    }
}

#[cfg(test)]
impl<'s> StageEngine<'s> {
    /// Engine with no waves, for tests that place entities by hand.
    pub fn scripted(session: &'s GameSession) -> Self {
        let stage = StageDefinition {
            name: "scripted".to_string(),
            concurrency_cap: 64,
            difficulty_multiplier: 1.0,
            wave_break_ticks: 0,
            sentence_pool: Vec::new(),
            variant_pools: Default::default(),
            waves: Vec::new(),
        };
        Self {
            session,
            stage_name: stage.name.clone(),
            time: SimTime::default(),
            phase: StagePhase::Running,
            scheduler: WaveScheduler::new(&stage, session),
            router: TargetRouter::default(),
            ledger: ScoreLedger::default(),
            player: PlayerCombatState::new(session.difficulty),
            events: Vec::new(),
            summary: None,
        }
    }

    /// Spawn an entity with fixed sentences at the current tick.
    pub fn spawn_scripted(
        &mut self,
        variant: typestrike_core::enums::EnemyVariant,
        sentences: &[&str],
    ) -> EntityId {
        self.scheduler
            .spawn_scripted(variant, sentences, self.time.tick, &mut self.events)
    }

    /// Spawn a Horde pack with one fixed sentence per member.
    pub fn spawn_scripted_pack(&mut self, sentences: &[&str]) -> Vec<EntityId> {
        self.scheduler
            .spawn_scripted_pack(sentences, self.time.tick, &mut self.events)
    }

    pub fn scheduler_mut(&mut self) -> &mut WaveScheduler {
        &mut self.scheduler
    }

    /// Type a string, one character per tick. Returns every event raised.
    pub fn type_str(&mut self, text: &str) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        for ch in text.chars() {
            events.extend(self.tick(Some(PlayerInput::key(ch))).events);
        }
        events
    }

    /// Run idle ticks. Returns every event raised.
    pub fn idle(&mut self, ticks: u64) -> Vec<CombatEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(self.tick(None).events);
        }
        events
    }
}
