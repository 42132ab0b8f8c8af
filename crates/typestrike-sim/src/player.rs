//! Player health and combo meter.

use tracing::info;

use typestrike_core::constants::{COMBO_EXTRA_LIFE_THRESHOLD, EXTRA_HEALTH_HEADROOM};
use typestrike_core::enums::Difficulty;
use typestrike_core::events::CombatEvent;
use typestrike_core::state::PlayerView;
use typestrike_core::types::EntityId;

/// The only ways player state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    /// An entity reached the player, or an explosion went off.
    Damage { amount: u32 },
    /// A qualifying kill fed the combo meter.
    ComboIncrement,
}

#[derive(Debug, Clone)]
pub struct PlayerCombatState {
    health: u32,
    max_health: u32,
    combo_meter: u32,
    combo_threshold: u32,
    defeated: bool,
}

impl PlayerCombatState {
    pub fn new(difficulty: Difficulty) -> Self {
        let health = difficulty.starting_health();
        Self {
            health,
            max_health: health + EXTRA_HEALTH_HEADROOM,
            combo_meter: 0,
            combo_threshold: COMBO_EXTRA_LIFE_THRESHOLD,
            defeated: false,
        }
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn combo_meter(&self) -> u32 {
        self.combo_meter
    }

    pub fn is_defeated(&self) -> bool {
        self.defeated
    }

    /// Apply one event, pushing whatever it causes onto `events`.
    ///
    /// Once defeated, further events are ignored: the stage is over.
    pub fn apply(&mut self, event: PlayerEvent, events: &mut Vec<CombatEvent>) {
        if self.defeated {
            return;
        }
        match event {
            PlayerEvent::Damage { amount } => {
                self.health = self.health.saturating_sub(amount);
                self.combo_meter = 0;
                events.push(CombatEvent::PlayerDamaged {
                    amount,
                    health: self.health,
                });
                if self.health == 0 {
                    self.defeated = true;
                    info!("player defeated");
                    events.push(CombatEvent::PlayerDefeated);
                }
            }
            PlayerEvent::ComboIncrement => {
                self.combo_meter += 1;
                if self.combo_meter >= self.combo_threshold {
                    self.combo_meter = 0;
                    if self.health < self.max_health {
                        self.health += 1;
                        info!(health = self.health, "extra life granted");
                        events.push(CombatEvent::ExtraLifeGranted {
                            health: self.health,
                        });
                    }
                }
            }
        }
    }

    pub fn view(&self, current_target: Option<EntityId>) -> PlayerView {
        PlayerView {
            health: self.health,
            max_health: self.max_health,
            combo_meter: self.combo_meter,
            combo_threshold: self.combo_threshold,
            current_target,
        }
    }
}
