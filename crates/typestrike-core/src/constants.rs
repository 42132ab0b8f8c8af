//! Simulation constants and tuning parameters.
//!
//! Per-variant numbers are consumed by the behavior policy table; changing a
//! value here retunes every stage at once.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Approach ---

/// Ticks an entity with approach multiplier 1.0 needs to reach the player.
pub const BASE_APPROACH_TICKS: f64 = 1200.0;

/// Distance from the player at which entities spawn (world units).
pub const SPAWN_DISTANCE: f64 = 100.0;

/// Lowest spawn bearing (radians, measured from +x counter-clockwise).
pub const SPAWN_BEARING_MIN: f64 = std::f64::consts::PI * 0.15;

/// Highest spawn bearing (radians).
pub const SPAWN_BEARING_MAX: f64 = std::f64::consts::PI * 0.85;

/// Lateral sway of a Dancing entity (world units).
pub const DANCE_SWAY_AMPLITUDE: f64 = 6.0;

/// Ticks per full sway cycle of a Dancing entity.
pub const DANCE_SWAY_PERIOD_TICKS: f64 = 90.0;

// --- Typing windows ---

/// Default speed-kill window (3 s).
pub const DEFAULT_SPEED_THRESHOLD_TICKS: u64 = 180;

// --- Explosive ---

/// Size growth per tick while an Explosive is alive.
pub const EXPLOSIVE_GROWTH_PER_TICK: f64 = 0.0015;

/// Size at which an Explosive bursts on its own.
pub const EXPLOSIVE_BURST_SIZE: f64 = 2.5;

/// Radius of a chain explosion (world units).
pub const CHAIN_RADIUS: f64 = 18.0;

/// Damage dealt to the player by an explosion.
pub const EXPLOSION_DAMAGE: u32 = 1;

// --- Deflatable ---

/// Sentences carried by a Deflatable.
pub const DEFLATABLE_SENTENCES: usize = 3;

/// Shrink applied on every correct keystroke.
pub const DEFLATE_PER_KEYSTROKE: f64 = 0.02;

/// Extra shrink applied when a sentence is cleared.
pub const DEFLATE_PER_SENTENCE: f64 = 0.15;

/// Floor for `size_factor`.
pub const MIN_SIZE_FACTOR: f64 = 0.2;

// --- Horde ---

/// Entities spawned per Horde composition unit.
pub const HORDE_PACK_SIZE: usize = 3;

/// Approach multiplier applied to surviving pack members when one falls.
pub const HORDE_ENRAGE_FACTOR: f64 = 1.25;

// --- Boss ---

/// Sentences carried by a Boss.
pub const BOSS_SENTENCES: usize = 5;

/// Ticks between boss projectiles.
pub const BOSS_PROJECTILE_INTERVAL_TICKS: u32 = 300;

// --- Player ---

/// Perfect kills needed to earn an extra life.
pub const COMBO_EXTRA_LIFE_THRESHOLD: u32 = 10;

/// Health above the starting value that extra lives may reach.
pub const EXTRA_HEALTH_HEADROOM: u32 = 2;

// --- Waves ---

/// Default pause between waves (2 s).
pub const DEFAULT_WAVE_BREAK_TICKS: u64 = 120;

/// Characters counted as one word for words-per-minute.
pub const CHARS_PER_WORD: f64 = 5.0;
