//! Stage definitions: wave compositions, cadence, concurrency cap, sentence pools.
//!
//! Definitions arrive as JSON from an external loader. Every structural problem
//! is reported here as a `ConfigError`, before any entity exists.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use typestrike_core::constants::DEFAULT_WAVE_BREAK_TICKS;
use typestrike_core::enums::EnemyVariant;

/// Errors raised while loading or validating a stage definition.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("stage JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read stage file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("stage has no waves")]
    NoWaves,
    #[error("wave {wave} has an empty composition")]
    EmptyComposition { wave: usize },
    #[error("wave {wave} spawns zero {variant} entities")]
    ZeroCount { wave: usize, variant: EnemyVariant },
    #[error("wave {wave} spawns invalid count {value} of {variant}")]
    InvalidCount {
        wave: usize,
        variant: EnemyVariant,
        value: i64,
    },
    #[error("unknown enemy variant `{name}`")]
    UnknownVariant { name: String },
    #[error("wave {wave} has negative spawn interval {value}")]
    NegativeInterval { wave: usize, value: i64 },
    #[error("negative wave break {0}")]
    NegativeWaveBreak(i64),
    #[error("concurrency cap must be at least 1, got {0}")]
    InvalidConcurrencyCap(i64),
    #[error("difficulty multiplier must be positive and finite, got {0}")]
    InvalidDifficultyMultiplier(f64),
    #[error("no sentences available for {variant}")]
    EmptySentencePool { variant: EnemyVariant },
    #[error("sentence {index} in the {pool} pool is empty")]
    EmptySentence { pool: String, index: usize },
}

/// One line of a wave composition.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionEntry {
    pub variant: EnemyVariant,
    /// Units to spawn. A Horde unit is a whole pack.
    pub count: u32,
}

/// One wave of a stage.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveDefinition {
    /// Ticks between spawn attempts. Zero spawns the whole wave at once.
    pub spawn_interval_ticks: u64,
    pub composition: Vec<CompositionEntry>,
}

impl WaveDefinition {
    pub fn new(spawn_interval_ticks: u64, composition: Vec<(EnemyVariant, u32)>) -> Self {
        Self {
            spawn_interval_ticks,
            composition: composition
                .into_iter()
                .map(|(variant, count)| CompositionEntry { variant, count })
                .collect(),
        }
    }

    pub fn is_boss_wave(&self) -> bool {
        self.composition
            .iter()
            .any(|entry| entry.variant == EnemyVariant::Boss)
    }

    /// Composition units in this wave.
    pub fn unit_count(&self) -> u32 {
        self.composition.iter().map(|entry| entry.count).sum()
    }
}

/// A validated stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageDefinition {
    pub name: String,
    /// Maximum simultaneously active entities before difficulty scaling.
    pub concurrency_cap: usize,
    /// Approach speed multiplier for the whole stage.
    pub difficulty_multiplier: f64,
    pub wave_break_ticks: u64,
    /// Fallback sentences for variants without their own pool.
    pub sentence_pool: Vec<String>,
    pub variant_pools: BTreeMap<EnemyVariant, Vec<String>>,
    pub waves: Vec<WaveDefinition>,
}

impl StageDefinition {
    /// Parse and validate a JSON stage definition.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawStage = serde_json::from_str(json)?;
        let stage = raw.into_stage()?;
        stage.validate()?;
        Ok(stage)
    }

    /// Read, parse and validate a stage definition file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Sentence pool used for `variant`.
    pub fn pool_for(&self, variant: EnemyVariant) -> &[String] {
        self.variant_pools
            .get(&variant)
            .map(Vec::as_slice)
            .unwrap_or(&self.sentence_pool)
    }

    /// Structural checks shared by parsed and hand-built definitions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency_cap == 0 {
            return Err(ConfigError::InvalidConcurrencyCap(0));
        }
        if !(self.difficulty_multiplier.is_finite() && self.difficulty_multiplier > 0.0) {
            return Err(ConfigError::InvalidDifficultyMultiplier(
                self.difficulty_multiplier,
            ));
        }
        if self.waves.is_empty() {
            return Err(ConfigError::NoWaves);
        }

        check_pool("default", &self.sentence_pool)?;
        for (variant, pool) in &self.variant_pools {
            check_pool(variant.name(), pool)?;
        }

        for (i, wave) in self.waves.iter().enumerate() {
            let number = i + 1;
            if wave.composition.is_empty() {
                return Err(ConfigError::EmptyComposition { wave: number });
            }
            for entry in &wave.composition {
                if entry.count == 0 {
                    return Err(ConfigError::ZeroCount {
                        wave: number,
                        variant: entry.variant,
                    });
                }
                self.require_pool(entry.variant)?;
                // Boss projectiles draw from the Fast pool.
                if entry.variant == EnemyVariant::Boss {
                    self.require_pool(EnemyVariant::Fast)?;
                }
            }
        }
        Ok(())
    }

    fn require_pool(&self, variant: EnemyVariant) -> Result<(), ConfigError> {
        if self.pool_for(variant).is_empty() {
            return Err(ConfigError::EmptySentencePool { variant });
        }
        Ok(())
    }
}

fn check_pool(name: &str, pool: &[String]) -> Result<(), ConfigError> {
    match pool.iter().position(|s| s.is_empty()) {
        Some(index) => Err(ConfigError::EmptySentence {
            pool: name.to_string(),
            index,
        }),
        None => Ok(()),
    }
}

// --- File format ---
//
// Numbers are read signed and names as strings so that bad values surface as
// specific `ConfigError`s instead of generic serde messages.

#[derive(Debug, Deserialize)]
struct RawStage {
    name: String,
    concurrency_cap: i64,
    #[serde(default = "default_multiplier")]
    difficulty_multiplier: f64,
    #[serde(default = "default_break")]
    wave_break_ticks: i64,
    #[serde(default)]
    sentence_pool: Vec<String>,
    #[serde(default)]
    variant_pools: BTreeMap<String, Vec<String>>,
    waves: Vec<RawWave>,
}

#[derive(Debug, Deserialize)]
struct RawWave {
    spawn_interval_ticks: i64,
    composition: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    variant: String,
    count: i64,
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_break() -> i64 {
    DEFAULT_WAVE_BREAK_TICKS as i64
}

fn parse_variant(name: &str) -> Result<EnemyVariant, ConfigError> {
    name.parse().map_err(|_| ConfigError::UnknownVariant {
        name: name.to_string(),
    })
}

impl RawStage {
    fn into_stage(self) -> Result<StageDefinition, ConfigError> {
        if self.concurrency_cap < 1 {
            return Err(ConfigError::InvalidConcurrencyCap(self.concurrency_cap));
        }
        if self.wave_break_ticks < 0 {
            return Err(ConfigError::NegativeWaveBreak(self.wave_break_ticks));
        }

        let variant_pools = self
            .variant_pools
            .into_iter()
            .map(|(name, pool)| Ok((parse_variant(&name)?, pool)))
            .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

        let waves = self
            .waves
            .into_iter()
            .enumerate()
            .map(|(i, wave)| {
                if wave.spawn_interval_ticks < 0 {
                    return Err(ConfigError::NegativeInterval {
                        wave: i + 1,
                        value: wave.spawn_interval_ticks,
                    });
                }
                let composition = wave
                    .composition
                    .into_iter()
                    .map(|entry| {
                        let variant = parse_variant(&entry.variant)?;
                        let count = u32::try_from(entry.count).map_err(|_| {
                            ConfigError::InvalidCount {
                                wave: i + 1,
                                variant,
                                value: entry.count,
                            }
                        })?;
                        Ok(CompositionEntry { variant, count })
                    })
                    .collect::<Result<Vec<_>, ConfigError>>()?;
                Ok(WaveDefinition {
                    spawn_interval_ticks: wave.spawn_interval_ticks as u64,
                    composition,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(StageDefinition {
            name: self.name,
            concurrency_cap: self.concurrency_cap as usize,
            difficulty_multiplier: self.difficulty_multiplier,
            wave_break_ticks: self.wave_break_ticks as u64,
            sentence_pool: self.sentence_pool,
            variant_pools,
            waves,
        })
    }
}
