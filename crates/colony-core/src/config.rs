//! Configuration types for the simulation.

use crate::error::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Inclusive range of counts, sampled once when a world is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: usize,
    pub max: usize,
}

impl CountRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub const fn exactly(count: usize) -> Self {
        Self { min: count, max: count }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(self.min..=self.max)
    }
}

/// How many of each entity a single generator pass tries to place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenerationMix {
    pub nests: usize,
    pub food_sources: usize,
    pub obstacles: usize,
    /// Spawn budget handed to every nest placed by this pass
    pub ants_per_nest: usize,
}

/// Scent field parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScentConfig {
    /// Per-tick multiplier applied to plain-cell trails
    pub decay_rate: f32,
    /// Trails weaker than this are dropped entirely
    pub cutoff: f32,
    /// Trail laid by a loaded ant on every step home
    pub deposit_amount: f32,
    /// Upper clamp for a single colony's trail on one cell
    pub max_trail: f32,
    /// How strongly searching ants prefer scented neighbours
    pub trail_bias: f32,
    /// Scent at or below this is considered faint (work-queue partition)
    pub faint_threshold: f32,
}

impl Default for ScentConfig {
    fn default() -> Self {
        Self {
            decay_rate: 0.98,
            cutoff: 0.01,
            deposit_amount: 10.0,
            max_trail: 100.0,
            trail_bias: 0.5,
            faint_threshold: 1.0,
        }
    }
}

/// Colony behaviour shared by every nest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyConfig {
    /// Ants hatched per tick while the spawn budget lasts
    pub spawn_per_tick: usize,
    /// Upper bound on living ants per colony
    pub max_live_ants: usize,
    /// Ticks an ant lives
    pub ant_lifespan: u64,
    /// Ticks after which a colony terminates regardless of its ants
    pub colony_lifespan: u64,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            spawn_per_tick: 10,
            max_live_ants: 500,
            ant_lifespan: 600,
            colony_lifespan: 20_000,
        }
    }
}

/// World configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Width of the initial world
    pub width: i32,
    /// Height of the initial world
    pub height: i32,
    /// Random seed for reproducibility
    pub seed: u64,
    pub nests: CountRange,
    pub food_sources: CountRange,
    pub obstacles: CountRange,
    /// Spawn budget of every nest placed at world creation
    pub ants_per_nest: usize,
    /// Starting quantity of every food source
    pub food_quantity: i64,
    /// Distance a side of the world moves out when an ant reaches it
    pub chunk_size: i32,
    /// Mixture stamped onto freshly extended strips
    pub chunk_mix: GenerationMix,
    /// Mixture used by the on-demand food trigger
    pub food_drop_mix: GenerationMix,
    /// Mixture used by the on-demand nest trigger
    pub nest_drop_mix: GenerationMix,
    pub colony: ColonyConfig,
    pub scent: ScentConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 250,
            height: 200,
            seed: 0,
            nests: CountRange::new(4, 5),
            food_sources: CountRange::new(20, 49),
            obstacles: CountRange::new(5, 19),
            ants_per_nest: 500,
            food_quantity: 200,
            chunk_size: 20,
            chunk_mix: GenerationMix {
                nests: 0,
                food_sources: 7,
                obstacles: 2,
                ants_per_nest: 0,
            },
            food_drop_mix: GenerationMix {
                food_sources: 15,
                ..Default::default()
            },
            nest_drop_mix: GenerationMix {
                nests: 1,
                ants_per_nest: 200,
                ..Default::default()
            },
            colony: ColonyConfig::default(),
            scent: ScentConfig::default(),
        }
    }
}

impl WorldConfig {
    pub fn with_size(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Parse a JSON document; missing fields fall back to their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(Error::Validation(format!(
                "world size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        for (name, range) in [
            ("nests", self.nests),
            ("food_sources", self.food_sources),
            ("obstacles", self.obstacles),
        ] {
            if range.min > range.max {
                return Err(Error::Validation(format!(
                    "{} range is empty: {}..={}",
                    name, range.min, range.max
                )));
            }
        }
        if self.chunk_size <= 0 {
            return Err(Error::Validation(format!(
                "chunk_size must be positive, got {}",
                self.chunk_size
            )));
        }
        if self.food_quantity < 0 {
            return Err(Error::Validation("food_quantity must not be negative".to_string()));
        }
        if !(self.scent.decay_rate > 0.0 && self.scent.decay_rate <= 1.0) {
            return Err(Error::Validation(format!(
                "scent decay_rate must lie in (0, 1], got {}",
                self.scent.decay_rate
            )));
        }
        if self.scent.faint_threshold < 0.0 || self.scent.cutoff < 0.0 {
            return Err(Error::Validation("scent thresholds must not be negative".to_string()));
        }
        Ok(())
    }
}
