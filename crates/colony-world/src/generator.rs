//! Random population of world regions.

use crate::cell::Cell;
use crate::colony::Colony;
use crate::grid::Grid;
use colony_core::{ColonyConfig, GenerationMix, NestId, Position, WorldConfig};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use tracing::debug;

/// Stamps nests, food sources and obstacles at uniformly random positions
#[derive(Debug, Clone)]
pub struct Generator {
    mix: GenerationMix,
    food_quantity: i64,
    colony: ColonyConfig,
}

impl Generator {
    pub fn new(mix: GenerationMix, food_quantity: i64, colony: ColonyConfig) -> Self {
        Self {
            mix,
            food_quantity,
            colony,
        }
    }

    /// Generator for `mix` using the food and colony settings of a world
    pub fn for_world(config: &WorldConfig, mix: GenerationMix) -> Self {
        Self::new(mix, config.food_quantity, config.colony.clone())
    }

    /// Populate the inclusive rectangle `start..=end` of `grid`.
    ///
    /// Positions are drawn independently, so two placements of one pass may
    /// collide; the later one wins. The batch lands on unmapped positions and on
    /// plain ground, but never replaces food, obstacles or nests, so fewer
    /// entities than requested may land.
    pub fn generate(&self, grid: &Grid, start: Position, end: Position, rng: &mut ChaCha8Rng) {
        if start.x > end.x || start.y > end.y {
            debug!(%start, %end, "Skipping generation for empty rectangle");
            return;
        }

        let mut batch: HashMap<Position, Cell> = HashMap::new();

        for _ in 0..self.mix.nests {
            let pos = random_position(start, end, rng);
            let id = NestId::from_rng(rng);
            let colony_rng = ChaCha8Rng::seed_from_u64(rng.gen());
            let colony = Colony::new(id, pos, self.mix.ants_per_nest, self.colony.clone(), colony_rng);
            batch.insert(pos, Cell::nest(colony));
        }

        for _ in 0..self.mix.food_sources {
            let pos = random_position(start, end, rng);
            batch.insert(pos, Cell::food(self.food_quantity));
        }

        for _ in 0..self.mix.obstacles {
            let pos = random_position(start, end, rng);
            batch.insert(pos, Cell::obstacle());
        }

        let requested = self.mix.nests + self.mix.food_sources + self.mix.obstacles;
        let collided = requested - batch.len();
        let placed = batch
            .into_iter()
            .map(|(pos, cell)| grid.place_on_ground(pos, cell))
            .filter(|placed| *placed)
            .count();

        debug!(
            %start,
            %end,
            requested,
            collided,
            placed,
            "Generated region"
        );
    }
}

fn random_position(start: Position, end: Position, rng: &mut ChaCha8Rng) -> Position {
    Position::new(rng.gen_range(start.x..=end.x), rng.gen_range(start.y..=end.y))
}
