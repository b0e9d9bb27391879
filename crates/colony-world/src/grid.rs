//! Sparse, growing 2D grid and the per-tick update protocol.

use crate::ant::{Ant, Probe, WorldView};
use crate::cell::{Cell, CellOutcome, NestTile, Stimulus};
use crate::colony::{ColonyReport, NestSnapshot};
use crate::generator::Generator;
use colony_core::{
    Bounds, CellKind, Edges, Error, GenerationMix, NestId, Position, Result, WorldConfig,
};
use dashmap::mapref::entry::Entry;
use dashmap::mapref::one::{Ref, RefMut};
use dashmap::DashMap;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument, trace};

/// Boundaries inside a tick at which `Grid::update_with` hands the grid to its observer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    /// All colonies and their ants have moved
    NestsUpdated,
    /// Every other cell has been updated; the map shape is still unchanged
    CellsUpdated,
    /// Expired cells are gone and newly touched positions are mapped
    RemovalsApplied,
    /// Chunk extension has run; the tick is complete
    ChunksExtended,
}

/// Summary of one tick
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub colonies: usize,
    pub live_ants: usize,
    pub spawned: usize,
    pub expired_ants: usize,
    pub harvests: usize,
    pub deliveries: u64,
    pub removed: Vec<Position>,
    pub terminated_nests: Vec<NestId>,
    pub materialized: usize,
    pub extended: Edges,
}

/// Non-inserting view of the map handed to ants during the nest phase
struct GridView<'a> {
    cells: &'a DashMap<Position, Cell>,
}

impl WorldView for GridView<'_> {
    fn probe(&self, pos: Position, nest: NestId) -> Probe {
        match self.cells.get(&pos) {
            Some(cell) => Probe {
                kind: cell.kind(),
                trail: cell.trail(nest),
                food_available: cell.food_available(),
            },
            None => Probe::default(),
        }
    }
}

/// An unbounded world of cells, materialized on demand
pub struct Grid {
    cells: DashMap<Position, Cell>,
    bounds: Bounds,
    config: WorldConfig,
    rng: Mutex<ChaCha8Rng>,
    tick: u64,
}

impl Grid {
    /// World of the given size centered at the origin, populated with the default mixture.
    ///
    /// Counts are drawn from the default ranges with seed 0, so every call with the
    /// same size builds the same world. Use `from_config` with another seed to vary it.
    pub fn new(width: i32, height: i32) -> Result<Self> {
        Self::from_config(WorldConfig::with_size(width, height))
    }

    /// Create a populated world from configuration
    pub fn from_config(config: WorldConfig) -> Result<Self> {
        let grid = Self::empty(config)?;

        let mix = {
            let mut rng = grid.rng.lock();
            GenerationMix {
                nests: grid.config.nests.sample(&mut *rng),
                food_sources: grid.config.food_sources.sample(&mut *rng),
                obstacles: grid.config.obstacles.sample(&mut *rng),
                ants_per_nest: grid.config.ants_per_nest,
            }
        };
        grid.generate_with(mix, grid.bounds.min, grid.bounds.max);

        info!(
            width = grid.config.width,
            height = grid.config.height,
            seed = grid.config.seed,
            nests = mix.nests,
            food_sources = mix.food_sources,
            obstacles = mix.obstacles,
            cells = grid.len(),
            "World created"
        );

        Ok(grid)
    }

    /// World with bounds set up but nothing placed in it
    pub fn empty(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cells: DashMap::new(),
            bounds: Bounds::centered(config.width, config.height),
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(config.seed)),
            config,
            tick: 0,
        })
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Number of completed ticks
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Number of mapped positions
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.cells.contains_key(&pos)
    }

    /// Snapshot of every mapped position, in no particular order
    pub fn positions(&self) -> Vec<Position> {
        self.cells.iter().map(|entry| *entry.key()).collect()
    }

    /// Get the cell at a position, mapping a fresh plain cell if there is none.
    ///
    /// Holds a write lock on the cell's shard until the guard is dropped.
    pub fn tile_at(&self, pos: Position) -> RefMut<'_, Position, Cell> {
        self.cells.entry(pos).or_insert_with(Cell::plain)
    }

    /// Get the cell at a position without mapping anything
    pub fn get(&self, pos: Position) -> Option<Ref<'_, Position, Cell>> {
        self.cells.get(&pos)
    }

    pub fn kind_at(&self, pos: Position) -> Option<CellKind> {
        self.cells.get(&pos).map(|cell| cell.kind())
    }

    /// Replace whatever occupies `pos`
    pub fn insert(&self, pos: Position, cell: Cell) -> Option<Cell> {
        self.cells.insert(pos, cell)
    }

    /// Map `cell` at `pos` if the position is unmapped or plain ground.
    ///
    /// Food, obstacles and nests are left in place.
    pub(crate) fn place_on_ground(&self, pos: Position, cell: Cell) -> bool {
        match self.cells.entry(pos) {
            Entry::Vacant(entry) => {
                entry.insert(cell);
                true
            }
            Entry::Occupied(mut entry) if matches!(entry.get(), Cell::Plain(_)) => {
                entry.insert(cell);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Remove the cell at `pos`; unmapped positions are left alone
    pub fn remove(&self, pos: Position) -> Option<Cell> {
        self.cells.remove(&pos).map(|(_, cell)| cell)
    }

    fn nest_tiles(&self) -> Vec<(Position, NestTile)> {
        self.cells
            .iter()
            .filter_map(|entry| entry.value().as_nest().map(|tile| (*entry.key(), tile.clone())))
            .collect()
    }

    /// Snapshots of every colony
    pub fn nests(&self) -> Vec<NestSnapshot> {
        self.nest_tiles()
            .iter()
            .map(|(_, tile)| tile.colony.lock().snapshot())
            .collect()
    }

    /// Copies of every living ant, across all colonies
    pub fn agents(&self) -> Vec<Ant> {
        self.nest_tiles()
            .iter()
            .flat_map(|(_, tile)| tile.colony.lock().ants().to_vec())
            .collect()
    }

    fn generate_with(&self, mix: GenerationMix, start: Position, end: Position) {
        let generator = Generator::for_world(&self.config, mix);
        let mut rng = self.rng.lock();
        generator.generate(self, start, end, &mut rng);
    }

    /// Scatter the configured on-demand food mixture over the current bounds
    pub fn generate_food_sources(&self) {
        self.generate_with(self.config.food_drop_mix, self.bounds.min, self.bounds.max);
    }

    /// Found the configured on-demand nests somewhere within the current bounds
    pub fn generate_nests(&self) {
        self.generate_with(self.config.nest_drop_mix, self.bounds.min, self.bounds.max);
    }

    /// Advance the whole world by one tick
    pub fn update(&mut self) -> Result<TickReport> {
        self.update_with(|_, _| {})
    }

    /// Advance the whole world by one tick, showing the grid to `inspect` after every phase.
    ///
    /// Nests and their ants go first, then every other cell. Both passes run in
    /// parallel and only touch cell payloads; removals and newly mapped cells are
    /// applied afterwards, followed by chunk extension.
    #[instrument(skip(self, inspect), fields(tick = self.tick + 1))]
    pub fn update_with<F>(&mut self, mut inspect: F) -> Result<TickReport>
    where
        F: FnMut(TickPhase, &Grid),
    {
        let tick = self.tick + 1;

        // Phase 1: colonies
        let nests = self.nest_tiles();
        let reports: Vec<(Position, ColonyReport)> = {
            let view = GridView { cells: &self.cells };
            let scent = &self.config.scent;
            nests
                .par_iter()
                .map(|(pos, tile)| -> Result<(Position, ColonyReport)> {
                    let mut colony = tile.colony.lock();
                    if colony.home() != *pos {
                        return Err(Error::InvalidState(format!(
                            "nest {} sits at {} but its ants call {} home",
                            colony.id(),
                            pos,
                            colony.home()
                        )));
                    }
                    Ok((*pos, colony.update(&view, scent)))
                })
                .collect::<Result<Vec<_>>>()?
        };
        inspect(TickPhase::NestsUpdated, self);

        let stimuli = collect_stimuli(&reports);

        // Phase 2: everything else
        let expired: Vec<Position> = {
            let scent = &self.config.scent;
            let stimuli = &stimuli;
            self.cells
                .par_iter_mut()
                .filter_map(|mut entry| {
                    let (pos, cell) = entry.pair_mut();
                    if matches!(cell, Cell::Nest(_)) {
                        return None;
                    }
                    match cell.update(stimuli.get(pos), scent) {
                        CellOutcome::Expired => Some(*pos),
                        CellOutcome::Keep => None,
                    }
                })
                .collect()
        };
        inspect(TickPhase::CellsUpdated, self);

        // Structural edits
        let mut report = TickReport {
            tick,
            colonies: reports.len(),
            ..Default::default()
        };
        for (pos, colony) in &reports {
            report.live_ants += colony.live_ants;
            report.spawned += colony.spawned;
            report.expired_ants += colony.expired;
            report.harvests += colony.harvests.len();
            report.deliveries += colony.delivered;
            if colony.terminated {
                debug!(
                    nest_id = %colony.nest_id,
                    position = %pos,
                    total_farmed_food = colony.total_farmed_food,
                    total_ants_created = colony.total_ants_created,
                    "Colony terminated"
                );
                report.terminated_nests.push(colony.nest_id);
                report.removed.push(*pos);
            }
        }
        report.removed.extend(expired);

        for pos in &report.removed {
            if self.cells.remove(pos).is_some() {
                trace!(position = %pos, "Removed cell");
            }
        }
        for (pos, stimulus) in &stimuli {
            if !self.cells.contains_key(pos) {
                self.cells
                    .insert(*pos, Cell::from_stimulus(stimulus, &self.config.scent));
                report.materialized += 1;
            }
        }
        inspect(TickPhase::RemovalsApplied, self);

        report.extended = self.extend_chunks();
        inspect(TickPhase::ChunksExtended, self);

        self.tick = tick;
        trace!(
            colonies = report.colonies,
            live_ants = report.live_ants,
            removed = report.removed.len(),
            materialized = report.materialized,
            "Tick complete"
        );
        Ok(report)
    }

    /// Push out every side of the world that an ant is standing on, populating
    /// only the freshly added strips.
    fn extend_chunks(&mut self) -> Edges {
        let bounds = self.bounds;
        let touched = self
            .nest_tiles()
            .iter()
            .fold(Edges::default(), |edges, (_, tile)| {
                tile.colony
                    .lock()
                    .ants()
                    .iter()
                    .fold(edges, |edges, ant| edges.union(bounds.edges_touched(ant.position)))
            });

        if !touched.any() {
            return touched;
        }

        let size = self.config.chunk_size;
        let mix = self.config.chunk_mix;

        // Horizontal strips span the rows from before this extension
        if touched.west {
            let start = Position::new(self.bounds.min.x - size, bounds.min.y);
            let end = Position::new(self.bounds.min.x - 1, bounds.max.y);
            self.bounds.min.x -= size;
            self.generate_with(mix, start, end);
        }
        if touched.east {
            let start = Position::new(self.bounds.max.x + 1, bounds.min.y);
            let end = Position::new(self.bounds.max.x + size, bounds.max.y);
            self.bounds.max.x += size;
            self.generate_with(mix, start, end);
        }
        // Vertical strips span the already widened columns so corners get filled too
        if touched.south {
            let start = Position::new(self.bounds.min.x, self.bounds.min.y - size);
            let end = Position::new(self.bounds.max.x, self.bounds.min.y - 1);
            self.bounds.min.y -= size;
            self.generate_with(mix, start, end);
        }
        if touched.north {
            let start = Position::new(self.bounds.min.x, self.bounds.max.y + 1);
            let end = Position::new(self.bounds.max.x, self.bounds.max.y + size);
            self.bounds.max.y += size;
            self.generate_with(mix, start, end);
        }

        debug!(
            west = touched.west,
            east = touched.east,
            south = touched.south,
            north = touched.north,
            min = %self.bounds.min,
            max = %self.bounds.max,
            "World extended"
        );

        touched
    }
}

/// Fold every colony's effects into one stimulus per touched position
fn collect_stimuli(reports: &[(Position, ColonyReport)]) -> HashMap<Position, Stimulus> {
    let mut stimuli: HashMap<Position, Stimulus> = HashMap::new();
    for (_, report) in reports {
        for pos in &report.visits {
            stimuli.entry(*pos).or_default().visits += 1;
        }
        for pos in &report.harvests {
            stimuli.entry(*pos).or_default().harvests += 1;
        }
        for (pos, amount) in &report.deposits {
            stimuli
                .entry(*pos)
                .or_default()
                .deposits
                .push((report.nest_id, *amount));
        }
    }
    stimuli
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colony::Colony;
    use colony_core::{AntId, ColonyConfig, CountRange};

    fn quiet_config(width: i32, height: i32) -> WorldConfig {
        WorldConfig {
            width,
            height,
            seed: 42,
            ..Default::default()
        }
    }

    /// Colony with no spawn budget, holding the given ants
    fn colony_with_ants(grid: &Grid, home: Position, ants: &[Position]) -> NestId {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let id = NestId::from_rng(&mut rng);
        let config = ColonyConfig {
            ant_lifespan: 10_000,
            ..grid.config().colony.clone()
        };
        let mut colony = Colony::new(id, home, 0, config.clone(), rng);
        for pos in ants {
            let mut ant = Ant::new(AntId::new(), id, home, config.ant_lifespan);
            ant.position = *pos;
            colony.adopt(ant).unwrap();
        }
        grid.insert(home, Cell::nest(colony));
        id
    }

    fn wall_around(grid: &Grid, center: Position, except: Option<Position>) {
        for pos in center.neighbors() {
            if Some(pos) != except {
                grid.insert(pos, Cell::obstacle());
            }
        }
    }

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(20, 20).unwrap();
        assert_eq!(grid.bounds(), Bounds::centered(20, 20));
        assert!(!grid.is_empty());

        let nests = grid.nests();
        assert!(!nests.is_empty() && nests.len() <= 5);
        assert!(nests.iter().all(|n| n.spawn_budget == 500));
        for pos in grid.positions() {
            assert!(grid.bounds().contains(pos));
        }
    }

    #[test]
    fn test_invalid_size_is_rejected() {
        assert!(Grid::new(0, 10).is_err());
        assert!(Grid::new(10, -1).is_err());
    }

    #[test]
    fn test_same_seed_same_world() {
        let a = Grid::from_config(quiet_config(30, 30)).unwrap();
        let b = Grid::from_config(quiet_config(30, 30)).unwrap();
        let mut pa = a.positions();
        let mut pb = b.positions();
        pa.sort_by_key(|p| (p.x, p.y));
        pb.sort_by_key(|p| (p.x, p.y));
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_lazy_densification_keeps_identity() {
        let grid = Grid::empty(quiet_config(10, 10)).unwrap();
        let pos = Position::new(123, -45);
        let nest = NestId::new();

        assert!(grid.get(pos).is_none());
        {
            let mut tile = grid.tile_at(pos);
            assert_eq!(tile.kind(), CellKind::Plain);
            if let Cell::Plain(plain) = tile.value_mut() {
                plain.deposit(nest, 5.0, 100.0);
            }
        }
        assert_eq!(grid.len(), 1);

        // The second read sees the first cell, not a fresh default
        assert_eq!(grid.tile_at(pos).scent(Some(nest)), 5.0);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_remove_is_a_no_op_for_unmapped_positions() {
        let grid = Grid::empty(quiet_config(10, 10)).unwrap();
        assert!(grid.remove(Position::new(1, 1)).is_none());

        grid.insert(Position::new(1, 1), Cell::food(5));
        assert!(grid.remove(Position::new(1, 1)).is_some());
        assert!(grid.is_empty());
    }

    #[test]
    fn test_food_removed_on_tick_after_it_reaches_zero() {
        let mut grid = Grid::empty(quiet_config(10, 10)).unwrap();
        let home = Position::new(0, 0);
        let food = Position::new(2, 0);
        grid.insert(food, Cell::food(2));

        let mut removed_on = None;
        for tick in 1..=10u64 {
            // A new colony replaces the old one every tick, so exactly one
            // searching ant stands beside the food each time
            colony_with_ants(&grid, home, &[Position::new(1, 0)]);
            let report = grid.update().unwrap();
            assert_eq!(report.tick, tick);
            if report.removed.contains(&food) {
                removed_on = Some(tick);
                break;
            }
            assert_eq!(grid.kind_at(food), Some(CellKind::Food));
        }
        // 2 -> 1 -> 0 -> -1
        assert_eq!(removed_on, Some(3));
        assert_ne!(grid.kind_at(food), Some(CellKind::Food));
    }

    #[test]
    fn test_map_shape_is_stable_during_parallel_phases() {
        let mut grid = Grid::from_config(quiet_config(30, 30)).unwrap();
        for _ in 0..5 {
            let before = grid.positions().len();
            let mut seen = Vec::new();
            grid.update_with(|phase, g| seen.push((phase, g.len()))).unwrap();

            assert_eq!(seen[0], (TickPhase::NestsUpdated, before));
            assert_eq!(seen[1], (TickPhase::CellsUpdated, before));
            assert_eq!(seen[2].0, TickPhase::RemovalsApplied);
            assert_eq!(seen[3].0, TickPhase::ChunksExtended);
        }
    }

    #[test]
    fn test_cells_see_post_move_ant_positions() {
        let mut grid = Grid::empty(quiet_config(40, 40)).unwrap();
        let home = Position::new(0, 0);
        let start = Position::new(5, 5);
        let target = Position::new(6, 5);
        wall_around(&grid, start, Some(target));
        grid.tile_at(start);
        grid.tile_at(target);
        colony_with_ants(&grid, home, &[start]);

        grid.update().unwrap();

        assert_eq!(grid.agents()[0].position, target);
        let footfall = |pos| grid.get(pos).and_then(|c| c.as_plain().map(|p| p.footfall()));
        assert_eq!(footfall(target), Some(1));
        assert_eq!(footfall(start), Some(0));
    }

    #[test]
    fn test_trail_lands_where_loaded_ant_arrives() {
        let mut grid = Grid::empty(quiet_config(40, 40)).unwrap();
        let home = Position::new(0, 0);
        let nest = colony_with_ants(&grid, home, &[Position::new(4, 0)]);
        if let Some(tile) = grid.get(home).and_then(|c| c.as_nest().cloned()) {
            let mut colony = tile.colony.lock();
            let mut ant = colony.remove_ant(0).unwrap();
            ant.carrying = true;
            colony.adopt(ant).unwrap();
        }

        grid.update().unwrap();
        let ant = grid.agents()[0].clone();
        assert_eq!(ant.position.x, 3);
        let trail = grid.get(ant.position).map(|c| c.scent(Some(nest))).unwrap_or(0.0);
        assert_eq!(trail, grid.config().scent.deposit_amount);
    }

    #[test]
    fn test_chunk_extension_on_west_edge() {
        let config = WorldConfig {
            chunk_mix: GenerationMix {
                food_sources: 40,
                obstacles: 40,
                ..Default::default()
            },
            ..quiet_config(10, 10)
        };
        let mut grid = Grid::empty(config).unwrap();
        assert_eq!(grid.bounds(), Bounds::new(Position::new(-5, -5), Position::new(5, 5)));

        // Pin an ant to the west edge
        let edge = Position::new(-5, 0);
        wall_around(&grid, edge, None);
        colony_with_ants(&grid, Position::new(0, 0), &[edge]);
        let before: HashMap<Position, CellKind> = grid
            .positions()
            .into_iter()
            .filter_map(|p| grid.kind_at(p).map(|k| (p, k)))
            .collect();

        let report = grid.update().unwrap();
        assert!(report.extended.west);
        assert!(!report.extended.east && !report.extended.north && !report.extended.south);

        let chunk = grid.config().chunk_size;
        let bounds = grid.bounds();
        assert_eq!(bounds.min.x, -5 - chunk);
        assert_eq!(bounds.max, Position::new(5, 5));
        assert_eq!(bounds.min.y, -5);

        for pos in grid.positions() {
            match before.get(&pos) {
                Some(kind) => assert_eq!(grid.kind_at(pos), Some(*kind)),
                None => {
                    // Either a generated strip cell or ground an ant touched
                    if grid.kind_at(pos) != Some(CellKind::Plain) {
                        assert!(pos.x >= bounds.min.x && pos.x < -5, "{pos} outside strip");
                        assert!(pos.y >= -5 && pos.y <= 5);
                    }
                }
            }
        }
        let strip_cells = grid
            .positions()
            .into_iter()
            .filter(|p| !before.contains_key(p))
            .count();
        assert!(strip_cells > 0);
    }

    #[test]
    fn test_corner_ant_extends_two_sides_without_overlap() {
        let config = WorldConfig {
            chunk_size: 3,
            chunk_mix: GenerationMix {
                obstacles: 500,
                ..Default::default()
            },
            ..quiet_config(10, 10)
        };
        let mut grid = Grid::empty(config).unwrap();
        let corner = Position::new(5, 5);
        wall_around(&grid, corner, None);
        colony_with_ants(&grid, Position::new(0, 0), &[corner]);
        let before: Vec<Position> = grid.positions();

        let report = grid.update().unwrap();
        assert!(report.extended.east && report.extended.north);
        assert_eq!(grid.bounds().max, Position::new(8, 8));
        assert_eq!(grid.bounds().min, Position::new(-5, -5));

        for pos in grid.positions() {
            if before.contains(&pos) || grid.kind_at(pos) == Some(CellKind::Plain) {
                continue;
            }
            // Every generated cell is outside the old rectangle but inside the new one
            assert!(grid.bounds().contains(pos));
            assert!(pos.x > 5 || pos.y > 5);
        }
        // The north strip spans the widened columns, so the new corner gets filled
        assert!(grid.positions().iter().any(|p| p.x > 6 && p.y > 6));
    }

    #[test]
    fn test_no_extension_in_the_interior() {
        let mut grid = Grid::empty(quiet_config(10, 10)).unwrap();
        let pos = Position::new(1, 1);
        wall_around(&grid, pos, None);
        colony_with_ants(&grid, Position::new(0, 0), &[pos]);

        let report = grid.update().unwrap();
        assert!(!report.extended.any());
        assert_eq!(grid.bounds(), Bounds::centered(10, 10));
    }

    #[test]
    fn test_terminated_nest_tile_is_removed() {
        let config = WorldConfig {
            colony: ColonyConfig {
                colony_lifespan: 2,
                ..Default::default()
            },
            ..quiet_config(10, 10)
        };
        let mut grid = Grid::empty(config).unwrap();
        let home = Position::new(0, 0);
        colony_with_ants(&grid, home, &[Position::new(1, 1)]);

        let first = grid.update().unwrap();
        assert!(first.terminated_nests.is_empty());
        assert_eq!(grid.kind_at(home), Some(CellKind::Nest));

        let second = grid.update().unwrap();
        assert_eq!(second.terminated_nests.len(), 1);
        assert!(second.removed.contains(&home));
        assert_ne!(grid.kind_at(home), Some(CellKind::Nest));
        assert!(grid.nests().is_empty());
        assert!(grid.agents().is_empty());
    }

    #[test]
    fn test_end_to_end_food_depletion() {
        let config = WorldConfig {
            nests: CountRange::exactly(0),
            food_sources: CountRange::exactly(0),
            obstacles: CountRange::exactly(0),
            ..quiet_config(10, 10)
        };
        let mut grid = Grid::from_config(config).unwrap();
        assert!(grid.is_empty());

        let home = Position::new(0, 0);
        let food = Position::new(1, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let colony = Colony::new(
            NestId::from_rng(&mut rng),
            home,
            50,
            ColonyConfig {
                spawn_per_tick: 50,
                ..Default::default()
            },
            rng,
        );
        grid.insert(home, Cell::nest(colony));
        grid.insert(food, Cell::food(3));

        let mut removed_on = None;
        for _ in 0..200 {
            let report = grid.update().unwrap();
            assert_eq!(grid.nests()[0].live_ants, 50);
            if report.removed.contains(&food) {
                removed_on = Some(report.tick);
                break;
            }
        }

        let tick = removed_on.expect("food source was never exhausted");
        assert!(tick >= 4, "removed on tick {tick}");
        assert_ne!(grid.kind_at(food), Some(CellKind::Food));
        assert!(grid.nests()[0].total_farmed_food > 0);
    }

    #[test]
    fn test_deliveries_are_backed_by_food() {
        let config = WorldConfig {
            nests: CountRange::exactly(0),
            food_sources: CountRange::exactly(0),
            obstacles: CountRange::exactly(0),
            ..quiet_config(10, 10)
        };
        let mut grid = Grid::from_config(config).unwrap();

        let home = Position::new(0, 0);
        let food = Position::new(1, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let colony = Colony::new(
            NestId::from_rng(&mut rng),
            home,
            50,
            ColonyConfig {
                spawn_per_tick: 50,
                ..Default::default()
            },
            rng,
        );
        grid.insert(home, Cell::nest(colony));
        grid.insert(food, Cell::food(3));

        let mut harvests = 0;
        let mut exhausted = false;
        for _ in 0..200 {
            let report = grid.update().unwrap();
            harvests += report.harvests;
            assert!(report.harvests <= 1);
            if report.removed.contains(&food) {
                exhausted = true;
                break;
            }
        }

        // Quantities 3, 2, 1 and 0 each hand out one portion
        assert!(exhausted);
        assert_eq!(harvests, 4);
        let farmed = grid.nests()[0].total_farmed_food;
        let carrying = grid.agents().iter().filter(|ant| ant.carrying).count() as u64;
        assert_eq!(farmed + carrying, 4);
    }

    #[test]
    fn test_misplaced_nest_aborts_the_tick() {
        let mut grid = Grid::empty(quiet_config(10, 10)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let colony = Colony::new(
            NestId::from_rng(&mut rng),
            Position::ORIGIN,
            10,
            ColonyConfig::default(),
            rng,
        );
        grid.insert(Position::new(3, 3), Cell::nest(colony));

        let result = grid.update();
        assert!(matches!(result, Err(Error::InvalidState(_))));
        assert_eq!(grid.tick(), 0);
        assert_eq!(grid.nests()[0].live_ants, 0);
    }

    #[test]
    fn test_on_demand_food_lands_on_explored_ground() {
        let grid = Grid::empty(quiet_config(10, 10)).unwrap();
        let bounds = grid.bounds();
        for x in bounds.min.x..=bounds.max.x {
            for y in bounds.min.y..=bounds.max.y {
                grid.tile_at(Position::new(x, y));
            }
        }
        let mapped = grid.len();
        grid.insert(Position::ORIGIN, Cell::obstacle());

        grid.generate_food_sources();
        let food = grid
            .positions()
            .into_iter()
            .filter(|p| grid.kind_at(*p) == Some(CellKind::Food))
            .count();
        assert!(food > 0 && food <= 15);
        assert_eq!(grid.len(), mapped);
        assert_eq!(grid.kind_at(Position::ORIGIN), Some(CellKind::Obstacle));
    }

    #[test]
    fn test_on_demand_generation() {
        let grid = Grid::empty(quiet_config(40, 40)).unwrap();
        grid.generate_food_sources();
        let food = grid
            .positions()
            .into_iter()
            .filter(|p| grid.kind_at(*p) == Some(CellKind::Food))
            .count();
        assert!(food > 0 && food <= 15);

        grid.generate_nests();
        let nests = grid.nests();
        assert_eq!(nests.len(), 1);
        assert_eq!(nests[0].spawn_budget, 200);
    }
}
