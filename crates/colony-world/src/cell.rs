//! World cells: the single occupant of every mapped position.

use crate::colony::Colony;
use colony_core::{CellKind, Color, NestId, Position, ScentConfig};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Scent emitted by every food source
pub const FOOD_SCENT: f32 = 100.0;
/// Scent emitted by every nest tile
pub const NEST_SCENT: f32 = 50.0;

/// Result of a cell's per-tick update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellOutcome {
    Keep,
    Expired,
}

/// Everything the ants did to one position during the nest phase of a tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stimulus {
    /// Ants that ended their step here
    pub visits: u32,
    /// Ants that took food from here
    pub harvests: u32,
    /// Trail laid per colony
    pub deposits: Vec<(NestId, f32)>,
}

/// Empty ground. Carries the colonies' trails.
#[derive(Debug, Clone, Default)]
pub struct PlainCell {
    trails: HashMap<NestId, f32>,
    footfall: u64,
}

impl PlainCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trail laid by one colony
    pub fn trail(&self, nest: NestId) -> f32 {
        self.trails.get(&nest).copied().unwrap_or(0.0)
    }

    /// Strongest trail of any colony
    pub fn scent(&self) -> f32 {
        self.trails.values().copied().fold(0.0, f32::max)
    }

    /// Total number of ant visits this cell has observed
    pub fn footfall(&self) -> u64 {
        self.footfall
    }

    pub fn deposit(&mut self, nest: NestId, amount: f32, max_trail: f32) {
        let trail = self.trails.entry(nest).or_insert(0.0);
        *trail = (*trail + amount.max(0.0)).min(max_trail);
    }

    /// Multiplicative decay toward zero; trails under the cutoff vanish
    pub fn decay(&mut self, rate: f32, cutoff: f32) {
        self.trails.retain(|_, trail| {
            *trail *= rate;
            *trail >= cutoff
        });
    }

    fn absorb(&mut self, stimulus: &Stimulus, scent: &ScentConfig) {
        self.footfall += stimulus.visits as u64;
        for &(nest, amount) in &stimulus.deposits {
            self.deposit(nest, amount, scent.max_trail);
        }
    }

    fn update(&mut self, stimulus: Option<&Stimulus>, scent: &ScentConfig) -> CellOutcome {
        self.decay(scent.decay_rate, scent.cutoff);
        if let Some(stimulus) = stimulus {
            self.absorb(stimulus, scent);
        }
        CellOutcome::Keep
    }
}

/// A finite pile of food.
///
/// A quantity of exactly zero is still available; the source expires only once
/// it has been harvested past zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoodSource {
    quantity: i64,
}

impl FoodSource {
    pub fn new(quantity: i64) -> Self {
        Self { quantity }
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn is_available(&self) -> bool {
        self.quantity >= 0
    }

    pub fn is_exhausted(&self) -> bool {
        self.quantity < 0
    }

    /// Take one portion; returns false once nothing was left to take
    pub fn harvest(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.quantity -= 1;
        true
    }

    fn update(&mut self, stimulus: Option<&Stimulus>) -> CellOutcome {
        // Colonies claim a source for one ant each, so harvests count colonies.
        let harvests = stimulus.map_or(0, |s| s.harvests);
        for _ in 0..harvests {
            if !self.harvest() {
                break;
            }
        }
        if self.is_exhausted() {
            CellOutcome::Expired
        } else {
            CellOutcome::Keep
        }
    }
}

/// Map-side handle of a colony. Cloning shares the colony.
#[derive(Debug, Clone)]
pub struct NestTile {
    pub id: NestId,
    pub home: Position,
    pub colony: Arc<Mutex<Colony>>,
}

impl NestTile {
    pub fn new(colony: Colony) -> Self {
        Self {
            id: colony.id(),
            home: colony.home(),
            colony: Arc::new(Mutex::new(colony)),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Cell {
    Plain(PlainCell),
    Food(FoodSource),
    Obstacle,
    Nest(NestTile),
}

impl Default for Cell {
    fn default() -> Self {
        Cell::plain()
    }
}

impl Cell {
    pub fn plain() -> Self {
        Cell::Plain(PlainCell::new())
    }

    pub fn food(quantity: i64) -> Self {
        Cell::Food(FoodSource::new(quantity))
    }

    pub fn obstacle() -> Self {
        Cell::Obstacle
    }

    pub fn nest(colony: Colony) -> Self {
        Cell::Nest(NestTile::new(colony))
    }

    /// Plain cell seeded with what ants did to a position that was not mapped yet
    pub fn from_stimulus(stimulus: &Stimulus, scent: &ScentConfig) -> Self {
        let mut plain = PlainCell::new();
        plain.absorb(stimulus, scent);
        Cell::Plain(plain)
    }

    pub fn kind(&self) -> CellKind {
        match self {
            Cell::Plain(_) => CellKind::Plain,
            Cell::Food(_) => CellKind::Food,
            Cell::Obstacle => CellKind::Obstacle,
            Cell::Nest(_) => CellKind::Nest,
        }
    }

    /// Scent as seen by `nest`'s ants, or the strongest scent when `nest` is `None`
    pub fn scent(&self, nest: Option<NestId>) -> f32 {
        match self {
            Cell::Plain(plain) => match nest {
                Some(id) => plain.trail(id),
                None => plain.scent(),
            },
            Cell::Food(_) => FOOD_SCENT,
            Cell::Obstacle => 0.0,
            Cell::Nest(_) => NEST_SCENT,
        }
    }

    /// Trail a colony left here; only plain ground holds trails
    pub fn trail(&self, nest: NestId) -> f32 {
        match self {
            Cell::Plain(plain) => plain.trail(nest),
            _ => 0.0,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Cell::Plain(plain) => Color::WHITE.lerp(Color::TRAIL, plain.scent() / FOOD_SCENT),
            Cell::Food(_) => Color::GREEN,
            Cell::Obstacle => Color::DARK_GRAY,
            Cell::Nest(_) => Color::BROWN,
        }
    }

    pub fn food_available(&self) -> bool {
        matches!(self, Cell::Food(food) if food.is_available())
    }

    pub fn as_food(&self) -> Option<&FoodSource> {
        match self {
            Cell::Food(food) => Some(food),
            _ => None,
        }
    }

    pub fn as_plain(&self) -> Option<&PlainCell> {
        match self {
            Cell::Plain(plain) => Some(plain),
            _ => None,
        }
    }

    pub fn as_nest(&self) -> Option<&NestTile> {
        match self {
            Cell::Nest(tile) => Some(tile),
            _ => None,
        }
    }

    /// Advance this cell by one tick.
    ///
    /// Touches nothing but this cell's own payload. Nest tiles never expire here;
    /// colony termination is decided by the grid.
    pub fn update(&mut self, stimulus: Option<&Stimulus>, scent: &ScentConfig) -> CellOutcome {
        match self {
            Cell::Plain(plain) => plain.update(stimulus, scent),
            Cell::Food(food) => food.update(stimulus),
            Cell::Obstacle | Cell::Nest(_) => CellOutcome::Keep,
        }
    }
}
