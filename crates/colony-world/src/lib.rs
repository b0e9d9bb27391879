//! World simulation engine.
//!
//! This module implements the sparse, growing 2D grid where ant colonies forage,
//! lay scent trails and exhaust food sources.

pub mod ant;
pub mod cell;
pub mod colony;
pub mod generator;
pub mod grid;
pub mod queue;

pub use ant::{Ant, AntStep, Probe, WorldView};
pub use cell::{Cell, CellOutcome, FoodSource, NestTile, PlainCell, Stimulus};
pub use colony::{Colony, ColonyReport, NestSnapshot};
pub use generator::Generator;
pub use grid::{Grid, TickPhase, TickReport};
pub use queue::{Entity, TileView};
