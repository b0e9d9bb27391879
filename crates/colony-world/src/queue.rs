//! Ordered work list over everything in the world.

use crate::ant::Ant;
use crate::grid::Grid;
use colony_core::{CellKind, Color, Position};

/// Read-only copy of one mapped cell
#[derive(Debug, Clone, PartialEq)]
pub struct TileView {
    pub position: Position,
    pub kind: CellKind,
    pub scent: f32,
    pub color: Color,
}

#[derive(Debug, Clone)]
pub enum Entity {
    Tile(TileView),
    Ant(Ant),
}

impl Entity {
    pub fn position(&self) -> Position {
        match self {
            Entity::Tile(tile) => tile.position,
            Entity::Ant(ant) => ant.position,
        }
    }
}

impl Grid {
    /// Faint ground first, then every ant, then scented ground and landmarks
    /// (food, obstacles, nests). Rebuilt on every call.
    pub fn queue(&self) -> Vec<Entity> {
        let threshold = self.config().scent.faint_threshold;
        let mut faint = Vec::new();
        let mut salient = Vec::new();

        for pos in self.positions() {
            let Some(cell) = self.get(pos) else {
                continue;
            };
            let tile = TileView {
                position: pos,
                kind: cell.kind(),
                scent: cell.scent(None),
                color: cell.color(),
            };
            if tile.kind == CellKind::Plain && tile.scent <= threshold {
                faint.push(Entity::Tile(tile));
            } else {
                salient.push(Entity::Tile(tile));
            }
        }

        let ants = self.agents().into_iter().map(Entity::Ant);
        faint.into_iter().chain(ants).chain(salient).collect()
    }
}
