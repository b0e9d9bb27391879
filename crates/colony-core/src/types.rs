//! Core type definitions for the simulation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a nest and the colony it hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NestId(pub Uuid);

impl NestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Draw an id from a caller-supplied random source so that runs stay reproducible
    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(Uuid::from_u128(rng.gen()))
    }
}

impl Default for NestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an ant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AntId(pub Uuid);

impl AntId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(Uuid::from_u128(rng.gen()))
    }
}

impl Default for AntId {
    fn default() -> Self {
        Self::new()
    }
}

/// 2D position in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn add(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub fn step(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.to_delta();
        self.add(dx, dy)
    }

    /// The eight surrounding positions
    pub fn neighbors(&self) -> impl Iterator<Item = Position> + '_ {
        Direction::all().into_iter().map(move |d| self.step(d))
    }

    /// Chessboard distance, i.e. the number of 8-neighbourhood moves between two positions
    pub fn chebyshev_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Direction for movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub fn to_delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::NorthEast => (1, -1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (-1, 1),
        }
    }

    pub fn all() -> [Direction; 8] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
            Direction::NorthEast,
            Direction::NorthWest,
            Direction::SouthEast,
            Direction::SouthWest,
        ]
    }
}

/// Inclusive rectangle of materialized world.
///
/// Bounds are only ever grown; nothing in the engine shrinks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Position,
    pub max: Position,
}

impl Bounds {
    pub fn new(min: Position, max: Position) -> Self {
        Self { min, max }
    }

    /// Bounds of a `width` x `height` world centered at the origin
    pub fn centered(width: i32, height: i32) -> Self {
        Self {
            min: Position::new(-width / 2, -height / 2),
            max: Position::new(width / 2, height / 2),
        }
    }

    pub fn width(&self) -> i32 {
        self.max.x - self.min.x + 1
    }

    pub fn height(&self) -> i32 {
        self.max.y - self.min.y + 1
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.min.x && pos.x <= self.max.x && pos.y >= self.min.y && pos.y <= self.max.y
    }

    /// Which of the four boundary lines a position lies exactly on
    pub fn edges_touched(&self, pos: Position) -> Edges {
        Edges {
            west: pos.x == self.min.x,
            east: pos.x == self.max.x,
            south: pos.y == self.min.y,
            north: pos.y == self.max.y,
        }
    }
}

/// Set of boundary lines, named after the side of the world they close off
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edges {
    /// `min.x`
    pub west: bool,
    /// `max.x`
    pub east: bool,
    /// `min.y`
    pub south: bool,
    /// `max.y`
    pub north: bool,
}

impl Edges {
    pub fn any(&self) -> bool {
        self.west || self.east || self.south || self.north
    }

    pub fn union(self, other: Edges) -> Edges {
        Edges {
            west: self.west || other.west,
            east: self.east || other.east,
            south: self.south || other.south,
            north: self.north || other.north,
        }
    }
}

/// RGB color handed to renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const DARK_GRAY: Color = Color::rgb(64, 64, 64);
    pub const BROWN: Color = Color::rgb(139, 69, 19);
    pub const TRAIL: Color = Color::rgb(255, 140, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear blend toward `other`; `t` is clamped to `[0, 1]`
    pub fn lerp(&self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

/// Discriminant of a cell, used wherever callers only need to know what occupies a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Plain,
    Food,
    Obstacle,
    Nest,
}

impl CellKind {
    pub fn is_passable(&self) -> bool {
        !matches!(self, CellKind::Obstacle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_position_as_key() {
        let mut set = HashSet::new();
        set.insert(Position::new(3, -4));
        assert!(set.contains(&Position::new(3, -4)));
        assert!(!set.contains(&Position::new(-4, 3)));
    }

    #[test]
    fn test_chebyshev_distance() {
        let pos1 = Position::new(0, 0);
        let pos2 = Position::new(3, 4);
        assert_eq!(pos1.chebyshev_distance(&pos2), 4);
        assert_eq!(pos2.chebyshev_distance(&pos1), 4);
    }

    #[test]
    fn test_neighbors() {
        let neighbors: HashSet<Position> = Position::new(5, 5).neighbors().collect();
        assert_eq!(neighbors.len(), 8);
        assert!(!neighbors.contains(&Position::new(5, 5)));
        assert!(neighbors.contains(&Position::new(4, 6)));
    }

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::North.to_delta(), (0, -1));
        assert_eq!(Direction::South.to_delta(), (0, 1));
        assert_eq!(Direction::East.to_delta(), (1, 0));
        assert_eq!(Direction::West.to_delta(), (-1, 0));
    }

    #[test]
    fn test_centered_bounds() {
        let bounds = Bounds::centered(10, 10);
        assert_eq!(bounds.min, Position::new(-5, -5));
        assert_eq!(bounds.max, Position::new(5, 5));
        assert_eq!(bounds.width(), 11);
        assert!(bounds.contains(Position::ORIGIN));
        assert!(!bounds.contains(Position::new(6, 0)));
    }

    #[test]
    fn test_edges_touched() {
        let bounds = Bounds::centered(10, 10);
        let edges = bounds.edges_touched(Position::new(-5, 5));
        assert!(edges.west && edges.north);
        assert!(!edges.east && !edges.south);
        assert!(!bounds.edges_touched(Position::ORIGIN).any());
    }

    #[test]
    fn test_color_lerp() {
        assert_eq!(Color::WHITE.lerp(Color::GREEN, 0.0), Color::WHITE);
        assert_eq!(Color::WHITE.lerp(Color::GREEN, 2.0), Color::GREEN);
    }

    proptest! {
        #[test]
        fn prop_interior_positions_touch_no_edge(x in -4i32..=4, y in -4i32..=4) {
            let bounds = Bounds::centered(10, 10);
            prop_assert!(bounds.contains(Position::new(x, y)));
            prop_assert!(!bounds.edges_touched(Position::new(x, y)).any());
        }

        #[test]
        fn prop_neighbors_are_one_step_away(x in -1000i32..1000, y in -1000i32..1000) {
            let center = Position::new(x, y);
            for n in center.neighbors() {
                prop_assert_eq!(center.chebyshev_distance(&n), 1);
            }
        }
    }
}
