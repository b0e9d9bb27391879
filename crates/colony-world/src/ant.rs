//! Ant state and navigation.

use colony_core::{AntId, CellKind, NestId, Position, ScentConfig};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// What an ant can learn about a single position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    pub kind: CellKind,
    /// Trail of the asking ant's own colony
    pub trail: f32,
    pub food_available: bool,
}

impl Default for Probe {
    fn default() -> Self {
        Self {
            kind: CellKind::Plain,
            trail: 0.0,
            food_available: false,
        }
    }
}

/// Read-only window onto the world that ants navigate through.
///
/// Implementations must not insert into the world; unmapped positions read as
/// `Probe::default()`.
pub trait WorldView {
    fn probe(&self, pos: Position, nest: NestId) -> Probe;
}

/// Effects of one ant step, applied by the grid after the nest phase
#[derive(Debug, Clone, PartialEq)]
pub struct AntStep {
    pub from: Position,
    pub to: Position,
    /// Food source the ant took a portion from
    pub harvested: Option<Position>,
    /// Trail laid at `to`
    pub deposit: Option<f32>,
    pub delivered: bool,
    pub expired: bool,
}

impl AntStep {
    fn stay(at: Position) -> Self {
        Self {
            from: at,
            to: at,
            harvested: None,
            deposit: None,
            delivered: false,
            expired: false,
        }
    }
}

/// An ant in the simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ant {
    pub id: AntId,
    pub nest_id: NestId,
    pub home: Position,
    pub position: Position,
    pub carrying: bool,
    pub age: u64,
    pub lifespan: u64,
    pub deliveries: u32,
}

impl Ant {
    pub fn new(id: AntId, nest_id: NestId, home: Position, lifespan: u64) -> Self {
        Self {
            id,
            nest_id,
            home,
            position: home,
            carrying: false,
            age: 0,
            lifespan,
            deliveries: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.age <= self.lifespan
    }

    /// Advance the ant by one tick.
    ///
    /// Loaded ants head home and lay trail; searching ants grab adjacent food or
    /// wander, biased toward their colony's trail.
    pub fn step<V, R>(&mut self, view: &V, rng: &mut R, scent: &ScentConfig) -> AntStep
    where
        V: WorldView + ?Sized,
        R: Rng + ?Sized,
    {
        self.age += 1;
        let mut step = AntStep::stay(self.position);
        if !self.is_alive() {
            step.expired = true;
            return step;
        }

        let nest = self.nest_id;
        let candidates: Vec<(Position, Probe)> = self
            .position
            .neighbors()
            .map(|pos| (pos, view.probe(pos, nest)))
            .filter(|(_, probe)| probe.kind.is_passable())
            .collect();

        if candidates.is_empty() {
            return step;
        }

        if self.carrying {
            let next = self.closest_to_home(&candidates, rng);
            self.position = next;
            step.to = next;
            step.deposit = Some(scent.deposit_amount);
            if next == self.home {
                self.carrying = false;
                self.deliveries += 1;
                step.delivered = true;
            }
            return step;
        }

        let food: Vec<Position> = candidates
            .iter()
            .filter(|(_, probe)| probe.food_available)
            .map(|(pos, _)| *pos)
            .collect();

        if let Some(&target) = food.choose(rng) {
            self.position = target;
            self.carrying = true;
            step.to = target;
            step.harvested = Some(target);
            return step;
        }

        let next = candidates
            .choose_weighted(rng, |(_, probe)| 1.0 + scent.trail_bias * probe.trail)
            .map(|(pos, _)| *pos)
            .unwrap_or(self.position);
        self.position = next;
        step.to = next;
        step
    }

    fn closest_to_home<R: Rng + ?Sized>(
        &self,
        candidates: &[(Position, Probe)],
        rng: &mut R,
    ) -> Position {
        let best = candidates
            .iter()
            .map(|(pos, _)| pos.chebyshev_distance(&self.home))
            .min()
            .unwrap_or(0);
        let closest: Vec<Position> = candidates
            .iter()
            .map(|(pos, _)| *pos)
            .filter(|pos| pos.chebyshev_distance(&self.home) == best)
            .collect();
        closest.choose(rng).copied().unwrap_or(self.position)
    }
}
