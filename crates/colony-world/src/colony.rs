//! Colony state: the ants a nest owns and the bookkeeping around them.

use crate::ant::{Ant, Probe, WorldView};
use colony_core::{AntId, ColonyConfig, Error, NestId, Position, Result, ScentConfig};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::trace;

/// Everything a colony's ants did during one tick
#[derive(Debug, Clone)]
pub struct ColonyReport {
    pub nest_id: NestId,
    /// Positions ants ended their step on, one entry per living ant
    pub visits: Vec<Position>,
    pub deposits: Vec<(Position, f32)>,
    pub harvests: Vec<Position>,
    pub delivered: u64,
    pub spawned: usize,
    pub expired: usize,
    pub live_ants: usize,
    pub total_ants_created: usize,
    pub total_farmed_food: u64,
    pub terminated: bool,
}

impl ColonyReport {
    fn new(nest_id: NestId) -> Self {
        Self {
            nest_id,
            visits: Vec::new(),
            deposits: Vec::new(),
            harvests: Vec::new(),
            delivered: 0,
            spawned: 0,
            expired: 0,
            live_ants: 0,
            total_ants_created: 0,
            total_farmed_food: 0,
            terminated: false,
        }
    }
}

/// Read-only summary of a colony
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestSnapshot {
    pub id: NestId,
    pub home: Position,
    pub age: u64,
    pub live_ants: usize,
    pub spawn_budget: usize,
    pub total_ants_created: usize,
    pub total_farmed_food: u64,
    pub terminated: bool,
}

#[derive(Debug)]
pub struct Colony {
    id: NestId,
    home: Position,
    ants: Vec<Ant>,
    rng: ChaCha8Rng,
    config: ColonyConfig,
    spawn_budget: usize,
    age: u64,
    total_ants_created: usize,
    total_farmed_food: u64,
}

impl Colony {
    pub fn new(
        id: NestId,
        home: Position,
        spawn_budget: usize,
        config: ColonyConfig,
        rng: ChaCha8Rng,
    ) -> Self {
        Self {
            id,
            home,
            ants: Vec::new(),
            rng,
            config,
            spawn_budget,
            age: 0,
            total_ants_created: 0,
            total_farmed_food: 0,
        }
    }

    pub fn id(&self) -> NestId {
        self.id
    }

    pub fn home(&self) -> Position {
        self.home
    }

    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    pub fn total_ants_created(&self) -> usize {
        self.total_ants_created
    }

    pub fn total_farmed_food(&self) -> u64 {
        self.total_farmed_food
    }

    /// Take in an ant from outside the spawn cycle
    pub fn adopt(&mut self, ant: Ant) -> Result<()> {
        if ant.nest_id != self.id {
            return Err(Error::InvalidState(format!(
                "ant {:?} belongs to nest {} not {}",
                ant.id, ant.nest_id, self.id
            )));
        }
        self.ants.push(ant);
        Ok(())
    }

    pub fn remove_ant(&mut self, index: usize) -> Result<Ant> {
        if index >= self.ants.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.ants.len(),
            });
        }
        Ok(self.ants.remove(index))
    }

    /// A colony ends when its lifespan is over, or once it has hatched its
    /// whole budget and every ant has died.
    pub fn is_terminated(&self) -> bool {
        self.age >= self.config.colony_lifespan
            || (self.total_ants_created >= self.spawn_budget && self.ants.is_empty())
    }

    fn spawn(&mut self) -> usize {
        let room = self.config.max_live_ants.saturating_sub(self.ants.len());
        let remaining = self.spawn_budget.saturating_sub(self.total_ants_created);
        let count = self.config.spawn_per_tick.min(room).min(remaining);

        for _ in 0..count {
            let id = AntId::from_rng(&mut self.rng);
            self.ants
                .push(Ant::new(id, self.id, self.home, self.config.ant_lifespan));
        }
        self.total_ants_created += count;
        count
    }

    /// Advance the colony and every ant it owns by one tick.
    ///
    /// Only this colony's state is mutated; the world is read through `view` and
    /// the ants' effects come back in the report. Each food source yields to at
    /// most one of this colony's ants per tick.
    pub fn update<V: WorldView + ?Sized>(
        &mut self,
        view: &V,
        scent: &ScentConfig,
    ) -> ColonyReport {
        self.age += 1;
        let mut report = ColonyReport::new(self.id);
        report.spawned = self.spawn();

        let mut claimed = HashSet::new();
        for ant in &mut self.ants {
            let unclaimed = Unclaimed {
                inner: view,
                claimed: &claimed,
            };
            let step = ant.step(&unclaimed, &mut self.rng, scent);
            if step.expired {
                report.expired += 1;
                continue;
            }
            report.visits.push(step.to);
            if let Some(amount) = step.deposit {
                report.deposits.push((step.to, amount));
            }
            if let Some(food) = step.harvested {
                claimed.insert(food);
                report.harvests.push(food);
            }
            if step.delivered {
                report.delivered += 1;
            }
        }

        self.ants.retain(Ant::is_alive);
        self.total_farmed_food += report.delivered;
        report.live_ants = self.ants.len();
        report.total_ants_created = self.total_ants_created;
        report.total_farmed_food = self.total_farmed_food;
        report.terminated = self.is_terminated();

        trace!(
            nest_id = %self.id,
            age = self.age,
            live_ants = report.live_ants,
            spawned = report.spawned,
            expired = report.expired,
            delivered = report.delivered,
            "Colony updated"
        );

        report
    }

    pub fn snapshot(&self) -> NestSnapshot {
        NestSnapshot {
            id: self.id,
            home: self.home,
            age: self.age,
            live_ants: self.ants.len(),
            spawn_budget: self.spawn_budget,
            total_ants_created: self.total_ants_created,
            total_farmed_food: self.total_farmed_food,
            terminated: self.is_terminated(),
        }
    }
}

/// Hides food sources that an ant of the colony already took from this tick
struct Unclaimed<'a, V: ?Sized> {
    inner: &'a V,
    claimed: &'a HashSet<Position>,
}

impl<V: WorldView + ?Sized> WorldView for Unclaimed<'_, V> {
    fn probe(&self, pos: Position, nest: NestId) -> Probe {
        let mut probe = self.inner.probe(pos, nest);
        if self.claimed.contains(&pos) {
            probe.food_available = false;
        }
        probe
    }
}
