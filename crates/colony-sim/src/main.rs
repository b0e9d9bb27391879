//! Headless driver that runs a colony world for a fixed number of ticks.

mod telemetry;

use anyhow::{Context, Result};
use colony_core::WorldConfig;
use colony_world::{Grid, TickReport};
use tracing::{debug, event, info, warn, Level};

const DEFAULT_TICKS: u64 = 1_000;
const METRICS_INTERVAL: u64 = 100;

fn main() -> Result<()> {
    telemetry::init_telemetry()?;

    let config = load_config()?;
    let ticks = std::env::var("COLONY_SIM_TICKS")
        .ok()
        .map(|raw| raw.parse::<u64>())
        .transpose()
        .context("COLONY_SIM_TICKS must be a non-negative integer")?
        .unwrap_or(DEFAULT_TICKS);

    info!("Starting colony simulation for {} ticks", ticks);
    debug!(config = %serde_json::to_string(&config)?, "World configuration");
    let mut grid = Grid::from_config(config)?;

    let mut total_deliveries = 0;
    let mut total_harvests = 0;
    for _ in 0..ticks {
        let report = grid.update()?;
        total_deliveries += report.deliveries;
        total_harvests += report.harvests;

        if report.tick % METRICS_INTERVAL == 0 {
            emit_metrics(&grid, &report);
        }
        if report.extended.any() {
            info!(tick = report.tick, bounds = ?grid.bounds(), "World grew");
        }
        if report.colonies == 0 {
            warn!(tick = report.tick, "No colonies left, stopping early");
            break;
        }
    }

    let nests = grid.nests();
    info!(
        event = "run_summary",
        final_tick = grid.tick(),
        cells = grid.len(),
        colonies = nests.len(),
        ants = grid.agents().len(),
        total_harvests,
        total_deliveries,
        bounds = ?grid.bounds(),
        "Simulation complete"
    );
    for nest in &nests {
        info!(
            event = "colony_summary",
            nest_id = %nest.id,
            home = %nest.home,
            age = nest.age,
            live_ants = nest.live_ants,
            total_ants_created = nest.total_ants_created,
            total_farmed_food = nest.total_farmed_food,
            "Colony"
        );
    }

    Ok(())
}

/// Read the world configuration named by `COLONY_SIM_CONFIG`, or fall back to defaults
fn load_config() -> Result<WorldConfig> {
    match std::env::var("COLONY_SIM_CONFIG") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {}", path))?;
            let config = WorldConfig::from_json(&raw)
                .with_context(|| format!("parsing config file {}", path))?;
            info!("Loaded configuration from {}", path);
            Ok(config)
        }
        Err(_) => Ok(WorldConfig::default()),
    }
}

fn emit_metrics(grid: &Grid, report: &TickReport) {
    info!(
        event = "population_metrics",
        tick = report.tick,
        colonies = report.colonies,
        live_ants = report.live_ants,
        spawned = report.spawned,
        expired_ants = report.expired_ants,
        harvests = report.harvests,
        deliveries = report.deliveries,
        cells = grid.len(),
        "Population metrics snapshot"
    );

    event!(
        Level::INFO,
        gauge_name = "live_ants",
        gauge_value = report.live_ants,
        tick = report.tick,
        "Live ants gauge"
    );
}
