//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use ev_charge_sim::sim::{self, SimulationConfig, SimulationResult};

/// Seed of the reference scenario.
pub const REFERENCE_SEED: u64 = 12345;

/// The reference site: 20 x 11 kW, one year, seeded.
pub fn reference_config() -> SimulationConfig {
    SimulationConfig::new(20, 11.0).with_seed(REFERENCE_SEED)
}

/// A seeded site of `chargers` x 11 kW over `days` days.
pub fn small_config(chargers: usize, days: usize, seed: u64) -> SimulationConfig {
    SimulationConfig::new(chargers, 11.0)
        .with_seed(seed)
        .with_duration_ticks(days * 96)
}

/// Runs the reference scenario.
pub fn reference_result() -> SimulationResult {
    sim::run(&reference_config())
}
