//! Charging-site demand simulation.

/// Hour-of-day arrival probabilities.
pub mod arrival;
/// Chargers, occupancy, and charging sessions.
pub mod charger;
/// Tick clock and calendar helpers.
pub mod clock;
/// Charging-demand distribution.
pub mod demand;
pub mod engine;
pub mod kpi;
/// Seeded and entropy random sources.
pub mod rng;
pub mod types;

pub use engine::Engine;
pub use types::{SimulationConfig, SimulationResult};

/// Runs one simulation with the default tables.
///
/// Seeded configs are fully deterministic; unseeded ones draw from OS
/// entropy.
///
/// # Examples
///
/// ```
/// use ev_charge_sim::sim::{self, SimulationConfig};
///
/// let cfg = SimulationConfig::new(4, 11.0).with_seed(1).with_duration_ticks(96);
/// let a = sim::run(&cfg);
/// let b = sim::run(&cfg);
/// assert_eq!(a, b);
/// ```
pub fn run(config: &SimulationConfig) -> SimulationResult {
    Engine::new(config.clone()).run()
}
