//! In-memory store of completed simulations.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::sim::clock::TICKS_PER_DAY;
use crate::sim::types::SimulationResult;

/// A completed run kept for later retrieval.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSimulation {
    pub id: u64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub result: SimulationResult,
}

/// Listing view of a stored run: inputs plus headline outputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSummary {
    pub id: u64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub num_chargers: usize,
    #[serde(rename = "powerKW")]
    pub power_kw: f64,
    pub arrival_multiplier: f64,
    pub ev_consumption: f64,
    pub duration_days: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
    #[serde(rename = "totalEnergyConsumedKWh")]
    pub total_energy_consumed_kwh: f64,
    #[serde(rename = "theoreticalMaxPowerKW")]
    pub theoretical_max_power_kw: f64,
    #[serde(rename = "actualMaxPowerDemandKW")]
    pub actual_max_power_demand_kw: f64,
    pub concurrency_factor: f64,
    pub total_charging_events: u64,
}

impl From<&StoredSimulation> for SimulationSummary {
    fn from(sim: &StoredSimulation) -> Self {
        let r = &sim.result;
        Self {
            id: sim.id,
            name: sim.name.clone(),
            created_at: sim.created_at,
            num_chargers: r.config.num_chargers,
            power_kw: r.config.charger_power_kw,
            arrival_multiplier: r.config.arrival_probability_multiplier,
            ev_consumption: r.config.ev_consumption_kwh_per_100km,
            duration_days: r.config.duration_ticks as f64 / TICKS_PER_DAY as f64,
            rng_seed: r.config.rng_seed,
            total_energy_consumed_kwh: r.total_energy_consumed_kwh,
            theoretical_max_power_kw: r.theoretical_max_power_kw,
            actual_max_power_demand_kw: r.actual_max_power_demand_kw,
            concurrency_factor: r.concurrency_factor,
            total_charging_events: r.total_charging_events,
        }
    }
}

/// Insertion-ordered simulations with sequential ids starting at 1.
#[derive(Debug, Default)]
pub struct SimulationStore {
    next_id: u64,
    simulations: Vec<StoredSimulation>,
}

impl SimulationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `result` stamped with the current time, naming it
    /// `Simulation <id>` when `name` is absent or blank.
    pub fn insert(&mut self, name: Option<String>, result: SimulationResult) -> &StoredSimulation {
        self.insert_at(name, result, Utc::now())
    }

    /// Stores `result` with an explicit creation time.
    pub fn insert_at(
        &mut self,
        name: Option<String>,
        result: SimulationResult,
        created_at: DateTime<Utc>,
    ) -> &StoredSimulation {
        self.next_id += 1;
        let id = self.next_id;
        let name = name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Simulation {id}"));
        self.simulations.push(StoredSimulation {
            id,
            name,
            created_at,
            result,
        });
        &self.simulations[self.simulations.len() - 1]
    }

    /// Summaries, newest first. Equal timestamps fall back to the higher id.
    pub fn summaries(&self) -> Vec<SimulationSummary> {
        let mut list: Vec<SimulationSummary> =
            self.simulations.iter().map(SimulationSummary::from).collect();
        list.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        list
    }

    pub fn get(&self, id: u64) -> Option<&StoredSimulation> {
        self.simulations.iter().find(|sim| sim.id == id)
    }

    pub fn remove(&mut self, id: u64) -> Option<StoredSimulation> {
        let index = self.simulations.iter().position(|sim| sim.id == id)?;
        Some(self.simulations.remove(index))
    }

    pub fn len(&self) -> usize {
        self.simulations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simulations.is_empty()
    }
}
