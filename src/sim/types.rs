//! Engine input and output records.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::charger::{ChargerId, EvId};
use super::clock::{HOURS_PER_TICK, TICKS_PER_DAY, Tick};

/// Typed input of one simulation run.
///
/// Values are assumed validated by the caller; the engine degrades
/// gracefully on zero chargers, zero power, or zero duration.
///
/// # Examples
///
/// ```
/// use ev_charge_sim::sim::types::SimulationConfig;
///
/// let cfg = SimulationConfig::new(20, 11.0).with_seed(12345);
/// assert_eq!(cfg.duration_ticks, 35_040);
/// assert_eq!(cfg.rng_seed, Some(12345));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Number of charging points.
    pub num_chargers: usize,
    /// Rated power of every charger (kW).
    #[serde(rename = "chargerPowerKW")]
    pub charger_power_kw: f64,
    /// EV energy consumption (kWh per 100 km).
    #[serde(rename = "evConsumptionKWhPer100km")]
    pub ev_consumption_kwh_per_100km: f64,
    /// Uniform scaling of base arrival probabilities.
    pub arrival_probability_multiplier: f64,
    /// Horizon length in 15-minute ticks.
    pub duration_ticks: usize,
    /// Seed for the reproducible random stream; `None` draws from OS entropy.
    #[serde(default)]
    pub rng_seed: Option<u64>,
    /// Whether to keep a per-charger, per-tick activity log.
    #[serde(default)]
    pub record_activity: bool,
}

impl SimulationConfig {
    /// One year of ticks.
    pub const ONE_YEAR_TICKS: usize = 365 * TICKS_PER_DAY;

    /// Creates an unseeded one-year configuration at 18 kWh/100km and
    /// multiplier 1.0.
    pub fn new(num_chargers: usize, charger_power_kw: f64) -> Self {
        Self {
            num_chargers,
            charger_power_kw,
            ev_consumption_kwh_per_100km: 18.0,
            arrival_probability_multiplier: 1.0,
            duration_ticks: Self::ONE_YEAR_TICKS,
            rng_seed: None,
            record_activity: false,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_duration_ticks(mut self, ticks: usize) -> Self {
        self.duration_ticks = ticks;
        self
    }

    #[must_use]
    pub fn with_activity_log(mut self) -> Self {
        self.record_activity = true;
        self
    }

    /// Horizon length in hours.
    pub fn duration_hours(&self) -> f64 {
        self.duration_ticks as f64 * HOURS_PER_TICK
    }
}

/// State of one charger during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargerTickInfo {
    pub is_busy: bool,
    #[serde(rename = "powerDrawKW")]
    pub power_draw_kw: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ev_id: Option<EvId>,
}

/// Per-tick history of one charger; `ticks[t]` describes tick `t`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargerTrace {
    pub charger_id: ChargerId,
    pub ticks: Vec<ChargerTickInfo>,
}

/// Activity of every charger over the run, in charger order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChargerActivityLog {
    pub chargers: Vec<ChargerTrace>,
}

impl ChargerActivityLog {
    pub(crate) fn with_chargers(ids: impl IntoIterator<Item = ChargerId>, ticks: usize) -> Self {
        Self {
            chargers: ids
                .into_iter()
                .map(|charger_id| ChargerTrace {
                    charger_id,
                    ticks: Vec::with_capacity(ticks),
                })
                .collect(),
        }
    }

    /// Looks up one charger's state at `tick`.
    pub fn at(&self, charger: ChargerId, tick: Tick) -> Option<&ChargerTickInfo> {
        self.chargers
            .iter()
            .find(|trace| trace.charger_id == charger)
            .and_then(|trace| trace.ticks.get(tick))
    }
}

/// Aggregate output of one run, bound to the config that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub config: SimulationConfig,
    #[serde(rename = "totalEnergyConsumedKWh")]
    pub total_energy_consumed_kwh: f64,
    /// `num_chargers * charger_power_kw`.
    #[serde(rename = "theoreticalMaxPowerKW")]
    pub theoretical_max_power_kw: f64,
    /// Largest per-tick aggregate draw.
    #[serde(rename = "actualMaxPowerDemandKW")]
    pub actual_max_power_demand_kw: f64,
    /// `actual / theoretical`, or 0 when the theoretical maximum is 0.
    pub concurrency_factor: f64,
    /// Aggregate draw per tick; the index is the tick.
    #[serde(rename = "powerDemandPerTickKW")]
    pub power_demand_per_tick_kw: Vec<f64>,
    /// Occupied chargers per tick; the index is the tick.
    pub busy_chargers_per_tick: Vec<usize>,
    /// Sessions that started charging.
    pub total_charging_events: u64,
    /// Arrivals whose sampled demand was 0 kWh.
    pub arrivals_without_charge: u64,
    /// Arrivals with demand that found their charger busy.
    pub arrivals_turned_away: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charger_activity_log: Option<ChargerActivityLog>,
}

impl SimulationResult {
    /// Power drawn at `tick`, if inside the horizon.
    pub fn power_at(&self, tick: Tick) -> Option<f64> {
        self.power_demand_per_tick_kw.get(tick).copied()
    }

    /// `(tick, kW)` pairs in tick order.
    pub fn power_by_tick(&self) -> impl Iterator<Item = (Tick, f64)> + '_ {
        self.power_demand_per_tick_kw.iter().copied().enumerate()
    }

    /// First tick at which the peak draw was reached.
    pub fn peak_tick(&self) -> Option<Tick> {
        self.power_by_tick()
            .find(|&(_, kw)| kw == self.actual_max_power_demand_kw)
            .map(|(tick, _)| tick)
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Simulation Results ---")?;
        writeln!(
            f,
            "Chargers:              {} x {:.1} kW",
            self.config.num_chargers, self.config.charger_power_kw
        )?;
        writeln!(
            f,
            "Horizon:               {} ticks ({:.1} days)",
            self.config.duration_ticks,
            self.config.duration_ticks as f64 / TICKS_PER_DAY as f64
        )?;
        match self.config.rng_seed {
            Some(seed) => writeln!(f, "Seed:                  {seed}")?,
            None => writeln!(f, "Seed:                  none (non-reproducible)")?,
        }
        writeln!(
            f,
            "Total energy consumed: {:.2} kWh",
            self.total_energy_consumed_kwh
        )?;
        writeln!(
            f,
            "Theoretical max power: {:.2} kW",
            self.theoretical_max_power_kw
        )?;
        writeln!(
            f,
            "Actual max power:      {:.2} kW",
            self.actual_max_power_demand_kw
        )?;
        writeln!(
            f,
            "Concurrency factor:    {:.2}%",
            self.concurrency_factor * 100.0
        )?;
        writeln!(f, "Charging events:       {}", self.total_charging_events)?;
        writeln!(f, "Arrivals w/o charge:   {}", self.arrivals_without_charge)?;
        write!(f, "Arrivals turned away:  {}", self.arrivals_turned_away)
    }
}
