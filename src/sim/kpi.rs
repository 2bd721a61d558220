//! Post-hoc KPI computation from a finished run.

use std::fmt;
use std::ops::RangeInclusive;

use serde::Serialize;

use super::clock::{TICKS_PER_DAY, Tick, clock_time};
use super::types::SimulationResult;

/// Peak-power band (kW) expected for the 20 x 11 kW reference site.
pub const REFERENCE_PEAK_KW: RangeInclusive<f64> = 77.0..=121.0;

/// Concurrency-factor band expected for the 20 x 11 kW reference site.
pub const REFERENCE_CONCURRENCY: RangeInclusive<f64> = 0.35..=0.55;

/// Aggregate indicators derived from a [`SimulationResult`].
///
/// Computed after the run so that the reported numbers always agree with
/// the per-tick series.
#[derive(Debug, Clone, Serialize)]
pub struct ChargingKpis {
    /// Mean aggregate draw over the horizon (kW).
    pub average_power_kw: f64,
    /// Busy charger-ticks divided by total charger-ticks.
    pub charger_utilization: f64,
    /// Charging sessions started per simulated day.
    pub charging_events_per_day: f64,
    /// Energy delivered per charger (kWh).
    pub energy_per_charger_kwh: f64,
    /// Mean energy per charging session (kWh).
    pub energy_per_event_kwh: f64,
    /// Share of demand-carrying arrivals that found their charger busy.
    pub turned_away_share: f64,
    /// First tick at which the peak was reached.
    pub peak_tick: Option<Tick>,
    pub actual_max_power_demand_kw: f64,
    pub concurrency_factor: f64,
}

impl ChargingKpis {
    pub fn from_result(result: &SimulationResult) -> Self {
        let ticks = result.power_demand_per_tick_kw.len();
        let chargers = result.config.num_chargers;

        let average_power_kw = if ticks > 0 {
            result.power_demand_per_tick_kw.iter().sum::<f64>() / ticks as f64
        } else {
            0.0
        };

        let charger_ticks = ticks * chargers;
        let charger_utilization = if charger_ticks > 0 {
            result.busy_chargers_per_tick.iter().sum::<usize>() as f64 / charger_ticks as f64
        } else {
            0.0
        };

        let days = ticks as f64 / TICKS_PER_DAY as f64;
        let charging_events_per_day = if days > 0.0 {
            result.total_charging_events as f64 / days
        } else {
            0.0
        };

        let energy_per_charger_kwh = if chargers > 0 {
            result.total_energy_consumed_kwh / chargers as f64
        } else {
            0.0
        };

        let energy_per_event_kwh = if result.total_charging_events > 0 {
            result.total_energy_consumed_kwh / result.total_charging_events as f64
        } else {
            0.0
        };

        let with_demand = result.total_charging_events + result.arrivals_turned_away;
        let turned_away_share = if with_demand > 0 {
            result.arrivals_turned_away as f64 / with_demand as f64
        } else {
            0.0
        };

        Self {
            average_power_kw,
            charger_utilization,
            charging_events_per_day,
            energy_per_charger_kwh,
            energy_per_event_kwh,
            turned_away_share,
            peak_tick: result.peak_tick(),
            actual_max_power_demand_kw: result.actual_max_power_demand_kw,
            concurrency_factor: result.concurrency_factor,
        }
    }

    /// Whether peak and concurrency both sit inside the reference bands.
    pub fn within_reference_range(&self) -> bool {
        REFERENCE_PEAK_KW.contains(&self.actual_max_power_demand_kw)
            && REFERENCE_CONCURRENCY.contains(&self.concurrency_factor)
    }
}

impl fmt::Display for ChargingKpis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- KPI Report ---")?;
        writeln!(f, "Average power:         {:.2} kW", self.average_power_kw)?;
        writeln!(
            f,
            "Charger utilization:   {:.2}%",
            self.charger_utilization * 100.0
        )?;
        writeln!(
            f,
            "Events per day:        {:.2}",
            self.charging_events_per_day
        )?;
        writeln!(
            f,
            "Energy per charger:    {:.2} kWh",
            self.energy_per_charger_kwh
        )?;
        writeln!(
            f,
            "Energy per event:      {:.2} kWh",
            self.energy_per_event_kwh
        )?;
        writeln!(
            f,
            "Turned away:           {:.2}%",
            self.turned_away_share * 100.0
        )?;
        match self.peak_tick {
            Some(tick) => write!(
                f,
                "Peak reached:          tick {tick} (day {}, {})",
                tick / TICKS_PER_DAY,
                clock_time(tick)
            ),
            None => write!(f, "Peak reached:          n/a"),
        }
    }
}
