//! Fixed-timestep engine that drives charger occupancy and metering.

use tracing::{debug, info, trace};

use super::arrival::ArrivalProfile;
use super::charger::ChargerPool;
use super::clock::{Clock, HOURS_PER_TICK, Tick};
use super::demand::DemandDistribution;
use super::rng::{RandomSource, UniformSource};
use super::types::{ChargerActivityLog, ChargerTickInfo, SimulationConfig, SimulationResult};

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub tick: Tick,
    /// Sessions that ended at the start of this tick.
    pub released: usize,
    /// Sessions that started during this tick.
    pub started: usize,
    /// Arrival rolls that sampled zero demand.
    pub without_charge: usize,
    /// Arrival rolls with demand that hit a busy charger.
    pub turned_away: usize,
    /// Occupied chargers after the arrival phase.
    pub busy_chargers: usize,
    /// Aggregate draw after the arrival phase (kW).
    pub power_kw: f64,
}

/// Running power and energy totals.
#[derive(Debug, Clone, Default)]
struct Meter {
    power_per_tick_kw: Vec<f64>,
    busy_per_tick: Vec<usize>,
    max_power_kw: f64,
    energy_kwh: f64,
}

impl Meter {
    fn with_capacity(ticks: usize) -> Self {
        Self {
            power_per_tick_kw: Vec::with_capacity(ticks),
            busy_per_tick: Vec::with_capacity(ticks),
            ..Self::default()
        }
    }

    fn record(&mut self, power_kw: f64, busy: usize) {
        self.power_per_tick_kw.push(power_kw);
        self.busy_per_tick.push(busy);
        self.max_power_kw = self.max_power_kw.max(power_kw);
        self.energy_kwh += power_kw * HOURS_PER_TICK;
    }
}

/// Simulation engine owning the charger pool, random source, and tables for
/// one run.
///
/// Each engine is single-use: [`Engine::run`] consumes it, so id counters
/// and random state can never leak into another run.
pub struct Engine {
    config: SimulationConfig,
    arrivals: ArrivalProfile,
    demand: DemandDistribution,
    rng: RandomSource,
    pool: ChargerPool,
    meter: Meter,
    activity: Option<ChargerActivityLog>,
    charging_events: u64,
    without_charge: u64,
    turned_away: u64,
}

impl Engine {
    /// Creates an engine with the default arrival and demand tables.
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_tables(
            config,
            ArrivalProfile::default(),
            DemandDistribution::default(),
        )
    }

    /// Creates an engine with explicit arrival and demand tables.
    pub fn with_tables(
        config: SimulationConfig,
        arrivals: ArrivalProfile,
        demand: DemandDistribution,
    ) -> Self {
        let rng = RandomSource::from_seed(config.rng_seed);
        Self::with_source(config, arrivals, demand, rng)
    }

    /// Creates an engine drawing from a caller-supplied random source.
    pub fn with_source(
        config: SimulationConfig,
        arrivals: ArrivalProfile,
        demand: DemandDistribution,
        rng: RandomSource,
    ) -> Self {
        let pool = ChargerPool::new(config.num_chargers, config.charger_power_kw);
        let activity = config.record_activity.then(|| {
            ChargerActivityLog::with_chargers(
                pool.chargers().iter().map(|c| c.id),
                config.duration_ticks,
            )
        });
        Self {
            meter: Meter::with_capacity(config.duration_ticks),
            config,
            arrivals,
            demand,
            rng,
            pool,
            activity,
            charging_events: 0,
            without_charge: 0,
            turned_away: 0,
        }
    }

    /// Advances the simulation through tick `t`.
    ///
    /// Ticks must be stepped in order starting at zero; [`Engine::run`] does
    /// this for the whole horizon.
    pub fn step(&mut self, t: Tick) -> TickReport {
        let mut report = TickReport {
            tick: t,
            ..TickReport::default()
        };

        // 1. Release sessions ending now
        report.released = self.pool.release_due(t);

        // 2. One arrival roll per charger, in index order
        let p = self.arrivals.probability_at(t) * self.config.arrival_probability_multiplier;
        for index in 0..self.pool.len() {
            if self.rng.next_unit() >= p {
                continue;
            }
            let demand_kwh = self
                .demand
                .sample_kwh(self.config.ev_consumption_kwh_per_100km, &mut self.rng);
            if demand_kwh <= 0.0 {
                report.without_charge += 1;
                continue;
            }
            match self.pool.try_start_session(index, t, demand_kwh) {
                Some(session) => {
                    trace!(
                        tick = t,
                        ev = %session.id,
                        charger = %session.charger,
                        demand_kwh = session.charging_demand_kwh,
                        departure_tick = session.departure_tick,
                        "session started"
                    );
                    report.started += 1;
                }
                None => {
                    trace!(tick = t, charger = index, demand_kwh, "arrival turned away");
                    report.turned_away += 1;
                }
            }
        }

        // 3. Metering
        report.power_kw = self.pool.power_draw_kw();
        report.busy_chargers = self.pool.busy_count();
        self.meter.record(report.power_kw, report.busy_chargers);

        if let Some(log) = &mut self.activity {
            for (history, charger) in log.chargers.iter_mut().zip(self.pool.chargers()) {
                history.ticks.push(ChargerTickInfo {
                    is_busy: !charger.is_available(),
                    power_draw_kw: charger.power_draw_kw(),
                    ev_id: charger.current_ev(),
                });
            }
        }

        self.charging_events += report.started as u64;
        self.without_charge += report.without_charge as u64;
        self.turned_away += report.turned_away as u64;
        report
    }

    /// Runs the full horizon and returns the aggregated result.
    pub fn run(mut self) -> SimulationResult {
        debug!(
            chargers = self.config.num_chargers,
            power_kw = self.config.charger_power_kw,
            ticks = self.config.duration_ticks,
            seed = ?self.config.rng_seed,
            deterministic = self.rng.is_deterministic(),
            "simulation starting"
        );

        let mut clock = Clock::new(self.config.duration_ticks);
        clock.run(|t| {
            self.step(t);
        });

        let result = self.finish();
        info!(
            energy_kwh = result.total_energy_consumed_kwh,
            max_power_kw = result.actual_max_power_demand_kw,
            concurrency_factor = result.concurrency_factor,
            charging_events = result.total_charging_events,
            turned_away = result.arrivals_turned_away,
            "simulation finished"
        );
        result
    }

    fn finish(self) -> SimulationResult {
        let theoretical_max_power_kw =
            self.config.num_chargers as f64 * self.config.charger_power_kw;
        let concurrency_factor = if theoretical_max_power_kw > 0.0 {
            self.meter.max_power_kw / theoretical_max_power_kw
        } else {
            0.0
        };

        SimulationResult {
            config: self.config,
            total_energy_consumed_kwh: self.meter.energy_kwh,
            theoretical_max_power_kw,
            actual_max_power_demand_kw: self.meter.max_power_kw,
            concurrency_factor,
            power_demand_per_tick_kw: self.meter.power_per_tick_kw,
            busy_chargers_per_tick: self.meter.busy_per_tick,
            total_charging_events: self.charging_events,
            arrivals_without_charge: self.without_charge,
            arrivals_turned_away: self.turned_away,
            charger_activity_log: self.activity,
        }
    }

    /// The charger pool, for inspection between steps.
    pub fn pool(&self) -> &ChargerPool {
        &self.pool
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::demand::DemandBucket;

    fn always_arrive() -> ArrivalProfile {
        ArrivalProfile::new([4.0; 24])
    }

    fn fixed_range(km: f64) -> DemandDistribution {
        DemandDistribution::new(vec![DemandBucket {
            range_km: Some(km),
            probability: 1.0,
        }])
    }

    #[test]
    fn certain_arrivals_fill_every_charger() {
        // 100 km at 18 kWh/100km on 18 kW = exactly 4 ticks
        let cfg = SimulationConfig::new(3, 18.0)
            .with_seed(1)
            .with_duration_ticks(10);
        let mut engine = Engine::with_tables(cfg, always_arrive(), fixed_range(100.0));

        let r0 = engine.step(0);
        assert_eq!(r0.started, 3);
        assert_eq!(r0.busy_chargers, 3);
        assert_eq!(r0.power_kw, 54.0);

        for t in 1..4 {
            let r = engine.step(t);
            assert_eq!(r.started, 0);
            assert_eq!(r.turned_away, 3);
        }

        let r4 = engine.step(4);
        assert_eq!(r4.released, 3);
        assert_eq!(r4.started, 3);
        assert_eq!(r4.busy_chargers, 3);
        assert_eq!(engine.pool().busy_count(), 3);
        assert_eq!(engine.pool().sessions_started(), 6);
        assert_eq!(engine.pool().get(0).and_then(|c| c.occupied_until()), Some(8));
        assert_eq!(engine.config().num_chargers, 3);
    }

    #[test]
    fn released_charger_is_free_for_same_tick_arrival() {
        let cfg = SimulationConfig::new(1, 18.0)
            .with_seed(3)
            .with_duration_ticks(8);
        let result = Engine::with_tables(cfg, always_arrive(), fixed_range(100.0)).run();
        // sessions start at ticks 0 and 4, the charger is never idle
        assert_eq!(result.total_charging_events, 2);
        assert!(result.power_demand_per_tick_kw.iter().all(|&kw| kw == 18.0));
        assert_eq!(result.arrivals_turned_away, 6);
    }

    #[test]
    fn zero_multiplier_means_no_arrivals() {
        let mut cfg = SimulationConfig::new(5, 11.0)
            .with_seed(9)
            .with_duration_ticks(96);
        cfg.arrival_probability_multiplier = 0.0;
        let result = Engine::new(cfg).run();
        assert_eq!(result.total_charging_events, 0);
        assert_eq!(result.total_energy_consumed_kwh, 0.0);
        assert_eq!(result.actual_max_power_demand_kw, 0.0);
        assert_eq!(result.theoretical_max_power_kw, 55.0);
        assert_eq!(result.concurrency_factor, 0.0);
    }

    #[test]
    fn zero_demand_table_never_occupies() {
        let cfg = SimulationConfig::new(2, 11.0)
            .with_seed(5)
            .with_duration_ticks(20);
        let no_charge = DemandDistribution::new(vec![DemandBucket {
            range_km: None,
            probability: 1.0,
        }]);
        let result = Engine::with_tables(cfg, always_arrive(), no_charge).run();
        assert_eq!(result.total_charging_events, 0);
        assert_eq!(result.arrivals_without_charge, 40);
        assert_eq!(result.arrivals_turned_away, 0);
    }

    #[test]
    fn zero_chargers_degenerates() {
        let cfg = SimulationConfig::new(0, 11.0)
            .with_seed(1)
            .with_duration_ticks(96);
        let result = Engine::new(cfg).run();
        assert_eq!(result.theoretical_max_power_kw, 0.0);
        assert_eq!(result.concurrency_factor, 0.0);
        assert_eq!(result.total_charging_events, 0);
        assert_eq!(result.power_demand_per_tick_kw, vec![0.0; 96]);
    }

    #[test]
    fn zero_duration_degenerates() {
        let cfg = SimulationConfig::new(4, 11.0)
            .with_seed(1)
            .with_duration_ticks(0);
        let result = Engine::new(cfg).run();
        assert!(result.power_demand_per_tick_kw.is_empty());
        assert_eq!(result.actual_max_power_demand_kw, 0.0);
        assert_eq!(result.theoretical_max_power_kw, 44.0);
        assert_eq!(result.concurrency_factor, 0.0);
    }

    #[test]
    fn zero_power_guards_division() {
        let cfg = SimulationConfig::new(3, 0.0)
            .with_seed(11)
            .with_duration_ticks(200);
        let result = Engine::new(cfg).run();
        assert_eq!(result.theoretical_max_power_kw, 0.0);
        assert_eq!(result.concurrency_factor, 0.0);
        assert_eq!(result.total_energy_consumed_kwh, 0.0);
    }

    #[test]
    fn activity_log_tracks_every_charger_and_tick() {
        let cfg = SimulationConfig::new(2, 18.0)
            .with_seed(1)
            .with_duration_ticks(6)
            .with_activity_log();
        let result = Engine::with_tables(cfg, always_arrive(), fixed_range(100.0)).run();
        let log = result.charger_activity_log.as_ref().unwrap();
        assert_eq!(log.chargers.len(), 2);
        for trace in &log.chargers {
            assert_eq!(trace.ticks.len(), 6);
            assert!(trace.ticks.iter().all(|i| i.is_busy && i.power_draw_kw == 18.0));
        }
        // charger-0 gets ev-0 then, at tick 4, ev-2
        let ev_at = |t: usize| log.chargers[0].ticks[t].ev_id.map(|id| id.0);
        assert_eq!(ev_at(0), Some(0));
        assert_eq!(ev_at(3), Some(0));
        assert_eq!(ev_at(4), Some(2));
    }

    #[test]
    fn activity_log_absent_by_default() {
        let cfg = SimulationConfig::new(2, 11.0)
            .with_seed(1)
            .with_duration_ticks(4);
        assert!(Engine::new(cfg).run().charger_activity_log.is_none());
    }
}
