//! Charging points, their occupancy, and the sessions that occupy them.

use std::fmt;

use serde::Serialize;

use super::clock::{TICKS_PER_HOUR, Tick};

/// Stable charger identity within one run, displayed as `charger-N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ChargerId(pub usize);

impl fmt::Display for ChargerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "charger-{}", self.0)
    }
}

/// EV identity within one run, displayed as `ev-N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EvId(pub u64);

impl fmt::Display for EvId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ev-{}", self.0)
    }
}

/// Occupancy state of a single charger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    Free,
    /// Held by `ev`; released exactly at `until_tick`.
    Occupied { ev: EvId, until_tick: Tick },
}

/// A charging session fixed entirely at arrival time.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargingSession {
    pub id: EvId,
    pub arrival_tick: Tick,
    pub charging_demand_kwh: f64,
    pub charger: ChargerId,
    /// `ceil(demand / power * 4)`.
    pub duration_ticks: usize,
    /// `arrival_tick + duration_ticks`.
    pub departure_tick: Tick,
}

impl ChargingSession {
    /// Plans a session for `demand_kwh` on a charger rated `power_kw`.
    ///
    /// `demand_kwh` must be positive, so the session lasts at least one tick.
    /// A zero-rated charger yields a session that never ends.
    pub fn plan(
        id: EvId,
        charger: ChargerId,
        arrival_tick: Tick,
        demand_kwh: f64,
        power_kw: f64,
    ) -> Self {
        let duration_ticks = (demand_kwh / power_kw * TICKS_PER_HOUR as f64).ceil() as usize;
        Self {
            id,
            arrival_tick,
            charging_demand_kwh: demand_kwh,
            charger,
            duration_ticks,
            departure_tick: arrival_tick.saturating_add(duration_ticks),
        }
    }
}

/// A single charging point.
#[derive(Debug, Clone)]
pub struct Charger {
    pub id: ChargerId,
    /// Rated power (kW), identical across the pool.
    pub power_kw: f64,
    occupancy: Occupancy,
}

impl Charger {
    pub fn new(id: ChargerId, power_kw: f64) -> Self {
        Self {
            id,
            power_kw,
            occupancy: Occupancy::Free,
        }
    }

    pub fn occupancy(&self) -> Occupancy {
        self.occupancy
    }

    pub fn is_available(&self) -> bool {
        self.occupancy == Occupancy::Free
    }

    /// The EV currently charging here, if any.
    pub fn current_ev(&self) -> Option<EvId> {
        match self.occupancy {
            Occupancy::Free => None,
            Occupancy::Occupied { ev, .. } => Some(ev),
        }
    }

    /// Tick at which the charger frees up, if occupied.
    pub fn occupied_until(&self) -> Option<Tick> {
        match self.occupancy {
            Occupancy::Free => None,
            Occupancy::Occupied { until_tick, .. } => Some(until_tick),
        }
    }

    /// Power drawn while occupied, 0 when free.
    pub fn power_draw_kw(&self) -> f64 {
        if self.is_available() { 0.0 } else { self.power_kw }
    }

    /// Frees the charger if its session ends at `tick`. Returns the departing EV.
    fn release_if_due(&mut self, tick: Tick) -> Option<EvId> {
        match self.occupancy {
            Occupancy::Occupied { ev, until_tick } if until_tick == tick => {
                self.occupancy = Occupancy::Free;
                Some(ev)
            }
            _ => None,
        }
    }
}

/// The run's chargers plus the per-run EV id counter.
///
/// Ids restart at zero for every pool, so concurrent runs never share
/// counters.
#[derive(Debug, Clone)]
pub struct ChargerPool {
    chargers: Vec<Charger>,
    next_ev_id: u64,
}

impl ChargerPool {
    /// Creates `count` free chargers rated `power_kw`, ids `0..count`.
    pub fn new(count: usize, power_kw: f64) -> Self {
        let chargers = (0..count)
            .map(|i| Charger::new(ChargerId(i), power_kw))
            .collect();
        Self {
            chargers,
            next_ev_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.chargers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chargers.is_empty()
    }

    pub fn chargers(&self) -> &[Charger] {
        &self.chargers
    }

    pub fn get(&self, index: usize) -> Option<&Charger> {
        self.chargers.get(index)
    }

    /// Frees every charger whose session ends at `tick`; returns how many.
    pub fn release_due(&mut self, tick: Tick) -> usize {
        self.chargers
            .iter_mut()
            .filter_map(|c| c.release_if_due(tick))
            .count()
    }

    /// Starts a session on charger `index` if it is free.
    ///
    /// Returns `None` without touching any state when the charger is busy,
    /// out of range, or `demand_kwh` is not positive. An EV id is only
    /// consumed when the session actually starts.
    pub fn try_start_session(
        &mut self,
        index: usize,
        tick: Tick,
        demand_kwh: f64,
    ) -> Option<ChargingSession> {
        if demand_kwh <= 0.0 {
            return None;
        }
        let charger = self.chargers.get_mut(index)?;
        if !charger.is_available() {
            return None;
        }

        let id = EvId(self.next_ev_id);
        self.next_ev_id += 1;

        let session = ChargingSession::plan(id, charger.id, tick, demand_kwh, charger.power_kw);
        charger.occupancy = Occupancy::Occupied {
            ev: id,
            until_tick: session.departure_tick,
        };
        Some(session)
    }

    /// Number of occupied chargers.
    pub fn busy_count(&self) -> usize {
        self.chargers.iter().filter(|c| !c.is_available()).count()
    }

    /// Aggregate power drawn by occupied chargers (kW).
    pub fn power_draw_kw(&self) -> f64 {
        self.chargers
            .iter()
            .fold(0.0, |total, c| total + c.power_draw_kw())
    }

    /// Number of sessions started so far in this pool.
    pub fn sessions_started(&self) -> u64 {
        self.next_ev_id
    }
}
