//! Time-of-day EV arrival probabilities.

use super::clock::{TICKS_PER_HOUR, Tick, hour_of_day};

/// Probability of an arrival at one charger within each clock hour.
pub const DEFAULT_HOURLY_PROBABILITIES: [f64; 24] = [
    0.0094, 0.0094, 0.0094, 0.0094, 0.0094, 0.0094, 0.0094, 0.0094, // 00-08
    0.0283, 0.0283, // 08-10
    0.0566, 0.0566, 0.0566, // 10-13
    0.0755, 0.0755, 0.0755, // 13-16
    0.1038, 0.1038, 0.1038, // 16-19
    0.0472, 0.0472, 0.0472, // 19-22
    0.0094, 0.0094, // 22-24
];

/// Hour-indexed arrival profile for a single charger.
///
/// Hourly values are spread uniformly over the four ticks of the hour, so a
/// tick sees one quarter of the hourly probability.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalProfile {
    hourly: [f64; 24],
}

impl ArrivalProfile {
    /// Creates a profile from 24 hourly probabilities.
    pub fn new(hourly: [f64; 24]) -> Self {
        Self { hourly }
    }

    /// Probability that one specific charger receives an arrival during `tick`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ev_charge_sim::sim::arrival::ArrivalProfile;
    ///
    /// let profile = ArrivalProfile::default();
    /// assert_eq!(profile.probability_at(0), 0.0094 / 4.0);
    /// assert_eq!(profile.probability_at(96), profile.probability_at(0));
    /// ```
    pub fn probability_at(&self, tick: Tick) -> f64 {
        self.hourly[hour_of_day(tick)] / TICKS_PER_HOUR as f64
    }

    /// The hourly base values.
    pub fn hourly(&self) -> &[f64; 24] {
        &self.hourly
    }

    /// Expected arrivals at one always-free charger over a full day.
    pub fn expected_daily_arrivals(&self) -> f64 {
        self.hourly.iter().sum()
    }
}

impl Default for ArrivalProfile {
    fn default() -> Self {
        Self::new(DEFAULT_HOURLY_PROBABILITIES)
    }
}
