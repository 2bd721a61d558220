//! Discrete charging-demand distribution for arriving EVs.

use super::rng::UniformSource;

/// One outcome of the demand distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemandBucket {
    /// Range to recharge in km, or `None` when the EV does not charge.
    pub range_km: Option<f64>,
    /// Probability of this outcome.
    pub probability: f64,
}

impl DemandBucket {
    const fn none(probability: f64) -> Self {
        Self {
            range_km: None,
            probability,
        }
    }

    const fn km(range_km: f64, probability: f64) -> Self {
        Self {
            range_km: Some(range_km),
            probability,
        }
    }

    /// Energy requested for this outcome at the given consumption rate.
    pub fn energy_kwh(&self, consumption_kwh_per_100km: f64) -> f64 {
        self.range_km
            .map_or(0.0, |km| km / 100.0 * consumption_kwh_per_100km)
    }
}

/// Default outcome table. Probabilities sum to 0.9997; draws above the final
/// cumulative value fall back to "no charge".
pub const DEFAULT_DEMAND_BUCKETS: [DemandBucket; 9] = [
    DemandBucket::none(0.3431),
    DemandBucket::km(5.0, 0.0490),
    DemandBucket::km(10.0, 0.0980),
    DemandBucket::km(20.0, 0.1176),
    DemandBucket::km(30.0, 0.0882),
    DemandBucket::km(50.0, 0.1176),
    DemandBucket::km(100.0, 0.1078),
    DemandBucket::km(200.0, 0.0490),
    DemandBucket::km(300.0, 0.0294),
];

/// Ordered table of demand outcomes sampled by cumulative-probability inversion.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandDistribution {
    buckets: Vec<DemandBucket>,
}

impl DemandDistribution {
    /// Creates a distribution from buckets in sampling order.
    pub fn new(buckets: Vec<DemandBucket>) -> Self {
        Self { buckets }
    }

    /// Draws one value from `source` and returns the requested energy in kWh.
    ///
    /// The first bucket whose cumulative probability is `>=` the draw wins.
    /// A draw beyond the last cumulative value yields 0 kWh.
    ///
    /// # Examples
    ///
    /// ```
    /// use ev_charge_sim::sim::demand::DemandDistribution;
    /// use ev_charge_sim::sim::rng::Lcg;
    ///
    /// let demand = DemandDistribution::default();
    /// let kwh = demand.sample_kwh(18.0, &mut Lcg::new(1));
    /// assert!(kwh >= 0.0);
    /// ```
    pub fn sample_kwh(&self, consumption_kwh_per_100km: f64, source: &mut impl UniformSource) -> f64 {
        let draw = source.next_unit();
        let mut cumulative = 0.0;
        for bucket in &self.buckets {
            cumulative += bucket.probability;
            if draw <= cumulative {
                return bucket.energy_kwh(consumption_kwh_per_100km);
            }
        }
        0.0
    }

    /// Probability of a zero-energy outcome, including the fallback mass.
    pub fn no_charge_probability(&self) -> f64 {
        let explicit: f64 = self
            .buckets
            .iter()
            .filter(|b| b.range_km.is_none())
            .map(|b| b.probability)
            .sum();
        explicit + (1.0 - self.total_probability()).max(0.0)
    }

    /// Sum of all bucket probabilities.
    pub fn total_probability(&self) -> f64 {
        self.buckets.iter().map(|b| b.probability).sum()
    }

    /// Mean requested energy in kWh at the given consumption rate.
    pub fn expected_kwh(&self, consumption_kwh_per_100km: f64) -> f64 {
        self.buckets
            .iter()
            .map(|b| b.probability * b.energy_kwh(consumption_kwh_per_100km))
            .sum()
    }

    /// Buckets in sampling order.
    pub fn buckets(&self) -> &[DemandBucket] {
        &self.buckets
    }
}

impl Default for DemandDistribution {
    fn default() -> Self {
        Self::new(DEFAULT_DEMAND_BUCKETS.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    /// Replays a fixed list of draws.
    struct Fixed(Vec<f64>);

    impl UniformSource for Fixed {
        fn next_unit(&mut self) -> f64 {
            self.0.remove(0)
        }
    }

    #[test]
    fn boundary_draw_belongs_to_lower_bucket() {
        let demand = DemandDistribution::default();
        assert_eq!(demand.sample_kwh(18.0, &mut Fixed(vec![0.0])), 0.0);
        assert_eq!(demand.sample_kwh(18.0, &mut Fixed(vec![0.3431])), 0.0);
        assert_eq!(demand.sample_kwh(18.0, &mut Fixed(vec![0.3432])), 0.9);
    }

    #[test]
    fn longest_range_bucket() {
        let demand = DemandDistribution::default();
        let kwh = demand.sample_kwh(18.0, &mut Fixed(vec![0.999]));
        assert!((kwh - 54.0).abs() < 1e-9);
    }

    #[test]
    fn draw_past_table_falls_back_to_no_charge() {
        let demand = DemandDistribution::default();
        assert_eq!(demand.sample_kwh(18.0, &mut Fixed(vec![0.99985])), 0.0);
    }

    #[test]
    fn consumes_exactly_one_draw() {
        let demand = DemandDistribution::default();
        let mut source = Fixed(vec![0.5, 0.25]);
        demand.sample_kwh(18.0, &mut source);
        assert_eq!(source.0, vec![0.25]);
    }

    #[test]
    fn default_table_starts_with_no_charge_bucket() {
        let demand = DemandDistribution::default();
        let buckets = demand.buckets();
        assert_eq!(buckets.len(), DEFAULT_DEMAND_BUCKETS.len());
        assert_eq!(buckets[0].range_km, None);
        assert!(buckets[1..].iter().all(|b| b.range_km.is_some()));
    }

    #[test]
    fn table_sums_short_of_one() {
        let demand = DemandDistribution::default();
        assert!((demand.total_probability() - 0.9997).abs() < 1e-9);
        assert!((demand.no_charge_probability() - 0.3434).abs() < 1e-9);
    }

    #[test]
    fn energy_scales_with_consumption() {
        let bucket = DemandBucket::km(100.0, 1.0);
        assert_eq!(bucket.energy_kwh(18.0), 18.0);
        assert_eq!(bucket.energy_kwh(7.0), 7.0);
        assert_eq!(DemandBucket::none(1.0).energy_kwh(18.0), 0.0);
    }

    #[test]
    fn empirical_no_charge_fraction_matches_table() {
        let demand = DemandDistribution::default();
        let mut rng = StdRng::seed_from_u64(2024);
        let n = 100_000;
        let zeros = (0..n)
            .filter(|_| demand.sample_kwh(18.0, &mut rng) == 0.0)
            .count();
        let fraction = zeros as f64 / n as f64;
        assert!(
            (fraction - 0.3431).abs() < 0.02,
            "no-charge fraction {fraction} too far from 0.3431"
        );
    }

    #[test]
    fn expected_energy_for_reference_consumption() {
        let demand = DemandDistribution::default();
        // 41.503 km mean range at 18 kWh/100km
        assert!((demand.expected_kwh(18.0) - 7.47054).abs() < 1e-9);
    }
}
