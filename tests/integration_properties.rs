//! Property tests over seeds and small site configurations.

use proptest::prelude::*;

use ev_charge_sim::sim::rng::{Lcg, UniformSource};
use ev_charge_sim::sim::{self, SimulationConfig};

fn site() -> impl Strategy<Value = SimulationConfig> {
    (
        1usize..8,
        prop_oneof![Just(3.7), Just(11.0), Just(22.0), Just(50.0)],
        5.0f64..30.0,
        0.0f64..3.0,
        0usize..600,
        any::<u64>(),
    )
        .prop_map(|(chargers, power, consumption, multiplier, ticks, seed)| {
            let mut cfg = SimulationConfig::new(chargers, power)
                .with_seed(seed)
                .with_duration_ticks(ticks);
            cfg.ev_consumption_kwh_per_100km = consumption;
            cfg.arrival_probability_multiplier = multiplier;
            cfg
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn result_invariants_hold(cfg in site()) {
        let result = sim::run(&cfg);

        prop_assert_eq!(result.power_demand_per_tick_kw.len(), cfg.duration_ticks);
        prop_assert_eq!(result.busy_chargers_per_tick.len(), cfg.duration_ticks);

        let theoretical = cfg.num_chargers as f64 * cfg.charger_power_kw;
        prop_assert_eq!(result.theoretical_max_power_kw, theoretical);

        let max = result.power_demand_per_tick_kw.iter().copied().fold(0.0, f64::max);
        prop_assert_eq!(result.actual_max_power_demand_kw, max);
        prop_assert!(max <= theoretical + 1e-9);
        prop_assert!((0.0..=1.0 + 1e-12).contains(&result.concurrency_factor));

        let sum: f64 = result.power_demand_per_tick_kw.iter().sum();
        prop_assert!((result.total_energy_consumed_kwh - sum * 0.25).abs() <= 1e-6 * (1.0 + sum));

        for (&kw, &busy) in result.power_demand_per_tick_kw.iter().zip(&result.busy_chargers_per_tick) {
            prop_assert!(busy <= cfg.num_chargers);
            prop_assert!((kw - busy as f64 * cfg.charger_power_kw).abs() < 1e-6);
        }
    }

    #[test]
    fn seeded_runs_are_reproducible(cfg in site()) {
        prop_assert_eq!(sim::run(&cfg), sim::run(&cfg));
    }

    #[test]
    fn lcg_stays_in_unit_interval(seed in any::<u64>()) {
        let mut lcg = Lcg::new(seed);
        for _ in 0..256 {
            let x = lcg.next_unit();
            prop_assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn seeds_equal_mod_2_pow_32_share_a_stream(seed in any::<u32>(), high in 1u64..1000) {
        let mut a = Lcg::new(u64::from(seed));
        let mut b = Lcg::new(u64::from(seed) + (high << 32));
        for _ in 0..16 {
            prop_assert_eq!(a.next_unit(), b.next_unit());
        }
    }
}
