//! Uniform random sources driving arrival and demand draws.
//!
//! Seeded runs use a 32-bit linear congruential generator so that a seed
//! reproduces the same sequence on every platform. Unseeded runs fall back
//! to an OS-seeded `StdRng`; their output is statistically valid but not
//! reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// LCG multiplier (Numerical Recipes).
const LCG_MULTIPLIER: u32 = 1_664_525;
/// LCG increment (Numerical Recipes).
const LCG_INCREMENT: u32 = 1_013_904_223;
/// LCG modulus, 2^32, as a float divisor.
const LCG_MODULUS: f64 = 4_294_967_296.0;

/// A stateful source of uniform values in `[0, 1)`.
pub trait UniformSource {
    /// Returns the next value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

/// Linear congruential generator: `state = (a * state + c) mod 2^32`.
///
/// # Examples
///
/// ```
/// use ev_charge_sim::sim::rng::{Lcg, UniformSource};
///
/// let mut a = Lcg::new(12345);
/// let mut b = Lcg::new(12345);
/// assert_eq!(a.next_unit(), b.next_unit());
/// ```
#[derive(Debug, Clone)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    /// Creates a generator from `seed`. Only the low 32 bits matter, which is
    /// the same as reducing the seed mod 2^32.
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed as u32,
        }
    }
}

impl UniformSource for Lcg {
    fn next_unit(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        f64::from(self.state) / LCG_MODULUS
    }
}

impl UniformSource for StdRng {
    fn next_unit(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// The random source a single run draws from.
#[derive(Debug, Clone)]
pub enum RandomSource {
    /// Reproducible LCG stream.
    Seeded(Lcg),
    /// OS-seeded stream, different on every run.
    Entropy(StdRng),
}

impl RandomSource {
    /// Seeded LCG when `seed` is present, OS entropy otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::Seeded(Lcg::new(seed)),
            None => Self::Entropy(StdRng::from_os_rng()),
        }
    }

    /// Returns `true` when the stream is reproducible.
    pub fn is_deterministic(&self) -> bool {
        matches!(self, Self::Seeded(_))
    }
}

impl UniformSource for RandomSource {
    fn next_unit(&mut self) -> f64 {
        match self {
            Self::Seeded(lcg) => lcg.next_unit(),
            Self::Entropy(rng) => rng.next_unit(),
        }
    }
}
