//! Fixed 15-minute tick clock and calendar helpers.

/// Index of a 15-minute simulation interval.
pub type Tick = usize;

/// Number of ticks in one clock hour.
pub const TICKS_PER_HOUR: usize = 4;

/// Number of ticks in one day.
pub const TICKS_PER_DAY: usize = 24 * TICKS_PER_HOUR;

/// Duration of one tick in hours.
pub const HOURS_PER_TICK: f64 = 0.25;

/// Position of a tick within the day (`0..96`).
pub fn tick_of_day(tick: Tick) -> usize {
    tick % TICKS_PER_DAY
}

/// Clock hour (`0..24`) a tick falls into.
pub fn hour_of_day(tick: Tick) -> usize {
    tick_of_day(tick) / TICKS_PER_HOUR
}

/// Zero-based day index a tick falls into.
pub fn day_of(tick: Tick) -> usize {
    tick / TICKS_PER_DAY
}

/// Formats the wall-clock start of a tick as `HH:MM`.
pub fn clock_time(tick: Tick) -> String {
    let minutes = tick_of_day(tick) * 15;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// A simulation clock that hands out ticks over a fixed horizon.
///
/// # Examples
///
/// ```
/// use ev_charge_sim::sim::clock::Clock;
///
/// let mut clock = Clock::new(3);
/// let mut ticks = Vec::new();
///
/// clock.run(|tick| ticks.push(tick));
/// assert_eq!(ticks, vec![0, 1, 2]);
/// ```
pub struct Clock {
    current: Tick,
    total: usize,
}

impl Clock {
    /// Creates a clock that will produce `total` ticks starting at zero.
    pub fn new(total: usize) -> Self {
        Self { current: 0, total }
    }

    /// Advances the clock by one tick.
    ///
    /// # Returns
    ///
    /// * `Some(tick)` - The tick to process, before advancing
    /// * `None` - If the horizon is exhausted
    pub fn tick(&mut self) -> Option<Tick> {
        if self.current < self.total {
            let tick = self.current;
            self.current += 1;
            Some(tick)
        } else {
            None
        }
    }

    /// Calls `f` for each remaining tick, in order.
    pub fn run(&mut self, mut f: impl FnMut(Tick)) {
        while let Some(tick) = self.tick() {
            f(tick);
        }
    }

    /// Number of ticks not yet handed out.
    pub fn remaining(&self) -> usize {
        self.total - self.current
    }
}
