//! Value sources for the producer loop.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Something the producer can pull raw values from.
///
/// Any `FnMut() -> f64` closure is a source.
pub trait Source: Send + 'static {
    /// Produces the next raw value.
    fn next_value(&mut self) -> f64;
}

impl<F> Source for F
where
    F: FnMut() -> f64 + Send + 'static,
{
    fn next_value(&mut self) -> f64 {
        self()
    }
}

/// A simulated analog sensor.
///
/// Starts at the midpoint of `[min, max]` and drifts by a random step of at
/// most 5% of the range per reading, clamped to the range.
pub struct SimulatedSensor {
    rng: StdRng,
    min: f64,
    max: f64,
    step: f64,
    current: f64,
}

impl SimulatedSensor {
    /// Creates a sensor over `[min, max]`. With a seed the sequence of
    /// readings is reproducible.
    ///
    /// # Panics
    ///
    /// Panics if `min >= max` or either bound is not finite. [`Pipeline::start_simulated`](crate::Pipeline::start_simulated)
    /// validates its config first and reports a bad range as an error.
    pub fn new(min: f64, max: f64, seed: Option<u64>) -> Self {
        assert!(
            min.is_finite() && max.is_finite() && min < max,
            "invalid sensor range [{min}, {max}]"
        );

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            rng,
            min,
            max,
            step: (max - min) * 0.05,
            current: min + (max - min) / 2.0,
        }
    }
}

impl Source for SimulatedSensor {
    fn next_value(&mut self) -> f64 {
        let delta = self.rng.gen_range(-self.step..=self.step);
        self.current = (self.current + delta).clamp(self.min, self.max);
        self.current
    }
}
