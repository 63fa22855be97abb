//! Pure transformations applied by the consumer.

/// Maps a raw reading to the value the consumer emits.
///
/// Implementations must be pure: the same input always gives the same output.
pub trait Transform: Send + 'static {
    /// Transforms one raw value.
    fn apply(&self, raw: f64) -> f64;
}

/// `y = gain * x + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    /// Multiplier applied to the raw value.
    pub gain: f64,
    /// Added after scaling.
    pub offset: f64,
}

impl LinearScale {
    /// Creates a scale with the given gain and offset.
    pub const fn new(gain: f64, offset: f64) -> Self {
        Self { gain, offset }
    }

    /// The identity transform.
    pub const fn identity() -> Self {
        Self::new(1.0, 0.0)
    }
}

impl Default for LinearScale {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform for LinearScale {
    #[inline]
    fn apply(&self, raw: f64) -> f64 {
        self.gain.mul_add(raw, self.offset)
    }
}
