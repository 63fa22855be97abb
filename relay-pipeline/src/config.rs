//! Pipeline configuration: defaults, TOML loading and validation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Errors from loading or validating a [`PipelineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`PipelineConfig`], including
    /// unknown keys.
    #[error("failed to parse config file {}", path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// `capacity` is 0.
    #[error("queue capacity must be at least 1")]
    ZeroCapacity,

    /// `sensor_min` is not below `sensor_max`, or either is not finite.
    #[error("sensor range [{min}, {max}] is empty or not finite")]
    SensorRange {
        /// Configured lower bound.
        min: f64,
        /// Configured upper bound.
        max: f64,
    },

    /// A scaling parameter is NaN or infinite.
    #[error("{field} must be finite, got {value}")]
    NotFinite {
        /// Name of the offending field.
        field: &'static str,
        /// Its value.
        value: f64,
    },

    /// `run_for_secs` is not positive, not finite, or too large for a
    /// `Duration`.
    #[error("run_for_secs must be a positive, representable number of seconds, got {0}")]
    RunFor(f64),
}

/// Everything needed to start a [`Pipeline`](crate::Pipeline).
///
/// The defaults reproduce the reference behavior: a 10-slot queue, a reading
/// produced every 500ms and consumed every 1000ms, so the queue fills up and
/// the producer ends up paced by the consumer.
///
/// ```toml
/// capacity = 10
/// produce_interval_ms = 500
/// consume_interval_ms = 1000
/// gain = 1.8
/// offset = 32.0
/// seed = 7
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Queue capacity, at least 1.
    pub capacity: usize,
    /// Pause after each produced reading, in milliseconds.
    pub produce_interval_ms: u64,
    /// Pause after each consumed reading, in milliseconds.
    pub consume_interval_ms: u64,
    /// Multiplier applied by the consumer's [`LinearScale`](crate::LinearScale).
    pub gain: f64,
    /// Added after scaling.
    pub offset: f64,
    /// Lower bound of the simulated sensor.
    pub sensor_min: f64,
    /// Upper bound of the simulated sensor.
    pub sensor_max: f64,
    /// Seed for the simulated sensor; entropy when unset.
    pub seed: Option<u64>,
    /// Stop producing after this many readings.
    pub count: Option<u64>,
    /// Trigger shutdown after this many seconds.
    pub run_for_secs: Option<f64>,
    /// Keep consuming what is queued after shutdown instead of abandoning it.
    pub drain_on_shutdown: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            capacity: 10,
            produce_interval_ms: 500,
            consume_interval_ms: 1000,
            gain: 1.0,
            offset: 0.0,
            sensor_min: 0.0,
            sensor_max: 100.0,
            seed: None,
            count: None,
            run_for_secs: None,
            drain_on_shutdown: true,
        }
    }
}

impl PipelineConfig {
    /// Loads a config from a TOML file. Missing keys take their defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    /// Checks the values that would otherwise fail later, deeper in the
    /// pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        let (min, max) = (self.sensor_min, self.sensor_max);
        if !(min.is_finite() && max.is_finite() && min < max) {
            return Err(ConfigError::SensorRange { min, max });
        }

        for (field, value) in [("gain", self.gain), ("offset", self.offset)] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }

        if let Some(secs) = self.run_for_secs {
            if !(secs > 0.0 && Duration::try_from_secs_f64(secs).is_ok()) {
                return Err(ConfigError::RunFor(secs));
            }
        }

        Ok(())
    }

    /// [`produce_interval_ms`](Self::produce_interval_ms) as a `Duration`.
    pub fn produce_interval(&self) -> Duration {
        Duration::from_millis(self.produce_interval_ms)
    }

    /// [`consume_interval_ms`](Self::consume_interval_ms) as a `Duration`.
    pub fn consume_interval(&self) -> Duration {
        Duration::from_millis(self.consume_interval_ms)
    }

    /// Wall-clock budget, if any. `None` also for a value that
    /// [`validate`](Self::validate) rejects.
    pub fn run_for(&self) -> Option<Duration> {
        self.run_for_secs
            .filter(|secs| *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}
