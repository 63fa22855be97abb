//! Producer and consumer loops around a [`relay_queue::BoundedQueue`].
//!
//! A [`Pipeline`] owns one queue, one producer thread and one consumer
//! thread:
//!
//! ```text
//!  Source ──► producer ──put──► BoundedQueue<Reading> ──take──► consumer ──► Transform ──► Sink
//!                 │                                                │
//!                 └──────── sleep(interval) / Shutdown ────────────┘
//! ```
//!
//! The producer pulls a value from its [`Source`], stamps it with a sequence
//! number and blocks in `put` while the queue is full. The consumer blocks in
//! `take` while it is empty, applies a [`Transform`] and hands the result to a
//! [`Sink`]. Both pause for their configured interval between iterations.
//!
//! Shutdown is a [`Shutdown`] signal. Triggering it cuts short any pause and
//! closes the queue, which releases a worker blocked inside `put` or `take`.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use relay_pipeline::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::default();
//! let pipeline = Pipeline::start_simulated(&config).unwrap();
//!
//! pipeline.shutdown_handle().sleep(Duration::from_secs(30));
//! pipeline.shutdown();
//!
//! let report = pipeline.join().unwrap();
//! println!("{report}");
//! ```

#![warn(missing_docs)]

mod config;
mod filter;
mod pipeline;
mod sensor;
mod shutdown;
mod sink;
mod worker;

pub use config::{ConfigError, PipelineConfig};
pub use filter::{LinearScale, Transform};
pub use pipeline::{Pipeline, PipelineError, PipelineReport};
pub use sensor::{SimulatedSensor, Source};
pub use shutdown::Shutdown;
pub use sink::{LogSink, Sample, Sink};
pub use worker::Reading;
