//! The producer and consumer loops.
//!
//! Both loops share nothing but the queue and the shutdown signal. Neither
//! holds the queue lock while logging or sleeping; the lock is only held
//! inside `put`/`take`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use hdrhistogram::Histogram;
use log::{debug, info};
use relay_queue::{BoundedQueue, PutError, TakeError};

use crate::filter::Transform;
use crate::sensor::Source;
use crate::shutdown::Shutdown;
use crate::sink::{Sample, Sink};

/// A raw value stamped with its production order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Position in the producer's output, starting at 0.
    pub seq: u64,
    /// The value the source produced.
    pub raw: f64,
}

/// Producer blocked time above this is logged.
const SLOW_PUT: Duration = Duration::from_millis(1);

pub(crate) struct ProducerReport {
    pub(crate) produced: u64,
    /// Microseconds spent inside `put` per reading.
    pub(crate) blocked_us: Histogram<u64>,
}

pub(crate) struct Producer<S> {
    pub(crate) queue: Arc<BoundedQueue<Reading>>,
    pub(crate) shutdown: Shutdown,
    pub(crate) source: S,
    pub(crate) interval: Duration,
    pub(crate) limit: Option<u64>,
    pub(crate) blocked_us: Histogram<u64>,
}

impl<S: Source> Producer<S> {
    pub(crate) fn run(mut self) -> ProducerReport {
        info!(
            "producer started: interval={:?} limit={:?}",
            self.interval, self.limit
        );

        let mut seq = 0u64;
        while !self.shutdown.is_triggered() {
            if self.limit.is_some_and(|limit| seq >= limit) {
                // Let the consumer drain what is left and observe the end
                self.queue.close();
                break;
            }

            let reading = Reading {
                seq,
                raw: self.source.next_value(),
            };

            let start = Instant::now();
            if let Err(PutError(reading)) = self.queue.put(reading) {
                debug!("queue closed, discarding reading #{}", reading.seq);
                break;
            }
            let blocked = start.elapsed();
            self.blocked_us
                .saturating_record(u64::try_from(blocked.as_micros()).unwrap_or(u64::MAX));
            if blocked >= SLOW_PUT {
                debug!("put of reading #{seq} blocked {blocked:?} on a full queue");
            }

            seq += 1;
            if self.shutdown.sleep(self.interval) {
                break;
            }
        }

        info!("producer stopped after {seq} reading(s)");
        ProducerReport {
            produced: seq,
            blocked_us: self.blocked_us,
        }
    }
}

pub(crate) struct Consumer<X, K> {
    pub(crate) queue: Arc<BoundedQueue<Reading>>,
    pub(crate) shutdown: Shutdown,
    pub(crate) transform: X,
    pub(crate) sink: K,
    pub(crate) interval: Duration,
    pub(crate) drain_on_shutdown: bool,
}

impl<X: Transform, K: Sink> Consumer<X, K> {
    /// Returns the number of readings consumed.
    pub(crate) fn run(mut self) -> u64 {
        info!("consumer started: interval={:?}", self.interval);

        let mut consumed = 0u64;
        loop {
            if !self.drain_on_shutdown && self.shutdown.is_triggered() {
                break;
            }

            let reading = match self.queue.take() {
                Ok(reading) => reading,
                Err(TakeError) => break,
            };

            let sample = Sample {
                seq: reading.seq,
                raw: reading.raw,
                scaled: self.transform.apply(reading.raw),
                queue_len: self.queue.len(),
                capacity: self.queue.capacity(),
            };
            self.sink.emit(&sample);
            consumed += 1;

            // Returns immediately once shutdown is triggered
            self.shutdown.sleep(self.interval);
        }

        info!("consumer stopped after {consumed} reading(s)");
        consumed
    }
}
