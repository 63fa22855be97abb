//! Starting, stopping and joining a producer/consumer pair.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use hdrhistogram::Histogram;
use log::{info, warn};
use relay_queue::{BoundedQueue, CapacityError, QueueStats};
use thiserror::Error;

use crate::config::{ConfigError, PipelineConfig};
use crate::filter::{LinearScale, Transform};
use crate::sensor::{SimulatedSensor, Source};
use crate::shutdown::Shutdown;
use crate::sink::{LogSink, Sink};
use crate::worker::{Consumer, Producer, ProducerReport, Reading};

const PRODUCER_THREAD: &str = "relay-producer";
const CONSUMER_THREAD: &str = "relay-consumer";

/// Errors from starting or joining a [`Pipeline`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The config failed [`PipelineConfig::validate`].
    #[error("invalid pipeline configuration")]
    Config(#[from] ConfigError),

    /// The queue rejected its capacity.
    #[error("invalid queue capacity")]
    Capacity(#[from] CapacityError),

    /// The blocked-time histogram could not be allocated.
    #[error("failed to create blocked-time histogram")]
    Histogram(#[from] hdrhistogram::CreationError),

    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn {name} thread")]
    Spawn {
        /// Name of the thread that failed to start.
        name: &'static str,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A worker panicked; carries the thread name.
    #[error("{0} thread panicked")]
    WorkerPanicked(&'static str),
}

/// What a finished pipeline did.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Readings the producer got into the queue.
    pub produced: u64,
    /// Readings the consumer emitted.
    pub consumed: u64,
    /// Final queue counters.
    pub queue: QueueStats,
    /// Median time a `put` spent blocked, in microseconds.
    pub blocked_p50_us: u64,
    /// 99th percentile time a `put` spent blocked, in microseconds.
    pub blocked_p99_us: u64,
    /// Longest time a `put` spent blocked, in microseconds.
    pub blocked_max_us: u64,
}

impl PipelineReport {
    fn new(producer: &ProducerReport, consumed: u64, queue: QueueStats) -> Self {
        let hist = &producer.blocked_us;
        // An empty histogram reports 0 for every quantile
        Self {
            produced: producer.produced,
            consumed,
            queue,
            blocked_p50_us: hist.value_at_quantile(0.50),
            blocked_p99_us: hist.value_at_quantile(0.99),
            blocked_max_us: hist.max(),
        }
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "produced={} consumed={} put_waits={} take_waits={} \
             put blocked p50={}us p99={}us max={}us",
            self.produced,
            self.consumed,
            self.queue.put_waits,
            self.queue.take_waits,
            self.blocked_p50_us,
            self.blocked_p99_us,
            self.blocked_max_us,
        )
    }
}

/// A running producer/consumer pair and the queue between them.
///
/// Dropping a `Pipeline` without calling [`join`](Self::join) triggers
/// shutdown and detaches the threads.
pub struct Pipeline {
    queue: Arc<BoundedQueue<Reading>>,
    shutdown: Shutdown,
    producer: Option<JoinHandle<ProducerReport>>,
    consumer: Option<JoinHandle<u64>>,
}

impl Pipeline {
    /// Validates `config`, creates the queue and spawns both worker threads.
    ///
    /// Triggering shutdown (through [`shutdown`](Self::shutdown) or any clone
    /// of [`shutdown_handle`](Self::shutdown_handle)) closes the queue, which
    /// releases a producer blocked on a full queue and a consumer blocked on
    /// an empty one.
    pub fn start<S, X, K>(
        config: &PipelineConfig,
        source: S,
        transform: X,
        sink: K,
    ) -> Result<Self, PipelineError>
    where
        S: Source,
        X: Transform,
        K: Sink,
    {
        config.validate()?;
        let queue = Arc::new(BoundedQueue::new(config.capacity)?);
        let shutdown = Shutdown::new();
        {
            let queue = Arc::clone(&queue);
            shutdown.on_trigger(move || {
                queue.close();
            });
        }

        let producer = Producer {
            queue: Arc::clone(&queue),
            shutdown: shutdown.clone(),
            source,
            interval: config.produce_interval(),
            limit: config.count,
            blocked_us: Histogram::new(3)?,
        };
        let consumer = Consumer {
            queue: Arc::clone(&queue),
            shutdown: shutdown.clone(),
            transform,
            sink,
            interval: config.consume_interval(),
            drain_on_shutdown: config.drain_on_shutdown,
        };

        let consumer = spawn(CONSUMER_THREAD, &shutdown, move || consumer.run())?;
        let producer = match spawn(PRODUCER_THREAD, &shutdown, move || producer.run()) {
            Ok(handle) => handle,
            Err(err) => {
                shutdown.trigger();
                let _ = consumer.join();
                return Err(err);
            }
        };

        info!(
            "pipeline started: capacity={} produce every {:?}, consume every {:?}",
            config.capacity,
            config.produce_interval(),
            config.consume_interval()
        );

        Ok(Self {
            queue,
            shutdown,
            producer: Some(producer),
            consumer: Some(consumer),
        })
    }

    /// Starts the reference pipeline: a [`SimulatedSensor`] feeding a
    /// [`LinearScale`] that logs through [`LogSink`].
    pub fn start_simulated(config: &PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let source = SimulatedSensor::new(config.sensor_min, config.sensor_max, config.seed);
        let transform = LinearScale::new(config.gain, config.offset);
        Self::start(config, source, transform, LogSink)
    }

    /// The queue between the workers.
    pub fn queue(&self) -> &Arc<BoundedQueue<Reading>> {
        &self.queue
    }

    /// A clone of the pipeline's shutdown signal.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Asks both workers to stop. Returns `false` if shutdown was already
    /// triggered.
    pub fn shutdown(&self) -> bool {
        self.shutdown.trigger()
    }

    /// Waits for both workers to finish and reports what they did.
    ///
    /// Returns once shutdown is triggered, or once the producer reaches its
    /// configured count and the consumer has drained the queue. Without
    /// either, this blocks forever.
    pub fn join(mut self) -> Result<PipelineReport, PipelineError> {
        let producer = self.producer.take().map(JoinHandle::join);
        let consumer = self.consumer.take().map(JoinHandle::join);

        let producer = match producer {
            Some(Ok(report)) => report,
            _ => {
                warn!("{PRODUCER_THREAD} thread panicked");
                return Err(PipelineError::WorkerPanicked(PRODUCER_THREAD));
            }
        };
        let consumed = match consumer {
            Some(Ok(consumed)) => consumed,
            _ => {
                warn!("{CONSUMER_THREAD} thread panicked");
                return Err(PipelineError::WorkerPanicked(CONSUMER_THREAD));
            }
        };

        let report = PipelineReport::new(&producer, consumed, self.queue.stats());
        info!("pipeline finished: {report}");
        Ok(report)
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        if self.producer.is_some() || self.consumer.is_some() {
            self.shutdown.trigger();
        }
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("queue", &self.queue)
            .field("shutdown", &self.shutdown)
            .finish_non_exhaustive()
    }
}

/// Triggers shutdown if the owning worker unwinds, so its peer is not left
/// blocked on a queue nobody will touch again.
struct TriggerOnPanic(Shutdown);

impl Drop for TriggerOnPanic {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.trigger();
        }
    }
}

fn spawn<T, F>(
    name: &'static str,
    shutdown: &Shutdown,
    f: F,
) -> Result<JoinHandle<T>, PipelineError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let guard = TriggerOnPanic(shutdown.clone());
    thread::Builder::new()
        .name(name.to_owned())
        .spawn(move || {
            let _guard = guard;
            f()
        })
        .map_err(|source| PipelineError::Spawn { name, source })
}
