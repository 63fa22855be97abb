//! Where consumed samples go.

use std::fmt;

use log::info;

/// One consumed reading after transformation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Sequence number assigned by the producer, starting at 0.
    pub seq: u64,
    /// The value as the source produced it.
    pub raw: f64,
    /// The value after the consumer's transform.
    pub scaled: f64,
    /// Queue depth right after this sample was taken.
    pub queue_len: usize,
    /// Queue capacity.
    pub capacity: usize,
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reading #{}: raw={:.3} scaled={:.3} queue={}/{}",
            self.seq, self.raw, self.scaled, self.queue_len, self.capacity
        )
    }
}

/// Receives every sample the consumer produces, on the consumer thread.
///
/// Any `FnMut(&Sample)` closure is a sink.
pub trait Sink: Send + 'static {
    /// Emits one sample.
    fn emit(&mut self, sample: &Sample);
}

impl<F> Sink for F
where
    F: FnMut(&Sample) + Send + 'static,
{
    fn emit(&mut self, sample: &Sample) {
        self(sample)
    }
}

/// Logs one status line per sample at `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl Sink for LogSink {
    fn emit(&mut self, sample: &Sample) {
        info!("{sample}");
    }
}
