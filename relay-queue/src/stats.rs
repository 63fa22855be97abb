//! Operation counters kept outside the queue lock.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;

/// Producer-side and consumer-side counters.
///
/// Each side gets its own cache line so a producer bumping `puts` does not
/// invalidate the line a consumer is bumping `takes` on.
#[derive(Default)]
pub(crate) struct Counters {
    producer: CachePadded<SideCounters>,
    consumer: CachePadded<SideCounters>,
}

#[derive(Default)]
struct SideCounters {
    completed: AtomicU64,
    waits: AtomicU64,
}

impl Counters {
    #[inline]
    pub(crate) fn record_put(&self) {
        self.producer.completed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_take(&self) {
        self.consumer.completed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_put_wait(&self) {
        self.producer.waits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_take_wait(&self) {
        self.consumer.waits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> QueueStats {
        QueueStats {
            puts: self.producer.completed.load(Ordering::Relaxed),
            takes: self.consumer.completed.load(Ordering::Relaxed),
            put_waits: self.producer.waits.load(Ordering::Relaxed),
            take_waits: self.consumer.waits.load(Ordering::Relaxed),
        }
    }
}

/// A snapshot of a queue's lifetime counters.
///
/// `put_waits` and `take_waits` count how many times a caller went to sleep on
/// a condition variable. A blocked caller sleeps once and is woken by a
/// notification (or, rarely, spuriously), so these stay small no matter how
/// long the caller was blocked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Elements accepted by `put` and its variants.
    pub puts: u64,
    /// Elements handed out by `take` and its variants.
    pub takes: u64,
    /// Times a producer slept waiting for room.
    pub put_waits: u64,
    /// Times a consumer slept waiting for an element.
    pub take_waits: u64,
}

impl QueueStats {
    /// Elements accepted but not yet taken when the snapshot was read.
    ///
    /// Counters are read without the queue lock, so under concurrent traffic
    /// this is approximate.
    pub fn in_flight(&self) -> u64 {
        self.puts.saturating_sub(self.takes)
    }
}
