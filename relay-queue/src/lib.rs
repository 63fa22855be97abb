//! A bounded, blocking FIFO queue for handing values between threads.
//!
//! [`BoundedQueue`] couples producers and consumers with backpressure in both
//! directions: [`put`](BoundedQueue::put) sleeps while the queue is full and
//! [`take`](BoundedQueue::take) sleeps while it is empty. Nothing is dropped,
//! reordered or spun on.
//!
//! # Protocol
//!
//! ```text
//!             ┌────────────── Mutex<State> ──────────────┐
//!  put() ───► │ ring: head / tail / count   closed: bool │ ───► take()
//!             └──────────────────────────────────────────┘
//!                 ▲ not_full (Condvar)   not_empty (Condvar) ▲
//!                 │                                          │
//!      waited on by put, notified by take     waited on by take, notified by put
//! ```
//!
//! 1. One lock guards the ring indices, the count, the slots and the closed
//!    flag. An element either moves in or out as a unit or not at all.
//! 2. Each side waits on its own condition variable and re-checks its
//!    predicate after every wakeup. A wakeup is a hint, never a promise of
//!    room or data.
//! 3. After a mutation the caller notifies the *other* side's condition
//!    before the guard is released.
//! 4. The lock is never held across anything but ring bookkeeping. Callers
//!    log, sleep and do I/O with the lock released.
//!
//! State machine:
//!
//! ```text
//!          put              put
//!  EMPTY ───────► PARTIAL ───────► FULL
//!        ◄───────         ◄───────
//!          take             take
//!
//!  put blocks in FULL, take blocks in EMPTY
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use relay_queue::BoundedQueue;
//!
//! let queue = Arc::new(BoundedQueue::<u64>::new(4).unwrap());
//!
//! let producer = {
//!     let queue = Arc::clone(&queue);
//!     thread::spawn(move || {
//!         for i in 0..100 {
//!             // Blocks whenever four values are already waiting
//!             queue.put(i).unwrap();
//!         }
//!     })
//! };
//!
//! let mut sum = 0;
//! for _ in 0..100 {
//!     sum += queue.take().unwrap();
//! }
//! producer.join().unwrap();
//! assert_eq!(sum, 99 * 100 / 2);
//! ```
//!
//! # Non-blocking and Timed Operations
//!
//! ```
//! use std::time::Duration;
//!
//! use relay_queue::{BoundedQueue, TakeTimeoutError, TryPutError, TryTakeError};
//!
//! let queue = BoundedQueue::new(2).unwrap();
//!
//! queue.try_put(1).unwrap();
//! queue.try_put(2).unwrap();
//! assert!(matches!(queue.try_put(3), Err(TryPutError::Full(3))));
//!
//! assert_eq!(queue.try_take().unwrap(), 1);
//! assert_eq!(queue.take_timeout(Duration::from_millis(10)).unwrap(), 2);
//! assert!(matches!(queue.try_take(), Err(TryTakeError::Empty)));
//! assert!(matches!(
//!     queue.take_timeout(Duration::from_millis(10)),
//!     Err(TakeTimeoutError::Timeout)
//! ));
//! ```
//!
//! # Closing
//!
//! [`close`](BoundedQueue::close) is the shutdown signal. It wakes every
//! blocked caller. Producers are refused from then on and get their value
//! back. Consumers keep draining what is already queued and only then see
//! [`TakeError`]:
//!
//! ```
//! use relay_queue::{BoundedQueue, PutError};
//!
//! let queue = BoundedQueue::new(4).unwrap();
//!
//! queue.put("a").unwrap();
//! queue.put("b").unwrap();
//! queue.close();
//!
//! assert_eq!(queue.put("c"), Err(PutError("c")));
//! assert_eq!(queue.take().unwrap(), "a");
//! assert_eq!(queue.take().unwrap(), "b");
//! assert!(queue.take().is_err());
//! ```
//!
//! # Several Producers or Consumers
//!
//! The queue is `Sync` and may be shared by any number of threads on either
//! side. Every waiter on a given condition waits for the same predicate and
//! every mutation changes the count by exactly one, so waking a single waiter
//! per mutation is enough. Ordering among concurrent producers is the order
//! in which they acquire the lock.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod ring;
mod stats;

use std::fmt;
use std::time::{Duration, Instant};

use log::debug;
use parking_lot::{Condvar, Mutex, MutexGuard};

pub use error::{
    CapacityError, PutError, PutTimeoutError, TakeError, TakeTimeoutError, TryPutError,
    TryTakeError,
};
pub use stats::QueueStats;

use ring::Ring;
use stats::Counters;

/// Everything the lock protects.
struct State<T> {
    ring: Ring<T>,
    closed: bool,
}

/// Outcome of waiting on one of the two conditions.
enum Readiness {
    Ready,
    Closed,
    TimedOut,
}

/// A fixed-capacity FIFO queue with blocking `put` and `take`.
///
/// Share it between threads with `Arc`. See the [crate docs](crate) for the
/// locking protocol.
pub struct BoundedQueue<T> {
    state: Mutex<State<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
    counters: Counters,
}

impl<T> BoundedQueue<T> {
    /// Creates an empty queue holding at most `capacity` elements.
    ///
    /// The capacity is exact; it is not rounded.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] if `capacity` is 0.
    ///
    /// # Example
    ///
    /// ```
    /// use relay_queue::{BoundedQueue, CapacityError};
    ///
    /// let queue = BoundedQueue::<u32>::new(3).unwrap();
    /// assert_eq!(queue.capacity(), 3);
    /// assert!(queue.is_empty());
    ///
    /// assert_eq!(BoundedQueue::<u32>::new(0).unwrap_err(), CapacityError);
    /// ```
    pub fn new(capacity: usize) -> Result<Self, CapacityError> {
        if capacity == 0 {
            return Err(CapacityError);
        }

        Ok(Self {
            state: Mutex::new(State {
                ring: Ring::with_capacity(capacity),
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
            counters: Counters::default(),
        })
    }

    /// Appends `value`, blocking while the queue is full.
    ///
    /// Wakes one consumer waiting in [`take`](Self::take).
    ///
    /// # Errors
    ///
    /// Returns `Err(PutError(value))` if the queue is closed, either before
    /// the call or while it was waiting for room.
    pub fn put(&self, value: T) -> Result<(), PutError<T>> {
        let mut state = self.state.lock();

        match self.wait_for_room(&mut state, None) {
            Readiness::Ready => {
                self.push_locked(&mut state, value);
                Ok(())
            }
            Readiness::Closed | Readiness::TimedOut => Err(PutError(value)),
        }
    }

    /// Appends `value` if there is room right now.
    ///
    /// # Errors
    ///
    /// - `TryPutError::Full(value)` if the queue is full
    /// - `TryPutError::Closed(value)` if the queue is closed
    ///
    /// # Example
    ///
    /// ```
    /// use relay_queue::{BoundedQueue, TryPutError};
    ///
    /// let queue = BoundedQueue::new(1).unwrap();
    ///
    /// assert!(queue.try_put(1).is_ok());
    /// assert!(matches!(queue.try_put(2), Err(TryPutError::Full(2))));
    ///
    /// queue.close();
    /// assert!(matches!(queue.try_put(3), Err(TryPutError::Closed(3))));
    /// ```
    pub fn try_put(&self, value: T) -> Result<(), TryPutError<T>> {
        let mut state = self.state.lock();

        if state.closed {
            return Err(TryPutError::Closed(value));
        }
        if state.ring.is_full() {
            return Err(TryPutError::Full(value));
        }

        self.push_locked(&mut state, value);
        Ok(())
    }

    /// Appends `value`, blocking for at most `timeout` while the queue is full.
    ///
    /// # Errors
    ///
    /// - `PutTimeoutError::Timeout(value)` if no room appeared in time
    /// - `PutTimeoutError::Closed(value)` if the queue is closed
    pub fn put_timeout(&self, value: T, timeout: Duration) -> Result<(), PutTimeoutError<T>> {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.state.lock();

        match self.wait_for_room(&mut state, deadline) {
            Readiness::Ready => {
                self.push_locked(&mut state, value);
                Ok(())
            }
            Readiness::Closed => Err(PutTimeoutError::Closed(value)),
            Readiness::TimedOut => Err(PutTimeoutError::Timeout(value)),
        }
    }

    /// Removes the oldest element, blocking while the queue is empty.
    ///
    /// Wakes one producer waiting in [`put`](Self::put).
    ///
    /// # Errors
    ///
    /// Returns [`TakeError`] once the queue is closed *and* empty. Elements
    /// queued before [`close`](Self::close) are still handed out first.
    pub fn take(&self) -> Result<T, TakeError> {
        let mut state = self.state.lock();

        match self.wait_for_element(&mut state, None) {
            Readiness::Ready => Ok(self.pop_locked(&mut state)),
            Readiness::Closed | Readiness::TimedOut => Err(TakeError),
        }
    }

    /// Removes the oldest element if one is available right now.
    ///
    /// # Errors
    ///
    /// - `TryTakeError::Empty` if the queue is empty but open
    /// - `TryTakeError::Closed` if the queue is closed and empty
    pub fn try_take(&self) -> Result<T, TryTakeError> {
        let mut state = self.state.lock();

        if !state.ring.is_empty() {
            return Ok(self.pop_locked(&mut state));
        }
        if state.closed {
            Err(TryTakeError::Closed)
        } else {
            Err(TryTakeError::Empty)
        }
    }

    /// Removes the oldest element, blocking for at most `timeout` while the
    /// queue is empty.
    ///
    /// # Errors
    ///
    /// - `TakeTimeoutError::Timeout` if nothing arrived in time
    /// - `TakeTimeoutError::Closed` if the queue is closed and empty
    pub fn take_timeout(&self, timeout: Duration) -> Result<T, TakeTimeoutError> {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.state.lock();

        match self.wait_for_element(&mut state, deadline) {
            Readiness::Ready => Ok(self.pop_locked(&mut state)),
            Readiness::Closed => Err(TakeTimeoutError::Closed),
            Readiness::TimedOut => Err(TakeTimeoutError::Timeout),
        }
    }

    /// Closes the queue and wakes every blocked caller.
    ///
    /// Returns `true` if this call closed the queue, `false` if it was already
    /// closed. Resident elements stay takeable.
    pub fn close(&self) -> bool {
        let mut state = self.state.lock();
        if state.closed {
            return false;
        }
        state.closed = true;
        let resident = state.ring.len();

        self.not_full.notify_all();
        self.not_empty.notify_all();
        drop(state);

        debug!("queue closed with {resident} element(s) resident");
        true
    }

    /// Returns `true` if [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Returns the number of elements currently queued.
    ///
    /// This is a snapshot and may be stale as soon as it returns.
    pub fn len(&self) -> usize {
        self.state.lock().ring.len()
    }

    /// Returns `true` if no elements are queued.
    pub fn is_empty(&self) -> bool {
        self.state.lock().ring.is_empty()
    }

    /// Returns `true` if the queue holds `capacity` elements.
    pub fn is_full(&self) -> bool {
        self.state.lock().ring.is_full()
    }

    /// Returns the maximum number of elements the queue holds.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns a snapshot of the queue's lifetime counters.
    ///
    /// Reading the counters does not take the queue lock.
    pub fn stats(&self) -> QueueStats {
        self.counters.snapshot()
    }

    // ========================================================================
    // Locked helpers
    // ========================================================================

    /// Sleeps on `not_full` until there is room, the queue closes, or the
    /// deadline passes. The predicate is re-checked after every wakeup.
    fn wait_for_room(
        &self,
        state: &mut MutexGuard<'_, State<T>>,
        deadline: Option<Instant>,
    ) -> Readiness {
        loop {
            if state.closed {
                return Readiness::Closed;
            }
            if !state.ring.is_full() {
                return Readiness::Ready;
            }

            self.counters.record_put_wait();
            match deadline {
                None => self.not_full.wait(state),
                Some(deadline) => {
                    if self.not_full.wait_until(state, deadline).timed_out() {
                        // Room may have appeared right at the deadline
                        if !state.closed && !state.ring.is_full() {
                            return Readiness::Ready;
                        }
                        return if state.closed {
                            Readiness::Closed
                        } else {
                            Readiness::TimedOut
                        };
                    }
                }
            }
        }
    }

    /// Sleeps on `not_empty` until an element is resident, the queue is closed
    /// and drained, or the deadline passes.
    fn wait_for_element(
        &self,
        state: &mut MutexGuard<'_, State<T>>,
        deadline: Option<Instant>,
    ) -> Readiness {
        loop {
            if !state.ring.is_empty() {
                return Readiness::Ready;
            }
            if state.closed {
                return Readiness::Closed;
            }

            self.counters.record_take_wait();
            match deadline {
                None => self.not_empty.wait(state),
                Some(deadline) => {
                    if self.not_empty.wait_until(state, deadline).timed_out() {
                        if !state.ring.is_empty() {
                            return Readiness::Ready;
                        }
                        return if state.closed {
                            Readiness::Closed
                        } else {
                            Readiness::TimedOut
                        };
                    }
                }
            }
        }
    }

    fn push_locked(&self, state: &mut MutexGuard<'_, State<T>>, value: T) {
        state.ring.push(value);
        self.counters.record_put();
        self.not_empty.notify_one();
    }

    fn pop_locked(&self, state: &mut MutexGuard<'_, State<T>>) -> T {
        let value = state.ring.pop();
        self.counters.record_take();
        self.not_full.notify_one();
        value
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.capacity)
            .field("len", &state.ring.len())
            .field("closed", &state.closed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    /// Polls `cond` until it holds, failing the test after five seconds.
    fn wait_until(mut cond: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !cond() {
            assert!(Instant::now() < deadline, "condition never became true");
            thread::sleep(Duration::from_millis(1));
        }
    }

    // ============================================================================
    // Construction
    // ============================================================================

    #[test]
    fn zero_capacity_rejected() {
        assert_eq!(BoundedQueue::<u64>::new(0).unwrap_err(), CapacityError);
    }

    #[test]
    fn capacity_not_rounded() {
        for cap in [1, 3, 10, 100] {
            let queue = BoundedQueue::<u64>::new(cap).unwrap();
            assert_eq!(queue.capacity(), cap);
            for i in 0..cap as u64 {
                queue.try_put(i).unwrap();
            }
            assert!(queue.is_full());
            assert!(queue.try_put(0).unwrap_err().is_full());
        }
    }

    #[test]
    fn independent_instances() {
        let a = BoundedQueue::new(2).unwrap();
        let b = BoundedQueue::<u64>::new(2).unwrap();

        a.put(1).unwrap();
        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
        assert!(matches!(b.try_take(), Err(TryTakeError::Empty)));
    }

    // ============================================================================
    // Basic Operations
    // ============================================================================

    #[test]
    fn basic_put_take() {
        let queue = BoundedQueue::<u64>::new(4).unwrap();

        queue.put(1).unwrap();
        queue.put(2).unwrap();
        queue.put(3).unwrap();

        assert_eq!(queue.take().unwrap(), 1);
        assert_eq!(queue.take().unwrap(), 2);
        assert_eq!(queue.take().unwrap(), 3);
    }

    #[test]
    fn try_put_try_take() {
        let queue = BoundedQueue::<u64>::new(2).unwrap();

        assert!(queue.try_put(1).is_ok());
        assert!(queue.try_put(2).is_ok());
        assert!(matches!(queue.try_put(3), Err(TryPutError::Full(3))));

        assert_eq!(queue.try_take().unwrap(), 1);
        assert_eq!(queue.try_take().unwrap(), 2);
        assert!(matches!(queue.try_take(), Err(TryTakeError::Empty)));
    }

    #[test]
    fn len_tracks_state_transitions() {
        let queue = BoundedQueue::<u64>::new(2).unwrap();
        assert!(queue.is_empty() && !queue.is_full());

        queue.put(1).unwrap();
        assert_eq!(queue.len(), 1);
        assert!(!queue.is_empty() && !queue.is_full());

        queue.put(2).unwrap();
        assert!(queue.is_full());

        queue.take().unwrap();
        queue.take().unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn failed_try_put_returns_value() {
        let queue = BoundedQueue::<String>::new(1).unwrap();
        queue.try_put("hello".to_string()).unwrap();

        match queue.try_put("world".to_string()) {
            Err(TryPutError::Full(s)) => assert_eq!(s, "world"),
            _ => panic!("expected Full error"),
        }

        queue.close();
        match queue.try_put("test".to_string()) {
            Err(TryPutError::Closed(s)) => assert_eq!(s, "test"),
            _ => panic!("expected Closed error"),
        }
    }

    #[test]
    fn many_laps_single_thread() {
        let queue = BoundedQueue::<u64>::new(3).unwrap();

        for i in 0..1000 {
            queue.put(i).unwrap();
            assert_eq!(queue.take().unwrap(), i);
        }
        assert_eq!(queue.stats().puts, 1000);
        assert_eq!(queue.stats().takes, 1000);
    }

    // ============================================================================
    // Blocking Behavior
    // ============================================================================

    #[test]
    fn put_blocks_until_take() {
        let queue = Arc::new(BoundedQueue::<u64>::new(3).unwrap());
        for i in 1..=3 {
            queue.try_put(i).unwrap();
        }

        let handle = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.put(4).unwrap())
        };

        wait_until(|| queue.stats().put_waits >= 1);
        assert!(!handle.is_finished());
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.take().unwrap(), 1);
        handle.join().unwrap();

        assert_eq!(queue.take().unwrap(), 2);
        assert_eq!(queue.take().unwrap(), 3);
        assert_eq!(queue.take().unwrap(), 4);
        assert!(matches!(
            queue.take_timeout(Duration::from_millis(20)),
            Err(TakeTimeoutError::Timeout)
        ));
    }

    #[test]
    fn take_blocks_until_put() {
        let queue = Arc::new(BoundedQueue::<u64>::new(2).unwrap());

        let handle = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.take().unwrap())
        };

        wait_until(|| queue.stats().take_waits >= 1);
        assert!(!handle.is_finished());

        queue.put(42).unwrap();
        assert_eq!(handle.join().unwrap(), 42);
    }

    #[test]
    fn blocked_take_does_not_spin() {
        let queue = Arc::new(BoundedQueue::<u64>::new(1).unwrap());

        let handle = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.take().unwrap())
        };

        wait_until(|| queue.stats().take_waits >= 1);
        thread::sleep(Duration::from_millis(200));
        queue.put(7).unwrap();
        assert_eq!(handle.join().unwrap(), 7);

        // One sleep, one wakeup. A spinning consumer would have re-entered
        // the wait thousands of times.
        assert!(queue.stats().take_waits <= 3, "{:?}", queue.stats());
    }

    #[test]
    fn blocked_put_does_not_spin() {
        let queue = Arc::new(BoundedQueue::<u64>::new(1).unwrap());
        queue.put(0).unwrap();

        let handle = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.put(1).unwrap())
        };

        wait_until(|| queue.stats().put_waits >= 1);
        thread::sleep(Duration::from_millis(200));
        queue.take().unwrap();
        handle.join().unwrap();

        assert!(queue.stats().put_waits <= 3, "{:?}", queue.stats());
    }

    // ============================================================================
    // Timeouts
    // ============================================================================

    #[test]
    fn put_timeout_expires_when_full() {
        let queue = BoundedQueue::<u64>::new(1).unwrap();
        queue.put(1).unwrap();

        let start = Instant::now();
        let err = queue.put_timeout(2, Duration::from_millis(30)).unwrap_err();
        assert!(start.elapsed() >= Duration::from_millis(30));
        assert!(err.is_timeout());
        assert_eq!(err.into_inner(), 2);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn put_timeout_succeeds_when_room_appears() {
        let queue = Arc::new(BoundedQueue::<u64>::new(1).unwrap());
        queue.put(1).unwrap();

        let handle = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.put_timeout(2, Duration::from_secs(5)))
        };

        wait_until(|| queue.stats().put_waits >= 1);
        assert_eq!(queue.take().unwrap(), 1);
        handle.join().unwrap().unwrap();
        assert_eq!(queue.take().unwrap(), 2);
    }

    #[test]
    fn take_timeout_returns_available_element_immediately() {
        let queue = BoundedQueue::<u64>::new(2).unwrap();
        queue.put(5).unwrap();
        assert_eq!(queue.take_timeout(Duration::ZERO).unwrap(), 5);
        assert_eq!(
            queue.take_timeout(Duration::ZERO),
            Err(TakeTimeoutError::Timeout)
        );
    }

    #[test]
    fn huge_timeout_does_not_overflow() {
        let queue = BoundedQueue::<u64>::new(1).unwrap();
        queue.put_timeout(1, Duration::MAX).unwrap();
        assert_eq!(queue.take_timeout(Duration::MAX).unwrap(), 1);
    }

    // ============================================================================
    // Close
    // ============================================================================

    #[test]
    fn close_is_idempotent() {
        let queue = BoundedQueue::<u64>::new(2).unwrap();
        assert!(!queue.is_closed());
        assert!(queue.close());
        assert!(!queue.close());
        assert!(queue.is_closed());
    }

    #[test]
    fn take_drains_before_error_when_closed() {
        let queue = BoundedQueue::<u64>::new(4).unwrap();

        queue.put(1).unwrap();
        queue.put(2).unwrap();
        queue.close();

        assert_eq!(queue.take().unwrap(), 1);
        assert_eq!(queue.try_take().unwrap(), 2);
        assert_eq!(queue.take(), Err(TakeError));
        assert_eq!(queue.try_take(), Err(TryTakeError::Closed));
        assert_eq!(
            queue.take_timeout(Duration::from_millis(5)),
            Err(TakeTimeoutError::Closed)
        );
    }

    #[test]
    fn put_refused_when_closed() {
        let queue = BoundedQueue::<u64>::new(4).unwrap();
        queue.close();

        assert_eq!(queue.put(1), Err(PutError(1)));
        assert!(queue.put_timeout(2, Duration::from_millis(5)).unwrap_err().is_closed());
        assert!(queue.is_empty());
    }

    #[test]
    fn close_wakes_blocked_take() {
        let queue = Arc::new(BoundedQueue::<u64>::new(4).unwrap());

        let handle = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.take())
        };

        wait_until(|| queue.stats().take_waits >= 1);
        queue.close();

        assert_eq!(handle.join().unwrap(), Err(TakeError));
    }

    #[test]
    fn close_wakes_blocked_put() {
        let queue = Arc::new(BoundedQueue::<u64>::new(1).unwrap());
        queue.put(1).unwrap();

        let handle = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.put(2))
        };

        wait_until(|| queue.stats().put_waits >= 1);
        queue.close();

        assert_eq!(handle.join().unwrap(), Err(PutError(2)));
        // The element queued before close is still there
        assert_eq!(queue.take().unwrap(), 1);
    }

    #[test]
    fn close_wakes_every_waiter() {
        let queue = Arc::new(BoundedQueue::<u64>::new(1).unwrap());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || queue.take())
            })
            .collect();

        wait_until(|| queue.stats().take_waits >= 4);
        queue.close();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Err(TakeError));
        }
    }

    // ============================================================================
    // Cross-Thread
    // ============================================================================

    #[test]
    fn fifo_ordering_cross_thread() {
        let queue = Arc::new(BoundedQueue::<u64>::new(8).unwrap());

        let consumer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for expected in 0..10_000 {
                    assert_eq!(queue.take().unwrap(), expected, "FIFO order violated");
                }
            })
        };

        for i in 0..10_000 {
            queue.put(i).unwrap();
        }

        consumer.join().unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn capacity_one_cross_thread() {
        let queue = Arc::new(BoundedQueue::<u64>::new(1).unwrap());

        let producer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..10_000 {
                    queue.put(i).unwrap();
                }
            })
        };

        for expected in 0..10_000 {
            assert_eq!(queue.take().unwrap(), expected);
        }
        producer.join().unwrap();
    }

    #[test]
    fn ping_pong_both_block() {
        let forward = Arc::new(BoundedQueue::<u64>::new(1).unwrap());
        let back = Arc::new(BoundedQueue::<u64>::new(1).unwrap());

        let echo = {
            let forward = Arc::clone(&forward);
            let back = Arc::clone(&back);
            thread::spawn(move || {
                for _ in 0..5000 {
                    let val = forward.take().unwrap();
                    back.put(val + 1).unwrap();
                }
            })
        };

        for i in 0..5000 {
            forward.put(i).unwrap();
            assert_eq!(back.take().unwrap(), i + 1);
        }

        echo.join().unwrap();
    }

    // ============================================================================
    // Drop Behavior
    // ============================================================================

    #[test]
    fn resident_values_dropped_with_queue() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let drop_count = Arc::new(AtomicUsize::new(0));

        #[derive(Debug)]
        struct DropCounter(Arc<AtomicUsize>);
        impl Drop for DropCounter {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let queue = BoundedQueue::new(4).unwrap();
        for _ in 0..3 {
            queue.put(DropCounter(Arc::clone(&drop_count))).unwrap();
        }

        drop(queue.take().unwrap());
        assert_eq!(drop_count.load(Ordering::SeqCst), 1);

        drop(queue);
        assert_eq!(drop_count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn zero_sized_type() {
        let queue = BoundedQueue::<()>::new(2).unwrap();
        queue.put(()).unwrap();
        queue.put(()).unwrap();
        assert!(queue.is_full());
        assert_eq!(queue.take().unwrap(), ());
        assert_eq!(queue.take().unwrap(), ());
    }

    #[test]
    fn debug_output() {
        let queue = BoundedQueue::<u8>::new(3).unwrap();
        queue.put(1).unwrap();
        let text = format!("{queue:?}");
        assert!(text.contains("capacity: 3"));
        assert!(text.contains("len: 1"));
        assert!(text.contains("closed: false"));
    }
}
