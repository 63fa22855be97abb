//! Error types for queue operations.
//!
//! A full or empty queue is never an error for the blocking calls; they wait.
//! The errors here cover construction, the non-blocking and timed variants,
//! and a queue that has been [closed](crate::BoundedQueue::close).

use std::fmt;

/// Returned by [`BoundedQueue::new`](crate::BoundedQueue::new) when asked for
/// a zero capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityError;

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue capacity must be at least 1")
    }
}

impl std::error::Error for CapacityError {}

/// Error returned by [`BoundedQueue::put`](crate::BoundedQueue::put) when the
/// queue has been closed.
///
/// Contains the value that could not be enqueued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PutError<T>(pub T);

impl<T> PutError<T> {
    /// Returns the value that could not be enqueued.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Display for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue closed")
    }
}

impl<T: fmt::Debug> std::error::Error for PutError<T> {}

/// Error returned by [`BoundedQueue::take`](crate::BoundedQueue::take) when the
/// queue has been closed and every resident element has been taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TakeError;

impl fmt::Display for TakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue closed and drained")
    }
}

impl std::error::Error for TakeError {}

/// Error returned by [`BoundedQueue::try_put`](crate::BoundedQueue::try_put).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryPutError<T> {
    /// The queue is full. Contains the value that was not enqueued.
    Full(T),
    /// The queue is closed. Contains the value that was not enqueued.
    Closed(T),
}

impl<T> TryPutError<T> {
    /// Returns the value that was not enqueued.
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(v) | Self::Closed(v) => v,
        }
    }

    /// Returns `true` if this error is the `Full` variant.
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full(_))
    }

    /// Returns `true` if this error is the `Closed` variant.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }
}

impl<T> fmt::Display for TryPutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => write!(f, "queue full"),
            Self::Closed(_) => write!(f, "queue closed"),
        }
    }
}

impl<T: fmt::Debug> std::error::Error for TryPutError<T> {}

/// Error returned by [`BoundedQueue::try_take`](crate::BoundedQueue::try_take).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryTakeError {
    /// The queue is empty but still open.
    Empty,
    /// The queue is closed and empty.
    Closed,
}

impl TryTakeError {
    /// Returns `true` if this error is the `Empty` variant.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns `true` if this error is the `Closed` variant.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for TryTakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "queue empty"),
            Self::Closed => write!(f, "queue closed and drained"),
        }
    }
}

impl std::error::Error for TryTakeError {}

/// Error returned by [`BoundedQueue::put_timeout`](crate::BoundedQueue::put_timeout).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutTimeoutError<T> {
    /// No room appeared before the deadline. Contains the value.
    Timeout(T),
    /// The queue was closed while waiting. Contains the value.
    Closed(T),
}

impl<T> PutTimeoutError<T> {
    /// Returns the value that was not enqueued.
    pub fn into_inner(self) -> T {
        match self {
            Self::Timeout(v) | Self::Closed(v) => v,
        }
    }

    /// Returns `true` if this error is the `Timeout` variant.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Returns `true` if this error is the `Closed` variant.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }
}

impl<T> fmt::Display for PutTimeoutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(_) => write!(f, "timed out waiting for room"),
            Self::Closed(_) => write!(f, "queue closed"),
        }
    }
}

impl<T: fmt::Debug> std::error::Error for PutTimeoutError<T> {}

/// Error returned by [`BoundedQueue::take_timeout`](crate::BoundedQueue::take_timeout).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakeTimeoutError {
    /// Nothing arrived before the deadline.
    Timeout,
    /// The queue is closed and empty.
    Closed,
}

impl TakeTimeoutError {
    /// Returns `true` if this error is the `Timeout` variant.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this error is the `Closed` variant.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for TakeTimeoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timed out waiting for an element"),
            Self::Closed => write!(f, "queue closed and drained"),
        }
    }
}

impl std::error::Error for TakeTimeoutError {}
