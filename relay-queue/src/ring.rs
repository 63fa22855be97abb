//! The ring storage behind [`BoundedQueue`](crate::BoundedQueue).
//!
//! `Ring` is plain single-threaded bookkeeping. All synchronization lives in
//! the queue; every method here is called with the queue lock held.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │ slots: [Option<T>; capacity]                          │
//! ├───────────────────────────────────────────────────────┤
//! │ head  - oldest occupied slot (valid when count > 0)   │
//! │ tail  - next slot to write   (valid when count < cap) │
//! │ count - occupied slots, 0..=capacity                  │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! Occupied slots are `[head, head + count)` taken modulo capacity, so
//! `tail == (head + count) % capacity` at all times.

pub(crate) struct Ring<T> {
    slots: Box<[Option<T>]>,
    head: usize,
    tail: usize,
    count: usize,
}

impl<T> Ring<T> {
    /// Allocates `capacity` empty slots. Capacity is used as-is, no rounding.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "ring capacity must be non-zero");
        let slots = std::iter::repeat_with(|| None).take(capacity).collect();
        Self {
            slots,
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    #[inline]
    fn advance(&self, index: usize) -> usize {
        let next = index + 1;
        if next == self.capacity() { 0 } else { next }
    }

    /// Writes `value` at `tail`. The caller has already waited for room.
    ///
    /// # Panics
    ///
    /// Panics if the ring is full or the tail slot is occupied. Either means
    /// the queue's bookkeeping is broken.
    pub(crate) fn push(&mut self, value: T) {
        assert!(
            self.count < self.capacity(),
            "push into full ring (count {}, capacity {})",
            self.count,
            self.capacity()
        );
        let slot = &mut self.slots[self.tail];
        assert!(slot.is_none(), "tail slot {} already occupied", self.tail);
        *slot = Some(value);

        self.tail = self.advance(self.tail);
        self.count += 1;
        self.debug_check();
    }

    /// Removes and returns the value at `head`. The caller has already waited
    /// for an element.
    ///
    /// # Panics
    ///
    /// Panics if the ring is empty or the head slot is vacant.
    pub(crate) fn pop(&mut self) -> T {
        assert!(self.count > 0, "pop from empty ring");
        let Some(value) = self.slots[self.head].take() else {
            panic!(
                "head slot {} vacant with {} element(s) resident",
                self.head, self.count
            );
        };

        self.head = self.advance(self.head);
        self.count -= 1;
        self.debug_check();
        value
    }

    #[inline]
    fn debug_check(&self) {
        debug_assert!(self.head < self.capacity());
        debug_assert!(self.tail < self.capacity());
        debug_assert!(self.count <= self.capacity());
        debug_assert_eq!(self.tail, (self.head + self.count) % self.capacity());
    }
}
