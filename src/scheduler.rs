//! Virtual-time timers
//!
//! Every simulated delay in the application is a timer on a virtual clock
//! measured from application start. Sessions own a [`Timers`] queue each and
//! are advanced by firing whatever is due, so tests can jump through a two
//! second "connection" without sleeping. The console binary maps the virtual
//! clock onto wall time.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

/// Handle to a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct Entry<E> {
    due: Duration,
    seq: u64,
    event: E,
}

impl<E> PartialEq for Entry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<E> Eq for Entry<E> {}

impl<E> PartialOrd for Entry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Entry<E> {
    // Reversed so the max-heap pops the earliest deadline, then the oldest timer
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A queue of pending events keyed by virtual deadline
pub struct Timers<E> {
    now: Duration,
    next_seq: u64,
    heap: BinaryHeap<Entry<E>>,
}

impl<E> Default for Timers<E> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            heap: BinaryHeap::new(),
        }
    }
}

impl<E> Timers<E> {
    /// Create an empty queue at virtual time zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time of this queue
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `event` to fire `delay` after the current virtual time
    pub fn schedule(&mut self, delay: Duration, event: E) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            due: self.now + delay,
            seq,
            event,
        });
        TimerId(seq)
    }

    /// Cancel one timer; returns whether it was still pending
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.heap.len();
        self.heap.retain(|entry| entry.seq != id.0);
        self.heap.len() != before
    }

    /// Cancel every pending timer whose event matches `predicate`
    pub fn cancel_where(&mut self, predicate: impl Fn(&E) -> bool) -> usize {
        let before = self.heap.len();
        self.heap.retain(|entry| !predicate(&entry.event));
        before - self.heap.len()
    }

    /// Cancel everything
    pub fn cancel_all(&mut self) {
        self.heap.clear();
    }

    /// Pop the earliest event due at or before `until`, moving the clock to
    /// its deadline
    pub fn pop_due(&mut self, until: Duration) -> Option<(Duration, E)> {
        if self.heap.peek().map_or(true, |entry| entry.due > until) {
            return None;
        }
        let entry = self.heap.pop()?;
        self.now = self.now.max(entry.due);
        Some((entry.due, entry.event))
    }

    /// Move the clock forward to `until` without firing anything
    pub fn advance_clock(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    /// Deadline of the next pending event
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.heap.peek().map(|entry| entry.due)
    }

    /// Number of pending timers
    #[must_use]
    pub fn pending(&self) -> usize {
        self.heap.len()
    }
}

/// A state machine driven by its own timers
pub trait Simulated {
    /// Fire every event due at or before `now`, in deadline order
    fn advance_to(&mut self, now: Duration);

    /// Earliest pending deadline, if any
    fn next_deadline(&self) -> Option<Duration>;

    /// Cancel all pending timers; nothing changes afterwards
    fn teardown(&mut self);
}
