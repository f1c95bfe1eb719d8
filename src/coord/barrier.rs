use std::sync::atomic::{AtomicUsize, Ordering};

/// Single-winner readiness barrier over a fixed reactor size
///
/// Every project's install step arrives exactly once; the arrival whose
/// increment reaches the reactor size makes its caller responsible for
/// draining the deferred queue. The increment and the comparison are one
/// indivisible fetch-and-increment, never a separate read and write.
pub struct ReadinessBarrier {
    total: usize,
    arrived: AtomicUsize,
}

impl ReadinessBarrier {
    /// Creates a barrier for a reactor of `total` projects
    pub fn new(total: usize) -> Self {
        Self {
            total,
            arrived: AtomicUsize::new(0),
        }
    }

    /// Records one arrival and returns the post-increment arrival count
    ///
    /// Exactly one caller per build run observes a count equal to the
    /// reactor size, regardless of interleaving. A count above the total
    /// means more install steps reported than the reactor holds.
    pub fn arrive(&self) -> usize {
        self.arrived.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Number of arrivals recorded so far
    pub fn arrivals(&self) -> usize {
        self.arrived.load(Ordering::Acquire)
    }

    /// The fixed reactor size this barrier waits for
    pub fn total(&self) -> usize {
        self.total
    }
}
