use std::collections::VecDeque;
use std::sync::Mutex;

use crate::coord::types::InstallRequest;

/// FIFO queue of deferred install requests, shared by every project task
/// in one build run
///
/// Push and pop are each atomic; pop is exclusive, so no two tasks can
/// remove the same request. The drain loop keeps popping until it
/// observes the queue empty rather than working from a snapshot.
pub struct DeferredQueue {
    inner: Mutex<VecDeque<InstallRequest>>,
}

impl DeferredQueue {
    /// Creates an empty queue for one build run
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
        }
    }

    /// Appends a request to the back of the queue
    pub fn push(&self, request: InstallRequest) {
        self.lock().push_back(request);
    }

    /// Removes and returns the oldest request, if any
    pub fn pop(&self) -> Option<InstallRequest> {
        self.lock().pop_front()
    }

    /// Returns the current number of queued requests
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Checks if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<InstallRequest>> {
        // A poisoned lock only means another task panicked mid-mutation;
        // the VecDeque itself is still structurally sound.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for DeferredQueue {
    fn default() -> Self {
        Self::new()
    }
}
