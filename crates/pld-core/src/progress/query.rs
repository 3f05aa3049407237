use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::observer::ProgressObserver;

/// Monotonic count of resolved titles, `0..=total`.
pub struct QueryProgress {
    total: usize,
    resolved: AtomicUsize,
    observer: Arc<dyn ProgressObserver>,
}

impl QueryProgress {
    pub fn new(total: usize, observer: Arc<dyn ProgressObserver>) -> Self {
        observer.query_started(total);
        Self {
            total,
            resolved: AtomicUsize::new(0),
            observer,
        }
    }

    /// Counts one resolution; saturates at `total`. Returns the new count.
    pub fn advance(&self) -> usize {
        let previous = self
            .resolved
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.total).then_some(n + 1)
            });
        let now = match previous {
            Ok(n) => n + 1,
            Err(n) => n,
        };
        self.observer.query_advanced(now, self.total);
        now
    }

    pub fn resolved(&self) -> usize {
        self.resolved.load(Ordering::Acquire)
    }

    pub fn total(&self) -> usize {
        self.total
    }
}
