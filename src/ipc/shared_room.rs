use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use std::time::Instant;

use crate::metrics::PipelineMetrics;
use crate::model::{Room, RoomSnapshot};

/// The room model behind the node's single mutual-exclusion guard.
///
/// Every access is scoped: the lock is released when the guard (or the
/// closure passed to [`with`](Self::with)) goes out of scope, on every exit
/// path. Nested locking from the same thread deadlocks; critical sections
/// must not call back into the handle.
#[derive(Clone)]
pub struct SharedRoom {
    inner: Arc<Mutex<Room>>,
    metrics: PipelineMetrics,
}

impl SharedRoom {
    pub fn new(room: Room, metrics: PipelineMetrics) -> Self {
        Self {
            inner: Arc::new(Mutex::new(room)),
            metrics,
        }
    }

    /// Blocks until the guard is free. There is no timeout.
    pub fn lock(&self) -> MutexGuard<'_, Room> {
        let wait_start = Instant::now();
        let guard = self.inner.lock();
        self.metrics.record_lock_wait(wait_start.elapsed());
        guard
    }

    /// Runs `f` inside one critical section.
    pub fn with<R>(&self, f: impl FnOnce(&mut Room) -> R) -> R {
        let mut room = self.lock();
        f(&mut *room)
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        self.lock().snapshot()
    }

    pub fn room_number(&self) -> u16 {
        self.lock().room_number()
    }
}
