use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TrySendError};
use std::time::Duration;

use crate::error::QueueError;

/// Creates a fixed-capacity FIFO. Sends never block; receives do.
pub fn bounded_queue<T>(name: &'static str, capacity: usize) -> (QueueSender<T>, QueueReceiver<T>) {
    let (tx, rx) = channel::bounded(capacity);
    (
        QueueSender { name, tx },
        QueueReceiver { name, rx },
    )
}

pub struct QueueSender<T> {
    name: &'static str,
    tx: Sender<T>,
}

// Manual impl: `T` itself need not be `Clone`.
impl<T> Clone for QueueSender<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            tx: self.tx.clone(),
        }
    }
}

impl<T> QueueSender<T> {
    /// Non-blocking send. A full queue rejects the new item and leaves the
    /// queued ones untouched.
    pub fn try_send(&self, item: T) -> Result<(), QueueError<T>> {
        self.tx.try_send(item).map_err(|e| match e {
            TrySendError::Full(item) => QueueError::Full(item),
            TrySendError::Disconnected(item) => QueueError::Disconnected(item),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }
}

pub struct QueueReceiver<T> {
    name: &'static str,
    rx: Receiver<T>,
}

impl<T> QueueReceiver<T> {
    /// Blocks until an item arrives. `None` once every sender is gone and
    /// the queue is drained.
    pub fn recv(&self) -> Option<T> {
        self.rx.recv().ok()
    }

    /// Like [`recv`](Self::recv) but gives up after `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    pub fn try_recv(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
