use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::StreamError;
use crate::reading::{TimestampedReading, RECORD_LEN};

// ============================================================================
// RING - Fixed-capacity byte storage
// ============================================================================

struct Ring {
    buf: Box<[u8]>,
    head: usize,
    len: usize,
}

impl Ring {
    fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.buf.len()
    }

    fn free(&self) -> usize {
        self.capacity() - self.len
    }

    fn push(&mut self, data: &[u8]) {
        debug_assert!(data.len() <= self.free());
        let cap = self.capacity();
        let tail = (self.head + self.len) % cap;
        let first = data.len().min(cap - tail);
        self.buf[tail..tail + first].copy_from_slice(&data[..first]);
        self.buf[..data.len() - first].copy_from_slice(&data[first..]);
        self.len += data.len();
    }

    fn pop(&mut self, out: &mut [u8]) {
        debug_assert!(out.len() <= self.len);
        let cap = self.capacity();
        let first = out.len().min(cap - self.head);
        out[..first].copy_from_slice(&self.buf[self.head..self.head + first]);
        let rest = out.len() - first;
        out[first..].copy_from_slice(&self.buf[..rest]);
        self.head = (self.head + out.len()) % cap;
        self.len -= out.len();
    }
}

// ============================================================================
// STREAM BUFFER - Single-producer/single-consumer record channel
// ============================================================================

struct State {
    ring: Ring,
    writer_alive: bool,
    reader_alive: bool,
}

struct Shared {
    state: Mutex<State>,
    data_ready: Condvar,
    space_ready: Condvar,
}

/// Creates a byte ring of `capacity` bytes carrying whole
/// [`RECORD_LEN`]-byte records from one writer to one reader.
///
/// Writes are all-or-nothing and reads only ever return whole records, so a
/// partial record can never reach the reader.
pub fn stream_buffer(capacity: usize) -> (StreamWriter, StreamReader) {
    let shared = Arc::new(Shared {
        state: Mutex::new(State {
            ring: Ring::new(capacity),
            writer_alive: true,
            reader_alive: true,
        }),
        data_ready: Condvar::new(),
        space_ready: Condvar::new(),
    });
    (
        StreamWriter { shared: shared.clone() },
        StreamReader { shared },
    )
}

pub struct StreamWriter {
    shared: Arc<Shared>,
}

impl StreamWriter {
    /// Writes `data`, waiting up to `wait` for room. `data` must be a whole
    /// number of records. Returns the bytes accepted, which is always
    /// `data.len()`; anything less is reported as an error and nothing is
    /// written.
    pub fn send(&self, data: &[u8], wait: Duration) -> Result<usize, StreamError> {
        if data.is_empty() || data.len() % RECORD_LEN != 0 {
            return Err(StreamError::Shortfall {
                expected: RECORD_LEN,
                actual: data.len(),
            });
        }

        let deadline = Instant::now() + wait;
        let mut state = self.shared.state.lock();
        loop {
            if !state.reader_alive {
                return Err(StreamError::Closed);
            }
            if state.ring.free() >= data.len() {
                break;
            }
            if data.len() > state.ring.capacity()
                || self.shared.space_ready.wait_until(&mut state, deadline).timed_out()
            {
                // Re-check once: space may have appeared right at the deadline.
                if state.reader_alive && state.ring.free() >= data.len() {
                    break;
                }
                return Err(StreamError::Full {
                    requested: data.len(),
                    available: state.ring.free(),
                });
            }
        }

        state.ring.push(data);
        drop(state);
        self.shared.data_ready.notify_one();
        Ok(data.len())
    }

    pub fn send_record(&self, record: &TimestampedReading, wait: Duration) -> Result<(), StreamError> {
        self.send(&record.to_bytes(), wait).map(|_| ())
    }

    pub fn bytes_available(&self) -> usize {
        self.shared.state.lock().ring.len
    }
}

impl Drop for StreamWriter {
    fn drop(&mut self) {
        self.shared.state.lock().writer_alive = false;
        self.shared.data_ready.notify_all();
    }
}

pub struct StreamReader {
    shared: Arc<Shared>,
}

impl StreamReader {
    /// Receives as many whole records as fit in `buf`, blocking until at
    /// least one is available (`wait = None`) or for at most `wait`.
    ///
    /// Returns the number of bytes copied, always a multiple of
    /// [`RECORD_LEN`]; `Ok(0)` means the wait timed out. A `buf` smaller than
    /// one record is rejected with [`StreamError::Shortfall`] without
    /// consuming anything.
    pub fn receive(&self, buf: &mut [u8], wait: Option<Duration>) -> Result<usize, StreamError> {
        if buf.len() < RECORD_LEN {
            return Err(StreamError::Shortfall {
                expected: RECORD_LEN,
                actual: buf.len(),
            });
        }

        let deadline = wait.map(|w| Instant::now() + w);
        let mut state = self.shared.state.lock();
        while state.ring.len < RECORD_LEN {
            if !state.writer_alive {
                return Err(StreamError::Closed);
            }
            match deadline {
                Some(deadline) => {
                    if self.shared.data_ready.wait_until(&mut state, deadline).timed_out()
                        && state.ring.len < RECORD_LEN
                    {
                        return Ok(0);
                    }
                }
                None => self.shared.data_ready.wait(&mut state),
            }
        }

        let n = (state.ring.len.min(buf.len()) / RECORD_LEN) * RECORD_LEN;
        state.ring.pop(&mut buf[..n]);
        drop(state);
        self.shared.space_ready.notify_one();
        Ok(n)
    }

    /// Blocks for exactly one record.
    pub fn receive_record(&self) -> Result<TimestampedReading, StreamError> {
        let mut buf = [0u8; RECORD_LEN];
        let n = self.receive(&mut buf, None)?;
        TimestampedReading::from_bytes(&buf[..n]).ok_or(StreamError::Shortfall {
            expected: RECORD_LEN,
            actual: n,
        })
    }

    pub fn bytes_available(&self) -> usize {
        self.shared.state.lock().ring.len
    }
}

impl Drop for StreamReader {
    fn drop(&mut self) {
        self.shared.state.lock().reader_alive = false;
        self.shared.space_ready.notify_all();
    }
}
