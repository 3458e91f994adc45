//! Transport module - Boundary to the gateway/cloud link
//!
//! The node only needs `publish(topic, payload, qos)` and a "network ready"
//! signal from whatever carries records off the board.

use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::TransportError;
use crate::reading::TimestampedReading;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Qos {
    AtMostOnce = 0,
    AtLeastOnce = 1,
}

impl TryFrom<u8> for Qos {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Qos::AtMostOnce),
            1 => Ok(Qos::AtLeastOnce),
            other => Err(format!("unsupported qos level {other}, expected 0 or 1")),
        }
    }
}

pub trait Transport: Send {
    fn publish(&mut self, topic: &str, payload: &[u8], qos: Qos) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn publish(&mut self, topic: &str, payload: &[u8], qos: Qos) -> Result<(), TransportError> {
        (**self).publish(topic, payload, qos)
    }
}

// ============================================================================
// TELEMETRY PAYLOAD - JSON body as the cloud gateway publishes it
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TelemetryPayload {
    pub temperature: u16,
    pub motion: u16,
    pub timestamp: u32,
    pub sensor_id: String,
    pub room: String,
}

impl TelemetryPayload {
    pub fn new(record: &TimestampedReading, room_number: u16) -> Self {
        Self {
            temperature: record.temperature,
            motion: record.motion,
            timestamp: record.timestamp,
            // The gateway keys rooms and sensors by a zero-padded id.
            sensor_id: format!("{room_number:03}"),
            room: format!("{room_number:03}"),
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, TransportError> {
        Ok(serde_json::to_vec(self)?)
    }
}

// ============================================================================
// TRANSPORTS
// ============================================================================

/// Accepts and discards everything. Stands in until a real link is attached.
#[derive(Debug, Default)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn publish(&mut self, _topic: &str, _payload: &[u8], _qos: Qos) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Frames each publish as one `topic qos payload` line on a byte sink, the
/// form the gateway reads off its serial port.
pub struct LinkTransport<W> {
    link: W,
}

impl<W: Write + Send> LinkTransport<W> {
    pub fn new(link: W) -> Self {
        Self { link }
    }

    pub fn into_inner(self) -> W {
        self.link
    }
}

impl<W: Write + Send> Transport for LinkTransport<W> {
    fn publish(&mut self, topic: &str, payload: &[u8], qos: Qos) -> Result<(), TransportError> {
        write!(self.link, "{} {} ", topic, qos as u8)?;
        self.link.write_all(payload)?;
        self.link.write_all(b"\n")?;
        self.link.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: Qos,
}

/// Records publishes in memory; can be switched to reject them.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    published: Arc<Mutex<Vec<Published>>>,
    failing: Arc<Mutex<bool>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    pub fn published(&self) -> Vec<Published> {
        self.published.lock().clone()
    }
}

impl Transport for MemoryTransport {
    fn publish(&mut self, topic: &str, payload: &[u8], qos: Qos) -> Result<(), TransportError> {
        if *self.failing.lock() {
            return Err(TransportError::Rejected {
                topic: topic.to_string(),
                reason: "broker unavailable".to_string(),
            });
        }
        self.published.lock().push(Published {
            topic: topic.to_string(),
            payload: payload.to_vec(),
            qos,
        });
        Ok(())
    }
}

// ============================================================================
// CONNECTIVITY - "network ready" level signal
// ============================================================================

#[derive(Clone, Default)]
pub struct Connectivity {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Connectivity {
    pub fn new(ready: bool) -> Self {
        Self {
            inner: Arc::new((Mutex::new(ready), Condvar::new())),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        let (lock, cvar) = &*self.inner;
        *lock.lock() = ready;
        cvar.notify_all();
    }

    pub fn is_ready(&self) -> bool {
        *self.inner.0.lock()
    }

    /// Waits up to `timeout` for the link to come up.
    pub fn wait_ready(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut ready = lock.lock();
        while !*ready {
            if cvar.wait_until(&mut ready, deadline).timed_out() {
                return *ready;
            }
        }
        true
    }
}
