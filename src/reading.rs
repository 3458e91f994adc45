//! Reading records exchanged between the pipeline tasks.

use crate::clock::Tick;

/// Size in bytes of one encoded [`TimestampedReading`] inside the stream buffer.
pub const RECORD_LEN: usize = 8;

/// Raw temperature/motion pair sampled from the room model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reading {
    pub temperature: u16,
    /// 0 or 1, kept as `u16` like the sensor register.
    pub motion: u16,
}

impl Reading {
    pub fn new(temperature: u16, motion: u16) -> Self {
        Self { temperature, motion }
    }

    pub fn stamp(self, timestamp: Tick) -> TimestampedReading {
        TimestampedReading {
            temperature: self.temperature,
            motion: self.motion,
            timestamp,
        }
    }
}

/// A [`Reading`] plus the tick at which the control task processed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimestampedReading {
    pub temperature: u16,
    pub motion: u16,
    pub timestamp: Tick,
}

impl TimestampedReading {
    /// Little-endian `temperature | motion | timestamp`.
    pub fn to_bytes(&self) -> [u8; RECORD_LEN] {
        let mut out = [0u8; RECORD_LEN];
        out[0..2].copy_from_slice(&self.temperature.to_le_bytes());
        out[2..4].copy_from_slice(&self.motion.to_le_bytes());
        out[4..8].copy_from_slice(&self.timestamp.to_le_bytes());
        out
    }

    /// Decodes exactly one record. Anything but `RECORD_LEN` bytes is rejected.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != RECORD_LEN {
            return None;
        }
        Some(Self {
            temperature: u16::from_le_bytes([bytes[0], bytes[1]]),
            motion: u16::from_le_bytes([bytes[2], bytes[3]]),
            timestamp: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }
}
