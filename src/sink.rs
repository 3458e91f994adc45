//! Output sinks for the logger task.

use parking_lot::RwLock;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Arc;

pub trait LineSink: Send {
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

/// Writes each line, newline-terminated, to any byte writer.
pub struct WriterSink<W> {
    out: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl WriterSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> LineSink for WriterSink<W> {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.out.write_all(line.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

// ============================================================================
// MEMORY LOG - Bounded in-memory line store, readable from other threads
// ============================================================================

#[derive(Clone)]
pub struct MemoryLog {
    entries: Arc<RwLock<VecDeque<String>>>,
    max_size: usize,
}

impl MemoryLog {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(max_size))),
            max_size,
        }
    }

    pub fn read_all(&self) -> Vec<String> {
        self.entries.read().iter().cloned().collect()
    }
}

impl LineSink for MemoryLog {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut log = self.entries.write();
        log.push_back(line.to_string());
        if log.len() > self.max_size {
            log.pop_front();
        }
        Ok(())
    }
}
