//! Tasks module - The four pipeline loops and the helpers they share

pub mod acquire_task;
pub mod control_task;
pub mod logger_task;
pub mod transmit_task;

use std::thread::{self, JoinHandle};
use tracing::{debug, info};

use crate::error::{NodeError, NodeResult, QueueError};
use crate::ipc::QueueSender;
use crate::metrics::PipelineMetrics;
use crate::reading::TimestampedReading;

pub use acquire_task::{acquire_cycle, run_acquire, spawn_acquire_thread};
pub use control_task::{spawn_control_thread, Controller};
pub use logger_task::{run_logger, spawn_logger_thread, terminate_line};
pub use transmit_task::{spawn_transmit_thread, Transmitter};

// ============================================================================
// TASK DESCRIPTORS - Name and logical priority (higher runs first)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpec {
    pub name: &'static str,
    pub priority: u8,
}

// The read-back half of acquisition runs inside the acquire task, so the
// slot below it (4) is unused.
pub const ACQUIRE: TaskSpec = TaskSpec { name: "Acquire", priority: 5 };
pub const CONTROL: TaskSpec = TaskSpec { name: "Controller", priority: 3 };
pub const TRANSMIT: TaskSpec = TaskSpec { name: "Transmit", priority: 2 };
pub const LOGGER: TaskSpec = TaskSpec { name: "Logger", priority: 1 };

pub(crate) fn spawn_task<F>(spec: TaskSpec, body: F) -> NodeResult<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    info!(task = spec.name, priority = spec.priority, "spawning task");
    thread::Builder::new()
        .name(spec.name.to_lowercase())
        .spawn(body)
        .map_err(|source| NodeError::Spawn { task: spec.name, source })
}

// ============================================================================
// LOG SENDER - Best-effort producer side of the log queue
// ============================================================================

#[derive(Clone)]
pub struct LogSender {
    queue: QueueSender<String>,
    metrics: PipelineMetrics,
}

impl LogSender {
    pub fn new(queue: QueueSender<String>, metrics: PipelineMetrics) -> Self {
        Self { queue, metrics }
    }

    /// Enqueues `line` without blocking. Returns `false` if it was dropped.
    pub fn send(&self, line: String) -> bool {
        match self.queue.try_send(line) {
            Ok(()) => true,
            Err(QueueError::Full(line)) => {
                self.metrics.log_line_dropped();
                debug!(queue = self.queue.name(), %line, "log queue full, line dropped");
                false
            }
            Err(QueueError::Disconnected(_)) => {
                self.metrics.log_line_dropped();
                false
            }
        }
    }
}

// ============================================================================
// LINE FORMATS
// ============================================================================

pub fn sensor_line(task: &str, action: &str, temperature: u16, motion: u16) -> String {
    format!("[{task:<12}] {action:<18} Temp: {temperature:>3}  Motion: {motion}")
}

pub fn record_line(task: &str, action: &str, record: &TimestampedReading) -> String {
    format!(
        "{}  Timestamp: {}",
        sensor_line(task, action, record.temperature, record.motion),
        record.timestamp
    )
}

pub fn message_line(task: &str, message: &str) -> String {
    format!("[{task:<12}] {message}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::bounded_queue;
    use crate::reading::Reading;

    #[test]
    fn line_formats_are_column_aligned() {
        assert_eq!(
            sensor_line("Acquire", "Set sensor values:", 7, 1),
            "[Acquire     ] Set sensor values: Temp:   7  Motion: 1"
        );
        assert_eq!(
            record_line("Transmit", "Transmit to gateway:", &Reading::new(30, 0).stamp(42)),
            "[Transmit    ] Transmit to gateway: Temp:  30  Motion: 0  Timestamp: 42"
        );
        assert_eq!(message_line("Controller", "hi"), "[Controller  ] hi");
    }

    #[test]
    fn full_log_queue_drops_and_counts() {
        let metrics = PipelineMetrics::new();
        let (tx, rx) = bounded_queue("log", 1);
        let log = LogSender::new(tx, metrics.clone());
        assert!(log.send("first".into()));
        assert!(!log.send("second".into()));
        assert_eq!(metrics.report().log_lines_dropped, 1);
        assert_eq!(rx.recv().as_deref(), Some("first"));
    }

    #[test]
    fn priorities_descend_toward_the_sink() {
        assert!(ACQUIRE.priority > CONTROL.priority);
        assert!(CONTROL.priority > TRANSMIT.priority);
        assert!(TRANSMIT.priority > LOGGER.priority);
    }
}
