use std::thread::JoinHandle;
use tracing::{info, warn};

use crate::error::NodeResult;
use crate::ipc::QueueReceiver;
use crate::metrics::PipelineMetrics;
use crate::sink::LineSink;

use super::{spawn_task, LOGGER};

/// Makes `line` safe for a fixed `max_len` buffer: cut at the first
/// terminator or line break, then keep at most `max_len - 1` bytes without
/// splitting a character.
pub fn terminate_line(line: &str, max_len: usize) -> &str {
    let line = match line.find(|c: char| matches!(c, '\0' | '\r' | '\n')) {
        Some(end) => &line[..end],
        None => line,
    };
    let limit = max_len.saturating_sub(1);
    if line.len() <= limit {
        return line;
    }
    let mut end = limit;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}

/// Sole writer of the output sink. Lines go out in queue order.
pub fn run_logger<S: LineSink>(lines: QueueReceiver<String>, mut sink: S, max_len: usize, metrics: PipelineMetrics) {
    while let Some(line) = lines.recv() {
        if let Err(e) = sink.write_line(terminate_line(&line, max_len)) {
            metrics.sink_error();
            warn!(error = %e, "output sink write failed");
        }
    }
    info!("log queue closed");
}

pub fn spawn_logger_thread<S: LineSink + 'static>(
    lines: QueueReceiver<String>,
    sink: S,
    max_len: usize,
    metrics: PipelineMetrics,
) -> NodeResult<JoinHandle<()>> {
    spawn_task(LOGGER, move || run_logger(lines, sink, max_len, metrics))
}
