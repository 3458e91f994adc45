use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info};

use crate::clock::Period;
use crate::error::{NodeResult, QueueError};
use crate::ipc::{QueueSender, SharedRoom};
use crate::metrics::PipelineMetrics;
use crate::reading::Reading;
use crate::source::SensorSource;

use super::{sensor_line, spawn_task, LogSender, ACQUIRE};

/// One acquisition: store `sample` in the room, read it back under a second
/// critical section, log both, and offer the read-back value to the control
/// task. The returned reading is what was enqueued (or rejected).
pub fn acquire_cycle(
    sample: Reading,
    room: &SharedRoom,
    readings: &QueueSender<Reading>,
    log: &LogSender,
    metrics: &PipelineMetrics,
) -> Result<Reading, QueueError<Reading>> {
    room.with(|room| {
        room.write_temperature(sample.temperature);
        room.write_motion(sample.motion);
    });

    let stored = room.with(|room| Reading::new(room.read_temperature(), room.read_motion()));
    metrics.reading_acquired();

    log.send(sensor_line(ACQUIRE.name, "Set sensor values:", sample.temperature, sample.motion));
    log.send(sensor_line(ACQUIRE.name, "Get sensor values:", stored.temperature, stored.motion));

    match readings.try_send(stored) {
        Ok(()) => Ok(stored),
        Err(QueueError::Full(dropped)) => {
            metrics.reading_dropped();
            debug!(temperature = dropped.temperature, motion = dropped.motion, "sensor queue full, reading dropped");
            Err(QueueError::Full(dropped))
        }
        Err(e) => Err(e),
    }
}

/// Periodic acquisition loop. Returns when the source runs dry or the
/// control side of the sensor queue is gone.
pub fn run_acquire<S: SensorSource>(
    mut source: S,
    room: SharedRoom,
    readings: QueueSender<Reading>,
    log: LogSender,
    metrics: PipelineMetrics,
    period: Duration,
) {
    let mut period = Period::new(period);
    loop {
        let Some(sample) = source.sample() else {
            info!("sensor source exhausted");
            break;
        };

        if let Err(QueueError::Disconnected(_)) = acquire_cycle(sample, &room, &readings, &log, &metrics) {
            info!("sensor queue closed");
            break;
        }

        if period.wait() {
            debug!(interval = ?period.interval(), "acquire cycle overran its period");
        }
    }
}

pub fn spawn_acquire_thread<S: SensorSource + 'static>(
    source: S,
    room: SharedRoom,
    readings: QueueSender<Reading>,
    log: LogSender,
    metrics: PipelineMetrics,
    period: Duration,
) -> NodeResult<JoinHandle<()>> {
    spawn_task(ACQUIRE, move || run_acquire(source, room, readings, log, metrics, period))
}
