use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info};

use crate::clock::TickClock;
use crate::control::{decide, Thresholds};
use crate::error::{NodeResult, StreamError};
use crate::ipc::{QueueReceiver, SharedRoom, StreamWriter};
use crate::metrics::PipelineMetrics;
use crate::reading::{Reading, TimestampedReading};

use super::{message_line, record_line, spawn_task, LogSender, CONTROL};

pub struct Controller {
    room: SharedRoom,
    stream: StreamWriter,
    log: LogSender,
    metrics: PipelineMetrics,
    clock: TickClock,
    thresholds: Thresholds,
}

impl Controller {
    pub fn new(
        room: SharedRoom,
        stream: StreamWriter,
        log: LogSender,
        metrics: PipelineMetrics,
        clock: TickClock,
        thresholds: Thresholds,
    ) -> Self {
        Self { room, stream, log, metrics, clock, thresholds }
    }

    /// Applies the policy for one reading, then stamps it and offers it to
    /// the stream buffer without waiting. A rejected record is dropped.
    pub fn handle(&self, reading: Reading) -> Result<TimestampedReading, StreamError> {
        let decision = decide(&reading, &self.thresholds);
        // One critical section, so cooling and heating are never seen on together.
        self.room.with(|room| decision.apply(room));

        for line in decision.describe(&self.thresholds) {
            self.log.send(message_line(CONTROL.name, &line));
        }

        let record = reading.stamp(self.clock.now());
        let sent = self.stream.send_record(&record, Duration::ZERO);
        if let Err(e) = &sent {
            self.metrics.record_dropped();
            debug!(error = %e, timestamp = record.timestamp, "record dropped at stream buffer");
        }

        self.log.send(record_line(CONTROL.name, "Send to stream:", &record));
        sent.map(|()| record)
    }

    /// Blocks on the sensor queue until every producer is gone.
    pub fn run(self, readings: QueueReceiver<Reading>) {
        while let Some(reading) = readings.recv() {
            // Rejections are already counted and logged by `handle`.
            self.handle(reading).ok();
        }
        info!("sensor queue drained and closed");
    }
}

pub fn spawn_control_thread(controller: Controller, readings: QueueReceiver<Reading>) -> NodeResult<JoinHandle<()>> {
    spawn_task(CONTROL, move || controller.run(readings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::{bounded_queue, stream_buffer, StreamReader};
    use crate::model::Room;

    fn controller(stream_bytes: usize) -> (Controller, StreamReader, QueueReceiver<String>, SharedRoom, PipelineMetrics) {
        let metrics = PipelineMetrics::new();
        let room = SharedRoom::new(Room::new(101), metrics.clone());
        let (writer, reader) = stream_buffer(stream_bytes);
        let (log_tx, log_rx) = bounded_queue("log", 64);
        let ctl = Controller::new(
            room.clone(),
            writer,
            LogSender::new(log_tx, metrics.clone()),
            metrics.clone(),
            TickClock::start(),
            Thresholds::default(),
        );
        (ctl, reader, log_rx, room, metrics)
    }

    #[test]
    fn hot_room_with_motion_cools_and_lights() {
        let (ctl, reader, log_rx, room, _) = controller(256);
        let before = ctl.clock.now();
        let sent = ctl.handle(Reading::new(30, 1)).unwrap();

        let snap = room.snapshot();
        assert!(snap.cooling && !snap.heating && snap.light);
        assert_eq!((sent.temperature, sent.motion), (30, 1));
        assert!(sent.timestamp >= before);
        assert_eq!(reader.receive_record().unwrap(), sent);

        let lines: Vec<String> = std::iter::from_fn(|| log_rx.try_recv()).collect();
        assert_eq!(lines[0], "[Controller  ] T > 25C : Cooling on, Heating off");
        assert_eq!(lines[1], "[Controller  ] Motion detected: Light on");
        assert!(lines[2].starts_with("[Controller  ] Send to stream:    Temp:  30  Motion: 1"));
    }

    #[test]
    fn cold_and_mild_rooms() {
        let (ctl, _reader, _log, room, _) = controller(256);
        ctl.handle(Reading::new(15, 0)).unwrap();
        let snap = room.snapshot();
        assert!(snap.heating && !snap.cooling && !snap.light);

        ctl.handle(Reading::new(22, 0)).unwrap();
        let snap = room.snapshot();
        assert!(!snap.heating && !snap.cooling && !snap.light);
    }

    #[test]
    fn full_stream_buffer_drops_record_but_still_actuates() {
        let (ctl, reader, _log, room, metrics) = controller(8);
        ctl.handle(Reading::new(22, 0)).unwrap();
        let err = ctl.handle(Reading::new(40, 1)).unwrap_err();

        assert!(matches!(err, StreamError::Full { .. }));
        assert!(room.snapshot().cooling);
        assert_eq!(metrics.report().records_dropped, 1);
        assert_eq!(reader.receive_record().unwrap().temperature, 22);
    }

    #[test]
    fn run_processes_in_fifo_order() {
        let (ctl, reader, _log, _room, _) = controller(256);
        let (tx, rx) = bounded_queue("sensor", 20);
        for t in [30, 15, 22, 26, 19] {
            tx.try_send(Reading::new(t, 0)).unwrap();
        }
        drop(tx);
        ctl.run(rx);

        let order: Vec<u16> = std::iter::from_fn(|| reader.receive_record().ok()).map(|r| r.temperature).collect();
        assert_eq!(order, vec![30, 15, 22, 26, 19]);
    }

    #[test]
    fn run_keeps_going_after_a_dropped_record() {
        let (ctl, reader, _log, room, metrics) = controller(8);
        let (tx, rx) = bounded_queue("sensor", 20);
        for t in [22, 30, 15] {
            tx.try_send(Reading::new(t, 0)).unwrap();
        }
        drop(tx);
        ctl.run(rx);

        assert_eq!(metrics.report().records_dropped, 2);
        assert!(room.snapshot().heating, "last reading was still applied");
        assert_eq!(reader.receive_record().unwrap().temperature, 22);
    }
}
