use std::thread::JoinHandle;
use tracing::{debug, info, warn};

use crate::clock::TickClock;
use crate::error::{NodeResult, StreamError, TransportError};
use crate::ipc::StreamReader;
use crate::metrics::PipelineMetrics;
use crate::reading::{TimestampedReading, RECORD_LEN};
use crate::transport::{Connectivity, Qos, TelemetryPayload, Transport};

use super::{message_line, record_line, spawn_task, LogSender, TRANSMIT};

pub struct Transmitter<T> {
    transport: T,
    connectivity: Connectivity,
    log: LogSender,
    metrics: PipelineMetrics,
    clock: TickClock,
    topic: String,
    qos: Qos,
    room_number: u16,
}

impl<T: Transport> Transmitter<T> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        transport: T,
        connectivity: Connectivity,
        log: LogSender,
        metrics: PipelineMetrics,
        clock: TickClock,
        topic: impl Into<String>,
        qos: Qos,
        room_number: u16,
    ) -> Self {
        Self {
            transport,
            connectivity,
            log,
            metrics,
            clock,
            topic: topic.into(),
            qos,
            room_number,
        }
    }

    /// Publishes one record. At most once: nothing is retried.
    pub fn forward(&mut self, record: &TimestampedReading) -> Result<(), TransportError> {
        if !self.connectivity.is_ready() {
            return Err(TransportError::NotConnected);
        }
        let payload = TelemetryPayload::new(record, self.room_number).to_json()?;
        self.transport.publish(&self.topic, &payload, self.qos)
    }

    pub fn handle(&mut self, record: &TimestampedReading) {
        self.metrics.record_transit(self.clock.since(record.timestamp));

        match self.forward(record) {
            Ok(()) => {
                self.metrics.record_forwarded();
                self.log.send(record_line(TRANSMIT.name, "Transmit to gateway:", record));
            }
            Err(TransportError::NotConnected) => {
                self.metrics.offline_drop();
                debug!(timestamp = record.timestamp, "link not ready, record dropped");
                self.log.send(message_line(TRANSMIT.name, "Link not ready: record dropped"));
            }
            Err(e) => {
                self.metrics.publish_failed();
                warn!(error = %e, topic = %self.topic, "publish failed");
                self.log.send(message_line(TRANSMIT.name, &format!("Publish failed: {e}")));
            }
        }
        self.log.send(" ".to_string());
    }

    /// Drains the stream buffer one record at a time until the control side
    /// hangs up. Anything short of a whole record is discarded.
    pub fn run(mut self, stream: StreamReader) {
        let mut buf = [0u8; RECORD_LEN];
        loop {
            let received = match stream.receive(&mut buf, None) {
                Ok(n) => n,
                Err(StreamError::Closed) => break,
                Err(e) => {
                    self.metrics.stream_shortfall();
                    debug!(error = %e, "stream receive failed");
                    continue;
                }
            };

            match TimestampedReading::from_bytes(&buf[..received]) {
                Some(record) => self.handle(&record),
                None => {
                    self.metrics.stream_shortfall();
                    debug!(received, expected = RECORD_LEN, "partial record discarded");
                }
            }
        }
        info!("stream buffer closed");
    }
}

pub fn spawn_transmit_thread<T: Transport + 'static>(
    transmitter: Transmitter<T>,
    stream: StreamReader,
) -> NodeResult<JoinHandle<()>> {
    spawn_task(TRANSMIT, move || transmitter.run(stream))
}
