//! Pipeline module - Builds the channels and starts the tasks in priority order

use std::thread::JoinHandle;
use tracing::{error, info};

use crate::clock::TickClock;
use crate::config::NodeConfig;
use crate::control::Thresholds;
use crate::error::{NodeError, NodeResult};
use crate::ipc::{bounded_queue, stream_buffer, SharedRoom};
use crate::metrics::PipelineMetrics;
use crate::model::Room;
use crate::reading::Reading;
use crate::sink::LineSink;
use crate::source::SensorSource;
use crate::tasks::{
    spawn_acquire_thread, spawn_control_thread, spawn_logger_thread, spawn_transmit_thread, Controller,
    LogSender, Transmitter, ACQUIRE, CONTROL, LOGGER, TRANSMIT,
};
use crate::transport::{Connectivity, Transport};

pub struct PipelineHandle {
    tasks: Vec<(&'static str, JoinHandle<()>)>,
    room: SharedRoom,
    metrics: PipelineMetrics,
}

impl PipelineHandle {
    pub fn room(&self) -> &SharedRoom {
        &self.room
    }

    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Waits for every task. Tasks only end once their input closes, so with
    /// an endless source this blocks for the life of the process.
    pub fn join(self) -> NodeResult<()> {
        let mut result = Ok(());
        for (name, handle) in self.tasks {
            if handle.join().is_err() {
                error!(task = name, "task terminated abnormally");
                result = Err(NodeError::TaskPanicked(name));
            }
        }
        result
    }
}

/// Spawns acquire, control, transmit and logger, highest priority first.
pub fn spawn_pipeline<S, T, K>(
    config: &NodeConfig,
    source: S,
    transport: T,
    sink: K,
    connectivity: Connectivity,
) -> NodeResult<PipelineHandle>
where
    S: SensorSource + 'static,
    T: Transport + 'static,
    K: LineSink + 'static,
{
    config.validate()?;

    let metrics = PipelineMetrics::new();
    let clock = TickClock::start();
    let room = SharedRoom::new(Room::new(config.room_number), metrics.clone());

    let (reading_tx, reading_rx) = bounded_queue::<Reading>("sensor-readings", config.sensor_queue_depth);
    let (log_tx, log_rx) = bounded_queue::<String>("log-lines", config.log_queue_depth);
    let (stream_tx, stream_rx) = stream_buffer(config.stream_buffer_bytes);
    let log = LogSender::new(log_tx, metrics.clone());

    let thresholds = Thresholds {
        cooling_above: config.cooling_above,
        heating_below: config.heating_below,
    };
    let controller = Controller::new(room.clone(), stream_tx, log.clone(), metrics.clone(), clock, thresholds);
    let transmitter = Transmitter::new(
        transport,
        connectivity,
        log.clone(),
        metrics.clone(),
        clock,
        config.telemetry_topic.clone(),
        config.qos(),
        config.room_number,
    );

    let mut tasks = Vec::with_capacity(4);
    tasks.push((
        ACQUIRE.name,
        spawn_acquire_thread(source, room.clone(), reading_tx, log, metrics.clone(), config.sample_period())?,
    ));
    tasks.push((CONTROL.name, spawn_control_thread(controller, reading_rx)?));
    tasks.push((TRANSMIT.name, spawn_transmit_thread(transmitter, stream_rx)?));
    tasks.push((
        LOGGER.name,
        spawn_logger_thread(log_rx, sink, config.log_line_max_len, metrics.clone())?,
    ));

    info!(
        room = config.room_number,
        period_ms = config.sample_period_ms,
        sensor_queue = config.sensor_queue_depth,
        log_queue = config.log_queue_depth,
        stream_bytes = config.stream_buffer_bytes,
        "pipeline started"
    );

    Ok(PipelineHandle {
        tasks,
        room,
        metrics,
    })
}
