pub mod clock;
pub mod config;
pub mod control;
pub mod error;
pub mod ipc;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod reading;
pub mod sink;
pub mod source;
pub mod tasks;
pub mod transport;

pub use clock::{Period, Tick, TickClock};
pub use config::{load_config, NodeConfig};
pub use control::{decide, ClimateAction, Decision, Thresholds};
pub use error::{ConfigError, NodeError, NodeResult, QueueError, StreamError, TransportError};
pub use ipc::{bounded_queue, stream_buffer, QueueReceiver, QueueSender, SharedRoom, StreamReader, StreamWriter};
pub use metrics::{MetricsReport, PipelineMetrics};
pub use model::{Room, RoomSnapshot};
pub use pipeline::{spawn_pipeline, PipelineHandle};
pub use reading::{Reading, TimestampedReading, RECORD_LEN};
pub use sink::{LineSink, MemoryLog, WriterSink};
pub use source::{ScriptedSensors, SensorSource, SimulatedSensors};
pub use transport::{Connectivity, LinkTransport, MemoryTransport, NullTransport, Qos, Transport};
