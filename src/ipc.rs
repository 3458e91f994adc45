//! IPC module - Inter-task communication (queues, stream buffer, guarded room)

pub mod channels;
pub mod shared_room;
pub mod stream_buffer;

pub use channels::{bounded_queue, QueueReceiver, QueueSender};
pub use shared_room::SharedRoom;
pub use stream_buffer::{stream_buffer, StreamReader, StreamWriter};
