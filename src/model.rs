//! Model module - In-memory state of one room: sensors, actuators, and the room itself

pub mod device;
pub mod room;
pub mod sensor;

pub use device::{Device, DeviceKind};
pub use room::{Room, RoomSnapshot};
pub use sensor::{Sensor, SensorKind};
