use super::device::{Device, DeviceKind};
use super::sensor::{Sensor, SensorKind};

/// Sensors and actuators of one room. Plain data: synchronisation is the
/// caller's job (see [`crate::ipc::shared_room::SharedRoom`]).
///
/// The cooling/heating interlock is not enforced here; the control policy
/// owns it.
#[derive(Debug, Clone)]
pub struct Room {
    number: u16,
    motion: Sensor,
    temperature: Sensor,
    light: Device,
    cooling: Device,
    heating: Device,
}

/// Copy of every value in a [`Room`] taken in one critical section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoomSnapshot {
    pub temperature: u16,
    pub motion: u16,
    pub light: bool,
    pub cooling: bool,
    pub heating: bool,
}

impl Room {
    pub fn new(number: u16) -> Self {
        Self {
            number,
            motion: Sensor::new(SensorKind::Motion, number),
            temperature: Sensor::new(SensorKind::Temperature, number),
            light: Device::new(DeviceKind::Light, number),
            cooling: Device::new(DeviceKind::Cooling, number),
            heating: Device::new(DeviceKind::Heating, number),
        }
    }

    pub fn room_number(&self) -> u16 {
        self.number
    }

    pub fn write_temperature(&mut self, value: u16) {
        self.temperature.write(value);
    }

    pub fn write_motion(&mut self, value: u16) {
        self.motion.write(value);
    }

    pub fn read_temperature(&self) -> u16 {
        self.temperature.read()
    }

    pub fn read_motion(&self) -> u16 {
        self.motion.read()
    }

    pub fn set_light(&mut self, on: bool) {
        self.light.set(on);
    }

    pub fn set_cooling(&mut self, on: bool) {
        self.cooling.set(on);
    }

    pub fn set_heating(&mut self, on: bool) {
        self.heating.set(on);
    }

    pub fn light_on(&self) -> bool {
        self.light.is_on()
    }

    pub fn cooling_on(&self) -> bool {
        self.cooling.is_on()
    }

    pub fn heating_on(&self) -> bool {
        self.heating.is_on()
    }

    pub fn device(&self, kind: DeviceKind) -> &Device {
        match kind {
            DeviceKind::Light => &self.light,
            DeviceKind::Cooling => &self.cooling,
            DeviceKind::Heating => &self.heating,
        }
    }

    pub fn sensor(&self, kind: SensorKind) -> &Sensor {
        match kind {
            SensorKind::Motion => &self.motion,
            SensorKind::Temperature => &self.temperature,
        }
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            temperature: self.read_temperature(),
            motion: self.read_motion(),
            light: self.light_on(),
            cooling: self.cooling_on(),
            heating: self.heating_on(),
        }
    }
}
