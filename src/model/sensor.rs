use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Motion,
    Temperature,
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Motion => write!(f, "MotionDetector"),
            SensorKind::Temperature => write!(f, "TemperatureSensor"),
        }
    }
}

/// A single sensor register. Kinds differ only by their tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sensor {
    kind: SensorKind,
    number: u16,
    value: u16,
}

impl Sensor {
    pub fn new(kind: SensorKind, number: u16) -> Self {
        Self { kind, number, value: 0 }
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn number(&self) -> u16 {
        self.number
    }

    pub fn read(&self) -> u16 {
        self.value
    }

    pub fn write(&mut self, value: u16) {
        self.value = value;
    }
}
