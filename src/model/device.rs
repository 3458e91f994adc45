use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Light,
    Cooling,
    Heating,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Light => write!(f, "Light"),
            DeviceKind::Cooling => write!(f, "Cooling"),
            DeviceKind::Heating => write!(f, "Heating"),
        }
    }
}

/// An on/off actuator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    kind: DeviceKind,
    number: u16,
    on: bool,
}

impl Device {
    pub fn new(kind: DeviceKind, number: u16) -> Self {
        Self { kind, number, on: false }
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn number(&self) -> u16 {
        self.number
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn set(&mut self, on: bool) {
        self.on = on;
    }
}
