//! Control module - Threshold policy mapping a reading to actuator states

use crate::model::Room;
use crate::reading::Reading;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Cooling switches on strictly above this temperature.
    pub cooling_above: u16,
    /// Heating switches on strictly below this temperature.
    pub heating_below: u16,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cooling_above: 25,
            heating_below: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClimateAction {
    Cool,
    Heat,
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub climate: ClimateAction,
    pub light: bool,
}

impl Decision {
    pub fn cooling(&self) -> bool {
        self.climate == ClimateAction::Cool
    }

    pub fn heating(&self) -> bool {
        self.climate == ClimateAction::Heat
    }

    /// Writes all three actuators. Cooling and heating are never both on.
    pub fn apply(&self, room: &mut Room) {
        room.set_cooling(self.cooling());
        room.set_heating(self.heating());
        room.set_light(self.light);
    }

    /// Human-readable lines, one per policy branch taken.
    pub fn describe(&self, thresholds: &Thresholds) -> [String; 2] {
        let climate = match self.climate {
            ClimateAction::Cool => format!("T > {}C : Cooling on, Heating off", thresholds.cooling_above),
            ClimateAction::Heat => format!("T < {}C : Heating on, Cooling off", thresholds.heating_below),
            ClimateAction::Idle => format!(
                "{}C <= T <= {}C : Cooling off, Heating off",
                thresholds.heating_below, thresholds.cooling_above
            ),
        };
        let light = if self.light {
            "Motion detected: Light on".to_string()
        } else {
            "Motion not detected: Light off".to_string()
        };
        [climate, light]
    }
}

pub fn decide_climate(temperature: u16, thresholds: &Thresholds) -> ClimateAction {
    if temperature > thresholds.cooling_above {
        ClimateAction::Cool
    } else if temperature < thresholds.heating_below {
        ClimateAction::Heat
    } else {
        ClimateAction::Idle
    }
}

pub fn decide(reading: &Reading, thresholds: &Thresholds) -> Decision {
    Decision {
        climate: decide_climate(reading.temperature, thresholds),
        light: reading.motion > 0,
    }
}
