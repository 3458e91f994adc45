//! Sensor sources feeding the acquire task.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

use crate::reading::Reading;

/// Upper bound (exclusive) of simulated temperatures.
pub const SIM_TEMPERATURE_MAX: u16 = 100;
/// Upper bound (exclusive) of simulated motion values.
pub const SIM_MOTION_MAX: u16 = 2;

pub trait SensorSource: Send {
    /// Samples the sensors. `None` means the source is exhausted.
    fn sample(&mut self) -> Option<Reading>;
}

/// Seeded stand-in for the peripheral reads.
pub struct SimulatedSensors {
    rng: StdRng,
    samples: u64,
}

impl SimulatedSensors {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            samples: 0,
        }
    }

    pub fn samples_taken(&self) -> u64 {
        self.samples
    }
}

impl SensorSource for SimulatedSensors {
    fn sample(&mut self) -> Option<Reading> {
        self.samples += 1;
        Some(Reading {
            temperature: self.rng.gen_range(0..SIM_TEMPERATURE_MAX),
            motion: self.rng.gen_range(0..SIM_MOTION_MAX),
        })
    }
}

/// Replays a fixed list of readings, then reports exhaustion.
pub struct ScriptedSensors {
    script: VecDeque<Reading>,
}

impl ScriptedSensors {
    pub fn new(readings: impl IntoIterator<Item = Reading>) -> Self {
        Self {
            script: readings.into_iter().collect(),
        }
    }
}

impl SensorSource for ScriptedSensors {
    fn sample(&mut self) -> Option<Reading> {
        self.script.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_values_stay_in_range() {
        let mut sim = SimulatedSensors::new(42);
        for _ in 0..1_000 {
            let r = sim.sample().unwrap();
            assert!(r.temperature < SIM_TEMPERATURE_MAX);
            assert!(r.motion < SIM_MOTION_MAX);
        }
        assert_eq!(sim.samples_taken(), 1_000);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SimulatedSensors::new(7);
        let mut b = SimulatedSensors::new(7);
        for _ in 0..50 {
            assert_eq!(a.sample(), b.sample());
        }
    }

    #[test]
    fn simulation_covers_all_bands() {
        let mut sim = SimulatedSensors::new(1);
        let temps: Vec<u16> = (0..500).filter_map(|_| sim.sample()).map(|r| r.temperature).collect();
        assert!(temps.iter().any(|&t| t < 20));
        assert!(temps.iter().any(|&t| t > 25));
    }

    #[test]
    fn scripted_source_ends() {
        let mut src = ScriptedSensors::new([Reading::new(1, 0), Reading::new(2, 1)]);
        assert_eq!(src.sample(), Some(Reading::new(1, 0)));
        assert_eq!(src.sample(), Some(Reading::new(2, 1)));
        assert_eq!(src.sample(), None);
    }
}
