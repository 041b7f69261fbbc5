//! Simulated supply current sensor.
//!
//! Reports a fixed baseline that can be changed at runtime through a
//! [`CurrentHandle`], so an overload can be injected into a running rig.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::app::ports::CurrentSensorPort;

/// Shared, lock-free setter for the simulated reading.
#[derive(Debug, Clone)]
pub struct CurrentHandle(Arc<AtomicU32>);

impl CurrentHandle {
    pub fn set(&self, amps: f32) {
        self.0.store(amps.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }
}

#[derive(Debug)]
pub struct SimulatedCurrentSensor {
    level: CurrentHandle,
}

impl SimulatedCurrentSensor {
    pub fn new(baseline_amps: f32) -> Self {
        Self {
            level: CurrentHandle(Arc::new(AtomicU32::new(baseline_amps.to_bits()))),
        }
    }

    pub fn handle(&self) -> CurrentHandle {
        self.level.clone()
    }
}

impl CurrentSensorPort for SimulatedCurrentSensor {
    fn sample(&mut self) -> f32 {
        self.level.get()
    }
}
