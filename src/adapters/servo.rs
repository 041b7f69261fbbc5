//! Simulated servo bank.
//!
//! Stands in for the PWM servo driver on a host build.  Every channel
//! remembers its last commanded angle and whether it is energised, so a
//! run can be inspected after the fact and the log shows what a real bank
//! would have been told.

use std::collections::BTreeMap;

use log::{debug, trace};

use crate::app::ports::ActuatorPort;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ServoChannel {
    pub angle: f32,
    pub enabled: bool,
}

#[derive(Debug, Default)]
pub struct SimulatedServoBank {
    channels: BTreeMap<u8, ServoChannel>,
    commands: u64,
}

impl SimulatedServoBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(&self, channel: u8) -> Option<ServoChannel> {
        self.channels.get(&channel).copied()
    }

    /// Position commands received so far.
    pub fn command_count(&self) -> u64 {
        self.commands
    }
}

impl ActuatorPort for SimulatedServoBank {
    fn set_position(&mut self, channel: u8, angle: f32) {
        self.commands += 1;
        let ch = self.channels.entry(channel).or_default();
        ch.angle = angle;
        if ch.enabled {
            trace!("servo {channel}: {angle:.1}°");
        } else {
            debug!("servo {channel}: {angle:.1}° stored while disabled");
        }
    }

    fn enable(&mut self, channel: u8) {
        self.channels.entry(channel).or_default().enabled = true;
    }

    fn disable(&mut self, channel: u8) {
        self.channels.entry(channel).or_default().enabled = false;
    }
}
