//! Host rig adapter: bridges the simulated peripherals to the port traits.
//!
//! Bundles the command link, button, current sensor, jog input and clock
//! into one value that satisfies [`RigIo`](crate::app::ports::RigIo), so
//! the scheduler can be handed a single `&mut` for everything it polls.
//! Actuation stays separate: the servo bank is owned by the axis registry.
//!
//! On the host nothing drives the button pin or the jog input, so both are
//! inert and mode changes arrive over the link only (`SET_MODE`).  The
//! pin's [`SimulatedPin::set_high`] is where a test or a future front-end
//! injects presses.

use crate::app::ports::{
    ButtonPort, ClockPort, CurrentSensorPort, JogDirection, JogInputPort, LinkPort,
};
use crate::error::Result;

use super::button_pin::{PinButton, SimulatedPin};
use super::current::SimulatedCurrentSensor;
use super::link::StdioLink;
use super::time::SystemClock;

/// Jog input that is never deflected.  The host build has no stick.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdleJog;

impl JogInputPort for IdleJog {
    fn direction(&mut self) -> JogDirection {
        JogDirection::Neutral
    }
}

/// Concrete adapter that combines all polled host peripherals.
pub struct HostRig {
    link: StdioLink,
    button: PinButton<SimulatedPin>,
    current: SimulatedCurrentSensor,
    jog: IdleJog,
    clock: SystemClock,
}

impl HostRig {
    pub fn new(
        link: StdioLink,
        button: PinButton<SimulatedPin>,
        current: SimulatedCurrentSensor,
        clock: SystemClock,
    ) -> Self {
        Self {
            link,
            button,
            current,
            jog: IdleJog,
            clock,
        }
    }
}

// ── LinkPort ──────────────────────────────────────────────────

impl LinkPort for HostRig {
    fn has_data(&mut self) -> bool {
        self.link.has_data()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.link.read_byte()
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.link.write_line(line)
    }
}

// ── Inputs ────────────────────────────────────────────────────

impl ButtonPort for HostRig {
    fn is_pressed(&mut self) -> Result<bool> {
        self.button.is_pressed()
    }
}

impl CurrentSensorPort for HostRig {
    fn sample(&mut self) -> f32 {
        self.current.sample()
    }
}

impl JogInputPort for HostRig {
    fn direction(&mut self) -> JogDirection {
        self.jog.direction()
    }
}

impl ClockPort for HostRig {
    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn sleep_ms(&mut self, ms: u64) {
        self.clock.sleep_ms(ms);
    }
}
