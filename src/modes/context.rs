//! Context threaded through every mode hook.
//!
//! `ModeContext` borrows exactly what a mode may touch during one call:
//! the axis registry (and through it the actuators), the jog input, and the
//! tick timestamp.  It is rebuilt by the scheduler for each call, so modes
//! never hold on to shared state between ticks.

use crate::app::ports::{ActuatorPort, JogInputPort};
use crate::axis::AxisRegistry;

pub struct ModeContext<'a, A: ActuatorPort> {
    /// Targets and actuation.
    pub axes: &'a mut AxisRegistry<A>,
    /// Held jog input.
    pub jog: &'a mut dyn JogInputPort,
    /// Timestamp of this call (milliseconds, monotonic).
    pub now_ms: u64,
}

impl<'a, A: ActuatorPort> ModeContext<'a, A> {
    pub fn new(axes: &'a mut AxisRegistry<A>, jog: &'a mut dyn JogInputPort, now_ms: u64) -> Self {
        Self { axes, jog, now_ms }
    }
}
