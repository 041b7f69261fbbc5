//! Safety supervisor.
//!
//! Runs from the scheduler at a fixed interval and watches the supply
//! current.  Each check takes an averaged reading (several sub-samples a
//! few milliseconds apart).
//!
//! ## Overload lifecycle
//!
//! 1. A reading above the limit while `Normal` disables every actuator
//!    **before** anything else is sampled.
//! 2. The supervisor enters `Holding` and blocks: it samples straight
//!    away, then again after every hold poll interval, until a reading is
//!    at or below `recovery_fraction × limit`.
//! 3. Actuation is re-enabled and the state returns to `Normal`.
//!
//! The hold freezes the whole control loop (command intake, status, mode
//! updates).  Only an external interrupt ends it early, and then
//! actuation stays disabled.
//!
//! The `overloaded` flag reported in status latches at step 1 and clears
//! at the first regular check after the hold whose reading is within the
//! limit, so a status consumer sees that an overload happened.

use core::sync::atomic::{AtomicBool, Ordering};

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{ActuatorPort, ClockPort, CurrentSensorPort, EventSink};
use crate::axis::AxisRegistry;
use crate::config::SystemConfig;
use crate::error::SafetyFault;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyState {
    Normal,
    /// Inside the blocking overload hold; actuation is disabled.
    Holding,
}

pub struct SafetySupervisor {
    limit_amps: f32,
    recovery_amps: f32,
    sub_samples: u8,
    sub_sample_spacing_ms: u64,
    hold_poll_ms: u64,
    state: SafetyState,
    overloaded: bool,
    last_current: f32,
    overload_count: u32,
}

impl SafetySupervisor {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            limit_amps: config.max_current_amps,
            recovery_amps: config.recovery_amps(),
            sub_samples: config.current_sub_samples.max(1),
            sub_sample_spacing_ms: config.sub_sample_spacing_ms,
            hold_poll_ms: config.hold_poll_interval_ms,
            state: SafetyState::Normal,
            overloaded: false,
            last_current: 0.0,
            overload_count: 0,
        }
    }

    /// Averaged reading over the configured number of sub-samples.
    pub fn read_current(&self, io: &mut (impl CurrentSensorPort + ClockPort)) -> f32 {
        let mut sum = 0.0;
        for i in 0..self.sub_samples {
            if i > 0 {
                io.sleep_ms(self.sub_sample_spacing_ms);
            }
            sum += io.sample();
        }
        sum / f32::from(self.sub_samples)
    }

    /// One periodic check.  Blocks while an overload is being held.
    ///
    /// Returns the fault that was handled, if any.  `running` is polled
    /// inside the hold so an interrupt can still end the process.
    pub fn check<A: ActuatorPort>(
        &mut self,
        io: &mut (impl CurrentSensorPort + ClockPort),
        axes: &mut AxisRegistry<A>,
        sink: &mut impl EventSink,
        running: &AtomicBool,
    ) -> Option<SafetyFault> {
        if self.state == SafetyState::Holding {
            return None;
        }

        let amps = self.read_current(io);
        self.last_current = amps;

        if amps <= self.limit_amps {
            if self.overloaded {
                info!("Current back within limit: {amps:.2} A");
                self.overloaded = false;
            }
            return None;
        }

        let fault = SafetyFault::Overcurrent {
            amps,
            limit: self.limit_amps,
        };
        self.handle_overload(amps, io, axes, sink, running);
        Some(fault)
    }

    fn handle_overload<A: ActuatorPort>(
        &mut self,
        amps: f32,
        io: &mut (impl CurrentSensorPort + ClockPort),
        axes: &mut AxisRegistry<A>,
        sink: &mut impl EventSink,
        running: &AtomicBool,
    ) {
        axes.disable();
        self.state = SafetyState::Holding;
        self.overloaded = true;
        self.overload_count += 1;
        error!(
            "OVERLOAD: {amps:.2} A > {:.2} A, servos disabled",
            self.limit_amps
        );
        sink.emit(&AppEvent::OverloadDetected {
            amps,
            limit: self.limit_amps,
        });

        loop {
            if !running.load(Ordering::SeqCst) {
                warn!("Interrupted during overload hold; servos stay disabled");
                return;
            }
            let amps = self.read_current(io);
            self.last_current = amps;
            sink.emit(&AppEvent::OverloadHold { amps });
            if amps <= self.recovery_amps {
                axes.enable();
                self.state = SafetyState::Normal;
                info!("Overload cleared at {amps:.2} A, servos re-enabled");
                sink.emit(&AppEvent::OverloadCleared { amps });
                return;
            }
            io.sleep_ms(self.hold_poll_ms);
        }
    }

    pub fn state(&self) -> SafetyState {
        self.state
    }

    /// True from overload detection until the first in-limit check after
    /// the hold.
    pub fn is_overloaded(&self) -> bool {
        self.overloaded
    }

    /// Most recent averaged reading.
    pub fn last_current(&self) -> f32 {
        self.last_current
    }

    pub fn overload_count(&self) -> u32 {
        self.overload_count
    }
}
