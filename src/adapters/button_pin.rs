//! Button on a digital input pin.
//!
//! [`PinButton`] adapts any `embedded-hal` [`InputPin`] to the
//! [`ButtonPort`], so the same code drives a GPIO on target hardware and
//! the [`SimulatedPin`] on a host.  The switch is wired active-low with a
//! pull-up by default.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::digital::{ErrorType, InputPin};

use crate::app::ports::ButtonPort;
use crate::error::{Error, Result};

pub struct PinButton<P: InputPin> {
    pin: P,
    active_low: bool,
}

impl<P: InputPin> PinButton<P> {
    pub fn active_low(pin: P) -> Self {
        Self {
            pin,
            active_low: true,
        }
    }

    pub fn active_high(pin: P) -> Self {
        Self {
            pin,
            active_low: false,
        }
    }
}

impl<P: InputPin> ButtonPort for PinButton<P> {
    fn is_pressed(&mut self) -> Result<bool> {
        let level = if self.active_low {
            self.pin.is_low()
        } else {
            self.pin.is_high()
        };
        level.map_err(|_| Error::Hal("button pin read"))
    }
}

// ── Host pin ──────────────────────────────────────────────────

/// Input pin whose level is set from elsewhere in the process.
#[derive(Debug, Clone)]
pub struct SimulatedPin {
    high: Arc<AtomicBool>,
}

impl SimulatedPin {
    /// A pulled-up pin (released, for an active-low switch).
    pub fn pulled_up() -> Self {
        Self {
            high: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn set_high(&self, high: bool) {
        self.high.store(high, Ordering::Relaxed);
    }
}

impl ErrorType for SimulatedPin {
    type Error = core::convert::Infallible;
}

impl InputPin for SimulatedPin {
    fn is_high(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(self.high.load(Ordering::Relaxed))
    }

    fn is_low(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(!self.high.load(Ordering::Relaxed))
    }
}
