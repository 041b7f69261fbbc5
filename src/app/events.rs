//! Outbound application events.
//!
//! The scheduler and its components emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to the console, forward to a
//! monitor, record in a test.

use crate::error::Error;
use crate::modes::ModeId;

/// Structured events emitted by the control core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The initial mode has been entered.
    Started(ModeId),

    /// A mode switch completed (exit and enter both ran, failed or not).
    ModeChanged { from: ModeId, to: ModeId },

    /// An inbound line or request was rejected.
    CommandRejected(Error),

    /// A scheduler step or mode hook failed; the loop carried on.
    StepFailed { step: &'static str, error: Error },

    /// A sample exceeded the threshold; actuation is now disabled.
    OverloadDetected { amps: f32, limit: f32 },

    /// One sample taken while holding in overload.
    OverloadHold { amps: f32 },

    /// The hold released; actuation is enabled again.
    OverloadCleared { amps: f32 },

    /// Periodic maintenance marker.
    Heartbeat { iteration: u64, buffered_bytes: usize },

    /// Actuation disabled on the way out.
    Shutdown,
}
