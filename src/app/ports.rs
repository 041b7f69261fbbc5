//! Port traits: the hexagonal boundary between the control core and the rig.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Scheduler (domain)
//! ```
//!
//! Driven adapters (servo bank, current sense, serial link, button, clock,
//! event sinks, fault storage) implement these traits.  The
//! [`Scheduler`](crate::scheduler::Scheduler) consumes them via generics, so
//! the core never touches hardware directly and every test can run against
//! recording mocks.

use crate::error::Result;

// ───────────────────────────────────────────────────────────────
// Actuation (domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Servo actuation.  Every call is fire-and-forget: no acknowledgement is
/// awaited and none is reported.
pub trait ActuatorPort {
    /// Command `channel` to `angle` degrees.
    fn set_position(&mut self, channel: u8, angle: f32);

    /// Energise the servo on `channel`.
    fn enable(&mut self, channel: u8);

    /// De-energise the servo on `channel`.
    fn disable(&mut self, channel: u8);
}

// ───────────────────────────────────────────────────────────────
// Command link (bidirectional byte stream)
// ───────────────────────────────────────────────────────────────

/// Non-blocking, poll-based byte link carrying the text protocol.
pub trait LinkPort {
    /// True if at least one byte can be read without blocking.
    fn has_data(&mut self) -> bool;

    /// Read one byte, or `None` if nothing is pending.
    fn read_byte(&mut self) -> Option<u8>;

    /// Write one complete line.  `line` already ends in `\n` and must reach
    /// the peer in one piece.
    fn write_line(&mut self, line: &str) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Sensors and inputs (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// The user button, polled once per tick.
pub trait ButtonPort {
    /// Raw level: `true` while the button is held.
    fn is_pressed(&mut self) -> Result<bool>;
}

/// Supply current sense.  Assumed fast relative to the loop cadence.
pub trait CurrentSensorPort {
    /// One instantaneous reading in amps.
    fn sample(&mut self) -> f32;
}

/// Direction the jog input is currently held in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JogDirection {
    #[default]
    Neutral,
    Forward,
    Reverse,
}

impl JogDirection {
    /// Multiplier applied to the jog step.
    pub fn sign(self) -> f32 {
        match self {
            Self::Neutral => 0.0,
            Self::Forward => 1.0,
            Self::Reverse => -1.0,
        }
    }
}

/// Held jog input (joystick, rocker switch, encoder).
pub trait JogInputPort {
    fn direction(&mut self) -> JogDirection;
}

/// Monotonic time plus the ability to block.
pub trait ClockPort {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;

    /// Block the calling context for `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u64);
}

/// Everything the scheduler polls each tick.  Adapters implement the
/// individual ports; this alias lets one value satisfy all of them.
pub trait RigIo: LinkPort + ButtonPort + CurrentSensorPort + JogInputPort + ClockPort {}

impl<T> RigIo for T where T: LinkPort + ButtonPort + CurrentSensorPort + JogInputPort + ClockPort {}

// ───────────────────────────────────────────────────────────────
// Event sink (domain → logging / monitoring)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`AppEvent`](super::events::AppEvent)s through
/// this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Fault record storage
// ───────────────────────────────────────────────────────────────

/// Persists the single-line record written when a fatal fault ends the run.
pub trait FaultRecordPort {
    /// Replace any previous record with `line`.
    fn persist(&mut self, line: &str) -> core::result::Result<(), StorageError>;
}

/// Errors from [`FaultRecordPort`] operations.
#[derive(Debug)]
pub enum StorageError {
    /// Generic I/O error from the storage backend.
    IoError(std::io::Error),
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}
