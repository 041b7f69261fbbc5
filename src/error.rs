//! Unified error types for the servo rig control core.
//!
//! Every fallible operation funnels into [`Error`], so each scheduler step
//! can be guarded with one `match` and the loop's fault isolation stays
//! uniform.  The variants follow the rig's fault taxonomy:
//!
//! | Variant       | Raised by                    | Handling                      |
//! |---------------|------------------------------|-------------------------------|
//! | `Parse`       | command buffer / grammar     | logged, buffer reset          |
//! | `Range`       | axis / mode / frame indices  | logged, command ignored       |
//! | `Mode`        | mode enter / exit / update   | logged, switch still completes|
//! | `Safety`      | safety supervisor            | blocking hold, never dropped  |
//! | `Hal`         | button pin, link, sensors    | logged, step skipped          |
//! | `Fatal`       | `Scheduler::supervise`       | shutdown + fault record       |
//!
//! Startup configuration problems are a separate
//! [`ConfigError`](crate::config::ConfigError); they abort startup before
//! the loop exists.

use core::fmt;

use crate::modes::ModeId;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed command line or byte stream.
    Parse(ParseError),
    /// An index was outside its valid range.
    Range(RangeError),
    /// A mode hook failed.  The inner error is what the hook returned.
    Mode {
        mode: ModeId,
        phase: ModePhase,
        source: Box<Error>,
    },
    /// Overcurrent condition.
    Safety(SafetyFault),
    /// A collaborator (pin, link, sensor) reported a failure.
    Hal(&'static str),
    /// Something escaped every per-step guard.
    Fatal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "parse: {e}"),
            Self::Range(e) => write!(f, "range: {e}"),
            Self::Mode {
                mode,
                phase,
                source,
            } => write!(f, "mode {} {phase}: {source}", mode.name()),
            Self::Safety(e) => write!(f, "safety: {e}"),
            Self::Hal(msg) => write!(f, "hal: {msg}"),
            Self::Fatal(msg) => write!(f, "fatal: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A byte that cannot appear in a command line.
    InvalidByte(u8),
    /// The line grew past the buffer capacity before a terminator arrived.
    LineTooLong,
    /// Recognised command with a non-numeric argument.
    BadArgument(&'static str),
    /// Not part of the command grammar.
    UnknownCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidByte(b) => write!(f, "invalid byte 0x{b:02x} in command stream"),
            Self::LineTooLong => write!(f, "command line too long"),
            Self::BadArgument(cmd) => write!(f, "invalid {cmd} command format"),
            Self::UnknownCommand(cmd) => write!(f, "unknown command: {cmd:?}"),
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

// ---------------------------------------------------------------------------
// Range errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    /// Axis index not in `[0, count)`.
    AxisIndex { index: i64, count: usize },
    /// Mode index not in `[0, ModeId::COUNT)`.
    ModeIndex(i64),
    /// A frame does not carry one position per axis.
    FrameWidth { expected: usize, found: usize },
    /// A commanded angle that is NaN or infinite.
    NonFiniteAngle { index: usize },
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AxisIndex { index, count } => {
                write!(f, "axis index {index} out of range (0..{count})")
            }
            Self::ModeIndex(index) => write!(f, "mode index {index} out of range"),
            Self::FrameWidth { expected, found } => {
                write!(f, "frame has {found} positions, expected {expected}")
            }
            Self::NonFiniteAngle { index } => {
                write!(f, "non-finite angle for axis {index}")
            }
        }
    }
}

impl From<RangeError> for Error {
    fn from(e: RangeError) -> Self {
        Self::Range(e)
    }
}

// ---------------------------------------------------------------------------
// Mode hook phases
// ---------------------------------------------------------------------------

/// Which mode hook a [`Error::Mode`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModePhase {
    Enter,
    Exit,
    Update,
    LongPress,
}

impl fmt::Display for ModePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enter => write!(f, "enter"),
            Self::Exit => write!(f, "exit"),
            Self::Update => write!(f, "update"),
            Self::LongPress => write!(f, "long-press"),
        }
    }
}

// ---------------------------------------------------------------------------
// Safety faults
// ---------------------------------------------------------------------------

/// Safety faults always trigger the blocking recovery path with actuation
/// disabled first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SafetyFault {
    /// Averaged current above the configured threshold.
    Overcurrent { amps: f32, limit: f32 },
}

impl fmt::Display for SafetyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overcurrent { amps, limit } => {
                write!(f, "overcurrent {amps:.2}A > {limit}A")
            }
        }
    }
}

impl From<SafetyFault> for Error {
    fn from(e: SafetyFault) -> Self {
        Self::Safety(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

pub type Result<T> = core::result::Result<T, Error>;
