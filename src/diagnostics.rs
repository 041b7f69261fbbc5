//! Fatal-fault record and panic reporting.
//!
//! When something escapes every per-step guard the process ends, but not
//! before one line describing the fault has been persisted through a
//! [`FaultRecordPort`].  The record overwrites any previous one, so the
//! file always describes the most recent crash.
//!
//! The panic hook only logs (with the source location); the record itself
//! is written by `main` after the unwind has been caught, once the
//! actuators are already being shut down.

use core::fmt::Write as _;
use std::any::Any;

use crate::app::ports::{FaultRecordPort, StorageError};

/// Longest persisted reason, in bytes.
const MAX_REASON_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultRecord {
    pub uptime_ms: u64,
    pub reason: heapless::String<MAX_REASON_LEN>,
}

impl FaultRecord {
    /// Build a record.  Line breaks are flattened and the reason is cut at
    /// a character boundary to fit.
    pub fn new(uptime_ms: u64, reason: &str) -> Self {
        let mut r = heapless::String::new();
        for c in reason.chars().map(|c| if c.is_control() { ' ' } else { c }) {
            if r.push(c).is_err() {
                break;
            }
        }
        Self {
            uptime_ms,
            reason: r,
        }
    }

    /// The persisted single-line form.
    pub fn to_line(&self) -> String {
        let mut line = String::with_capacity(self.reason.len() + 24);
        let _ = write!(line, "[{} ms] {}", self.uptime_ms, self.reason);
        line
    }

    pub fn persist(&self, store: &mut impl FaultRecordPort) -> Result<(), StorageError> {
        store.persist(&self.to_line())
    }
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic"
    }
}

// ───────────────────────────────────────────────────────────────
// Panic hook
// ───────────────────────────────────────────────────────────────

/// Install a panic hook that routes panics through `log`.
///
/// Call once during init, after the logger is up.
pub fn install_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        let reason = panic_message(info.payload());
        match info.location() {
            Some(loc) => log::error!("PANIC at {}:{}: {}", loc.file(), loc.line(), reason),
            None => log::error!("PANIC: {}", reason),
        }
    }));
}
