//! Text command protocol.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                     Command Protocol                       │
//! │                                                            │
//! │  ┌──────────┐   ┌───────────────┐   ┌──────────────────┐   │
//! │  │ LinkPort │──▶│ CommandBuffer │──▶│ Command::parse   │   │
//! │  │ (bytes)  │   │ (lines)       │   │ → execute        │   │
//! │  └──────────┘   └───────────────┘   └──────────────────┘   │
//! │       ▲                                   │   │            │
//! │       │                    AxisRegistry ◀─┘   ▼            │
//! │  ┌──────────┐                       PendingModeRequest     │
//! │  │ STATUS:  │◀── StatusReport            (scheduler)       │
//! │  └──────────┘                                              │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod buffer;
pub mod command;
pub mod status;

use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::{ActuatorPort, EventSink, LinkPort};
use crate::axis::AxisRegistry;
use crate::error::Result;

pub use buffer::{CommandBuffer, Line, MAX_LINE_LEN};
pub use command::Command;
pub use status::{STATUS_PREFIX, StatusReport};

// ---------------------------------------------------------------------------
// Pending mode request
// ---------------------------------------------------------------------------

/// Single-slot mode-switch message.  Written by the protocol, drained by
/// the scheduler exactly once per tick.  A later request overwrites an
/// undrained one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingModeRequest {
    slot: Option<i64>,
}

impl PendingModeRequest {
    pub fn set(&mut self, index: i64) {
        self.slot = Some(index);
    }

    /// Remove and return the request, leaving the slot empty.
    pub fn take(&mut self) -> Option<i64> {
        self.slot.take()
    }
}

// ---------------------------------------------------------------------------
// Command link
// ---------------------------------------------------------------------------

/// Inbound byte intake and line dispatch for one link.
#[derive(Debug, Clone, Default)]
pub struct CommandLink {
    buffer: CommandBuffer,
    pending: PendingModeRequest,
    lines_dispatched: u64,
}

impl CommandLink {
    pub fn new(max_line_len: usize) -> Self {
        Self {
            buffer: CommandBuffer::new(max_line_len),
            pending: PendingModeRequest::default(),
            lines_dispatched: 0,
        }
    }

    /// Drain every byte currently available on `link`, dispatching each
    /// completed line.  Bounded by available bytes, not time.
    pub fn poll<A: ActuatorPort>(
        &mut self,
        link: &mut impl LinkPort,
        axes: &mut AxisRegistry<A>,
        sink: &mut impl EventSink,
    ) {
        while link.has_data() {
            let Some(byte) = link.read_byte() else {
                break;
            };
            match self.buffer.feed(byte) {
                Ok(Some(line)) => self.dispatch(&line, axes, sink),
                Ok(None) => {}
                Err(e) => sink.emit(&AppEvent::CommandRejected(e.into())),
            }
        }
    }

    /// Parse and execute one line.  Failures are reported, never returned.
    pub fn dispatch<A: ActuatorPort>(
        &mut self,
        line: &str,
        axes: &mut AxisRegistry<A>,
        sink: &mut impl EventSink,
    ) {
        self.lines_dispatched += 1;
        debug!("Command: {line}");
        let outcome = Command::parse(line)
            .map_err(Into::into)
            .and_then(|cmd| self.execute(cmd, axes));
        if let Err(e) = outcome {
            sink.emit(&AppEvent::CommandRejected(e));
        }
    }

    fn execute<A: ActuatorPort>(&mut self, cmd: Command, axes: &mut AxisRegistry<A>) -> Result<()> {
        match cmd {
            Command::HomeAll => axes.home_all(),
            Command::HomeAxis(index) => {
                let index = axes.check_index(index)?;
                axes.home(index)?;
            }
            Command::SetMode(index) => {
                info!("Mode request: {index}");
                self.pending.set(index);
            }
            Command::RestartPlayback => {
                info!("RESTART_PLAYBACK acknowledged; restart with a long press in PLAYBACK");
            }
        }
        Ok(())
    }

    /// Drain the pending mode request.
    pub fn take_mode_request(&mut self) -> Option<i64> {
        self.pending.take()
    }

    /// Bytes of a partial line currently buffered.
    pub fn buffered_bytes(&self) -> usize {
        self.buffer.len()
    }

    pub fn lines_dispatched(&self) -> u64 {
        self.lines_dispatched
    }
}
