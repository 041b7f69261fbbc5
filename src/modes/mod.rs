//! Operating-mode state machine.
//!
//! Three modes share one capability contract ([`Mode`]):
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  ModeMachine                                             │
//! │  ┌──────────┬──────────┬──────────┬──────────┬────────┐  │
//! │  │ ModeId   │ enter    │ exit     │ update   │ long   │  │
//! │  ├──────────┼──────────┼──────────┼──────────┼────────┤  │
//! │  │ HOME     │ home all │ -        │ -        │ -      │  │
//! │  │ JOG      │ reset    │ -        │ nudge    │ axis / │  │
//! │  │          │          │          │          │ step   │  │
//! │  │ PLAYBACK │ frame 0  │ -        │ advance  │ restart│  │
//! │  └──────────┴──────────┴──────────┴──────────┴────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Exactly one mode is active.  Only the scheduler switches modes, always
//! through [`ModeMachine::switch_to`]: `exit` of the outgoing mode runs to
//! completion or failure, the active pointer moves, then `enter` of the
//! incoming mode runs.  A failing hook is reported but never blocks the
//! switch, and switching to the already-active mode still runs the full
//! exit/enter cycle.

pub mod context;
pub mod home;
pub mod jog;
pub mod playback;

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::{ActuatorPort, EventSink};
use crate::error::{Error, ModePhase, Result};

pub use context::ModeContext;
pub use home::HomeMode;
pub use jog::JogMode;
pub use playback::PlaybackMode;

// ---------------------------------------------------------------------------
// Mode identity
// ---------------------------------------------------------------------------

/// Every mode the rig can be in.  The discriminant is the protocol index
/// used by `SET_MODE:<int>` and the short-press cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ModeId {
    Home = 0,
    Jog = 1,
    Playback = 2,
}

impl ModeId {
    /// Total number of modes.
    pub const COUNT: usize = 3;

    /// Map a protocol index to a mode.  `None` if out of range.
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(Self::Home),
            1 => Some(Self::Jog),
            2 => Some(Self::Playback),
            _ => None,
        }
    }

    /// The mode a short press cycles to: `(current + 1) mod COUNT`.
    pub fn next(self) -> Self {
        match self {
            Self::Home => Self::Jog,
            Self::Jog => Self::Playback,
            Self::Playback => Self::Home,
        }
    }

    /// Name reported in status lines.
    pub fn name(self) -> &'static str {
        match self {
            Self::Home => "HOME",
            Self::Jog => "JOG",
            Self::Playback => "PLAYBACK",
        }
    }
}

// ---------------------------------------------------------------------------
// Capability contract
// ---------------------------------------------------------------------------

/// The contract every mode implements.  Only the active mode's hooks run.
pub trait Mode {
    fn id(&self) -> ModeId;

    fn name(&self) -> &'static str {
        self.id().name()
    }

    /// Runs once when the mode becomes active.
    fn enter<A: ActuatorPort>(&mut self, ctx: &mut ModeContext<'_, A>) -> Result<()>;

    /// Runs once when the mode stops being active.
    fn exit<A: ActuatorPort>(&mut self, _ctx: &mut ModeContext<'_, A>) -> Result<()> {
        Ok(())
    }

    /// Runs every tick while active.
    fn update<A: ActuatorPort>(&mut self, ctx: &mut ModeContext<'_, A>) -> Result<()>;

    /// Runs when the button is released after a long press.
    fn handle_button_press<A: ActuatorPort>(
        &mut self,
        ctx: &mut ModeContext<'_, A>,
        held_ms: u64,
    ) -> Result<()>;
}

/// Route a call to the concrete mode behind `$id`.
macro_rules! dispatch {
    ($machine:expr, $id:expr, |$mode:ident| $body:expr) => {
        match $id {
            ModeId::Home => {
                let $mode = &mut $machine.home;
                $body
            }
            ModeId::Jog => {
                let $mode = &mut $machine.jog;
                $body
            }
            ModeId::Playback => {
                let $mode = &mut $machine.playback;
                $body
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// Owns one instance of each mode and the index of the active one.
pub struct ModeMachine {
    home: HomeMode,
    jog: JogMode,
    playback: PlaybackMode,
    active: ModeId,
    /// Completed switches since startup.
    switches: u64,
}

impl ModeMachine {
    /// Construct with `initial` active.  Its `enter` has not run yet; call
    /// [`start`](Self::start) before the first tick.
    pub fn new(home: HomeMode, jog: JogMode, playback: PlaybackMode, initial: ModeId) -> Self {
        Self {
            home,
            jog,
            playback,
            active: initial,
            switches: 0,
        }
    }

    /// Run the initial `enter`.  Unlike later switches, a failure here is
    /// returned: the rig must not start in a half-entered mode.
    pub fn start<A: ActuatorPort>(
        &mut self,
        ctx: &mut ModeContext<'_, A>,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let id = self.active;
        info!("Mode machine starting in {}", id.name());
        dispatch!(self, id, |m| m.enter(ctx)).map_err(|e| wrap(id, ModePhase::Enter, e))?;
        sink.emit(&AppEvent::Started(id));
        Ok(())
    }

    /// The exit → switch → enter sequence.  Never short-circuits, never
    /// fails: hook errors are emitted and the switch completes.
    pub fn switch_to<A: ActuatorPort>(
        &mut self,
        next: ModeId,
        ctx: &mut ModeContext<'_, A>,
        sink: &mut impl EventSink,
    ) {
        let from = self.active;
        info!("Mode transition: {} -> {}", from.name(), next.name());

        if let Err(e) = dispatch!(self, from, |m| m.exit(ctx)) {
            sink.emit(&AppEvent::StepFailed {
                step: "mode exit",
                error: wrap(from, ModePhase::Exit, e),
            });
        }

        self.active = next;
        self.switches += 1;

        if let Err(e) = dispatch!(self, next, |m| m.enter(ctx)) {
            sink.emit(&AppEvent::StepFailed {
                step: "mode enter",
                error: wrap(next, ModePhase::Enter, e),
            });
        }

        info!("Entered {} mode", next.name());
        sink.emit(&AppEvent::ModeChanged { from, to: next });
    }

    /// Per-tick update of the active mode.
    pub fn update<A: ActuatorPort>(&mut self, ctx: &mut ModeContext<'_, A>) -> Result<()> {
        let id = self.active;
        dispatch!(self, id, |m| m.update(ctx)).map_err(|e| wrap(id, ModePhase::Update, e))
    }

    /// Forward a long press to the active mode.
    pub fn handle_button_press<A: ActuatorPort>(
        &mut self,
        ctx: &mut ModeContext<'_, A>,
        held_ms: u64,
    ) -> Result<()> {
        let id = self.active;
        dispatch!(self, id, |m| m.handle_button_press(ctx, held_ms))
            .map_err(|e| wrap(id, ModePhase::LongPress, e))
    }

    pub fn active(&self) -> ModeId {
        self.active
    }

    pub fn switch_count(&self) -> u64 {
        self.switches
    }

    pub fn playback(&self) -> &PlaybackMode {
        &self.playback
    }

    pub fn jog(&self) -> &JogMode {
        &self.jog
    }

    /// `(current_frame, total_frames)` while Playback is active.
    pub fn playback_progress(&self) -> Option<(usize, usize)> {
        (self.active == ModeId::Playback)
            .then(|| (self.playback.current_frame(), self.playback.total_frames()))
    }
}

fn wrap(mode: ModeId, phase: ModePhase, source: Error) -> Error {
    Error::Mode {
        mode,
        phase,
        source: Box::new(source),
    }
}
