//! Cooperative control loop.
//!
//! One [`Scheduler`] owns every piece of core state (axes, mode machine,
//! command link, safety supervisor, button tracker) and is the only
//! writer, so nothing here needs a lock.  All I/O flows through the port
//! traits handed to [`Scheduler::tick`].
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        tick()                                │
//! │                                                              │
//! │  1. LinkPort ──▶ CommandLink ──▶ AxisRegistry / pending mode │
//! │  2. pending mode ──▶ ModeMachine::switch_to                  │
//! │  3. ButtonPort ──▶ ButtonTracker ──▶ next mode / long press  │
//! │  4. every 250 ms ──▶ SafetySupervisor (may block)            │
//! │  5. every 100 ms ──▶ STATUS line                             │
//! │  6. active mode update()                                     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each step is guarded on its own: an error is emitted as
//! [`AppEvent::StepFailed`] and the remaining steps still run.  Anything
//! that escapes (a panic) is caught by [`Scheduler::supervise`], which
//! records it and shuts down.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{ActuatorPort, EventSink, FaultRecordPort, LinkPort, RigIo};
use crate::axis::AxisRegistry;
use crate::config::SystemConfig;
use crate::diagnostics::{self, FaultRecord};
use crate::drivers::button::{ButtonEvent, ButtonTracker};
use crate::error::{Error, RangeError, Result};
use crate::modes::{ModeContext, ModeId, ModeMachine};
use crate::protocol::{CommandLink, StatusReport};
use crate::safety::{SafetyState, SafetySupervisor};

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

pub struct Scheduler<A: ActuatorPort> {
    axes: AxisRegistry<A>,
    modes: ModeMachine,
    link: CommandLink,
    safety: SafetySupervisor,
    button: ButtonTracker,
    running: Arc<AtomicBool>,

    current_check_interval_ms: u64,
    status_interval_ms: u64,
    loop_sleep_ms: u64,
    maintenance_every: u64,

    last_safety_ms: u64,
    last_status_ms: u64,
    iteration: u64,
    step_failures: u64,
}

impl<A: ActuatorPort> Scheduler<A> {
    /// Assemble the loop.  Nothing is actuated until [`start`](Self::start).
    pub fn new(config: &SystemConfig, axes: AxisRegistry<A>, modes: ModeMachine) -> Self {
        Self {
            axes,
            modes,
            link: CommandLink::new(config.max_line_len),
            safety: SafetySupervisor::new(config),
            button: ButtonTracker::new(config.long_press_ms),
            running: Arc::new(AtomicBool::new(true)),
            current_check_interval_ms: config.current_check_interval_ms,
            status_interval_ms: config.status_interval_ms,
            loop_sleep_ms: config.loop_sleep_ms,
            maintenance_every: config.maintenance_every.max(1),
            last_safety_ms: 0,
            last_status_ms: 0,
            iteration: 0,
            step_failures: 0,
        }
    }

    /// Shared flag that keeps [`run`](Self::run) going.  Clearing it from
    /// another context (an interrupt handler) ends the loop.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enable actuation and enter the initial mode.  If the initial mode
    /// cannot be entered, actuation is disabled again and the error is
    /// returned.
    pub fn start(&mut self, io: &mut impl RigIo, sink: &mut impl EventSink) -> Result<()> {
        let now = io.now_ms();
        self.last_safety_ms = now;
        self.last_status_ms = now;

        self.axes.enable();
        let mut ctx = ModeContext::new(&mut self.axes, &mut *io, now);
        if let Err(e) = self.modes.start(&mut ctx, sink) {
            self.axes.disable();
            return Err(e);
        }
        info!("Rig started with {} axes", self.axes.len());
        Ok(())
    }

    /// Tick until the running flag clears, sleeping between iterations.
    pub fn run(&mut self, io: &mut impl RigIo, sink: &mut impl EventSink) {
        info!("Entering control loop");
        while self.running.load(Ordering::SeqCst) {
            self.tick(io, sink);
            io.sleep_ms(self.loop_sleep_ms);
        }
        info!("Control loop stopped after {} iterations", self.iteration);
    }

    /// Start, run and shut down, catching anything that escapes the
    /// per-step guards.
    ///
    /// A panic becomes [`Error::Fatal`]; its reason is persisted to `record`
    /// before shutdown.  Every way out of this call, including a failed
    /// start, goes through [`shutdown`](Self::shutdown).
    pub fn supervise(
        &mut self,
        io: &mut impl RigIo,
        sink: &mut impl EventSink,
        record: &mut impl FaultRecordPort,
    ) -> Result<()> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.start(io, sink)?;
            self.run(io, sink);
            Ok(())
        }));

        let result = match outcome {
            Ok(result) => result,
            Err(payload) => {
                let reason = diagnostics::panic_message(payload.as_ref()).to_owned();
                error!("MAIN LOOP CRASH: {reason}");
                if let Err(e) = FaultRecord::new(io.now_ms(), &reason).persist(record) {
                    warn!("Fault record not written: {e}");
                }
                Err(Error::Fatal(reason))
            }
        };

        self.shutdown(sink);
        result
    }

    /// The single shutdown path: every exit disables all actuation.
    pub fn shutdown(&mut self, sink: &mut impl EventSink) {
        self.running.store(false, Ordering::SeqCst);
        self.axes.disable();
        warn!("Shutdown: all servos disabled");
        sink.emit(&AppEvent::Shutdown);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// One loop iteration, steps in fixed order.
    pub fn tick(&mut self, io: &mut impl RigIo, sink: &mut impl EventSink) {
        self.iteration += 1;

        // 1. Command intake
        self.link.poll(io, &mut self.axes, sink);

        // 2. Pending mode request
        if let Some(index) = self.link.take_mode_request() {
            match ModeId::from_index(index) {
                Some(next) => self.switch_mode(next, io, sink),
                None => sink.emit(&AppEvent::CommandRejected(
                    RangeError::ModeIndex(index).into(),
                )),
            }
        }

        // 3. Button
        match io.is_pressed() {
            Ok(pressed) => {
                let now = io.now_ms();
                match self.button.update(pressed, now) {
                    Some(ButtonEvent::ShortPress) => {
                        let next = self.modes.active().next();
                        self.switch_mode(next, io, sink);
                    }
                    Some(ButtonEvent::LongPress { held_ms }) => {
                        let mut ctx = ModeContext::new(&mut self.axes, &mut *io, now);
                        let result = self.modes.handle_button_press(&mut ctx, held_ms);
                        self.guard("long press", result, sink);
                    }
                    None => {}
                }
            }
            Err(e) => self.guard("button", Err(e), sink),
        }

        // 4. Safety (may block)
        let now = io.now_ms();
        if now.saturating_sub(self.last_safety_ms) >= self.current_check_interval_ms {
            if let Some(fault) = self.safety.check(io, &mut self.axes, sink, &self.running) {
                if self.safety.state() == SafetyState::Holding {
                    // Hold interrupted: actuation stays off until shutdown.
                    self.guard("safety", Err(fault.into()), sink);
                } else {
                    info!("Safety step recovered from {fault}");
                }
            }
            self.last_safety_ms = now;
        }

        // 5. Status
        let now = io.now_ms();
        if now.saturating_sub(self.last_status_ms) >= self.status_interval_ms {
            let result = self.emit_status(io);
            self.guard("status", result, sink);
            self.last_status_ms = now;
        }

        // 6. Active mode update
        let now = io.now_ms();
        let mut ctx = ModeContext::new(&mut self.axes, &mut *io, now);
        let result = self.modes.update(&mut ctx);
        self.guard("mode update", result, sink);

        if self.iteration % self.maintenance_every == 0 {
            sink.emit(&AppEvent::Heartbeat {
                iteration: self.iteration,
                buffered_bytes: self.link.buffered_bytes(),
            });
        }
    }

    fn switch_mode(&mut self, next: ModeId, io: &mut impl RigIo, sink: &mut impl EventSink) {
        let now = io.now_ms();
        let mut ctx = ModeContext::new(&mut self.axes, &mut *io, now);
        self.modes.switch_to(next, &mut ctx, sink);
    }

    fn guard(&mut self, step: &'static str, result: Result<()>, sink: &mut impl EventSink) {
        if let Err(error) = result {
            self.step_failures += 1;
            sink.emit(&AppEvent::StepFailed { step, error });
        }
    }

    // ── Status ────────────────────────────────────────────────

    /// Snapshot of everything a `STATUS:` line reports.
    pub fn status_report(&self) -> StatusReport<'_> {
        StatusReport::new(
            self.modes.active().name(),
            self.axes.as_slice(),
            self.safety.last_current(),
            self.safety.is_overloaded(),
            self.modes.playback_progress(),
        )
    }

    fn emit_status(&self, io: &mut impl LinkPort) -> Result<()> {
        let line = self.status_report().to_line()?;
        io.write_line(&line)
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn axes(&self) -> &AxisRegistry<A> {
        &self.axes
    }

    pub fn modes(&self) -> &ModeMachine {
        &self.modes
    }

    pub fn safety(&self) -> &SafetySupervisor {
        &self.safety
    }

    pub fn link(&self) -> &CommandLink {
        &self.link
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn step_failures(&self) -> u64 {
        self.step_failures
    }
}
