//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events
//! through the `log` facade (stderr, plus the log file when configured).
//! A monitor or telemetry adapter would implement the same trait.

use log::{debug, error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink {
    rejected: u64,
    failures: u64,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(mode) => {
                info!("START | initial_mode={}", mode.name());
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE | {} -> {}", from.name(), to.name());
            }
            AppEvent::CommandRejected(e) => {
                self.rejected += 1;
                warn!("CMD | rejected: {e}");
            }
            AppEvent::StepFailed { step, error } => {
                self.failures += 1;
                error!("STEP | {step} failed: {error}");
            }
            AppEvent::OverloadDetected { amps, limit } => {
                error!("SAFETY | overload {amps:.2} A > {limit:.2} A, holding");
            }
            AppEvent::OverloadHold { amps } => {
                warn!("SAFETY | holding, {amps:.2} A");
            }
            AppEvent::OverloadCleared { amps } => {
                info!("SAFETY | cleared at {amps:.2} A");
            }
            AppEvent::Heartbeat {
                iteration,
                buffered_bytes,
            } => {
                debug!(
                    "HEARTBEAT | iter={iteration} buffered={buffered_bytes} \
                     rejected={} failures={}",
                    self.rejected, self.failures
                );
            }
            AppEvent::Shutdown => {
                warn!("SHUTDOWN | actuation disabled");
            }
        }
    }
}
