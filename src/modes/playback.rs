//! PLAYBACK: replay the recorded sequence at a fixed frame rate.
//!
//! Frame timing is derived from the time since `enter`, not from tick
//! counts: after `t` ms the mode has taken `t * rate / 1000` steps.  If the
//! loop falls behind (an overload hold, a slow tick) the skipped frames are
//! counted but only the frame due now is applied.  At the end of the
//! sequence playback wraps to frame 0.

use log::{debug, info, warn};

use super::{Mode, ModeContext, ModeId};
use crate::app::ports::ActuatorPort;
use crate::error::{RangeError, Result};
use crate::sequence::Sequence;

#[derive(Debug, Clone)]
pub struct PlaybackMode {
    sequence: Sequence,
    frame_rate: u32,
    current_frame: usize,
    started_ms: u64,
    steps_taken: u64,
}

impl PlaybackMode {
    pub fn new(sequence: Sequence, frame_rate: u32) -> Self {
        Self {
            sequence,
            frame_rate,
            current_frame: 0,
            started_ms: 0,
            steps_taken: 0,
        }
    }

    /// Index of the next frame to apply.
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn total_frames(&self) -> usize {
        self.sequence.len()
    }

    fn rewind(&mut self, now_ms: u64) {
        self.current_frame = 0;
        self.started_ms = now_ms;
        self.steps_taken = 0;
    }

    fn steps_due(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.started_ms) * u64::from(self.frame_rate) / 1000
    }
}

impl Mode for PlaybackMode {
    fn id(&self) -> ModeId {
        ModeId::Playback
    }

    fn enter<A: ActuatorPort>(&mut self, ctx: &mut ModeContext<'_, A>) -> Result<()> {
        self.rewind(ctx.now_ms);
        if self.sequence.is_empty() {
            warn!("PLAYBACK: no frames loaded");
        } else if self.sequence.width() != ctx.axes.len() {
            return Err(RangeError::FrameWidth {
                expected: ctx.axes.len(),
                found: self.sequence.width(),
            }
            .into());
        } else {
            info!(
                "PLAYBACK: {} frames at {} fps",
                self.sequence.len(),
                self.frame_rate
            );
        }
        Ok(())
    }

    fn update<A: ActuatorPort>(&mut self, ctx: &mut ModeContext<'_, A>) -> Result<()> {
        let total = self.sequence.len();
        if total == 0 {
            return Ok(());
        }
        let due = self.steps_due(ctx.now_ms);
        if due <= self.steps_taken {
            return Ok(());
        }

        let behind = due - self.steps_taken - 1;
        if behind > 0 {
            debug!("PLAYBACK: {behind} frames skipped");
            self.current_frame = ((self.current_frame as u64 + behind) % total as u64) as usize;
        }

        if let Some(frame) = self.sequence.frame(self.current_frame) {
            ctx.axes.apply_frame(frame)?;
        }
        self.current_frame = (self.current_frame + 1) % total;
        self.steps_taken = due;
        Ok(())
    }

    fn handle_button_press<A: ActuatorPort>(
        &mut self,
        ctx: &mut ModeContext<'_, A>,
        _held_ms: u64,
    ) -> Result<()> {
        info!("PLAYBACK: restart");
        self.rewind(ctx.now_ms);
        Ok(())
    }
}
