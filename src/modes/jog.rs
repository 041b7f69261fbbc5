//! JOG: manual nudging of one selected axis.
//!
//! While the jog input is held off-centre the selected axis moves by the
//! current step size, at most once per repeat interval.  Releasing the
//! input re-arms the next nudge immediately.
//!
//! A long press shorter than the step-cycle threshold selects the next
//! axis; a longer one cycles the step size.

use log::info;

use super::{Mode, ModeContext, ModeId};
use crate::app::ports::{ActuatorPort, JogDirection};
use crate::config::SystemConfig;
use crate::error::{RangeError, Result};

#[derive(Debug, Clone)]
pub struct JogMode {
    axis: usize,
    step_index: usize,
    steps: Vec<f32>,
    repeat_ms: u64,
    step_cycle_press_ms: u64,
    last_nudge_ms: Option<u64>,
}

impl JogMode {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            axis: 0,
            step_index: 0,
            steps: config.jog_steps_deg.clone(),
            repeat_ms: config.jog_repeat_ms,
            step_cycle_press_ms: config.jog_step_cycle_press_ms,
            last_nudge_ms: None,
        }
    }

    /// Index of the axis being jogged.
    pub fn selected_axis(&self) -> usize {
        self.axis
    }

    /// Degrees moved per nudge.
    pub fn step_deg(&self) -> f32 {
        self.steps.get(self.step_index).copied().unwrap_or(1.0)
    }

    fn nudge_due(&self, now_ms: u64) -> bool {
        self.last_nudge_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.repeat_ms)
    }
}

impl Mode for JogMode {
    fn id(&self) -> ModeId {
        ModeId::Jog
    }

    fn enter<A: ActuatorPort>(&mut self, ctx: &mut ModeContext<'_, A>) -> Result<()> {
        self.last_nudge_ms = None;
        if self.axis >= ctx.axes.len() {
            self.axis = 0;
        }
        info!("JOG: axis {} selected, step {}°", self.axis, self.step_deg());
        Ok(())
    }

    fn update<A: ActuatorPort>(&mut self, ctx: &mut ModeContext<'_, A>) -> Result<()> {
        let direction = ctx.jog.direction();
        if direction == JogDirection::Neutral {
            self.last_nudge_ms = None;
            return Ok(());
        }
        if !self.nudge_due(ctx.now_ms) {
            return Ok(());
        }

        let current = ctx
            .axes
            .get(self.axis)
            .map(|a| a.target())
            .ok_or(RangeError::AxisIndex {
                index: self.axis as i64,
                count: ctx.axes.len(),
            })?;
        ctx.axes
            .set_target(self.axis, current + direction.sign() * self.step_deg())?;
        self.last_nudge_ms = Some(ctx.now_ms);
        Ok(())
    }

    fn handle_button_press<A: ActuatorPort>(
        &mut self,
        ctx: &mut ModeContext<'_, A>,
        held_ms: u64,
    ) -> Result<()> {
        if held_ms < self.step_cycle_press_ms {
            self.axis = (self.axis + 1) % ctx.axes.len().max(1);
            info!("JOG: axis {} selected", self.axis);
        } else {
            self.step_index = (self.step_index + 1) % self.steps.len().max(1);
            info!("JOG: step {}°", self.step_deg());
        }
        Ok(())
    }
}
