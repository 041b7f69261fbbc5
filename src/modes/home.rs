//! HOME: park every axis at its calibrated home position.

use log::debug;

use super::{Mode, ModeContext, ModeId};
use crate::app::ports::ActuatorPort;
use crate::error::Result;

#[derive(Debug, Default)]
pub struct HomeMode;

impl HomeMode {
    pub fn new() -> Self {
        Self
    }
}

impl Mode for HomeMode {
    fn id(&self) -> ModeId {
        ModeId::Home
    }

    fn enter<A: ActuatorPort>(&mut self, ctx: &mut ModeContext<'_, A>) -> Result<()> {
        ctx.axes.home_all();
        Ok(())
    }

    fn update<A: ActuatorPort>(&mut self, _ctx: &mut ModeContext<'_, A>) -> Result<()> {
        Ok(())
    }

    fn handle_button_press<A: ActuatorPort>(
        &mut self,
        _ctx: &mut ModeContext<'_, A>,
        held_ms: u64,
    ) -> Result<()> {
        debug!("HOME: long press ({held_ms} ms) ignored");
        Ok(())
    }
}
