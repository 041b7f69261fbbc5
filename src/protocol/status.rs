//! Outbound status line.
//!
//! ```text
//! STATUS:{"mode":"PLAYBACK","axes":[{"name":..,"position":..,"min":..,
//!         "max":..,"home":..},..],"current":0.42,"overloaded":false,
//!         "frame":12,"total_frames":300}
//! ```
//!
//! `frame` and `total_frames` are present only while Playback is active.

use serde::Serialize;

use crate::axis::Axis;
use crate::error::{Error, Result};

/// Line prefix of every status report.
pub const STATUS_PREFIX: &str = "STATUS:";

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport<'a> {
    pub mode: &'static str,
    pub axes: &'a [Axis],
    pub current: f32,
    pub overloaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_frames: Option<usize>,
}

impl<'a> StatusReport<'a> {
    pub fn new(
        mode: &'static str,
        axes: &'a [Axis],
        current: f32,
        overloaded: bool,
        playback: Option<(usize, usize)>,
    ) -> Self {
        Self {
            mode,
            axes,
            current,
            overloaded,
            frame: playback.map(|(frame, _)| frame),
            total_frames: playback.map(|(_, total)| total),
        }
    }

    /// Render as one newline-terminated protocol line.
    pub fn to_line(&self) -> Result<String> {
        let json = serde_json::to_string(self).map_err(|_| Error::Hal("status encode"))?;
        Ok(format!("{STATUS_PREFIX}{json}\n"))
    }
}
