//! Rig configuration parameters.
//!
//! Two sources, both read once at startup and immutable afterwards:
//!
//! - [`SystemConfig`]: timing and safety tunables.  Defaults match the
//!   bench rig; an optional JSON settings file may override any subset.
//! - [`AxisConfig`] list: one entry per actuated axis, read from
//!   `config.json` (a JSON array).  A missing or unreadable file falls back
//!   to [`default_axes`]; a file that parses but describes an unsafe rig is
//!   rejected.

use std::collections::HashSet;
use std::path::Path;

use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Number of axes in the fallback configuration.
pub const DEFAULT_AXIS_COUNT: usize = 5;

/// Core system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Safety ---
    /// Averaged current (amps) above which actuation is cut.
    pub max_current_amps: f32,
    /// Fraction of `max_current_amps` the reading must fall to before
    /// actuation is re-enabled.
    pub recovery_fraction: f32,
    /// Period of the safety check (milliseconds).
    pub current_check_interval_ms: u64,
    /// Sub-samples averaged into one current reading.
    pub current_sub_samples: u8,
    /// Spacing between sub-samples (milliseconds).
    pub sub_sample_spacing_ms: u64,
    /// Pause between samples while holding in overload (milliseconds).
    pub hold_poll_interval_ms: u64,

    // --- Telemetry ---
    /// Period of `STATUS:` line emission (milliseconds).
    pub status_interval_ms: u64,

    // --- Playback ---
    /// Sequence frames per second.
    pub frame_rate: u32,

    // --- Button ---
    /// Presses held at least this long are long presses (milliseconds).
    pub long_press_ms: u64,

    // --- Jog ---
    /// Minimum time between two jog nudges while the input is held.
    pub jog_repeat_ms: u64,
    /// Selectable jog step sizes (degrees).
    pub jog_steps_deg: Vec<f32>,
    /// Long presses at least this long cycle the jog step instead of the axis.
    pub jog_step_cycle_press_ms: u64,

    // --- Loop ---
    /// Idle sleep at the end of each loop iteration (milliseconds).
    pub loop_sleep_ms: u64,
    /// Run the maintenance hook every this many iterations.
    pub maintenance_every: u64,

    // --- Protocol ---
    /// Longest accepted command line (bytes, excluding terminator).
    pub max_line_len: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Safety
            max_current_amps: 2.0,
            recovery_fraction: 0.8,
            current_check_interval_ms: 250,
            current_sub_samples: 5,
            sub_sample_spacing_ms: 1,
            hold_poll_interval_ms: 100,

            // Telemetry
            status_interval_ms: 100, // 10 Hz

            // Playback
            frame_rate: 30,

            // Button
            long_press_ms: 1000,

            // Jog
            jog_repeat_ms: 50,
            jog_steps_deg: vec![0.5, 1.0, 5.0],
            jog_step_cycle_press_ms: 3000,

            // Loop
            loop_sleep_ms: 10,
            maintenance_every: 100,

            // Protocol
            max_line_len: crate::protocol::buffer::MAX_LINE_LEN,
        }
    }
}

impl SystemConfig {
    /// Reject out-of-range values.  Nothing is clamped: a settings file
    /// that disables the overcurrent cutoff must not load.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.max_current_amps.is_finite() && self.max_current_amps > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "max_current_amps must be a positive number".into(),
            ));
        }
        if !(self.recovery_fraction > 0.0 && self.recovery_fraction <= 1.0) {
            return Err(ConfigError::ValidationFailed(
                "recovery_fraction must be in (0, 1]".into(),
            ));
        }
        if self.current_sub_samples == 0 {
            return Err(ConfigError::ValidationFailed(
                "current_sub_samples must be at least 1".into(),
            ));
        }
        if !(1..=1000).contains(&self.frame_rate) {
            return Err(ConfigError::ValidationFailed(
                "frame_rate must be 1-1000".into(),
            ));
        }
        if self.current_check_interval_ms == 0 || self.status_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "check and status intervals must be non-zero".into(),
            ));
        }
        if self.jog_steps_deg.is_empty()
            || self.jog_steps_deg.iter().any(|s| !(s.is_finite() && *s > 0.0))
        {
            return Err(ConfigError::ValidationFailed(
                "jog_steps_deg must hold positive step sizes".into(),
            ));
        }
        if self.maintenance_every == 0 {
            return Err(ConfigError::ValidationFailed(
                "maintenance_every must be non-zero".into(),
            ));
        }
        if !(1..=crate::protocol::buffer::MAX_LINE_LEN).contains(&self.max_line_len) {
            return Err(ConfigError::ValidationFailed(format!(
                "max_line_len must be 1-{}",
                crate::protocol::buffer::MAX_LINE_LEN
            )));
        }
        Ok(())
    }

    /// Current below which an overload hold releases.
    pub fn recovery_amps(&self) -> f32 {
        self.max_current_amps * self.recovery_fraction
    }

    /// Load settings from a JSON file.  Absent fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        let cfg: Self = serde_json::from_str(&text)
            .map_err(|e| ConfigError::Corrupted(format!("{}: {e}", path.display())))?;
        cfg.validate()?;
        info!("Settings loaded from {}", path.display());
        Ok(cfg)
    }
}

// ---------------------------------------------------------------------------
// Axis definitions
// ---------------------------------------------------------------------------

/// One axis as described in `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    pub name: String,
    /// Actuation channel the servo is wired to.
    pub pin: u8,
    #[serde(rename = "min_value")]
    pub min: f32,
    #[serde(rename = "max_value")]
    pub max: f32,
    #[serde(rename = "home_value")]
    pub home: f32,
    /// Feedback mux address; defaults to the axis index.
    #[serde(default)]
    pub sensor_addr: Option<u8>,
}

/// The fallback rig: five axes on channels 0–4, ±90°, homed at 0°.
pub fn default_axes() -> Vec<AxisConfig> {
    (0..DEFAULT_AXIS_COUNT)
        .map(|i| AxisConfig {
            name: format!("Axis {}", i + 1),
            pin: i as u8,
            min: -90.0,
            max: 90.0,
            home: 0.0,
            sensor_addr: Some(i as u8),
        })
        .collect()
}

/// Read the axis list.  Unreadable or unparseable files fall back to
/// [`default_axes`]; a parsed list that fails [`validate_axes`] is an error.
pub fn load_axes(path: &Path) -> Result<Vec<AxisConfig>, ConfigError> {
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|text| {
            serde_json::from_str::<Vec<AxisConfig>>(&text).map_err(|e| e.to_string())
        });

    let axes = match parsed {
        Ok(axes) => {
            info!("Loaded config: {} axes from {}", axes.len(), path.display());
            axes
        }
        Err(e) => {
            warn!("Config error ({}): {e}", path.display());
            warn!("Using default configuration");
            default_axes()
        }
    };

    validate_axes(&axes)?;
    Ok(axes)
}

/// Semantic checks on an axis list.
pub fn validate_axes(axes: &[AxisConfig]) -> Result<(), ConfigError> {
    if axes.is_empty() {
        return Err(ConfigError::ValidationFailed("no axes configured".into()));
    }
    let mut pins = HashSet::new();
    for (i, axis) in axes.iter().enumerate() {
        if !(axis.min.is_finite() && axis.max.is_finite() && axis.home.is_finite()) {
            return Err(ConfigError::ValidationFailed(format!(
                "axis {i} ({}): non-finite limits",
                axis.name
            )));
        }
        if axis.min >= axis.max {
            return Err(ConfigError::ValidationFailed(format!(
                "axis {i} ({}): min_value must be below max_value",
                axis.name
            )));
        }
        if !(axis.min..=axis.max).contains(&axis.home) {
            return Err(ConfigError::ValidationFailed(format!(
                "axis {i} ({}): home_value {} outside [{}, {}]",
                axis.name, axis.home, axis.min, axis.max
            )));
        }
        if !pins.insert(axis.pin) {
            return Err(ConfigError::ValidationFailed(format!(
                "axis {i} ({}): pin {} already in use",
                axis.name, axis.pin
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from the startup loaders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// File could not be read.
    Io(String),
    /// File was read but did not deserialize.
    Corrupted(String),
    /// A value failed range validation.
    ValidationFailed(String),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
            Self::Corrupted(msg) => write!(f, "config corrupted: {}", msg),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
