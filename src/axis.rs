//! Axis registry.
//!
//! Owns the axis definitions, their current targets, and the actuation
//! handle.  Every target change is forwarded to the [`ActuatorPort`]
//! immediately; nothing waits for the servo to arrive.
//!
//! Indices are fixed at construction.  An index outside `[0, N)` is a
//! caller error ([`RangeError::AxisIndex`]) and issues no actuation call.
//! Angles are clamped into the axis' calibrated range so a target is
//! always inside `[min, max]`; a NaN or infinite angle is rejected
//! ([`RangeError::NonFiniteAngle`]) and leaves the target untouched.

use log::{debug, info};
use serde::Serialize;

use crate::app::ports::ActuatorPort;
use crate::config::AxisConfig;
use crate::error::{RangeError, Result};

/// One controlled degree of freedom.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    #[serde(skip)]
    pub id: usize,
    pub name: String,
    #[serde(skip)]
    pub channel: u8,
    #[serde(rename = "position")]
    target: f32,
    pub min: f32,
    pub max: f32,
    pub home: f32,
}

impl Axis {
    /// Current commanded position (degrees).
    pub fn target(&self) -> f32 {
        self.target
    }

    fn clamp(&self, angle: f32) -> f32 {
        angle.clamp(self.min, self.max)
    }
}

/// Fixed-length ordered collection of axes plus the actuation handle.
pub struct AxisRegistry<A: ActuatorPort> {
    axes: Vec<Axis>,
    actuator: A,
    enabled: bool,
}

impl<A: ActuatorPort> AxisRegistry<A> {
    /// Build the registry.  Targets start at each axis' home position; no
    /// actuation call is made until the first command.
    pub fn new(configs: &[AxisConfig], actuator: A) -> Self {
        let axes = configs
            .iter()
            .enumerate()
            .map(|(id, cfg)| {
                let sensor = cfg.sensor_addr.unwrap_or(id as u8);
                info!(
                    "  Created axis {id}: {} on pin {}, sensor {sensor}, range [{}, {}], home {}",
                    cfg.name, cfg.pin, cfg.min, cfg.max, cfg.home
                );
                Axis {
                    id,
                    name: cfg.name.clone(),
                    channel: cfg.pin,
                    target: cfg.home,
                    min: cfg.min,
                    max: cfg.max,
                    home: cfg.home,
                }
            })
            .collect();
        Self {
            axes,
            actuator,
            enabled: false,
        }
    }

    /// Number of axes (N).
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Axis> {
        self.axes.iter()
    }

    pub fn as_slice(&self) -> &[Axis] {
        &self.axes
    }

    pub fn get(&self, index: usize) -> Option<&Axis> {
        self.axes.get(index)
    }

    /// Whether actuation is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The actuation handle (read-only; tests inspect recorded calls).
    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Check `index` against `[0, N)`.
    pub fn check_index(&self, index: i64) -> Result<usize> {
        usize::try_from(index)
            .ok()
            .filter(|i| *i < self.axes.len())
            .ok_or_else(|| {
                RangeError::AxisIndex {
                    index,
                    count: self.axes.len(),
                }
                .into()
            })
    }

    /// Command axis `index` to `angle` (clamped into its range).
    pub fn set_target(&mut self, index: usize, angle: f32) -> Result<()> {
        let count = self.axes.len();
        let axis = self.axes.get_mut(index).ok_or(RangeError::AxisIndex {
            index: index as i64,
            count,
        })?;
        if !angle.is_finite() {
            return Err(RangeError::NonFiniteAngle { index }.into());
        }
        let clamped = axis.clamp(angle);
        if clamped != angle {
            debug!("{}: {angle} clamped to {clamped}", axis.name);
        }
        axis.target = clamped;
        self.actuator.set_position(axis.channel, clamped);
        Ok(())
    }

    /// Apply one position per axis, in order.
    pub fn apply_frame(&mut self, frame: &[f32]) -> Result<()> {
        if frame.len() != self.axes.len() {
            return Err(RangeError::FrameWidth {
                expected: self.axes.len(),
                found: frame.len(),
            }
            .into());
        }
        if let Some(index) = frame.iter().position(|a| !a.is_finite()) {
            return Err(RangeError::NonFiniteAngle { index }.into());
        }
        for (index, angle) in frame.iter().enumerate() {
            self.set_target(index, *angle)?;
        }
        Ok(())
    }

    /// Move axis `index` to its home position.
    pub fn home(&mut self, index: usize) -> Result<()> {
        let home = self
            .axes
            .get(index)
            .map(|a| a.home)
            .ok_or(RangeError::AxisIndex {
                index: index as i64,
                count: self.axes.len(),
            })?;
        info!("Homing axis {index} ({}) to {home}°", self.axes[index].name);
        self.set_target(index, home)
    }

    /// Move every axis to its home position.
    pub fn home_all(&mut self) {
        info!("Homing all axes...");
        for axis in &mut self.axes {
            axis.target = axis.home;
            self.actuator.set_position(axis.channel, axis.home);
        }
    }

    /// Energise every axis.
    pub fn enable(&mut self) {
        for axis in &self.axes {
            self.actuator.enable(axis.channel);
        }
        self.enabled = true;
        info!("All servos enabled");
    }

    /// De-energise every axis.
    pub fn disable(&mut self) {
        for axis in &self.axes {
            self.actuator.disable(axis.channel);
        }
        self.enabled = false;
        info!("All servos disabled");
    }
}
