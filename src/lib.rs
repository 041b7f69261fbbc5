//! Servo rig control core.
//!
//! Exposes the pure-logic modules for integration testing and for the
//! host binary.  The core never touches hardware: every collaborator is a
//! port trait in [`app::ports`], implemented by the [`adapters`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod axis;
pub mod config;
pub mod diagnostics;
pub mod drivers;
pub mod error;
pub mod logging;
pub mod modes;
pub mod protocol;
pub mod safety;
pub mod scheduler;
pub mod sequence;
