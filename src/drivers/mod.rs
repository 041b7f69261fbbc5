//! Input drivers.

pub mod button;
