//! Application boundary: the types the control core shares with adapters.
//!
//! The core (axes, modes, protocol, safety, scheduler) never performs I/O
//! itself.  All interaction with the rig happens through the **port traits**
//! defined in [`ports`], and everything the core wants the outside world to
//! know leaves as an [`events::AppEvent`].

pub mod events;
pub mod ports;
