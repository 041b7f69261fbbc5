//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements          | Connects to                  |
//! |--------------|---------------------|------------------------------|
//! | `button_pin` | ButtonPort          | any `embedded-hal` input pin |
//! | `current`    | CurrentSensorPort   | simulated supply sense       |
//! | `fault_file` | FaultRecordPort     | `error.log`                  |
//! | `hardware`   | all polled ports    | the bundled host peripherals |
//! | `link`       | LinkPort            | stdin / stdout               |
//! | `log_sink`   | EventSink           | `log` facade                 |
//! | `servo`      | ActuatorPort        | simulated servo bank         |
//! | `time`       | ClockPort           | `std::time::Instant`         |

pub mod button_pin;
pub mod current;
pub mod fault_file;
pub mod hardware;
pub mod link;
pub mod log_sink;
pub mod servo;
pub mod time;
