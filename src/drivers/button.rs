//! Polled button driver with short and long press detection.
//!
//! The raw level is sampled once per scheduler tick.  A rising edge
//! records the press timestamp; the falling edge classifies the gesture
//! by how long the button was held.
//!
//! | Gesture     | Condition                 | Event                     |
//! |-------------|---------------------------|---------------------------|
//! | Short press | released < `long_press_ms`| `ShortPress`              |
//! | Long press  | released ≥ `long_press_ms`| `LongPress { held_ms }`   |
//!
//! Classification happens on release only, so holding the button never
//! fires anything by itself.

/// Button events emitted after gesture classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    ShortPress,
    LongPress { held_ms: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeState {
    Released,
    Pressed { since_ms: u64 },
}

pub struct ButtonTracker {
    long_press_ms: u64,
    state: EdgeState,
}

impl ButtonTracker {
    pub fn new(long_press_ms: u64) -> Self {
        Self {
            long_press_ms,
            state: EdgeState::Released,
        }
    }

    /// Feed one raw sample taken at `now_ms`.
    pub fn update(&mut self, pressed: bool, now_ms: u64) -> Option<ButtonEvent> {
        match (self.state, pressed) {
            (EdgeState::Released, true) => {
                self.state = EdgeState::Pressed { since_ms: now_ms };
                None
            }
            (EdgeState::Pressed { since_ms }, false) => {
                self.state = EdgeState::Released;
                let held_ms = now_ms.saturating_sub(since_ms);
                if held_ms < self.long_press_ms {
                    Some(ButtonEvent::ShortPress)
                } else {
                    Some(ButtonEvent::LongPress { held_ms })
                }
            }
            _ => None,
        }
    }

    pub fn is_held(&self) -> bool {
        matches!(self.state, EdgeState::Pressed { .. })
    }
}
