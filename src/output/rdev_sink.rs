//! rdev-based synthetic input
//!
//! Uses `rdev::simulate` to inject pointer events through the platform
//! input API (XTest on X11, CGEvent on macOS, SendInput on Windows).
//!
//! Requires:
//! - X11 session on Linux (Wayland compositors reject XTest)
//! - Accessibility permission on macOS

use super::InputSink;
use crate::error::OutputError;
use crate::event::MouseButton;
use rdev::{simulate, EventType};

/// rdev-based synthetic input sink
#[derive(Debug, Default)]
pub struct RdevSink;

impl RdevSink {
    pub fn new() -> Self {
        Self
    }

    fn send(&self, event: &EventType) -> Result<(), OutputError> {
        simulate(event).map_err(|e| {
            tracing::trace!("rdev simulate failed for {:?}", event);
            OutputError::from(e)
        })
    }
}

impl InputSink for RdevSink {
    fn set_position(&self, x: i32, y: i32) -> Result<(), OutputError> {
        self.send(&EventType::MouseMove {
            x: x as f64,
            y: y as f64,
        })
    }

    fn press(&self, button: MouseButton) -> Result<(), OutputError> {
        self.send(&EventType::ButtonPress(button.into()))
    }

    fn release(&self, button: MouseButton) -> Result<(), OutputError> {
        self.send(&EventType::ButtonRelease(button.into()))
    }

    fn scroll(&self, dx: i64, dy: i64) -> Result<(), OutputError> {
        self.send(&EventType::Wheel {
            delta_x: dx,
            delta_y: dy,
        })
    }

    fn name(&self) -> &'static str {
        "rdev"
    }
}
