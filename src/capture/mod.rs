//! Global input capture
//!
//! An [`InputSource`] delivers every pointer and key notification from the
//! OS, stamped with the time the callback ran. The [`CaptureRouter`] decides
//! what each notification means:
//! - pointer events go to the event log (ignored unless recording)
//! - key events go to the hotkey matcher, which may request a toggle
//!
//! Button and scroll notifications carry no coordinates, so the router
//! tracks the last pointer position for the whole process lifetime.

pub mod rdev_source;

pub use rdev_source::RdevSource;

use crate::error::CaptureError;
use crate::event::{MouseButton, PointerAction};
use crate::event_log::EventLog;
use crate::hotkey::HotkeyMatcher;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

/// Raw notification from the input source
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    Move { x: f64, y: f64 },
    Button { button: MouseButton, pressed: bool },
    Scroll { dx: i64, dy: i64 },
    Key {
        key: rdev::Key,
        pressed: bool,
        /// Text produced by the key, if the OS reports one
        name: Option<String>,
    },
}

/// A notification plus the time the capture callback observed it
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedInput {
    pub at: Instant,
    pub input: RawInput,
}

impl CapturedInput {
    /// Stamp a notification with the current time
    pub fn now(input: RawInput) -> Self {
        Self {
            at: Instant::now(),
            input,
        }
    }
}

/// Trait for global input capture implementations
///
/// The sender side must never block the capture callback, so the channel is
/// unbounded.
#[async_trait::async_trait]
pub trait InputSource: Send {
    /// Start capturing; fails if the platform refuses global hooks
    async fn start(&mut self) -> Result<mpsc::UnboundedReceiver<CapturedInput>, CaptureError>;

    /// Stop delivering notifications
    async fn stop(&mut self) -> Result<(), CaptureError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Factory function to create the platform input source
pub fn create_source() -> Box<dyn InputSource> {
    Box::new(RdevSource::new())
}

/// Routes captured input to the event log and the hotkey matcher
pub struct CaptureRouter {
    log: Arc<EventLog>,
    matcher: Arc<HotkeyMatcher>,
    position: Option<(i32, i32)>,
}

impl CaptureRouter {
    pub fn new(log: Arc<EventLog>, matcher: Arc<HotkeyMatcher>) -> Self {
        Self {
            log,
            matcher,
            position: None,
        }
    }

    /// Last known pointer position
    pub fn position(&self) -> Option<(i32, i32)> {
        self.position
    }

    fn current_position(&mut self) -> (i32, i32) {
        match self.position {
            Some(position) => position,
            None => {
                tracing::debug!("Pointer position unknown, assuming (0, 0)");
                self.position = Some((0, 0));
                (0, 0)
            }
        }
    }

    /// Handle one notification; returns true if the hotkey requests a toggle
    pub fn route(&mut self, captured: CapturedInput) -> bool {
        let action = match captured.input {
            RawInput::Move { x, y } => {
                let position = (x.round() as i32, y.round() as i32);
                self.position = Some(position);
                PointerAction::Move {
                    x: position.0,
                    y: position.1,
                }
            }
            RawInput::Button { button, pressed } => {
                let (x, y) = self.current_position();
                PointerAction::Click {
                    x,
                    y,
                    button,
                    pressed,
                }
            }
            RawInput::Scroll { dx, dy } => {
                let (x, y) = self.current_position();
                PointerAction::Scroll { x, y, dx, dy }
            }
            RawInput::Key { key, pressed, name } => {
                let matched = self.matcher.on_key(key, pressed, name.as_deref());
                if matched {
                    tracing::debug!("Hotkey {} pressed", self.matcher.spec());
                }
                return matched;
            }
        };

        if self.log.append_at(action, captured.at) {
            tracing::trace!("Recorded {:?}", action);
        }
        false
    }
}
