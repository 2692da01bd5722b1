//! Recorded pointer events
//!
//! Every event carries the pointer position it happened at, so replay can
//! reposition the pointer before each action.

use std::time::Instant;

/// Mouse button identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    /// Platform specific extra button (back/forward, etc.)
    Other(u8),
}

impl From<rdev::Button> for MouseButton {
    fn from(button: rdev::Button) -> Self {
        match button {
            rdev::Button::Left => MouseButton::Left,
            rdev::Button::Right => MouseButton::Right,
            rdev::Button::Middle => MouseButton::Middle,
            rdev::Button::Unknown(code) => MouseButton::Other(code),
        }
    }
}

impl From<MouseButton> for rdev::Button {
    fn from(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => rdev::Button::Left,
            MouseButton::Right => rdev::Button::Right,
            MouseButton::Middle => rdev::Button::Middle,
            MouseButton::Other(code) => rdev::Button::Unknown(code),
        }
    }
}

impl std::fmt::Display for MouseButton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MouseButton::Left => write!(f, "left"),
            MouseButton::Right => write!(f, "right"),
            MouseButton::Middle => write!(f, "middle"),
            MouseButton::Other(code) => write!(f, "button{}", code),
        }
    }
}

/// Payload of a pointer event, before the log stamps it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Move {
        x: i32,
        y: i32,
    },
    Click {
        x: i32,
        y: i32,
        button: MouseButton,
        pressed: bool,
    },
    Scroll {
        x: i32,
        y: i32,
        dx: i64,
        dy: i64,
    },
}

/// A recorded event with its capture timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Pointer moved
    Move { x: i32, y: i32, t: Instant },

    /// Button pressed or released at a position
    Click {
        x: i32,
        y: i32,
        button: MouseButton,
        pressed: bool,
        t: Instant,
    },

    /// Wheel scrolled at a position
    Scroll {
        x: i32,
        y: i32,
        dx: i64,
        dy: i64,
        t: Instant,
    },
}

impl Event {
    /// Attach a capture timestamp to a pointer action
    pub fn stamp(action: PointerAction, t: Instant) -> Self {
        match action {
            PointerAction::Move { x, y } => Event::Move { x, y, t },
            PointerAction::Click {
                x,
                y,
                button,
                pressed,
            } => Event::Click {
                x,
                y,
                button,
                pressed,
                t,
            },
            PointerAction::Scroll { x, y, dx, dy } => Event::Scroll { x, y, dx, dy, t },
        }
    }

    /// Capture timestamp
    pub fn timestamp(&self) -> Instant {
        match self {
            Event::Move { t, .. } | Event::Click { t, .. } | Event::Scroll { t, .. } => *t,
        }
    }

    /// Pointer position at capture time
    pub fn position(&self) -> (i32, i32) {
        match self {
            Event::Move { x, y, .. } | Event::Click { x, y, .. } | Event::Scroll { x, y, .. } => {
                (*x, *y)
            }
        }
    }

    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Move { .. } => "move",
            Event::Click { .. } => "click",
            Event::Scroll { .. } => "scroll",
        }
    }
}
