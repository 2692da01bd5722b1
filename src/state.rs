//! State machine for the looprec session
//!
//! Defines the states of the record/replay cycle:
//! Idle → Recording → Looping → Idle
//!
//! A single enum means "recording and looping at once" cannot be
//! represented.

use std::time::Instant;

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting for the hotkey
    Idle,

    /// Capturing pointer events into the log
    Recording {
        /// When recording started
        started_at: Instant,
    },

    /// Replaying the captured log in a loop
    Looping {
        /// When looping started
        started_at: Instant,
        /// Number of events in the log being replayed
        events: usize,
    },
}

impl State {
    /// Create a new idle state
    pub fn new() -> Self {
        State::Idle
    }

    /// Check if in idle state
    pub fn is_idle(&self) -> bool {
        matches!(self, State::Idle)
    }

    /// Check if in recording state
    pub fn is_recording(&self) -> bool {
        matches!(self, State::Recording { .. })
    }

    /// Check if in looping state
    pub fn is_looping(&self) -> bool {
        matches!(self, State::Looping { .. })
    }

    /// Time spent in the current non-idle state
    pub fn duration(&self) -> Option<std::time::Duration> {
        match self {
            State::Recording { started_at } | State::Looping { started_at, .. } => {
                Some(started_at.elapsed())
            }
            State::Idle => None,
        }
    }

    /// Name written to the state file
    pub fn name(&self) -> &'static str {
        match self {
            State::Idle => "idle",
            State::Recording { .. } => "recording",
            State::Looping { .. } => "looping",
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            State::Idle => write!(f, "Idle"),
            State::Recording { started_at } => {
                write!(f, "Recording ({:.1}s)", started_at.elapsed().as_secs_f32())
            }
            State::Looping { started_at, events } => {
                write!(
                    f,
                    "Looping ({} events, {:.1}s)",
                    events,
                    started_at.elapsed().as_secs_f32()
                )
            }
        }
    }
}
