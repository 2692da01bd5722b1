//! Dry-run output
//!
//! Logs each action at info level instead of injecting it. Useful for
//! checking a recording on a session where injection is unavailable, or
//! without letting the replay take over the pointer.

use super::InputSink;
use crate::error::OutputError;
use crate::event::MouseButton;
use std::sync::atomic::{AtomicU64, Ordering};

/// Sink that only logs
#[derive(Debug, Default)]
pub struct DryRunSink {
    actions: AtomicU64,
}

impl DryRunSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of actions seen so far
    pub fn actions(&self) -> u64 {
        self.actions.load(Ordering::Relaxed)
    }

    fn count(&self) {
        self.actions.fetch_add(1, Ordering::Relaxed);
    }
}

impl InputSink for DryRunSink {
    fn set_position(&self, x: i32, y: i32) -> Result<(), OutputError> {
        self.count();
        tracing::info!("[dry-run] move to ({}, {})", x, y);
        Ok(())
    }

    fn press(&self, button: MouseButton) -> Result<(), OutputError> {
        self.count();
        tracing::info!("[dry-run] press {}", button);
        Ok(())
    }

    fn release(&self, button: MouseButton) -> Result<(), OutputError> {
        self.count();
        tracing::info!("[dry-run] release {}", button);
        Ok(())
    }

    fn scroll(&self, dx: i64, dy: i64) -> Result<(), OutputError> {
        self.count();
        tracing::info!("[dry-run] scroll ({}, {})", dx, dy);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_actions() {
        let sink = DryRunSink::new();
        sink.set_position(1, 2).unwrap();
        sink.press(MouseButton::Left).unwrap();
        sink.release(MouseButton::Left).unwrap();
        sink.scroll(0, 1).unwrap();
        assert_eq!(sink.actions(), 4);
        assert_eq!(sink.name(), "dry-run");
    }
}
