//! Synthetic input output module
//!
//! Replay drives an [`InputSink`], which injects pointer actions as if they
//! came from hardware.
//!
//! Implementations:
//! 1. rdev - OS-level injection (X11, macOS, Windows)
//! 2. dry run - logs every action instead of injecting it

pub mod dry_run;
pub mod rdev_sink;

pub use dry_run::DryRunSink;
pub use rdev_sink::RdevSink;

use crate::error::OutputError;
use crate::event::MouseButton;

/// Trait for synthetic input implementations
///
/// Every call is independent; a failed call does not poison the sink.
pub trait InputSink: Send + Sync {
    /// Move the pointer to absolute screen coordinates
    fn set_position(&self, x: i32, y: i32) -> Result<(), OutputError>;

    /// Press a mouse button
    fn press(&self, button: MouseButton) -> Result<(), OutputError>;

    /// Release a mouse button
    fn release(&self, button: MouseButton) -> Result<(), OutputError>;

    /// Scroll the wheel by the given deltas
    fn scroll(&self, dx: i64, dy: i64) -> Result<(), OutputError>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Factory function for the sink used by the daemon
pub fn create_sink(dry_run: bool) -> Box<dyn InputSink> {
    if dry_run {
        Box::new(DryRunSink::new())
    } else {
        Box::new(RdevSink::new())
    }
}
