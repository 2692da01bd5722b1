//! Error types for looprec
//!
//! Uses thiserror for ergonomic error definitions with clear messages
//! that guide users toward fixing common issues.

use thiserror::Error;

/// Top-level error type for the looprec application
#[derive(Error, Debug)]
pub enum LooprecError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Another looprec daemon is already running")]
    AlreadyRunning,
}

/// Errors related to global input capture
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Global input hooks are unavailable: {0}\n  On macOS grant Accessibility permission in System Settings > Privacy & Security.\n  On Linux an X11 session (DISPLAY) is required.")]
    Unavailable(String),

    #[error("Input listener stopped unexpectedly")]
    ListenerGone,

    #[error("Input source already started")]
    AlreadyStarted,

    #[error("Failed to start capture thread: {0}")]
    Thread(#[from] std::io::Error),
}

/// Errors related to synthetic input injection
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Synthetic input rejected: {0}")]
    InjectionFailed(String),
}

/// Errors produced while parsing a hotkey string
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HotkeyError {
    #[error("Empty hotkey")]
    Empty,

    #[error("Unknown key name: '{0}'. Use F1-F12 or a single character.")]
    UnknownKey(String),
}

/// Result type alias using LooprecError
pub type Result<T> = std::result::Result<T, LooprecError>;

impl From<rdev::SimulateError> for OutputError {
    fn from(e: rdev::SimulateError) -> Self {
        OutputError::InjectionFailed(format!("{:?}", e))
    }
}

impl From<rdev::ListenError> for CaptureError {
    fn from(e: rdev::ListenError) -> Self {
        CaptureError::Unavailable(format!("{:?}", e))
    }
}
