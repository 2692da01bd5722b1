//! Test doubles shared by the integration tests
//!
//! Nothing here touches the OS: input comes from a channel the test
//! drives, replayed actions are recorded in memory.

#![allow(dead_code)]

use looprec::capture::{CapturedInput, InputSource, RawInput};
use looprec::error::{CaptureError, OutputError};
use looprec::output::InputSink;
use looprec::progress::ProgressObserver;
use looprec::MouseButton;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// One call made on the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(i32, i32),
    Press(MouseButton),
    Release(MouseButton),
    Scroll(i64, i64),
}

/// Sink that records every call with the (tokio) time it happened
#[derive(Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<(tokio::time::Instant, Action)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, action: Action) -> Result<(), OutputError> {
        self.calls
            .lock()
            .unwrap()
            .push((tokio::time::Instant::now(), action));
        Ok(())
    }

    pub fn actions(&self) -> Vec<Action> {
        self.calls.lock().unwrap().iter().map(|(_, a)| *a).collect()
    }

    pub fn calls(&self) -> Vec<(tokio::time::Instant, Action)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl InputSink for RecordingSink {
    fn set_position(&self, x: i32, y: i32) -> Result<(), OutputError> {
        self.record(Action::Move(x, y))
    }

    fn press(&self, button: MouseButton) -> Result<(), OutputError> {
        self.record(Action::Press(button))
    }

    fn release(&self, button: MouseButton) -> Result<(), OutputError> {
        self.record(Action::Release(button))
    }

    fn scroll(&self, dx: i64, dy: i64) -> Result<(), OutputError> {
        self.record(Action::Scroll(dx, dy))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Observer that keeps every published value
#[derive(Default)]
pub struct RecordingProgress {
    values: Mutex<Vec<u8>>,
}

impl RecordingProgress {
    pub fn values(&self) -> Vec<u8> {
        self.values.lock().unwrap().clone()
    }
}

impl ProgressObserver for RecordingProgress {
    fn publish(&self, percent: u8) {
        self.values.lock().unwrap().push(percent);
    }
}

/// Input source fed by the test through a channel
pub struct ScriptedSource {
    rx: Option<mpsc::UnboundedReceiver<CapturedInput>>,
}

impl ScriptedSource {
    pub fn new() -> (Self, mpsc::UnboundedSender<CapturedInput>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { rx: Some(rx) }, tx)
    }
}

#[async_trait::async_trait]
impl InputSource for ScriptedSource {
    async fn start(&mut self) -> Result<mpsc::UnboundedReceiver<CapturedInput>, CaptureError> {
        self.rx.take().ok_or(CaptureError::AlreadyStarted)
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Input source that behaves like a session without global hook access
pub struct UnavailableSource;

#[async_trait::async_trait]
impl InputSource for UnavailableSource {
    async fn start(&mut self) -> Result<mpsc::UnboundedReceiver<CapturedInput>, CaptureError> {
        Err(CaptureError::Unavailable("no display".to_string()))
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

pub fn key(key: rdev::Key, pressed: bool) -> CapturedInput {
    CapturedInput::now(RawInput::Key {
        key,
        pressed,
        name: None,
    })
}

pub fn moved_at(at: Instant, x: f64, y: f64) -> CapturedInput {
    CapturedInput {
        at,
        input: RawInput::Move { x, y },
    }
}

pub fn button_at(at: Instant, button: MouseButton, pressed: bool) -> CapturedInput {
    CapturedInput {
        at,
        input: RawInput::Button { button, pressed },
    }
}

/// Poll `condition` until it holds or `timeout` passes
pub async fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
