//! rdev-based global input capture
//!
//! Runs `rdev::listen` on a dedicated OS thread. The callback stamps each
//! notification and forwards it on an unbounded channel, so it never waits
//! on the daemon.
//!
//! Requires:
//! - X11 session on Linux (DISPLAY set)
//! - Accessibility permission on macOS

use super::{CapturedInput, InputSource, RawInput};
use crate::error::CaptureError;
use rdev::{listen, Event, EventType};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// How long `start` waits for rdev to report a hook failure
const STARTUP_GRACE: Duration = Duration::from_millis(300);

/// rdev-based input source
pub struct RdevSource {
    running: Arc<AtomicBool>,
    thread_handle: Option<std::thread::JoinHandle<()>>,
    access_check: fn() -> bool,
}

impl RdevSource {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
            access_check: has_capture_access,
        }
    }

    /// Replace the platform permission check run by `start`
    pub fn with_access_check(mut self, check: fn() -> bool) -> Self {
        self.access_check = check;
        self
    }
}

impl Default for RdevSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Fail early when the OS refuses global hooks
///
/// On macOS without Accessibility permission `rdev::listen` does not fail;
/// it installs an event tap that never fires. `granted` is asked first so
/// that case becomes a startup error instead of a silent, deaf daemon.
fn require_access(granted: impl FnOnce() -> bool) -> Result<(), CaptureError> {
    if granted() {
        Ok(())
    } else {
        Err(CaptureError::Unavailable(
            "Accessibility permission not granted".to_string(),
        ))
    }
}

#[cfg(target_os = "macos")]
fn has_capture_access() -> bool {
    // Shows the system permission dialog the first time around
    if check_accessibility_permission() {
        return true;
    }
    is_accessibility_granted()
}

#[cfg(not(target_os = "macos"))]
fn has_capture_access() -> bool {
    // X11 reports a missing display through listen() itself
    true
}

/// Check if Accessibility permission is granted by trying to create an event tap.
/// Unlike AXIsProcessTrusted(), this is not cached.
#[cfg(target_os = "macos")]
fn is_accessibility_granted() -> bool {
    use core_graphics::event::{
        CGEventTap, CGEventTapLocation, CGEventTapOptions, CGEventTapPlacement, CGEventType,
    };

    CGEventTap::new(
        CGEventTapLocation::Session,
        CGEventTapPlacement::HeadInsertEventTap,
        CGEventTapOptions::ListenOnly,
        vec![CGEventType::MouseMoved],
        |_, _, _| None,
    )
    .is_ok()
}

/// Ask for Accessibility permission, prompting the user if it is missing
#[cfg(target_os = "macos")]
fn check_accessibility_permission() -> bool {
    #[link(name = "ApplicationServices", kind = "framework")]
    extern "C" {
        fn AXIsProcessTrustedWithOptions(options: core_foundation::base::CFTypeRef) -> bool;
    }

    use core_foundation::base::TCFType;
    use core_foundation::boolean::CFBoolean;
    use core_foundation::dictionary::CFDictionary;
    use core_foundation::string::CFString;

    let key = CFString::new("AXTrustedCheckOptionPrompt");
    let value = CFBoolean::true_value();
    let options = CFDictionary::from_CFType_pairs(&[(key.as_CFType(), value.as_CFType())]);

    unsafe { AXIsProcessTrustedWithOptions(options.as_concrete_TypeRef() as _) }
}

/// Translate an rdev event, keeping the key text only for presses
fn translate(event: Event) -> RawInput {
    match event.event_type {
        EventType::MouseMove { x, y } => RawInput::Move { x, y },
        EventType::ButtonPress(button) => RawInput::Button {
            button: button.into(),
            pressed: true,
        },
        EventType::ButtonRelease(button) => RawInput::Button {
            button: button.into(),
            pressed: false,
        },
        EventType::Wheel { delta_x, delta_y } => RawInput::Scroll {
            dx: delta_x,
            dy: delta_y,
        },
        EventType::KeyPress(key) => RawInput::Key {
            key,
            pressed: true,
            name: event.name,
        },
        EventType::KeyRelease(key) => RawInput::Key {
            key,
            pressed: false,
            name: None,
        },
    }
}

#[async_trait::async_trait]
impl InputSource for RdevSource {
    async fn start(&mut self) -> Result<mpsc::UnboundedReceiver<CapturedInput>, CaptureError> {
        if self.thread_handle.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }
        if let Err(e) = require_access(self.access_check) {
            tracing::error!("Global input capture failed: {}", e);
            return Err(e);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let (failed_tx, failed_rx) = oneshot::channel();
        let running = self.running.clone();
        running.store(true, Ordering::SeqCst);

        let thread_handle = std::thread::Builder::new()
            .name("looprec-capture".to_string())
            .spawn(move || {
                let running_clone = running.clone();
                let callback = move |event: Event| {
                    if !running_clone.load(Ordering::SeqCst) {
                        return;
                    }
                    // Receiver gone means the daemon is shutting down
                    let _ = tx.send(CapturedInput::now(translate(event)));
                };

                // This blocks until an error occurs or the process is terminated
                if let Err(e) = listen(callback) {
                    running.store(false, Ordering::SeqCst);
                    let _ = failed_tx.send(CaptureError::from(e));
                }
            })?;

        // listen() either fails right away or runs until the process exits
        match tokio::time::timeout(STARTUP_GRACE, failed_rx).await {
            Ok(Ok(e)) => {
                tracing::error!("Global input capture failed: {}", e);
                return Err(e);
            }
            Ok(Err(_)) => {
                // Thread ended without reporting; listen() returned Ok
                return Err(CaptureError::ListenerGone);
            }
            Err(_) => {}
        }

        tracing::debug!("rdev listener running");
        self.thread_handle = Some(thread_handle);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        self.running.store(false, Ordering::SeqCst);
        // Note: rdev's listen() can't be stopped from another thread; the
        // thread stays parked in the OS hook until the process exits
        self.thread_handle.take();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "rdev"
    }
}
