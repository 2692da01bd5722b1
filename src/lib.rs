//! Looprec: record pointer input and replay it in a loop
//!
//! This library provides the core functionality for:
//! - Capturing global pointer and key events via rdev
//! - Matching a configurable hotkey that drives the record/replay cycle
//! - Storing a timestamped, ordered event log
//! - Replaying the log in a loop at an adjustable speed via rdev::simulate
//! - Publishing replay progress for status bars
//!
//! # Architecture
//!
//! ```text
//!                            ┌─────────────────────────────────────┐
//!                            │              Daemon                 │
//!                            │  (owns Session, serialises toggles) │
//!                            └─────────────────────────────────────┘
//!                                 ▲              ▲             │
//!             captured input      │    SIGUSR1   │             │ toggle
//!          ┌──────────────┐       │    SIGHUP    │             ▼
//!          │ Input Source │───────┘              │     ┌──────────────┐
//!          │   (rdev)     │                      │     │   Session    │
//!          └──────────────┘             `looprec toggle` │ Idle/Rec/Loop│
//!                 │                                    └──────────────┘
//!                 ▼                                      │          │
//!          ┌──────────────┐   key events  ┌──────────┐   │ begin/   │ spawn/
//!          │CaptureRouter │──────────────▶│  Hotkey  │   │ freeze/  │ stop+join
//!          └──────────────┘               │ Matcher  │   │ clear    ▼
//!                 │ pointer events        └──────────┘   │   ┌──────────────┐
//!                 ▼                                      │   │    Replay    │
//!          ┌──────────────┐◀─────────────────────────────┘   │    Worker    │
//!          │  Event Log   │──────── Arc<[Event]> ───────────▶│ (tokio task) │
//!          └──────────────┘                                  └──────────────┘
//!                                                              │         │
//!                                                              ▼         ▼
//!                                                    ┌──────────┐ ┌──────────┐
//!                                                    │InputSink │ │ Progress │
//!                                                    │  (rdev)  │ │ (watch)  │
//!                                                    └──────────┘ └──────────┘
//! ```

pub mod capture;
pub mod cli;
pub mod config;
pub mod daemon;
pub mod error;
pub mod event;
pub mod event_log;
pub mod hotkey;
pub mod output;
pub mod progress;
pub mod replay;
pub mod session;
pub mod state;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use daemon::Daemon;
pub use error::{LooprecError, Result};
pub use event::{Event, MouseButton, PointerAction};
pub use event_log::EventLog;
pub use session::{Session, Transition};
pub use state::State;
