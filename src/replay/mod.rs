//! Replay worker
//!
//! Replays a frozen event log in a loop until stopped:
//!
//! ```text
//!   ┌──────────────────────── pass ────────────────────────┐
//!   │ for each event:                                      │
//!   │   sleep (gap to previous event / speed) ─── stop? ───┼──▶ exit
//!   │   reposition pointer, then click / scroll            │
//!   │   publish progress                                   │
//!   └──────────────────────────────────────────────────────┘
//!        publish 0, next pass
//! ```
//!
//! A failed injection skips that event only. Stopping is a join: the handle
//! waits until the task has returned, so the caller can safely clear the log.

pub mod timing;

pub use timing::{pass_delays, scaled_delay, SpeedControl};

use crate::error::OutputError;
use crate::event::Event;
use crate::output::InputSink;
use crate::progress::{percent, ProgressObserver};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// How long an empty log waits before checking again
pub const EMPTY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Apply one event to the sink
///
/// The pointer is moved to the recorded position before every action.
pub fn dispatch(sink: &dyn InputSink, event: &Event) -> Result<(), OutputError> {
    match *event {
        Event::Move { x, y, .. } => sink.set_position(x, y),
        Event::Click {
            x,
            y,
            button,
            pressed,
            ..
        } => {
            sink.set_position(x, y)?;
            if pressed {
                sink.press(button)
            } else {
                sink.release(button)
            }
        }
        Event::Scroll { x, y, dx, dy, .. } => {
            sink.set_position(x, y)?;
            sink.scroll(dx, dy)
        }
    }
}

/// Handle to a running replay loop
pub struct ReplayHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<u64>,
}

impl ReplayHandle {
    /// Start looping over `events` on a new tokio task
    pub fn spawn(
        events: Arc<[Event]>,
        speed: Arc<SpeedControl>,
        sink: Arc<dyn InputSink>,
        progress: Arc<dyn ProgressObserver>,
    ) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        tracing::debug!(
            "Spawning replay worker ({} events, sink: {})",
            events.len(),
            sink.name()
        );
        let task = tokio::spawn(replay_loop(events, speed, sink, progress, stop_rx));
        Self { stop_tx, task }
    }

    /// Whether the worker has exited on its own
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Ask the worker to stop and wait until it has exited
    ///
    /// Returns the number of completed passes.
    pub async fn stop(self) -> u64 {
        self.stop_tx.send_replace(true);
        match self.task.await {
            Ok(passes) => passes,
            Err(e) => {
                tracing::error!("Replay worker failed: {}", e);
                0
            }
        }
    }
}

/// Sleep for `delay` unless a stop arrives first; returns true when stopping
async fn wait_or_stop(stop: &mut watch::Receiver<bool>, delay: Duration) -> bool {
    if *stop.borrow() {
        return true;
    }

    if delay.is_zero() {
        // Still give the stop signal a chance between back-to-back events
        tokio::task::yield_now().await;
        return *stop.borrow();
    }

    tokio::select! {
        _ = tokio::time::sleep(delay) => *stop.borrow(),
        changed = stop.changed() => changed.is_err() || *stop.borrow(),
    }
}

async fn replay_loop(
    events: Arc<[Event]>,
    speed: Arc<SpeedControl>,
    sink: Arc<dyn InputSink>,
    progress: Arc<dyn ProgressObserver>,
    mut stop: watch::Receiver<bool>,
) -> u64 {
    let total = events.len();
    let mut passes = 0u64;

    'passes: loop {
        if total == 0 {
            if wait_or_stop(&mut stop, EMPTY_POLL_INTERVAL).await {
                break;
            }
            continue;
        }

        let started = Instant::now();
        let mut previous: Option<Instant> = None;
        let mut failures = 0usize;

        for (i, event) in events.iter().enumerate() {
            let t = event.timestamp();
            let delay = match previous {
                Some(p) => scaled_delay(p, t, speed.get()),
                None => Duration::ZERO,
            };
            previous = Some(t);

            if wait_or_stop(&mut stop, delay).await {
                break 'passes;
            }

            if let Err(e) = dispatch(sink.as_ref(), event) {
                failures += 1;
                tracing::debug!("Skipping {} event {}: {}", event.kind(), i, e);
            }

            progress.publish(percent(i + 1, total));
        }

        progress.publish(0);
        passes += 1;

        if failures > 0 {
            tracing::warn!(
                "Pass {} finished with {} of {} events not applied",
                passes,
                failures,
                total
            );
        }
        tracing::debug!(
            "Pass {} finished in {:.2}s",
            passes,
            started.elapsed().as_secs_f32()
        );
    }

    progress.publish(0);
    tracing::debug!("Replay worker exiting after {} passes", passes);
    passes
}
