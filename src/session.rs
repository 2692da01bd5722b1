//! Record/replay session
//!
//! The session owns the state and is the only place the event log changes
//! phase. `toggle` takes `&mut self`, so whoever owns the session (the daemon
//! task) serialises every transition; a toggle that arrives while a replay
//! worker is being stopped simply waits its turn.

use crate::event_log::EventLog;
use crate::output::InputSink;
use crate::progress::ProgressObserver;
use crate::replay::{pass_delays, ReplayHandle, SpeedControl};
use crate::state::State;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Idle → Recording
    StartedRecording,
    /// Recording → Looping
    StartedLooping { events: usize },
    /// Recording with nothing captured; still recording
    NothingRecorded,
    /// Looping → Idle, after the replay worker has exited
    StoppedLooping { passes: u64 },
}

/// Single owner of the session state, the event log phases and the replay worker
pub struct Session {
    state: State,
    log: Arc<EventLog>,
    speed: Arc<SpeedControl>,
    sink: Arc<dyn InputSink>,
    progress: Arc<dyn ProgressObserver>,
    replay: Option<ReplayHandle>,
}

impl Session {
    pub fn new(
        log: Arc<EventLog>,
        speed: Arc<SpeedControl>,
        sink: Arc<dyn InputSink>,
        progress: Arc<dyn ProgressObserver>,
    ) -> Self {
        Self {
            state: State::Idle,
            log,
            speed,
            sink,
            progress,
            replay: None,
        }
    }

    /// Current state
    pub fn state(&self) -> State {
        self.state
    }

    /// The shared log the capture side appends to
    pub fn log(&self) -> &Arc<EventLog> {
        &self.log
    }

    /// Advance the record/replay cycle by one step
    pub async fn toggle(&mut self) -> Transition {
        match self.state {
            State::Idle => {
                self.log.begin();
                self.state = State::Recording {
                    started_at: Instant::now(),
                };
                tracing::info!("Recording started");
                Transition::StartedRecording
            }

            State::Recording { started_at } => {
                let Some(events) = self.log.try_freeze() else {
                    tracing::info!("No events recorded yet, still recording");
                    return Transition::NothingRecorded;
                };

                let count = events.len();
                let speed = self.speed.get();
                let pass: Duration = pass_delays(&events, speed).iter().sum();
                tracing::info!(
                    "Recording stopped ({} events in {:.1}s), looping at {}x ({:.1}s per pass)",
                    count,
                    started_at.elapsed().as_secs_f32(),
                    speed,
                    pass.as_secs_f32()
                );

                self.replay = Some(ReplayHandle::spawn(
                    events,
                    self.speed.clone(),
                    self.sink.clone(),
                    self.progress.clone(),
                ));
                self.state = State::Looping {
                    started_at: Instant::now(),
                    events: count,
                };
                Transition::StartedLooping { events: count }
            }

            State::Looping { .. } => {
                let passes = self.stop_replay().await;
                self.log.clear();
                self.state = State::Idle;
                tracing::info!("Looping stopped after {} passes, recording cleared", passes);
                Transition::StoppedLooping { passes }
            }
        }
    }

    /// Stop whatever is running and return to idle
    pub async fn shutdown(&mut self) {
        if self.state.is_looping() {
            self.stop_replay().await;
        }
        self.log.clear();
        self.state = State::Idle;
    }

    /// Join the replay worker; the log stays untouched until it has exited
    async fn stop_replay(&mut self) -> u64 {
        let passes = match self.replay.take() {
            Some(handle) => handle.stop().await,
            None => 0,
        };
        self.progress.publish(0);
        passes
    }
}
