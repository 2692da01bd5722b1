//! Shared event log between the capture thread and the replay worker
//!
//! The log has three phases driven by the session:
//! - recording: the capture side appends, timestamps clamped under the lock
//! - frozen: appends are ignored and replay iterates an immutable snapshot
//! - cleared: everything dropped, back to an empty log
//!
//! The mutex doubles as the handoff barrier at the recording→looping edge:
//! anything appended before `freeze()` is in the snapshot, anything after is
//! discarded.

use crate::event::{Event, PointerAction};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

#[derive(Debug, Default)]
struct LogInner {
    accepting: bool,
    events: Vec<Event>,
    frozen: Option<Arc<[Event]>>,
    last_timestamp: Option<Instant>,
}

/// Append-only, then read-only, ordered sequence of recorded events
#[derive(Debug, Default)]
pub struct EventLog {
    inner: Mutex<LogInner>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LogInner> {
        // A panic while holding the lock leaves the vector intact, keep going
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Clear any previous recording and start accepting appends
    pub fn begin(&self) {
        let mut inner = self.lock();
        inner.events.clear();
        inner.frozen = None;
        inner.last_timestamp = None;
        inner.accepting = true;
    }

    /// Append an action stamped with the current time
    ///
    /// Returns false if the log is not recording (the event is dropped).
    pub fn append(&self, action: PointerAction) -> bool {
        let mut inner = self.lock();
        // Stamp under the lock so capture order equals timestamp order
        let now = Instant::now();
        Self::push(&mut inner, action, now)
    }

    /// Append an action with an explicit capture time
    ///
    /// A time earlier than the previous event is clamped to it.
    pub fn append_at(&self, action: PointerAction, t: Instant) -> bool {
        let mut inner = self.lock();
        Self::push(&mut inner, action, t)
    }

    fn push(inner: &mut LogInner, action: PointerAction, t: Instant) -> bool {
        if !inner.accepting {
            return false;
        }
        let t = match inner.last_timestamp {
            Some(last) if t < last => last,
            _ => t,
        };
        inner.last_timestamp = Some(t);
        inner.events.push(Event::stamp(action, t));
        true
    }

    /// Stop accepting appends and hand out the recorded sequence
    pub fn freeze(&self) -> Arc<[Event]> {
        let mut inner = self.lock();
        inner.accepting = false;
        if let Some(ref frozen) = inner.frozen {
            return frozen.clone();
        }
        let events: Arc<[Event]> = std::mem::take(&mut inner.events).into();
        inner.frozen = Some(events.clone());
        events
    }

    /// Freeze only if something was recorded
    ///
    /// With an empty log nothing changes and recording continues.
    pub fn try_freeze(&self) -> Option<Arc<[Event]>> {
        {
            let inner = self.lock();
            if inner.frozen.is_none() && inner.events.is_empty() {
                return None;
            }
        }
        Some(self.freeze())
    }

    /// Drop all events and stop accepting appends
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.accepting = false;
        inner.events = Vec::new();
        inner.frozen = None;
        inner.last_timestamp = None;
    }

    /// Number of events currently held (recording or frozen)
    pub fn len(&self) -> usize {
        let inner = self.lock();
        match inner.frozen {
            Some(ref frozen) => frozen.len(),
            None => inner.events.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether appends are currently accepted
    pub fn is_recording(&self) -> bool {
        self.lock().accepting
    }
}
