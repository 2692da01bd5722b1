//! Record/replay cycle tests against the public library API
//!
//! Capture is driven through `CaptureRouter`, replay goes to an in-memory
//! sink, and time is paused so timing assertions are exact.

mod common;

use common::{button_at, key, moved_at, Action, RecordingProgress, RecordingSink};
use looprec::capture::CaptureRouter;
use looprec::config::HotkeyModifiers;
use looprec::hotkey::{HotkeyMatcher, HotkeySpec, KeyIdentifier};
use looprec::replay::SpeedControl;
use looprec::{EventLog, MouseButton, Session, Transition};
use rdev::Key;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct Harness {
    session: Session,
    router: CaptureRouter,
    sink: Arc<RecordingSink>,
    progress: Arc<RecordingProgress>,
    speed: Arc<SpeedControl>,
}

fn harness(spec: HotkeySpec) -> Harness {
    let log = Arc::new(EventLog::new());
    let sink = Arc::new(RecordingSink::new());
    let progress = Arc::new(RecordingProgress::default());
    let speed = Arc::new(SpeedControl::new(2.0));
    let session = Session::new(log.clone(), speed.clone(), sink.clone(), progress.clone());
    let router = CaptureRouter::new(log, Arc::new(HotkeyMatcher::new(spec)));
    Harness {
        session,
        router,
        sink,
        progress,
        speed,
    }
}

impl Harness {
    /// Route a notification, toggling the session like the daemon does
    async fn feed(&mut self, input: looprec::capture::CapturedInput) -> Option<Transition> {
        if self.router.route(input) {
            Some(self.session.toggle().await)
        } else {
            None
        }
    }
}

fn f3() -> HotkeySpec {
    HotkeySpec::default()
}

#[tokio::test(start_paused = true)]
async fn hotkey_drives_full_cycle() {
    let mut h = harness(f3());
    let base = Instant::now();

    // Not recording yet: ignored
    h.feed(moved_at(base, 1.0, 1.0)).await;

    assert_eq!(
        h.feed(key(Key::F3, true)).await,
        Some(Transition::StartedRecording)
    );
    // Releases never toggle
    assert_eq!(h.feed(key(Key::F3, false)).await, None);

    h.feed(moved_at(base, 10.0, 10.0)).await;
    h.feed(button_at(base + Duration::from_millis(100), MouseButton::Left, true))
        .await;
    h.feed(button_at(base + Duration::from_millis(120), MouseButton::Left, false))
        .await;
    h.feed(moved_at(base + Duration::from_millis(300), 20.0, 20.0))
        .await;

    assert_eq!(
        h.feed(key(Key::F3, true)).await,
        Some(Transition::StartedLooping { events: 4 })
    );

    // One pass takes 150ms at 2x; stop during the second pass
    tokio::time::sleep(Duration::from_millis(200)).await;
    let transition = h.feed(key(Key::F3, true)).await;
    assert_eq!(transition, Some(Transition::StoppedLooping { passes: 1 }));
    assert!(h.session.state().is_idle());
    assert!(h.session.log().is_empty());

    let actions = h.sink.actions();
    assert_eq!(
        &actions[..6],
        &[
            Action::Move(10, 10),
            Action::Move(10, 10),
            Action::Press(MouseButton::Left),
            Action::Move(10, 10),
            Action::Release(MouseButton::Left),
            Action::Move(20, 20),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn replay_timing_scales_with_speed() {
    let mut h = harness(f3());
    let base = Instant::now();

    h.session.toggle().await;
    h.feed(moved_at(base, 0.0, 0.0)).await;
    h.feed(moved_at(base + Duration::from_millis(100), 1.0, 0.0))
        .await;
    h.feed(moved_at(base + Duration::from_millis(300), 2.0, 0.0))
        .await;
    h.session.toggle().await;

    tokio::time::sleep(Duration::from_millis(160)).await;
    h.session.toggle().await;

    let calls = h.sink.calls();
    assert!(calls.len() >= 4);
    let start = calls[0].0;
    let offsets: Vec<u64> = calls[..4]
        .iter()
        .map(|(t, _)| (*t - start).as_millis() as u64)
        .collect();
    // Gaps of 100ms and 200ms at 2x, then the next pass starts immediately
    assert_eq!(offsets, vec![0, 50, 150, 150]);
}

#[tokio::test(start_paused = true)]
async fn speed_change_applies_while_looping() {
    let mut h = harness(f3());
    let base = Instant::now();

    h.session.toggle().await;
    h.feed(moved_at(base, 0.0, 0.0)).await;
    h.feed(moved_at(base + Duration::from_millis(100), 1.0, 0.0))
        .await;
    h.session.toggle().await;

    // The gap being waited on at 60ms was computed at 2x and is kept
    tokio::time::sleep(Duration::from_millis(60)).await;
    h.speed.set(4.0);
    tokio::time::sleep(Duration::from_millis(80)).await;
    h.session.toggle().await;

    let calls = h.sink.calls();
    let start = calls[0].0;
    let offsets: Vec<u64> = calls
        .iter()
        .map(|(t, _)| (*t - start).as_millis() as u64)
        .collect();
    // Two passes at 2x, then the next gap computed at 4x
    assert_eq!(offsets[..6], [0, 50, 50, 100, 100, 125]);
}

#[tokio::test(start_paused = true)]
async fn progress_resets_between_passes() {
    let mut h = harness(f3());
    let base = Instant::now();

    h.session.toggle().await;
    for i in 0..4 {
        h.feed(moved_at(base + Duration::from_millis(i * 10), i as f64, 0.0))
            .await;
    }
    h.session.toggle().await;

    // Two full passes of 15ms each at 2x, stop in the third
    tokio::time::sleep(Duration::from_millis(35)).await;
    h.session.toggle().await;

    let values = h.progress.values();
    assert_eq!(&values[..10], &[25, 50, 75, 100, 0, 25, 50, 75, 100, 0]);
    assert_eq!(values.last(), Some(&0));
}

#[tokio::test(start_paused = true)]
async fn ctrl_hotkey_requires_control_held() {
    let spec = HotkeySpec {
        key: KeyIdentifier::Function(3),
        modifiers: HotkeyModifiers {
            ctrl: true,
            alt: false,
            shift: false,
        },
    };
    let mut h = harness(spec);

    assert_eq!(h.feed(key(Key::F3, true)).await, None);
    assert!(h.session.state().is_idle());

    h.feed(key(Key::ControlRight, true)).await;
    assert_eq!(
        h.feed(key(Key::F3, true)).await,
        Some(Transition::StartedRecording)
    );

    h.feed(key(Key::ControlRight, false)).await;
    assert_eq!(h.feed(key(Key::F3, true)).await, None);
    assert!(h.session.state().is_recording());
}

#[tokio::test(start_paused = true)]
async fn stop_then_record_has_no_torn_reads() {
    let mut h = harness(f3());
    let base = Instant::now();

    h.session.toggle().await;
    for i in 0..10u64 {
        h.feed(moved_at(base + Duration::from_millis(i * 100), i as f64, 0.0))
            .await;
    }
    h.session.toggle().await;

    // Stop mid-pass, then immediately start a new recording
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(matches!(
        h.session.toggle().await,
        Transition::StoppedLooping { passes: 0 }
    ));
    let dispatched = h.sink.len();
    assert!(dispatched > 0 && dispatched < 10);

    assert_eq!(h.session.toggle().await, Transition::StartedRecording);
    h.feed(moved_at(Instant::now(), 99.0, 99.0)).await;

    // The old worker is gone: nothing more reaches the sink
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(h.sink.len(), dispatched);

    // And the new log holds only the new event
    assert_eq!(h.session.log().len(), 1);
    assert_eq!(
        h.session.toggle().await,
        Transition::StartedLooping { events: 1 }
    );
    h.session.shutdown().await;
}

#[tokio::test]
async fn concurrent_toggles_are_serialised() {
    let h = harness(f3());
    let session = Arc::new(tokio::sync::Mutex::new(h.session));

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let session = session.clone();
        tasks.push(tokio::spawn(
            async move { session.lock().await.toggle().await },
        ));
    }

    let mut transitions = Vec::new();
    for task in tasks {
        transitions.push(task.await.unwrap());
    }

    // Nothing was captured, so only the first toggle changes state
    let started = transitions
        .iter()
        .filter(|t| **t == Transition::StartedRecording)
        .count();
    let nothing = transitions
        .iter()
        .filter(|t| **t == Transition::NothingRecorded)
        .count();
    assert_eq!(started, 1);
    assert_eq!(nothing, 9);
    assert!(session.lock().await.state().is_recording());
}
