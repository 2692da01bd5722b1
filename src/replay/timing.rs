//! Replay timing
//!
//! Delays are rebuilt from the gaps between capture timestamps, divided by
//! the speed multiplier that is current when each delay is computed.

use crate::config::sanitize_speed;
use crate::event::Event;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Live replay speed, shared between settings reload and the replay worker
#[derive(Debug)]
pub struct SpeedControl {
    bits: AtomicU64,
}

impl SpeedControl {
    pub fn new(speed: f64) -> Self {
        Self {
            bits: AtomicU64::new(sanitize_speed(speed).to_bits()),
        }
    }

    /// Current multiplier, always positive and finite
    pub fn get(&self) -> f64 {
        sanitize_speed(f64::from_bits(self.bits.load(Ordering::Relaxed)))
    }

    /// Change the multiplier; only delays computed afterwards are affected
    pub fn set(&self, speed: f64) {
        self.bits
            .store(sanitize_speed(speed).to_bits(), Ordering::Relaxed);
    }
}

impl Default for SpeedControl {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_SPEED)
    }
}

/// Delay between two captured instants at the given speed
pub fn scaled_delay(previous: Instant, current: Instant, speed: f64) -> Duration {
    let gap = current.saturating_duration_since(previous);
    let speed = sanitize_speed(speed);
    Duration::try_from_secs_f64(gap.as_secs_f64() / speed).unwrap_or(Duration::MAX)
}

/// Delays before each event of a pass at a fixed speed (first is zero)
pub fn pass_delays(events: &[Event], speed: f64) -> Vec<Duration> {
    let mut delays = Vec::with_capacity(events.len());
    let mut previous: Option<Instant> = None;
    for event in events {
        let t = event.timestamp();
        delays.push(match previous {
            Some(p) => scaled_delay(p, t, speed),
            None => Duration::ZERO,
        });
        previous = Some(t);
    }
    delays
}
