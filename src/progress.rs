//! Replay progress reporting
//!
//! Progress is a percentage of the current pass. Publishing never blocks
//! the replay worker and a dropped update is not an error.

use tokio::sync::watch;

/// Receives replay progress (0-100)
pub trait ProgressObserver: Send + Sync {
    fn publish(&self, percent: u8);
}

impl ProgressObserver for watch::Sender<u8> {
    fn publish(&self, percent: u8) {
        // send_replace never fails, even with no receivers
        self.send_replace(percent.min(100));
    }
}

/// Observer that discards every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn publish(&self, _percent: u8) {}
}

/// Percentage after `done` of `total` events, rounded to nearest
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let done = done.min(total);
    ((done as f64 / total as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(3, 3), 100);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(5, 3), 100);
    }

    #[test]
    fn test_watch_observer() {
        let (tx, rx) = watch::channel(0u8);
        tx.publish(42);
        assert_eq!(*rx.borrow(), 42);
        tx.publish(250);
        assert_eq!(*rx.borrow(), 100);
    }

    #[test]
    fn test_watch_observer_without_receiver() {
        let (tx, rx) = watch::channel(0u8);
        drop(rx);
        tx.publish(10);
        assert_eq!(*tx.borrow(), 10);
    }
}
