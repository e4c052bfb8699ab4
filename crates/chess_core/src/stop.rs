//! Cooperative cancellation for long-running loops.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared stop flag.
///
/// Cheap to clone; every clone observes the same flag. Loops poll
/// [`StopSignal::is_stopped`] at safe points (between moves, between games)
/// and wind down without leaving half-applied state behind.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that work stop at the next check.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Clear a previous stop request so the signal can be reused.
    pub fn reset(&self) {
        self.stopped.store(false, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_stop_is_shared_between_clones() {
        let signal = StopSignal::new();
        let other = signal.clone();
        assert!(!other.is_stopped());

        signal.stop();
        assert!(other.is_stopped());

        other.reset();
        assert!(!signal.is_stopped());
    }

    #[test]
    fn test_stop_from_another_thread() {
        let signal = StopSignal::new();
        let remote = signal.clone();
        thread::spawn(move || remote.stop()).join().unwrap();
        assert!(signal.is_stopped());
    }
}
