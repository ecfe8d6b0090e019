//! Cooperative stop signalling for background loops and blocking waits.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::sync::lock;

/// A one-way latch: once triggered it stays triggered.
///
/// Waiters wake promptly on `trigger`, so interval sleeps (heartbeat) and
/// the session main thread both observe shutdown within their wait quantum
/// rather than a full interval. Safe to trigger from a signal-handler
/// thread.
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    stopped: Mutex<bool>,
    condvar: Condvar,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch the signal and wake all waiters. Idempotent.
    pub fn trigger(&self) {
        let mut stopped = lock(&self.stopped);
        *stopped = true;
        self.condvar.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *lock(&self.stopped)
    }

    /// Block until the signal is triggered.
    pub fn wait(&self) {
        let mut stopped = lock(&self.stopped);
        while !*stopped {
            stopped = self
                .condvar
                .wait(stopped)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
        }
    }

    /// Wait up to `timeout` for the signal. Returns `true` if triggered.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut stopped = lock(&self.stopped);
        while !*stopped {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self
                .condvar
                .wait_timeout(stopped, deadline - now)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            stopped = guard;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[test]
    fn starts_untriggered() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_triggered());
        assert!(!signal.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn trigger_is_idempotent_and_sticky() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        signal.trigger();
        assert!(signal.is_triggered());
        assert!(signal.wait_timeout(Duration::from_millis(1)));
    }

    #[test]
    fn wait_wakes_on_trigger_from_other_thread() {
        let signal = Arc::new(ShutdownSignal::new());
        let waiter = {
            let signal = Arc::clone(&signal);
            std::thread::spawn(move || signal.wait())
        };

        std::thread::sleep(Duration::from_millis(20));
        signal.trigger();
        waiter.join().expect("waiter should finish");
    }

    #[test]
    fn wait_timeout_returns_early_when_triggered() {
        let signal = Arc::new(ShutdownSignal::new());
        let trigger = {
            let signal = Arc::clone(&signal);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                signal.trigger();
            })
        };

        let started = std::time::Instant::now();
        assert!(signal.wait_timeout(Duration::from_secs(5)));
        assert!(started.elapsed() < Duration::from_secs(5));
        trigger.join().expect("trigger thread should finish");
    }
}
