use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::warn;

/// Lock a mutex, recovering the guard if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Join a background thread, abandoning it with a warning if it does not
/// finish within `timeout`. Guarantees shutdown progress even when a loop
/// is stuck in blocking I/O.
pub(crate) fn join_with_timeout(handle: JoinHandle<()>, timeout: Duration, task: &str) {
    let deadline = Instant::now() + timeout;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            warn!(task, ?timeout, "background task did not stop in time; abandoning");
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    if handle.join().is_err() {
        warn!(task, "background task panicked");
    }
}
