//! Coalesced wake primitive for the matcher thread
//!
//! One notifier is shared by every channel's doorbell. It carries no
//! information about which channel became ready; after any wake the
//! consumer must poll all channels. Back-to-back notifications coalesce
//! into a single wake, which is safe because draining is idempotent.

use super::Doorbell;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::Duration;

/// Process-wide "some channel has new data" signal
pub struct Notifier {
    signaled: Mutex<bool>,
    condvar: Condvar,
}

impl Notifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Notifier {
            signaled: Mutex::new(false),
            condvar: Condvar::new(),
        })
    }

    /// Raise the signal, waking the consumer if it is waiting
    pub fn notify(&self) {
        let mut signaled = self.signaled.lock();
        *signaled = true;
        self.condvar.notify_one();
    }

    /// Block until the signal is raised or `timeout` elapses
    ///
    /// Consumes the signal. Returns `false` on timeout with no signal
    /// received, which the matcher treats as terminal "no more data".
    pub fn wait(&self, timeout: Duration) -> bool {
        let mut signaled = self.signaled.lock();
        if !*signaled {
            // Timeout and signal-received both fall through; the flag
            // below distinguishes them.
            let _ = self.condvar.wait_for(&mut signaled, timeout);
        }
        let received = *signaled;
        *signaled = false;
        received
    }

    /// Build a doorbell that raises this notifier
    pub fn doorbell(self: &Arc<Self>) -> Doorbell {
        let notifier = Arc::clone(self);
        Arc::new(move |_id| notifier.notify())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_notify_before_wait() {
        let n = Notifier::new();
        n.notify();
        assert!(n.wait(Duration::from_millis(1)));
    }

    #[test]
    fn test_wait_timeout_returns_false() {
        let n = Notifier::new();
        assert!(!n.wait(Duration::from_millis(10)));
    }

    #[test]
    fn test_notifications_coalesce() {
        let n = Notifier::new();
        n.notify();
        n.notify();
        n.notify();
        assert!(n.wait(Duration::from_millis(1)));
        // Signal consumed: second wait times out
        assert!(!n.wait(Duration::from_millis(10)));
    }

    #[test]
    fn test_cross_thread_wake() {
        let n = Notifier::new();
        let waker = Arc::clone(&n);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            waker.notify();
        });
        assert!(n.wait(Duration::from_secs(5)));
        handle.join().unwrap();
    }

    #[test]
    fn test_doorbell_raises_signal() {
        let n = Notifier::new();
        let bell = n.doorbell();
        bell(1);
        assert!(n.wait(Duration::from_millis(1)));
    }
}
