//! Fixed-interval inbox polling
//!
//! A background thread fires a sync cycle at a fixed interval while an
//! identity is active. The returned handle cancels the thread
//! deterministically on `stop()` or drop; no orphaned timers, and no
//! cycle starts after teardown.

use log::{debug, info, warn};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::Synchronizer;

/// Default polling interval between sync cycles
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Handle to a running poller; dropping it stops the poll thread
pub struct PollerHandle {
    signal: Arc<(Mutex<bool>, Condvar)>,
    thread: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Stop the poller and wait for the thread to exit
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let (lock, cvar) = &*self.signal;
        *lock.lock().unwrap() = true;
        cvar.notify_all();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawn the polling thread.
///
/// The first cycle fires immediately, then every `interval`. Ticks while
/// no identity is active are skipped; sync failures are logged and
/// retried on the next tick.
pub fn start_poller(sync: Arc<Synchronizer>, interval: Duration) -> PollerHandle {
    let signal = Arc::new((Mutex::new(false), Condvar::new()));
    let thread_signal = Arc::clone(&signal);

    let thread = thread::spawn(move || {
        info!("inbox poller started, interval {:?}", interval);
        loop {
            if sync.session().has_identity() {
                match sync.sync() {
                    Ok(Some(stats)) => debug!(
                        "poll cycle: {} fetched, {} purged, {} delete failures ({} ms)",
                        stats.fetched, stats.purged, stats.delete_failures, stats.duration_ms
                    ),
                    Ok(None) => {}
                    Err(e) => warn!("poll cycle failed: {}", e),
                }
            }

            if wait_for_stop(&thread_signal, interval) {
                break;
            }
        }
        info!("inbox poller stopped");
    });

    PollerHandle {
        signal,
        thread: Some(thread),
    }
}

/// Block for `interval` or until the stop flag is raised.
/// Returns true when the poller should exit.
fn wait_for_stop(signal: &(Mutex<bool>, Condvar), interval: Duration) -> bool {
    let (lock, cvar) = signal;
    let deadline = Instant::now() + interval;
    let mut stopped = lock.lock().unwrap();
    while !*stopped {
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        let (guard, _) = cvar.wait_timeout(stopped, deadline - now).unwrap();
        stopped = guard;
    }
    true
}
