//! Two-phase confirmation for destructive actions
//!
//! A destructive action (identity retire, message deletion) is never run
//! from the requesting call site. The call site records the action on
//! the gate; only an explicit `confirm()` executes it, and `cancel()`
//! discards it. At most one confirmation is pending at a time.

use std::sync::Mutex;

use crate::error::Result;

type Action = Box<dyn FnOnce() -> Result<()> + Send>;

/// A recorded destructive action awaiting user confirmation
pub struct PendingConfirmation {
    pub title: String,
    pub message: String,
    action: Action,
}

/// Holder for the at-most-one pending confirmation
pub struct ConfirmationGate {
    pending: Mutex<Option<PendingConfirmation>>,
}

impl ConfirmationGate {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(None),
        }
    }

    /// Record an action for later confirmation. A still-pending earlier
    /// request is discarded uninvoked.
    pub fn request(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
        action: impl FnOnce() -> Result<()> + Send + 'static,
    ) {
        let mut pending = self.pending.lock().unwrap();
        *pending = Some(PendingConfirmation {
            title: title.into(),
            message: message.into(),
            action: Box::new(action),
        });
    }

    /// Title and message of the pending confirmation, for display
    pub fn pending(&self) -> Option<(String, String)> {
        self.pending
            .lock()
            .unwrap()
            .as_ref()
            .map(|p| (p.title.clone(), p.message.clone()))
    }

    /// Execute the recorded action exactly once and clear it.
    ///
    /// Returns `None` when nothing was pending; the guarded action never
    /// runs without a prior `request`.
    pub fn confirm(&self) -> Option<Result<()>> {
        let pending = self.pending.lock().unwrap().take()?;
        Some((pending.action)())
    }

    /// Discard the pending action uninvoked
    pub fn cancel(&self) {
        *self.pending.lock().unwrap() = None;
    }
}

impl Default for ConfirmationGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_confirm_runs_action_exactly_once() {
        let gate = ConfirmationGate::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&runs);
        gate.request("Delete mailbox", "This cannot be undone.", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert!(gate.pending().is_some());
        assert!(gate.confirm().is_some());
        assert_eq!(runs.load(Ordering::SeqCst), 1);

        // Cleared after execution; a second confirm is a no-op
        assert!(gate.pending().is_none());
        assert!(gate.confirm().is_none());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_discards_action() {
        let gate = ConfirmationGate::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&runs);
        gate.request("Delete message", "Remove this message?", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        gate.cancel();
        assert!(gate.confirm().is_none());
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_new_request_replaces_pending() {
        let gate = ConfirmationGate::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&first);
        gate.request("First", "first", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let counter = Arc::clone(&second);
        gate.request("Second", "second", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert!(gate.confirm().is_some());
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }
}
