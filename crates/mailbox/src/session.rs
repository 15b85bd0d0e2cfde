//! Shared session state for the active identity
//!
//! One `Session` is the single context object shared by the inbox
//! synchronizer, the lifecycle controller and the poller. It owns the
//! active identity, the visible message list, the retention policy and
//! the sync phase.
//!
//! Every identity swap or clear bumps an epoch counter. In-flight work
//! captures the epoch when it starts and commits only if the epoch is
//! unchanged, so a late-arriving response can never populate state for
//! an identity that has since been replaced.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::models::{Identity, MessageSummary, RetentionPolicy};

/// Where the synchronizer currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Syncing,
    /// The last cycle's fetch failed; the previous list is retained and
    /// the next tick retries
    Error,
}

pub struct Session {
    identity: RwLock<Option<Identity>>,
    messages: RwLock<Vec<MessageSummary>>,
    policy: RwLock<RetentionPolicy>,
    phase: RwLock<SyncPhase>,
    /// Dismissible user-facing notice from a non-fatal failure
    notice: RwLock<Option<String>>,
    /// Bumped on every identity swap/clear
    epoch: AtomicU64,
    /// Single-flight sync guard
    syncing: AtomicBool,
}

impl Session {
    pub fn new() -> Self {
        Self {
            identity: RwLock::new(None),
            messages: RwLock::new(Vec::new()),
            policy: RwLock::new(RetentionPolicy::default()),
            phase: RwLock::new(SyncPhase::Idle),
            notice: RwLock::new(None),
            epoch: AtomicU64::new(0),
            syncing: AtomicBool::new(false),
        }
    }

    // === Identity ===

    pub fn identity(&self) -> Option<Identity> {
        self.identity.read().unwrap().clone()
    }

    pub fn has_identity(&self) -> bool {
        self.identity.read().unwrap().is_some()
    }

    /// Install a new active identity, clearing all message state.
    /// Invalidates any in-flight work issued under the previous identity.
    pub fn install_identity(&self, identity: Identity) {
        let mut guard = self.identity.write().unwrap();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *guard = Some(identity);
        self.messages.write().unwrap().clear();
        *self.phase.write().unwrap() = SyncPhase::Idle;
        *self.notice.write().unwrap() = None;
    }

    /// Drop the active identity and all message state
    pub fn clear_identity(&self) {
        let mut guard = self.identity.write().unwrap();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *guard = None;
        self.messages.write().unwrap().clear();
        *self.phase.write().unwrap() = SyncPhase::Idle;
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    // === Messages ===

    pub fn messages(&self) -> Vec<MessageSummary> {
        self.messages.read().unwrap().clone()
    }

    /// Atomically replace the message list, provided the identity has not
    /// changed since `epoch` was captured. Returns false when the commit
    /// was discarded as stale.
    pub fn commit_messages(&self, epoch: u64, messages: Vec<MessageSummary>) -> bool {
        // Hold the identity lock so a swap cannot interleave with the check
        let _identity = self.identity.read().unwrap();
        if self.epoch.load(Ordering::SeqCst) != epoch {
            return false;
        }
        *self.messages.write().unwrap() = messages;
        true
    }

    /// Remove a single message locally, with the same staleness check
    pub fn remove_message(&self, epoch: u64, id: &crate::models::MessageId) -> bool {
        let _identity = self.identity.read().unwrap();
        if self.epoch.load(Ordering::SeqCst) != epoch {
            return false;
        }
        self.messages.write().unwrap().retain(|m| &m.id != id);
        true
    }

    // === Retention policy ===

    pub fn policy(&self) -> RetentionPolicy {
        *self.policy.read().unwrap()
    }

    pub fn set_policy(&self, policy: RetentionPolicy) {
        *self.policy.write().unwrap() = policy;
    }

    // === Sync phase & notices ===

    pub fn phase(&self) -> SyncPhase {
        *self.phase.read().unwrap()
    }

    /// Phase write with the same staleness check as message commits, so
    /// a cycle issued under a replaced identity cannot leave its phase
    /// behind. Returns false when the write was discarded as stale.
    pub(crate) fn set_phase_if_current(&self, epoch: u64, phase: SyncPhase) -> bool {
        let _identity = self.identity.read().unwrap();
        if self.epoch.load(Ordering::SeqCst) != epoch {
            return false;
        }
        *self.phase.write().unwrap() = phase;
        true
    }

    /// Take (and clear) the pending user-facing notice
    pub fn take_notice(&self) -> Option<String> {
        self.notice.write().unwrap().take()
    }

    /// Notice write with the same staleness check as message commits
    pub(crate) fn set_notice_if_current(&self, epoch: u64, notice: impl Into<String>) -> bool {
        let _identity = self.identity.read().unwrap();
        if self.epoch.load(Ordering::SeqCst) != epoch {
            return false;
        }
        *self.notice.write().unwrap() = Some(notice.into());
        true
    }

    // === Single-flight guard ===

    /// Try to become the one in-flight sync. Returns false when another
    /// sync holds the slot; the caller should drop its trigger.
    pub(crate) fn try_begin_sync(&self) -> bool {
        self.syncing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub(crate) fn end_sync(&self) {
        self.syncing.store(false, Ordering::SeqCst);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmailAddress, MessageId};
    use chrono::Utc;

    fn make_identity(address: &str) -> Identity {
        Identity {
            id: "acc1".to_string(),
            address: address.to_string(),
            token: "tok".to_string(),
            password: "pw".to_string(),
            quota: 0,
            used: 0,
            is_disabled: false,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn make_message(id: &str) -> MessageSummary {
        MessageSummary {
            id: MessageId::new(id),
            from: EmailAddress::new("s@example.com"),
            to: Vec::new(),
            subject: String::new(),
            intro: String::new(),
            seen: false,
            has_attachments: false,
            size: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_install_clears_messages_and_bumps_epoch() {
        let session = Session::new();
        let epoch = session.epoch();
        assert!(session.commit_messages(epoch, vec![make_message("m1")]));
        assert_eq!(session.messages().len(), 1);

        session.install_identity(make_identity("a@b.com"));
        assert!(session.messages().is_empty());
        assert!(session.epoch() > epoch);
    }

    #[test]
    fn test_stale_commit_discarded() {
        let session = Session::new();
        session.install_identity(make_identity("a@b.com"));
        let epoch = session.epoch();

        // Identity swapped while a fetch was in flight
        session.install_identity(make_identity("c@d.com"));

        assert!(!session.commit_messages(epoch, vec![make_message("m1")]));
        assert!(session.messages().is_empty());
    }

    #[test]
    fn test_stale_phase_write_discarded() {
        let session = Session::new();
        session.install_identity(make_identity("a@b.com"));
        let epoch = session.epoch();

        session.install_identity(make_identity("c@d.com"));

        assert!(!session.set_phase_if_current(epoch, SyncPhase::Error));
        assert_eq!(session.phase(), SyncPhase::Idle);
        assert!(!session.set_notice_if_current(epoch, "stale"));
        assert!(session.take_notice().is_none());
    }

    #[test]
    fn test_single_flight_guard() {
        let session = Session::new();
        assert!(session.try_begin_sync());
        assert!(!session.try_begin_sync());
        session.end_sync();
        assert!(session.try_begin_sync());
    }

    #[test]
    fn test_remove_message() {
        let session = Session::new();
        let epoch = session.epoch();
        session.commit_messages(epoch, vec![make_message("m1"), make_message("m2")]);

        assert!(session.remove_message(epoch, &MessageId::new("m1")));
        let ids: Vec<_> = session.messages().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![MessageId::new("m2")]);
    }
}
