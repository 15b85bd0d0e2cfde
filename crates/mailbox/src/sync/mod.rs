//! Inbox synchronizer
//!
//! Orchestrates a sync cycle: fetch the full message list, evaluate the
//! retention policy, issue best-effort parallel deletes for expired
//! messages, then reconcile local state in one atomic commit.
//!
//! Cycles are single-flight: a trigger (manual or timer tick) while a
//! cycle is in flight is ignored, not queued.

mod poller;

pub use poller::{DEFAULT_POLL_INTERVAL, PollerHandle, start_poller};

use chrono::Utc;
use log::{debug, warn};
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::mailtm::Remote;
use crate::models::{MessageDetail, MessageId, MessageSummary};
use crate::purge;
use crate::session::{Session, SyncPhase};

/// Statistics from one sync cycle
#[derive(Debug, Default, Clone)]
pub struct SyncStats {
    /// Number of messages the listing returned
    pub fetched: usize,
    /// Number of expired messages deleted remotely
    pub purged: usize,
    /// Number of expired messages whose remote delete failed; they stay
    /// in the local list and retry next cycle
    pub delete_failures: usize,
    /// Duration of the cycle
    pub duration_ms: u64,
}

/// Releases the single-flight slot on every exit path
struct SyncGuard<'a> {
    session: &'a Session,
}

impl Drop for SyncGuard<'_> {
    fn drop(&mut self) {
        self.session.end_sync();
    }
}

pub struct Synchronizer {
    remote: Arc<dyn Remote>,
    session: Arc<Session>,
}

impl Synchronizer {
    pub fn new(remote: Arc<dyn Remote>, session: Arc<Session>) -> Self {
        Self { remote, session }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Run one sync cycle.
    ///
    /// Returns `Ok(None)` when the trigger was dropped: another cycle was
    /// in flight, no identity is active, or the identity changed while
    /// the fetch was pending (the stale outcome, success or failure, is
    /// discarded without touching the new identity's state).
    ///
    /// A fetch failure for the still-current identity returns
    /// [`Error::SyncFailed`]; the previous message list is retained and
    /// the next tick retries.
    pub fn sync(&self) -> Result<Option<SyncStats>> {
        if !self.session.try_begin_sync() {
            debug!("sync trigger ignored: a cycle is already in flight");
            return Ok(None);
        }
        let _guard = SyncGuard {
            session: &self.session,
        };
        self.run_cycle()
    }

    fn run_cycle(&self) -> Result<Option<SyncStats>> {
        let start = Instant::now();
        let epoch = self.session.epoch();
        let Some(identity) = self.session.identity() else {
            return Ok(None);
        };

        if !self.session.set_phase_if_current(epoch, SyncPhase::Syncing) {
            return Ok(None);
        }

        let fetched = match self.remote.list_messages(&identity.token) {
            Ok(messages) => messages,
            Err(e) => {
                // A failure issued under a replaced identity is dropped
                // wholesale; it must not mark the new identity errored
                if !self.session.set_phase_if_current(epoch, SyncPhase::Error) {
                    debug!("discarding sync failure issued under a replaced identity");
                    return Ok(None);
                }
                // Previous list stays visible; recoverable on the next tick
                return Err(Error::SyncFailed {
                    message: e.to_string(),
                });
            }
        };

        let mut stats = SyncStats {
            fetched: fetched.len(),
            ..Default::default()
        };

        let policy = self.session.policy();
        let (_, expired) = purge::partition_expired(&fetched, &policy, Utc::now());

        let mut deleted: HashSet<MessageId> = HashSet::new();
        if !expired.is_empty() {
            debug!(
                "purge pass: {} of {} messages past the retention window",
                expired.len(),
                stats.fetched
            );

            // Each deletion succeeds or fails independently
            let outcomes: Vec<(MessageId, bool)> = expired
                .par_iter()
                .map(|m| {
                    match self.remote.delete_message(&m.id, &identity.token) {
                        Ok(()) => (m.id.clone(), true),
                        Err(e) => {
                            warn!("best-effort purge of message {} failed: {}", m.id.as_str(), e);
                            (m.id.clone(), false)
                        }
                    }
                })
                .collect();

            for (id, ok) in outcomes {
                if ok {
                    deleted.insert(id);
                    stats.purged += 1;
                } else {
                    stats.delete_failures += 1;
                }
            }
        }

        // One atomic commit: everything fetched minus the messages whose
        // remote delete actually succeeded. Failed deletes stay visible
        // and naturally retry next cycle (they still match the expiry
        // predicate).
        let remaining: Vec<MessageSummary> = fetched
            .into_iter()
            .filter(|m| !deleted.contains(&m.id))
            .collect();

        if !self.session.commit_messages(epoch, remaining) {
            debug!("discarding sync result issued under a replaced identity");
            return Ok(None);
        }

        self.session.set_phase_if_current(epoch, SyncPhase::Idle);
        if stats.delete_failures > 0 {
            self.session.set_notice_if_current(
                epoch,
                format!(
                    "{} expired message(s) could not be deleted",
                    stats.delete_failures
                ),
            );
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;
        Ok(Some(stats))
    }

    /// Fetch full content for one message. On demand only; nothing is
    /// cached here.
    pub fn fetch_detail(&self, id: &MessageId) -> Result<MessageDetail> {
        let Some(identity) = self.session.identity() else {
            return Err(Error::SyncFailed {
                message: "no active identity".to_string(),
            });
        };
        self.remote.get_message(id, &identity.token)
    }

    /// Delete one message remotely, then drop it from local state.
    ///
    /// Unlike purge deletions this is user-requested, so a failure is
    /// surfaced as [`Error::DeleteFailed`] instead of being swallowed.
    pub fn delete_message(&self, id: &MessageId) -> Result<()> {
        let epoch = self.session.epoch();
        let Some(identity) = self.session.identity() else {
            return Err(Error::DeleteFailed {
                message: "no active identity".to_string(),
            });
        };

        self.remote
            .delete_message(id, &identity.token)
            .map_err(|e| Error::DeleteFailed {
                message: e.to_string(),
            })?;

        self.session.remove_message(epoch, id);
        Ok(())
    }
}
