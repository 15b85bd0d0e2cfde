//! Mailbox crate - Business logic for disposable email identities
//!
//! This crate provides the stateful core of a disposable-email client:
//! - Domain models (Identity, MessageSummary, RetentionPolicy)
//! - Mail.tm API client behind the `Remote` trait
//! - Pure auto-purge retention evaluation
//! - Inbox synchronizer with single-flight polling and stale-response guarding
//! - Identity lifecycle (provision, restore, retire) with confirmation gating
//! - Persistent identity store surviving restarts
//!
//! All durable mail state lives in the remote service; this crate only owns
//! the active identity, the in-memory message list and the purge policy.
//! It has zero UI dependencies.

pub mod confirm;
pub mod error;
pub mod lifecycle;
pub mod mailtm;
pub mod models;
pub mod purge;
pub mod session;
pub mod storage;
pub mod sync;

pub use confirm::{ConfirmationGate, PendingConfirmation};
pub use error::{Error, Result};
pub use lifecycle::LifecycleController;
pub use mailtm::{MailTm, Remote, api};
pub use models::{
    Domain, EmailAddress, Identity, MessageDetail, MessageId, MessageSummary, RetentionPolicy,
};
pub use purge::{is_expired, partition_expired};
pub use session::{Session, SyncPhase};
pub use storage::{FileIdentityStore, IdentityStore, InMemoryIdentityStore};
pub use sync::{DEFAULT_POLL_INTERVAL, PollerHandle, SyncStats, Synchronizer, start_poller};
