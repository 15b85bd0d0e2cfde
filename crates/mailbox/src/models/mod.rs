//! Domain models for the mailbox crate

mod identity;
mod message;
mod retention;

pub use identity::{Domain, Identity};
pub use message::{EmailAddress, MessageDetail, MessageId, MessageSummary};
pub use retention::RetentionPolicy;
