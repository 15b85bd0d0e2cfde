//! Identity persistence
//!
//! The active identity and the retention policy survive process
//! restarts. Address, token and password are written and cleared as one
//! record; there are no partial writes.

mod file;
mod memory;

pub use file::FileIdentityStore;
pub use memory::InMemoryIdentityStore;

use crate::error::Result;
use crate::models::{Identity, RetentionPolicy};

/// Trait for identity persistence backends
pub trait IdentityStore: Send + Sync {
    /// Load the previously saved identity, if any
    fn load(&self) -> Result<Option<Identity>>;

    /// Persist the active identity (whole record, atomically)
    fn save(&self, identity: &Identity) -> Result<()>;

    /// Clear the persisted identity as a unit
    fn clear(&self) -> Result<()>;

    /// Load the saved retention policy, if any
    fn load_policy(&self) -> Result<Option<RetentionPolicy>>;

    /// Persist the retention policy
    fn save_policy(&self, policy: &RetentionPolicy) -> Result<()>;
}
