//! In-memory identity store for tests

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use super::IdentityStore;
use crate::error::{Error, Result};
use crate::models::{Identity, RetentionPolicy};

/// In-memory implementation of [`IdentityStore`].
///
/// Can be told to fail saves, for exercising persistence-failure paths.
pub struct InMemoryIdentityStore {
    identity: RwLock<Option<Identity>>,
    policy: RwLock<Option<RetentionPolicy>>,
    fail_saves: AtomicBool,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self {
            identity: RwLock::new(None),
            policy: RwLock::new(None),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Make subsequent `save` calls fail
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl Default for InMemoryIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityStore for InMemoryIdentityStore {
    fn load(&self) -> Result<Option<Identity>> {
        Ok(self.identity.read().unwrap().clone())
    }

    fn save(&self, identity: &Identity) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(Error::Storage(anyhow::anyhow!("simulated save failure")));
        }
        *self.identity.write().unwrap() = Some(identity.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.identity.write().unwrap() = None;
        Ok(())
    }

    fn load_policy(&self) -> Result<Option<RetentionPolicy>> {
        Ok(*self.policy.read().unwrap())
    }

    fn save_policy(&self, policy: &RetentionPolicy) -> Result<()> {
        *self.policy.write().unwrap() = Some(*policy);
        Ok(())
    }
}
