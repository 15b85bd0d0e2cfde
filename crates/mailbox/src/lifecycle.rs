//! Identity lifecycle: provision, restore, retire
//!
//! Coordinates the remote service, the session and the identity store.
//! Only one lifecycle operation may be in flight; a concurrent request
//! gets [`Error::Busy`] so two identities can never race to become
//! active. Retirement is reachable only through a confirmed
//! [`crate::ConfirmationGate`] action.

use log::{info, warn};
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::confirm::ConfirmationGate;
use crate::error::{Error, Result};
use crate::mailtm::Remote;
use crate::models::{Identity, RetentionPolicy};
use crate::session::Session;
use crate::storage::IdentityStore;

/// Length of generated local parts and passwords
const CREDENTIAL_LEN: usize = 10;

pub struct LifecycleController {
    remote: Arc<dyn Remote>,
    session: Arc<Session>,
    store: Arc<dyn IdentityStore>,
    busy: AtomicBool,
}

/// Releases the one-operation-in-flight slot on every exit path
struct OpGuard<'a> {
    busy: &'a AtomicBool,
}

impl Drop for OpGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

impl LifecycleController {
    pub fn new(
        remote: Arc<dyn Remote>,
        session: Arc<Session>,
        store: Arc<dyn IdentityStore>,
    ) -> Self {
        Self {
            remote,
            session,
            store,
            busy: AtomicBool::new(false),
        }
    }

    fn begin_op(&self) -> Result<OpGuard<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::Busy);
        }
        Ok(OpGuard { busy: &self.busy })
    }

    /// Install the saved identity and retention policy from the store,
    /// without any remote call (trust-on-read).
    pub fn bootstrap(&self) -> Result<Option<Identity>> {
        if let Some(policy) = self.store.load_policy()? {
            self.session.set_policy(policy);
        }

        let Some(identity) = self.store.load()? else {
            return Ok(None);
        };
        info!("restored saved identity {}", identity.address);
        self.session.install_identity(identity.clone());
        Ok(Some(identity))
    }

    /// Provision a brand-new identity: pick an active domain, generate
    /// random credentials, create the remote account and authenticate.
    ///
    /// Fails with [`Error::NoDomainAvailable`] when no active domain is
    /// offered, [`Error::ProvisionFailed`] for any other remote failure.
    /// Nothing is installed or persisted on failure; a previously active
    /// identity stays untouched.
    pub fn create_fresh(&self) -> Result<Identity> {
        let _guard = self.begin_op()?;
        self.provision()
    }

    fn provision(&self) -> Result<Identity> {
        self.provision_inner().map_err(|e| match e {
            Error::NoDomainAvailable | Error::Storage(_) => e,
            other => Error::ProvisionFailed {
                message: other.to_string(),
            },
        })
    }

    fn provision_inner(&self) -> Result<Identity> {
        let domains = self.remote.list_domains()?;
        let domain = domains
            .into_iter()
            .find(|d| d.is_active)
            .ok_or(Error::NoDomainAvailable)?;

        let address = format!("{}@{}", random_token(CREDENTIAL_LEN), domain.domain);
        let password = random_token(CREDENTIAL_LEN);

        let account = self.remote.create_account(&address, &password)?;
        let auth = self.remote.get_token(&address, &password)?;
        let identity = Identity::from_account(account, auth.token, password);

        self.install(identity)
    }

    /// Re-adopt an existing mailbox from its address and password.
    ///
    /// Authenticates and fetches the account before touching any state;
    /// on [`Error::RestoreFailed`] the previously active identity is
    /// unchanged.
    pub fn restore(&self, address: &str, password: &str) -> Result<Identity> {
        let _guard = self.begin_op()?;

        let result: Result<Identity> = (|| {
            let auth = self.remote.get_token(address, password)?;
            let account = self.remote.get_account(&auth.id, &auth.token)?;
            Ok(Identity::from_account(account, auth.token, password))
        })();

        let identity = result.map_err(|e| Error::RestoreFailed {
            message: e.to_string(),
        })?;

        info!("restoring identity {}", identity.address);
        self.install(identity)
    }

    /// Retire the active identity and provision a fresh one.
    ///
    /// The remote account delete is best-effort: the user already
    /// confirmed local abandonment, so a failure is logged and swallowed.
    /// Local identity and message state are cleared before the new
    /// provisioning starts.
    ///
    /// Destructive; call through [`Self::request_retire`] + gate confirm.
    pub fn retire_and_replace(&self) -> Result<Identity> {
        let _guard = self.begin_op()?;

        if let Some(identity) = self.session.identity() {
            info!("retiring identity {}", identity.address);
            if let Err(e) = self.remote.delete_account(&identity.id, &identity.token) {
                warn!(
                    "best-effort remote delete of identity {} failed: {}",
                    identity.address, e
                );
            }
        }

        self.store.clear()?;
        self.session.clear_identity();

        self.provision()
    }

    /// Record a confirmation-gated retire on the gate. The retire runs
    /// only when the gate is confirmed, never from this call site.
    pub fn request_retire(self: &Arc<Self>, gate: &ConfirmationGate) {
        let controller = Arc::clone(self);
        gate.request(
            "Generate new identity",
            "This permanently deletes the current mailbox and all its messages.",
            move || controller.retire_and_replace().map(|_| ()),
        );
    }

    /// Update the retention policy on the session and persist it
    pub fn set_retention(&self, policy: RetentionPolicy) -> Result<()> {
        self.session.set_policy(policy);
        self.store.save_policy(&policy)
    }

    /// Persist then install: if persisting fails nothing is installed,
    /// so session and store can never disagree about the active identity.
    fn install(&self, identity: Identity) -> Result<Identity> {
        self.store.save(&identity)?;
        self.session.install_identity(identity.clone());
        info!("identity {} is now active", identity.address);
        Ok(identity)
    }
}

fn random_token(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| rng.sample(Alphanumeric) as char)
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_token_shape() {
        let token = random_token(10);
        assert_eq!(token.len(), 10);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(token, token.to_lowercase());
    }

    #[test]
    fn test_random_tokens_differ() {
        // Astronomically unlikely to collide
        assert_ne!(random_token(10), random_token(10));
    }
}
