//! Error taxonomy for mailbox operations
//!
//! Remote failures never cross component boundaries raw: the client maps
//! transport and status errors here, and the orchestrating components
//! (synchronizer, lifecycle controller) convert them to the operation-level
//! variants with a human-readable message. Nothing in this taxonomy is
//! fatal; every failure leaves the previously valid state in place.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Domain listing returned no active domain to provision against.
    #[error("no active mail domain available")]
    NoDomainAvailable,

    /// Provisioning a fresh identity failed partway; nothing was installed.
    #[error("identity provisioning failed: {message}")]
    ProvisionFailed { message: String },

    /// Restoring an identity from saved credentials failed; the previously
    /// active identity is untouched.
    #[error("identity restore failed: {message}")]
    RestoreFailed { message: String },

    /// An inbox sync cycle failed. Transient; retried on the next tick.
    #[error("inbox sync failed: {message}")]
    SyncFailed { message: String },

    /// A requested message deletion failed. Surfaced as a dismissible
    /// notice; does not roll back other state.
    #[error("delete failed: {message}")]
    DeleteFailed { message: String },

    /// Another lifecycle operation is already in flight.
    #[error("another identity operation is already in flight")]
    Busy,

    /// The remote service rejected the request.
    #[error("api error {status}: {detail}")]
    Api { status: u16, detail: String },

    /// Transport-level failure talking to the remote service.
    #[error("http error: {0}")]
    Http(String),

    /// Local persistence failure.
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<ureq::Error> for Error {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::StatusCode(code) => Error::Api {
                status: code,
                detail: match code {
                    401 => "unauthorized".to_string(),
                    404 => "not found".to_string(),
                    _ => "request rejected".to_string(),
                },
            },
            other => Error::Http(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
