//! Identity model representing a provisioned disposable mailbox

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mailtm::api;

/// A mail domain offered by the remote service for new addresses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: String,
    pub domain: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_private: bool,
}

/// The disposable mailbox the user currently controls: a remote account
/// plus the credentials needed to read and retire it.
///
/// Exactly one identity is active at a time. The full record (address,
/// token, password) is persisted verbatim across restarts and cleared as
/// a unit on retire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Remote account identifier
    pub id: String,
    /// Full email address (local part @ domain)
    pub address: String,
    /// Bearer token for authenticated calls
    pub token: String,
    /// Account password, kept for restore after the token expires
    pub password: String,
    #[serde(default)]
    pub quota: i64,
    #[serde(default)]
    pub used: i64,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default)]
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Assemble an identity from the remote account record and the
    /// credentials that produced it.
    pub fn from_account(
        account: api::Account,
        token: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: account.id,
            address: account.address,
            token: token.into(),
            password: password.into(),
            quota: account.quota,
            used: account.used,
            is_disabled: account.is_disabled,
            is_deleted: account.is_deleted,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_account() -> api::Account {
        api::Account {
            id: "acc1".to_string(),
            address: "u7f2k@belgianairways.com".to_string(),
            quota: 40_000_000,
            used: 120,
            is_disabled: false,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_from_account_carries_credentials() {
        let identity = Identity::from_account(make_account(), "tok", "s3cret");
        assert_eq!(identity.id, "acc1");
        assert_eq!(identity.address, "u7f2k@belgianairways.com");
        assert_eq!(identity.token, "tok");
        assert_eq!(identity.password, "s3cret");
        assert!(!identity.is_disabled);
    }

    #[test]
    fn test_identity_roundtrips_verbatim() {
        let identity = Identity::from_account(make_account(), "tok", "s3cret");
        let json = serde_json::to_string(&identity).unwrap();
        let back: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(back, identity);
    }

    #[test]
    fn test_domain_deserializes_wire_shape() {
        let domain: Domain = serde_json::from_value(serde_json::json!({
            "id": "d1",
            "domain": "belgianairways.com",
            "isActive": true,
            "isPrivate": false
        }))
        .unwrap();
        assert!(domain.is_active);
        assert_eq!(domain.domain, "belgianairways.com");
    }
}
