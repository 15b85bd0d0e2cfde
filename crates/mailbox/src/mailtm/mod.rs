//! Mail.tm API integration
//!
//! This module provides:
//! - The `Remote` trait, the surface the synchronizer and lifecycle
//!   controller consume (and tests fake)
//! - The HTTP client implementing it against api.mail.tm
//! - Wire types for the JSON-LD (hydra) responses

mod client;

pub use client::MailTm;

use crate::error::Result;
use crate::models::{Domain, MessageDetail, MessageId, MessageSummary};

/// Operations the remote mail service exposes.
///
/// Stateless request/response; every call may fail and is never retried
/// internally. Failures surface as typed [`crate::Error`] values.
pub trait Remote: Send + Sync {
    /// List domains available for new addresses
    fn list_domains(&self) -> Result<Vec<Domain>>;

    /// Create a mailbox account; 4xx detail messages (e.g. address taken)
    /// are carried in the error
    fn create_account(&self, address: &str, password: &str) -> Result<api::Account>;

    /// Exchange credentials for a bearer token
    fn get_token(&self, address: &str, password: &str) -> Result<api::Token>;

    /// Fetch full account details by ID
    fn get_account(&self, id: &str, token: &str) -> Result<api::Account>;

    /// List inbox messages, server-ordered
    fn list_messages(&self, token: &str) -> Result<Vec<MessageSummary>>;

    /// Fetch full message content by ID
    fn get_message(&self, id: &MessageId, token: &str) -> Result<MessageDetail>;

    /// Delete a single message
    fn delete_message(&self, id: &MessageId, token: &str) -> Result<()>;

    /// Delete the whole account
    fn delete_account(&self, id: &str, token: &str) -> Result<()>;
}

/// Mail.tm API response types
pub mod api {
    use chrono::{DateTime, Utc};
    use serde::Deserialize;

    /// Collection envelope used by JSON-LD listings
    #[derive(Debug, Deserialize)]
    pub struct HydraList<T> {
        #[serde(rename = "hydra:member", default = "Vec::new")]
        pub member: Vec<T>,
    }

    /// Remote account record (no credentials)
    #[derive(Debug, Clone, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Account {
        pub id: String,
        pub address: String,
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

    /// Response from the token endpoint
    #[derive(Debug, Deserialize)]
    pub struct Token {
        pub token: String,
        pub id: String,
    }

    /// RFC 7807 style problem body returned on 4xx
    #[derive(Debug, Deserialize)]
    pub struct Problem {
        #[serde(default)]
        pub detail: Option<String>,
    }

}
