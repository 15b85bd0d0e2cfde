//! Message models for inbox listings and on-demand detail views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a message (remote message ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An email address with optional display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAddress {
    /// Email address (e.g., "john@example.com")
    pub address: String,
    /// Display name; the wire format sends an empty string when absent
    #[serde(default)]
    pub name: String,
}

impl EmailAddress {
    /// Create a new email address with just the address
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: String::new(),
        }
    }

    /// Create a new email address with a display name
    pub fn with_name(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: name.into(),
        }
    }

    /// Format for display: the name when present, the address otherwise
    pub fn display(&self) -> &str {
        if self.name.is_empty() {
            &self.address
        } else {
            &self.name
        }
    }
}

/// Summary of a message as returned by the inbox listing.
///
/// Immutable once fetched except for the `seen` flag, which the server
/// controls. Listing order is server-determined and preserved as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSummary {
    pub id: MessageId,
    pub from: EmailAddress,
    #[serde(default)]
    pub to: Vec<EmailAddress>,
    #[serde(default)]
    pub subject: String,
    /// Short plain-text preview of the body
    #[serde(default)]
    pub intro: String,
    #[serde(default)]
    pub seen: bool,
    #[serde(default)]
    pub has_attachments: bool,
    #[serde(default)]
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

/// Full message content, fetched on demand per message ID.
///
/// Not cached beyond the currently viewed message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDetail {
    #[serde(flatten)]
    pub summary: MessageSummary,
    /// Plain text body
    #[serde(default)]
    pub text: String,
    /// HTML body variants
    #[serde(default)]
    pub html: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_address_display() {
        let plain = EmailAddress::new("noreply@example.com");
        assert_eq!(plain.display(), "noreply@example.com");

        let named = EmailAddress::with_name("Example Support", "noreply@example.com");
        assert_eq!(named.display(), "Example Support");
    }

    #[test]
    fn test_summary_deserializes_wire_shape() {
        let msg: MessageSummary = serde_json::from_value(serde_json::json!({
            "id": "m1",
            "from": {"address": "sender@example.com", "name": ""},
            "to": [{"address": "u7f2k@belgianairways.com", "name": ""}],
            "subject": "Verify your account",
            "intro": "Click the link below...",
            "seen": false,
            "hasAttachments": false,
            "size": 4321,
            "createdAt": "2025-10-24T12:00:00+00:00"
        }))
        .unwrap();

        assert_eq!(msg.id.as_str(), "m1");
        assert_eq!(msg.from.address, "sender@example.com");
        assert!(!msg.seen);
        assert_eq!(msg.size, 4321);
    }

    #[test]
    fn test_detail_flattens_summary_fields() {
        let detail: MessageDetail = serde_json::from_value(serde_json::json!({
            "id": "m1",
            "from": {"address": "sender@example.com", "name": "Sender"},
            "subject": "Hello",
            "intro": "Hi there",
            "seen": true,
            "size": 100,
            "createdAt": "2025-10-24T12:00:00+00:00",
            "text": "Hi there, full body.",
            "html": ["<p>Hi there, full body.</p>"]
        }))
        .unwrap();

        assert_eq!(detail.summary.subject, "Hello");
        assert_eq!(detail.text, "Hi there, full body.");
        assert_eq!(detail.html.len(), 1);
    }
}
