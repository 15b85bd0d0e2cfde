//! Auto-purge retention evaluation
//!
//! Pure functions of (messages, policy, reference instant); no I/O and
//! no side effects. The synchronizer decides what to do with the
//! partition.

use chrono::{DateTime, Utc};

use crate::models::{MessageSummary, RetentionPolicy};

/// Check whether a single message has outlived the retention window.
///
/// A message is expired iff the policy is enabled and the message is at
/// least `policy.window` old at `now`. A disabled policy never expires
/// anything.
pub fn is_expired(message: &MessageSummary, policy: &RetentionPolicy, now: DateTime<Utc>) -> bool {
    policy.enabled && now - message.created_at >= policy.window
}

/// Partition messages into (retained, expired) sets.
///
/// Server ordering is preserved within each partition. Deterministic:
/// the same inputs produce the same partition regardless of call count.
pub fn partition_expired(
    messages: &[MessageSummary],
    policy: &RetentionPolicy,
    now: DateTime<Utc>,
) -> (Vec<MessageSummary>, Vec<MessageSummary>) {
    messages
        .iter()
        .cloned()
        .partition(|m| !is_expired(m, policy, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmailAddress, MessageId};
    use chrono::Duration;

    fn make_message(id: &str, age: Duration) -> MessageSummary {
        MessageSummary {
            id: MessageId::new(id),
            from: EmailAddress::new("sender@example.com"),
            to: Vec::new(),
            subject: format!("Subject {}", id),
            intro: String::new(),
            seen: false,
            has_attachments: false,
            size: 0,
            created_at: Utc::now() - age,
        }
    }

    #[test]
    fn test_disabled_policy_expires_nothing() {
        let policy = RetentionPolicy::disabled(Duration::hours(1));
        let messages = vec![
            make_message("m1", Duration::hours(48)),
            make_message("m2", Duration::minutes(5)),
        ];

        let (retained, expired) = partition_expired(&messages, &policy, Utc::now());
        assert_eq!(retained.len(), 2);
        assert!(expired.is_empty());
    }

    #[test]
    fn test_old_messages_expire() {
        let policy = RetentionPolicy::enabled(Duration::hours(1));
        let messages = vec![
            make_message("old", Duration::hours(2)),
            make_message("fresh", Duration::minutes(10)),
        ];

        let (retained, expired) = partition_expired(&messages, &policy, Utc::now());
        assert_eq!(retained.len(), 1);
        assert_eq!(retained[0].id.as_str(), "fresh");
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id.as_str(), "old");
    }

    #[test]
    fn test_window_boundary_expires() {
        // age == window counts as expired (>=, not >)
        let policy = RetentionPolicy::enabled(Duration::hours(1));
        let now = Utc::now();
        let mut message = make_message("m1", Duration::zero());
        message.created_at = now;
        let at_boundary = now + Duration::hours(1);

        assert!(is_expired(&message, &policy, at_boundary));
        assert!(!is_expired(&message, &policy, at_boundary - Duration::seconds(1)));
    }

    #[test]
    fn test_order_preserved_within_partitions() {
        let policy = RetentionPolicy::enabled(Duration::hours(1));
        let messages = vec![
            make_message("a", Duration::hours(3)),
            make_message("b", Duration::minutes(1)),
            make_message("c", Duration::hours(2)),
            make_message("d", Duration::minutes(2)),
        ];

        let (retained, expired) = partition_expired(&messages, &policy, Utc::now());
        let retained_ids: Vec<_> = retained.iter().map(|m| m.id.as_str()).collect();
        let expired_ids: Vec<_> = expired.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(retained_ids, ["b", "d"]);
        assert_eq!(expired_ids, ["a", "c"]);
    }

    #[test]
    fn test_deterministic() {
        let policy = RetentionPolicy::enabled(Duration::hours(1));
        let now = Utc::now();
        let messages = vec![
            make_message("m1", Duration::hours(2)),
            make_message("m2", Duration::minutes(30)),
        ];

        let first = partition_expired(&messages, &policy, now);
        let second = partition_expired(&messages, &policy, now);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_input() {
        let policy = RetentionPolicy::enabled(Duration::hours(1));
        let (retained, expired) = partition_expired(&[], &policy, Utc::now());
        assert!(retained.is_empty());
        assert!(expired.is_empty());
    }
}
