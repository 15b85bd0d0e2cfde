//! User-configurable auto-purge retention policy

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// How long fetched messages may live before the auto-purge pass
/// expires them.
///
/// Persisted as `{ "enabled": bool, "durationMs": i64 }`, the shape
/// earlier versions of the client saved, so existing settings files
/// keep loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub enabled: bool,
    pub window: Duration,
}

impl RetentionPolicy {
    /// Enabled policy with the given window
    pub fn enabled(window: Duration) -> Self {
        Self {
            enabled: true,
            window,
        }
    }

    /// Disabled policy keeping the given window for when it is re-enabled
    pub fn disabled(window: Duration) -> Self {
        Self {
            enabled: false,
            window,
        }
    }
}

impl Default for RetentionPolicy {
    /// Purge off, 24 hour window
    fn default() -> Self {
        Self::disabled(Duration::hours(24))
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Persisted {
    enabled: bool,
    duration_ms: i64,
}

impl Serialize for RetentionPolicy {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Persisted {
            enabled: self.enabled,
            duration_ms: self.window.num_milliseconds(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RetentionPolicy {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let p = Persisted::deserialize(deserializer)?;
        Ok(Self {
            enabled: p.enabled,
            window: Duration::milliseconds(p.duration_ms),
        })
    }
}
