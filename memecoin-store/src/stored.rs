//! Retention envelope shared by the backends

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A record together with the end of its retention window.
///
/// Both backends persist this envelope so expiry semantics stay identical
/// regardless of where the record lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Stored<T> {
    pub record: T,
    pub expires_at: DateTime<Utc>,
}

impl<T> Stored<T> {
    pub fn new(record: T, ttl: Duration) -> Self {
        Self {
            record,
            expires_at: expiry_at(Utc::now(), ttl),
        }
    }

    /// Whether the record is still within its retention window at `now`.
    pub fn live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// End of a retention window starting at `now`. Saturates at the far
/// future instead of overflowing for absurd configured windows.
pub(crate) fn expiry_at(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::try_seconds(ttl.as_secs().min(i64::MAX as u64) as i64)
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
