//! Timestamp type used throughout the poll.
//!
//! Timestamps are Unix epoch milliseconds (UTC). Ledger records carry them
//! as ISO-8601 strings.

use crate::TypesError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A Unix timestamp in milliseconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Get the current system time as a `Timestamp`.
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis().max(0) as u64)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Render as an RFC 3339 string with millisecond precision, e.g.
    /// `2024-03-01T12:00:00.000Z`.
    pub fn to_iso8601(&self) -> String {
        DateTime::<Utc>::from_timestamp_millis(self.0 as i64)
            .unwrap_or_default()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn parse_iso8601(s: &str) -> Result<Self, TypesError> {
        let parsed = DateTime::parse_from_rfc3339(s)
            .map_err(|_| TypesError::InvalidTimestamp(s.to_string()))?;
        let millis = parsed.timestamp_millis();
        if millis < 0 {
            return Err(TypesError::InvalidTimestamp(s.to_string()));
        }
        Ok(Self(millis as u64))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

/// Source of the current time. Swapped for a deterministic clock in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_millis_and_zulu() {
        let ts = Timestamp::from_millis(1_709_294_400_123);
        assert_eq!(ts.to_iso8601(), "2024-03-01T12:00:00.123Z");
    }

    #[test]
    fn parses_offsets() {
        let ts = Timestamp::parse_iso8601("2024-03-01T13:00:00.123+01:00").unwrap();
        assert_eq!(ts.as_millis(), 1_709_294_400_123);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Timestamp::parse_iso8601("yesterday").is_err());
    }

    #[test]
    fn epoch_formats() {
        assert_eq!(Timestamp::EPOCH.to_iso8601(), "1970-01-01T00:00:00.000Z");
    }
}
