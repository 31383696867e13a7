use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};

/// Host-assigned commit time of a world-state change.
///
/// Mirrors the protobuf well-known `Timestamp` layout used by ledger hosts:
/// whole seconds since the UNIX epoch plus a non-negative nanosecond offset.
/// Serialized as `{ "seconds": .., "nanos": .. }`.
///
/// Ordering: `seconds` → `nanos`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    /// Seconds since UNIX epoch.
    pub seconds: i64,
    /// Nanoseconds within the second, `0..1_000_000_000`.
    pub nanos: i32,
}

impl Timestamp {
    /// Create a timestamp with explicit values.
    pub fn new(seconds: i64, nanos: i32) -> Self {
        Self { seconds, nanos }
    }

    /// Timestamp for the current wall-clock time.
    pub fn now() -> Self {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            seconds: elapsed.as_secs() as i64,
            nanos: elapsed.subsec_nanos() as i32,
        }
    }

    /// The UNIX epoch.
    pub const fn zero() -> Self {
        Self {
            seconds: 0,
            nanos: 0,
        }
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}s.{:09})", self.seconds, self.nanos)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::from_timestamp(self.seconds, self.nanos.max(0) as u32) {
            Some(dt) => write!(f, "{}", dt.to_rfc3339_opts(SecondsFormat::Nanos, true)),
            None => write!(f, "{}s.{:09}", self.seconds, self.nanos),
        }
    }
}
