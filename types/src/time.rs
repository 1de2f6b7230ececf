//! Timestamp type and clock abstraction.
//!
//! Timestamps are UTC instants with microsecond precision. The canonical text
//! form is ISO-8601 with an explicit `+00:00` offset, and the fractional part
//! is omitted when it is zero (e.g. `2025-12-05T10:00:00+00:00`,
//! `2025-12-05T10:00:00.250000+00:00`). Signatures are computed over that text,
//! so it must be reproduced byte-for-byte by every implementation.

use chrono::{DateTime, SubsecRound, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::TypeError;

const MICROS_PER_SEC: i64 = 1_000_000;

/// A UTC instant truncated to whole microseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Get the current system time as a `Timestamp`.
    pub fn now() -> Self {
        Self(Utc::now().trunc_subsecs(6))
    }

    /// Build from microseconds since the Unix epoch. `None` if out of range.
    pub fn from_unix_micros(micros: i64) -> Option<Self> {
        DateTime::from_timestamp_micros(micros).map(Self)
    }

    /// Build from whole seconds since the Unix epoch. `None` if out of range.
    pub fn from_unix_secs(secs: i64) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(Self)
    }

    pub fn as_unix_micros(&self) -> i64 {
        self.0.timestamp_micros()
    }

    pub fn as_unix_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Signed microseconds from `earlier` to `self` (negative if `earlier` is later).
    pub fn micros_since(&self, earlier: Timestamp) -> i64 {
        self.as_unix_micros().saturating_sub(earlier.as_unix_micros())
    }

    /// Shift by a signed number of seconds, saturating at the representable range.
    pub fn offset_secs(&self, secs: i64) -> Self {
        let shifted = TimeDelta::try_seconds(secs).and_then(|d| self.0.checked_add_signed(d));
        match shifted {
            Some(dt) => Self(dt),
            None if secs < 0 => Self(DateTime::<Utc>::MIN_UTC),
            None => Self(DateTime::<Utc>::MAX_UTC.trunc_subsecs(6)),
        }
    }

    /// Canonical ISO-8601 rendering used in signing data and on the wire.
    pub fn to_iso8601(&self) -> String {
        let base = self.0.format("%Y-%m-%dT%H:%M:%S");
        let micros = self.0.nanosecond() / 1_000;
        if micros == 0 {
            format!("{base}+00:00")
        } else {
            format!("{base}.{micros:06}+00:00")
        }
    }

    /// Parse an RFC 3339 / ISO-8601 timestamp with an explicit offset.
    ///
    /// Input is normalised to UTC. Sub-microsecond precision is rejected
    /// because it could not be rendered back into the signed form.
    pub fn parse_iso8601(s: &str) -> Result<Self, TypeError> {
        let parsed = DateTime::parse_from_rfc3339(s).map_err(|e| TypeError::InvalidTimestamp {
            value: s.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.nanosecond() % 1_000 != 0 {
            return Err(TypeError::InvalidTimestamp {
                value: s.to_string(),
                reason: "sub-microsecond precision is not supported".into(),
            });
        }
        Ok(Self(parsed.with_timezone(&Utc)))
    }
}

/// Convert whole seconds to microseconds, saturating.
pub fn secs_to_micros(secs: u64) -> i64 {
    i64::try_from(secs)
        .unwrap_or(i64::MAX)
        .saturating_mul(MICROS_PER_SEC)
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Timestamp::parse_iso8601(&s).map_err(serde::de::Error::custom)
    }
}

/// Source of the current time.
///
/// Verification and attestation creation read time through this trait so tests
/// can drive freshness deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time from the operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}
