//! Timestamp stamping rule.
//!
//! # Responsibility
//! - Produce `created_at`/`updated_at` values for every write path.
//! - Define the persisted text form of timestamps.
//!
//! # Invariants
//! - Stamps are UTC with millisecond precision.
//! - An update stamp is strictly greater than the previous `updated_at`.
//! - Callers never supply stamps; repositories ask this module.

use chrono::{NaiveDateTime, SubsecRound, TimeDelta, Utc};

/// Persisted form: `YYYY-MM-DD HH:MM:SS.fff`. Sorts lexicographically in time
/// order and extends SQLite's `CURRENT_TIMESTAMP` layout.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// `CURRENT_TIMESTAMP` layout, accepted on read for rows stamped by column
/// defaults.
const SQLITE_DEFAULT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source of "now" for stamping.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// Clock frozen at one instant. Useful for deterministic tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Stamp for a newly inserted row; used for both `created_at` and `updated_at`.
pub fn stamp_insert(clock: &dyn Clock) -> NaiveDateTime {
    clock.now().trunc_subsecs(3)
}

/// Stamp for a mutation of a row last touched at `previous`.
///
/// Returns `max(now, previous + 1ms)` so `updated_at` moves forward even when
/// the clock is frozen or has stepped backwards.
pub fn stamp_update(clock: &dyn Clock, previous: NaiveDateTime) -> NaiveDateTime {
    let now = clock.now().trunc_subsecs(3);
    let floor = previous.trunc_subsecs(3) + TimeDelta::milliseconds(1);
    now.max(floor)
}

pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a persisted timestamp, with or without fractional seconds.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, SQLITE_DEFAULT_FORMAT))
        .ok()
}
