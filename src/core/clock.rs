//! Clock capability for request timestamps

use chrono::{DateTime, SecondsFormat, Utc};

/// Source of the `Timestamp` parameter.
///
/// Implementations return the current UTC time in RFC 3339 form with a `Z`
/// suffix and whole seconds, e.g. `2021-06-01T12:00:00Z`.
pub trait Clock: Send + Sync {
    fn now(&self) -> String;
}

/// Formats a UTC instant the way the signing scheme expects.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Wall clock backed by `chrono::Utc::now`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        format_timestamp(Utc::now())
    }
}

/// Always reports the same instant. Used for tests and request replays.
#[derive(Debug, Clone)]
pub struct FixedClock(String);

impl FixedClock {
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self(timestamp.into())
    }

    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(format_timestamp(instant))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> String {
        self.0.clone()
    }
}
