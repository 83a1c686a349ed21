//! # Record Models
//!
//! Plain data records consumed by the status engine. Records arrive already
//! decoded from the platform API; the engine only reads them.
//!
//! Field names accept both the snake_case spelling used by the backend and the
//! camelCase spelling used by the web client, so a record decoded from either
//! source lands in the same struct.

pub mod booking;
pub mod invoice;

pub use booking::{Booking, BookingRecord};
pub use invoice::{Invoice, InvoiceStatus};

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier of a booking, invoice or tenant.
///
/// The platform API emits numeric ids for legacy rows and string ids for newer
/// ones, so both are accepted and normalized to a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Signed(n) => Self(n.to_string()),
            RawId::Unsigned(n) => Self(n.to_string()),
        })
    }
}

/// Deserialize raw date text without rejecting the record.
///
/// Strings pass through and `null` becomes `None`. Any other JSON value is kept
/// as its textual form, so it later fails [`parse_calendar_date`] and the
/// engine reports the booking as having invalid dates.
pub(crate) fn lenient_date<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(raw)) => Some(raw),
        Some(other) => Some(other.to_string()),
    })
}

/// Parse a calendar date from the formats the platform emits.
///
/// Accepts a bare `YYYY-MM-DD`, an RFC 3339 timestamp, or a naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` timestamp. Only the calendar date is kept.
pub(crate) fn parse_calendar_date(raw: &str) -> Option<chrono::NaiveDate> {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};

    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|ts| ts.date())
}
