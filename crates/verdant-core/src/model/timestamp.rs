//! Absolute instants and lenient parsing of backend timestamp strings.
//!
//! The backend emits RFC 3339 strings with an offset, but older payloads carry
//! naive `YYYY-MM-DDTHH:MM:SS[.ffffff]` values that are implicitly UTC. Both
//! are accepted; everything is normalized to [`Utc`].

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::TimelineError;

/// An absolute instant. All engine state is keyed on UTC.
pub type Timestamp = DateTime<Utc>;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a backend timestamp string.
///
/// # Errors
///
/// Returns [`TimelineError::InvalidTimestamp`] if `raw` is neither RFC 3339
/// nor a naive ISO-8601 date-time.
pub fn parse_timestamp(raw: &str) -> Result<Timestamp, TimelineError> {
    let trimmed = raw.trim();
    let rfc_err = match DateTime::parse_from_rfc3339(trimmed) {
        Ok(parsed) => return Ok(parsed.with_timezone(&Utc)),
        Err(err) => err,
    };

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TimelineError::InvalidTimestamp {
            raw: raw.to_string(),
            reason: rfc_err.to_string(),
        })
}

/// Serde helper for fields that accept any format [`parse_timestamp`] does.
pub(crate) fn deserialize_lenient<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Timestamp, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// Newtype for deserializing timestamps nested in collections.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LenientTimestamp(pub Timestamp);

impl<'de> Deserialize<'de> for LenientTimestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_lenient(deserializer).map(Self)
    }
}
