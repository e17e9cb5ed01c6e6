pub mod completions;
pub mod event;
pub mod note;
pub mod photo;
pub mod rebuild;
pub mod show;
pub mod verify;

use chrono::{NaiveDate, SecondsFormat};
use verdant_core::{DateKeyer, Timestamp};

/// Calendar date of `timestamp` as `YYYY-MM-DD`, for command output.
pub(crate) fn date_key(keyer: &DateKeyer, timestamp: &Timestamp) -> String {
    keyer.key(timestamp).format("%Y-%m-%d").to_string()
}

pub(crate) fn fmt_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// RFC 3339 with a `Z` suffix, matching the state file.
pub(crate) fn fmt_ts(timestamp: &Timestamp) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
