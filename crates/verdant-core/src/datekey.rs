//! Mapping absolute instants onto the viewer's calendar dates.
//!
//! A [`DateKeyer`] resolves its zone once, when it is built, and never
//! consults the system zone again, so a day's membership cannot shift
//! between two mutations.

use std::env;
use std::fmt;
use std::str::FromStr;

use chrono::{FixedOffset, Local, NaiveDate};
use chrono_tz::Tz;
use tracing::debug;

use crate::model::Timestamp;

/// The time zone calendar dates are computed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    /// System zone, including its DST rules.
    #[default]
    Local,
    Utc,
    /// A fixed UTC offset, e.g. `+05:30`.
    Fixed(FixedOffset),
    /// An IANA zone, e.g. `Europe/Berlin`.
    Named(Tz),
}

/// Error returned when a zone string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time zone '{raw}': expected local, utc, an offset like +05:30, or a name like Europe/Berlin")]
pub struct InvalidZone {
    pub raw: String,
}

impl FromStr for Zone {
    type Err = InvalidZone;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "local" => return Ok(Self::Local),
            "utc" | "z" | "+00:00" | "-00:00" => return Ok(Self::Utc),
            _ => {}
        }
        if let Some(offset) = parse_offset(trimmed) {
            return Ok(Self::Fixed(offset));
        }
        trimmed
            .parse::<Tz>()
            .map(Self::Named)
            .map_err(|_| InvalidZone { raw: s.to_string() })
    }
}

fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Utc => f.write_str("utc"),
            Self::Fixed(offset) => write!(f, "{offset}"),
            Self::Named(tz) => f.write_str(tz.name()),
        }
    }
}

/// Zone rules a keyer computes with. `Zone::Local` never appears here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rules {
    Utc,
    Fixed(FixedOffset),
    Named(Tz),
}

impl Rules {
    fn resolve(zone: Zone) -> Self {
        match zone {
            Zone::Local => resolve_local(),
            Zone::Utc => Self::Utc,
            Zone::Fixed(offset) => Self::Fixed(offset),
            Zone::Named(tz) => Self::Named(tz),
        }
    }
}

/// Snapshot the system zone: `TZ` first, then the platform zone name.
/// Anything unnamed (a POSIX `TZ` string, a detection failure) is pinned to
/// the offset in effect right now.
fn resolve_local() -> Rules {
    let named = match env::var("TZ") {
        Ok(raw) => raw.trim_start_matches(':').parse::<Tz>().ok(),
        Err(_) => iana_time_zone::get_timezone()
            .ok()
            .and_then(|name| name.parse::<Tz>().ok()),
    };
    let rules = named.map_or_else(
        || Rules::Fixed(*Local::now().offset()),
        Rules::Named,
    );
    debug!(?rules, "resolved local time zone");
    rules
}

/// Converts instants to calendar-date keys in a fixed zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateKeyer {
    zone: Zone,
    rules: Rules,
}

impl Default for DateKeyer {
    fn default() -> Self {
        Self::new(Zone::Local)
    }
}

impl DateKeyer {
    /// Build a keyer. `Zone::Local` is resolved here, once.
    #[must_use]
    pub fn new(zone: Zone) -> Self {
        Self {
            zone,
            rules: Rules::resolve(zone),
        }
    }

    #[must_use]
    pub const fn utc() -> Self {
        Self {
            zone: Zone::Utc,
            rules: Rules::Utc,
        }
    }

    /// The zone this keyer was asked for.
    #[must_use]
    pub const fn zone(&self) -> Zone {
        self.zone
    }

    /// The calendar date `timestamp` falls on in this keyer's zone.
    #[must_use]
    pub fn key(&self, timestamp: &Timestamp) -> NaiveDate {
        match self.rules {
            Rules::Utc => timestamp.date_naive(),
            Rules::Fixed(offset) => timestamp.with_timezone(&offset).date_naive(),
            Rules::Named(tz) => timestamp.with_timezone(&tz).date_naive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_timestamp;

    fn ts(raw: &str) -> Timestamp {
        parse_timestamp(raw).expect("timestamp")
    }

    #[test]
    fn utc_key_is_utc_date() {
        let keyer = DateKeyer::utc();
        assert_eq!(
            keyer.key(&ts("2024-03-01T23:59:59Z")),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn negative_offset_shifts_late_utc_back_a_day() {
        let keyer = DateKeyer::new("-08:00".parse().expect("zone"));
        assert_eq!(
            keyer.key(&ts("2024-03-02T03:00:00Z")),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn positive_offset_shifts_forward() {
        let keyer = DateKeyer::new("+05:30".parse().expect("zone"));
        assert_eq!(
            keyer.key(&ts("2024-12-31T20:00:00Z")),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
    }

    #[test]
    fn named_zone_follows_dst() {
        let keyer = DateKeyer::new("America/New_York".parse().expect("zone"));
        // 03:30Z is the previous evening in EST (winter) and EDT (summer) alike.
        assert_eq!(
            keyer.key(&ts("2024-01-15T03:30:00Z")),
            NaiveDate::from_ymd_opt(2024, 1, 14).unwrap()
        );
        // 04:30Z crosses midnight only under EDT.
        assert_eq!(
            keyer.key(&ts("2024-07-15T04:30:00Z")),
            NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()
        );
        assert_eq!(
            keyer.key(&ts("2024-01-15T04:30:00Z")),
            NaiveDate::from_ymd_opt(2024, 1, 14).unwrap()
        );
    }

    #[test]
    fn zone_parsing() {
        assert_eq!("local".parse::<Zone>(), Ok(Zone::Local));
        assert_eq!("UTC".parse::<Zone>(), Ok(Zone::Utc));
        assert_eq!(
            "+0200".parse::<Zone>(),
            Ok(Zone::Fixed(FixedOffset::east_opt(7200).unwrap()))
        );
        assert_eq!(
            "-3".parse::<Zone>(),
            Ok(Zone::Fixed(FixedOffset::west_opt(3 * 3600).unwrap()))
        );
        assert_eq!(
            "America/New_York".parse::<Zone>(),
            Ok(Zone::Named(chrono_tz::America::New_York))
        );
        assert!("mars/olympus".parse::<Zone>().is_err());
        assert!("+25:00".parse::<Zone>().is_err());
    }

    #[test]
    fn zone_display_round_trips() {
        for raw in ["local", "utc", "+05:30", "-08:00", "Europe/Berlin"] {
            let zone: Zone = raw.parse().expect("zone");
            assert_eq!(zone.to_string().parse::<Zone>(), Ok(zone));
        }
    }
}
