//! Care event types and the per-type event history.
//!
//! # Canonical order
//!
//! Event types have a fixed display rank that is independent of when the
//! events happened:
//!   water(0) < fertilize(1) < prune(2) < repot(3)
//!
//! `Ord` follows this rank, so any `BTreeSet<EventType>` iterates in display
//! order without an explicit re-sort.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use super::timestamp::{LenientTimestamp, Timestamp};

// ---------------------------------------------------------------------------
// EventType
// ---------------------------------------------------------------------------

/// A kind of plant care event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum EventType {
    Water = 0,
    Fertilize = 1,
    Prune = 2,
    Repot = 3,
}

impl EventType {
    /// All event types in canonical display order.
    pub const ALL: [Self; 4] = [Self::Water, Self::Fertilize, Self::Prune, Self::Repot];

    /// Return the display rank of this event type.
    #[must_use]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// Return the lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Fertilize => "fertilize",
            Self::Prune => "prune",
            Self::Repot => "repot",
        }
    }
}

impl PartialOrd for EventType {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventType {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown event type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventType {
    /// The unrecognised input string.
    pub raw: String,
}

impl fmt::Display for UnknownEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown event type '{}': expected one of water, fertilize, prune, repot",
            self.raw
        )
    }
}

impl std::error::Error for UnknownEventType {}

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "water" => Ok(Self::Water),
            "fertilize" => Ok(Self::Fertilize),
            "prune" => Ok(Self::Prune),
            "repot" => Ok(Self::Repot),
            _ => Err(UnknownEventType { raw: s.to_string() }),
        }
    }
}

// ---------------------------------------------------------------------------
// EventHistory
// ---------------------------------------------------------------------------

/// Event timestamps grouped by type, each list newest first.
///
/// The head of each list doubles as the "last watered" / "last fertilized"
/// display value. Duplicate timestamps are kept; rejecting them is the
/// caller's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventHistory {
    by_type: BTreeMap<EventType, Vec<Timestamp>>,
}

impl EventHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a timestamp, keeping the type's list sorted newest first.
    pub fn insert(&mut self, event_type: EventType, timestamp: Timestamp) {
        let list = self.by_type.entry(event_type).or_default();
        // Insert after any equal timestamps so repeated inserts keep arrival order.
        let pos = list.partition_point(|existing| *existing >= timestamp);
        list.insert(pos, timestamp);
    }

    /// Remove one occurrence of `timestamp`. Returns `false` if it was absent.
    pub fn remove(&mut self, event_type: EventType, timestamp: &Timestamp) -> bool {
        let Some(list) = self.by_type.get_mut(&event_type) else {
            return false;
        };
        let Some(pos) = list.iter().position(|existing| existing == timestamp) else {
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            self.by_type.remove(&event_type);
        }
        true
    }

    /// Timestamps for one type, newest first.
    #[must_use]
    pub fn timestamps(&self, event_type: EventType) -> &[Timestamp] {
        self.by_type.get(&event_type).map_or(&[], Vec::as_slice)
    }

    /// Most recent timestamp for a type.
    #[must_use]
    pub fn last(&self, event_type: EventType) -> Option<Timestamp> {
        self.timestamps(event_type).first().copied()
    }

    /// Returns true if `timestamp` is recorded for `event_type`.
    #[must_use]
    pub fn contains(&self, event_type: EventType, timestamp: &Timestamp) -> bool {
        self.timestamps(event_type).contains(timestamp)
    }

    /// Iterate every `(type, timestamp)` pair, types in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (EventType, &Timestamp)> + '_ {
        self.by_type
            .iter()
            .flat_map(|(event_type, list)| list.iter().map(move |ts| (*event_type, ts)))
    }

    /// Total number of recorded events across all types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_type.values().map(Vec::len).sum()
    }

    /// Returns true when no events are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

impl FromIterator<(EventType, Timestamp)> for EventHistory {
    fn from_iter<I: IntoIterator<Item = (EventType, Timestamp)>>(iter: I) -> Self {
        let mut history = Self::new();
        for (event_type, timestamp) in iter {
            history.insert(event_type, timestamp);
        }
        history
    }
}

// Always emits all four keys so consumers can index without a presence check.
impl Serialize for EventHistory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(EventType::ALL.len()))?;
        for event_type in EventType::ALL {
            map.serialize_entry(event_type.as_str(), self.timestamps(event_type))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EventHistory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<EventType, Vec<LenientTimestamp>>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .flat_map(|(event_type, list)| list.into_iter().map(move |ts| (event_type, ts.0)))
            .collect())
    }
}
