//! Self-check of the timeline invariants against a fresh rebuild.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::warn;

use super::{Timeline, recompute_default_photo};
use crate::datekey::DateKeyer;
use crate::index::{build_day_index, derive_calendar_summary, derive_navigation_index};
use crate::model::{Snapshot, Timestamp};

/// A violated timeline invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Inconsistency {
    #[error("day {0} is indexed but has no content")]
    EmptyBucket(NaiveDate),

    #[error("day index differs from a full rebuild ({incremental} vs {rebuilt} days)")]
    DayIndexDrift { incremental: usize, rebuilt: usize },

    #[error("calendar summary differs from the day index")]
    CalendarDrift,

    #[error("navigation index differs from the day index")]
    NavigationDrift,

    #[error("photos are not sorted newest first")]
    PhotosUnsorted,

    #[error("default photo does not follow the selection policy")]
    DefaultPhotoStale,

    #[error("two notes share the timestamp {0}")]
    DuplicateNote(Timestamp),

    #[error("two photos share the key '{0}'")]
    DuplicatePhotoKey(String),

    #[error("replaying the stored items one at a time disagrees with a full rebuild")]
    ReplayDrift,
}

impl Timeline {
    /// Compare the maintained views against a rebuild from the raw
    /// collections. An empty result means every invariant holds.
    #[must_use]
    pub fn check_consistency(&self) -> Vec<Inconsistency> {
        let mut problems: Vec<Inconsistency> = self
            .day_index
            .iter()
            .filter(|(_, bucket)| bucket.is_empty())
            .map(|(date, _)| Inconsistency::EmptyBucket(*date))
            .collect();

        let rebuilt = build_day_index(&self.keyer, &self.events, &self.notes, &self.photos);
        if rebuilt != self.day_index {
            problems.push(Inconsistency::DayIndexDrift {
                incremental: self.day_index.len(),
                rebuilt: rebuilt.len(),
            });
        }
        if derive_calendar_summary(&self.day_index) != self.calendar {
            problems.push(Inconsistency::CalendarDrift);
        }
        if derive_navigation_index(&self.day_index) != self.navigation {
            problems.push(Inconsistency::NavigationDrift);
        }
        if !self
            .photos
            .windows(2)
            .all(|pair| pair[0].timestamp >= pair[1].timestamp)
        {
            problems.push(Inconsistency::PhotosUnsorted);
        }
        if recompute_default_photo(&self.photos, &self.default_photo) != self.default_photo {
            problems.push(Inconsistency::DefaultPhotoStale);
        }

        for problem in &problems {
            warn!(%problem, "timeline inconsistency");
        }
        problems
    }
}

/// Audit a stored snapshot before trusting it.
///
/// Besides the invariants of the rebuilt timeline this checks what a rebuild
/// would silently repair (unsorted photos, a stale default, duplicate keys)
/// and replays every item through the incremental mutators, which must land
/// on the same views as the rebuild.
#[must_use]
pub fn audit_snapshot(keyer: DateKeyer, snapshot: &Snapshot) -> Vec<Inconsistency> {
    let mut problems = Vec::new();

    let mut seen = HashSet::new();
    for note in &snapshot.notes {
        if !seen.insert(note.timestamp) {
            problems.push(Inconsistency::DuplicateNote(note.timestamp));
        }
    }
    let mut seen = HashSet::new();
    for photo in &snapshot.photos {
        if !seen.insert(photo.key.as_str()) {
            problems.push(Inconsistency::DuplicatePhotoKey(photo.key.clone()));
        }
    }
    if !snapshot
        .photos
        .windows(2)
        .all(|pair| pair[0].timestamp >= pair[1].timestamp)
    {
        problems.push(Inconsistency::PhotosUnsorted);
    }

    let rebuilt = Timeline::from_snapshot(keyer, snapshot.clone());
    if rebuilt.default_photo() != &snapshot.default_photo {
        problems.push(Inconsistency::DefaultPhotoStale);
    }
    problems.extend(rebuilt.check_consistency());

    let replayed = replay(keyer, snapshot);
    if replayed.day_index() != rebuilt.day_index()
        || replayed.calendar_summary() != rebuilt.calendar_summary()
        || replayed.navigation_index() != rebuilt.navigation_index()
        || replayed.default_photo() != rebuilt.default_photo()
    {
        problems.push(Inconsistency::ReplayDrift);
    }

    for problem in &problems {
        warn!(%problem, "stored snapshot inconsistency");
    }
    problems
}

fn replay(keyer: DateKeyer, snapshot: &Snapshot) -> Timeline {
    let mut timeline = Timeline::new(keyer);
    for (event_type, timestamp) in snapshot.events.iter() {
        timeline.add_event(event_type, *timestamp);
    }
    for note in &snapshot.notes {
        // Duplicates are reported by the caller.
        let _ = timeline.add_note(note.clone());
    }
    timeline.add_photos(snapshot.photos.iter().cloned());
    if snapshot.default_photo.set {
        if let Some(key) = snapshot.default_photo.key() {
            let _ = timeline.set_default_photo(key);
        }
    }
    timeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::DayBucket;
    use crate::model::{DefaultPhoto, EventType, Note, Photo, parse_timestamp};

    #[test]
    fn fresh_timeline_is_consistent() {
        let mut timeline = Timeline::new(DateKeyer::utc());
        let ts = |raw: &str| parse_timestamp(raw).expect("timestamp");
        timeline.add_event(EventType::Water, ts("2024-03-01T20:00:00Z"));
        timeline.add_note(Note::new(ts("2024-03-02T20:00:00Z"), "hi")).expect("note");
        timeline.add_photos([Photo::new("p", ts("2024-04-02T20:00:00Z"), "/p.jpg")]);
        assert!(timeline.check_consistency().is_empty());
    }

    #[test]
    fn audit_accepts_a_saved_timeline() {
        let mut timeline = Timeline::new(DateKeyer::utc());
        let ts = |raw: &str| parse_timestamp(raw).expect("timestamp");
        timeline.add_event(EventType::Prune, ts("2024-03-01T20:00:00Z"));
        timeline.add_note(Note::new(ts("2024-03-01T21:00:00Z"), "trimmed")).expect("note");
        timeline.add_photos([
            Photo::new("a", ts("2024-02-02T20:00:00Z"), "/a.jpg"),
            Photo::new("b", ts("2024-04-02T20:00:00Z"), "/b.jpg"),
        ]);
        timeline.set_default_photo("a").expect("pin");

        assert!(audit_snapshot(DateKeyer::utc(), &timeline.snapshot()).is_empty());
    }

    #[test]
    fn audit_flags_what_a_rebuild_would_repair() {
        let ts = |raw: &str| parse_timestamp(raw).expect("timestamp");
        let mut snapshot = Snapshot::default();
        snapshot.notes.push(Note::new(ts("2024-03-01T21:00:00Z"), "one"));
        snapshot.notes.push(Note::new(ts("2024-03-01T21:00:00Z"), "two"));
        snapshot.photos.push(Photo::new("a", ts("2024-01-01T00:00:00Z"), "/a.jpg"));
        snapshot.photos.push(Photo::new("b", ts("2024-02-01T00:00:00Z"), "/b.jpg"));

        let problems = audit_snapshot(DateKeyer::utc(), &snapshot);
        assert!(problems.contains(&Inconsistency::DuplicateNote(ts("2024-03-01T21:00:00Z"))));
        assert!(problems.contains(&Inconsistency::PhotosUnsorted));
        assert!(problems.contains(&Inconsistency::DefaultPhotoStale));
    }

    #[test]
    fn stale_pinned_copy_is_a_stale_default_not_replay_drift() {
        let ts = |raw: &str| parse_timestamp(raw).expect("timestamp");
        let fresh = Photo::new("a", ts("2024-01-01T00:00:00Z"), "/a.jpg").with_thumbnail("/a_t2.jpg");
        let mut snapshot = Snapshot::default();
        snapshot.photos.push(Photo::new("b", ts("2024-02-01T00:00:00Z"), "/b.jpg"));
        snapshot.photos.push(fresh.clone());
        snapshot.default_photo =
            DefaultPhoto::chosen(fresh.clone().with_thumbnail("/a_t1.jpg"));

        assert_eq!(
            audit_snapshot(DateKeyer::utc(), &snapshot),
            vec![Inconsistency::DefaultPhotoStale]
        );
        let rebuilt = Timeline::from_snapshot(DateKeyer::utc(), snapshot);
        assert_eq!(rebuilt.default_photo(), &DefaultPhoto::chosen(fresh));
    }

    #[test]
    fn detects_husk_day_and_navigation_drift() {
        let mut timeline = Timeline::new(DateKeyer::utc());
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        timeline.day_index.insert(date, DayBucket::default());

        let problems = timeline.check_consistency();
        assert!(problems.contains(&Inconsistency::EmptyBucket(date)));
        assert!(problems.contains(&Inconsistency::NavigationDrift));
        assert!(problems.iter().any(|p| matches!(p, Inconsistency::DayIndexDrift { .. })));
    }
}
