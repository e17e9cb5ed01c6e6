//! The timeline engine: raw collections plus incrementally maintained views.
//!
//! A [`Timeline`] owns a plant's events, notes, and photos together with the
//! three views derived from them ([`DayIndex`], [`CalendarSummary`],
//! [`NavigationIndex`]) and the [`DefaultPhoto`].
//!
//! # Contract with the host
//!
//! The host calls the backend first and invokes exactly one mutator per
//! confirmed success. Nothing here performs I/O or rolls back. When the host
//! suspects drift (back-navigation, another tab) it calls
//! [`Timeline::replace_all`] with a fresh server snapshot.
//!
//! # Invariants
//!
//! After every mutator:
//! 1. A date is a [`DayIndex`] key iff something happened on it.
//! 2. `(year, month)` is in the [`NavigationIndex`] iff some [`DayIndex`] key
//!    falls in that month.
//! 3. The views equal what [`build_day_index`] and friends produce from the
//!    current raw collections.
//!
//! [`Timeline::check_consistency`] verifies all three.

mod events;
mod notes;
mod photos;
mod verify;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{info, trace};

use crate::datekey::DateKeyer;
use crate::index::{
    CalendarSummary, DayBucket, DayIndex, NavigationIndex, build_day_index,
    derive_calendar_summary, derive_navigation_index,
};
use crate::model::media::sort_newest_first;
use crate::model::{DefaultPhoto, EventHistory, EventType, Note, Photo, Snapshot, Timestamp};

pub use photos::recompute_default_photo;
pub use verify::{Inconsistency, audit_snapshot};

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// One plant's timeline state for the life of a page view.
#[derive(Debug, Clone)]
pub struct Timeline {
    keyer: DateKeyer,
    events: EventHistory,
    notes: Vec<Note>,
    photos: Vec<Photo>,
    default_photo: DefaultPhoto,
    day_index: DayIndex,
    calendar: CalendarSummary,
    navigation: NavigationIndex,
}

/// Borrowed view of the derived state, in the shape the renderer consumes.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineView<'a> {
    pub day_index: &'a DayIndex,
    pub calendar_summary: &'a CalendarSummary,
    pub navigation_index: &'a NavigationIndex,
    pub default_photo: &'a DefaultPhoto,
}

impl Timeline {
    /// An empty timeline keyed in `keyer`'s zone.
    #[must_use]
    pub fn new(keyer: DateKeyer) -> Self {
        Self {
            keyer,
            events: EventHistory::new(),
            notes: Vec::new(),
            photos: Vec::new(),
            default_photo: DefaultPhoto::default(),
            day_index: DayIndex::new(),
            calendar: CalendarSummary::new(),
            navigation: NavigationIndex::new(),
        }
    }

    /// Hydrate from an initial-state payload.
    #[must_use]
    pub fn from_snapshot(keyer: DateKeyer, snapshot: Snapshot) -> Self {
        let mut timeline = Self::new(keyer);
        timeline.replace_all(snapshot);
        timeline
    }

    /// Discard every derived view and rebuild from `snapshot`.
    ///
    /// An explicit default photo in the snapshot is kept if its photo is
    /// still present; otherwise the newest photo becomes the default.
    pub fn replace_all(&mut self, snapshot: Snapshot) -> TimelineView<'_> {
        let Snapshot {
            events,
            notes,
            mut photos,
            default_photo,
        } = snapshot;
        sort_newest_first(&mut photos);

        self.day_index = build_day_index(&self.keyer, &events, &notes, &photos);
        self.calendar = derive_calendar_summary(&self.day_index);
        self.navigation = derive_navigation_index(&self.day_index);
        self.default_photo = recompute_default_photo(&photos, &default_photo);
        self.events = events;
        self.notes = notes;
        self.photos = photos;

        info!(
            events = self.events.len(),
            notes = self.notes.len(),
            photos = self.photos.len(),
            days = self.day_index.len(),
            "timeline rebuilt from snapshot"
        );

        self.view()
    }

    /// Clone the raw collections back out.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            events: self.events.clone(),
            notes: self.notes.clone(),
            photos: self.photos.clone(),
            default_photo: self.default_photo.clone(),
        }
    }

    #[must_use]
    pub const fn view(&self) -> TimelineView<'_> {
        TimelineView {
            day_index: &self.day_index,
            calendar_summary: &self.calendar,
            navigation_index: &self.navigation,
            default_photo: &self.default_photo,
        }
    }

    // -- accessors ----------------------------------------------------------

    #[must_use]
    pub const fn keyer(&self) -> &DateKeyer {
        &self.keyer
    }

    #[must_use]
    pub const fn events(&self) -> &EventHistory {
        &self.events
    }

    /// Most recent event of `event_type` ("last watered").
    #[must_use]
    pub fn last_event(&self, event_type: EventType) -> Option<Timestamp> {
        self.events.last(event_type)
    }

    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Photos, newest first.
    #[must_use]
    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    #[must_use]
    pub const fn default_photo(&self) -> &DefaultPhoto {
        &self.default_photo
    }

    #[must_use]
    pub const fn day_index(&self) -> &DayIndex {
        &self.day_index
    }

    #[must_use]
    pub fn day(&self, date: NaiveDate) -> Option<&DayBucket> {
        self.day_index.get(&date)
    }

    #[must_use]
    pub const fn calendar_summary(&self) -> &CalendarSummary {
        &self.calendar
    }

    #[must_use]
    pub const fn navigation_index(&self) -> &NavigationIndex {
        &self.navigation
    }

    // -- bucket bookkeeping shared by the mutators --------------------------

    /// Get or create the bucket for `date`, registering a new month if needed.
    fn bucket_mut(&mut self, date: NaiveDate) -> &mut DayBucket {
        if !self.day_index.contains_key(&date) && self.navigation.add(date.year(), date.month()) {
            trace!(year = date.year(), month = date.month(), "navigation month added");
        }
        self.day_index.entry(date).or_insert_with(|| {
            trace!(%date, "day bucket created");
            DayBucket::default()
        })
    }

    /// Drop the bucket for `date` if it is empty, and its month if that was
    /// the month's last bucket.
    fn prune_bucket(&mut self, date: NaiveDate) {
        if !self.day_index.get(&date).is_some_and(DayBucket::is_empty) {
            return;
        }
        self.day_index.remove(&date);
        trace!(%date, "day bucket removed");

        if !self.month_has_content(date.year(), date.month())
            && self.navigation.remove(date.year(), date.month())
        {
            trace!(year = date.year(), month = date.month(), "navigation month removed");
        }
    }

    fn month_has_content(&self, year: i32, month: u32) -> bool {
        let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return false;
        };
        self.day_index
            .range(first..)
            .next()
            .is_some_and(|(date, _)| date.year() == year && date.month() == month)
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(DateKeyer::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_timestamp;

    fn ts(raw: &str) -> Timestamp {
        parse_timestamp(raw).expect("timestamp")
    }

    fn snapshot() -> Snapshot {
        let mut snapshot = Snapshot::default();
        snapshot.events.insert(EventType::Water, ts("2024-03-01T20:00:00Z"));
        snapshot.events.insert(EventType::Repot, ts("2023-06-01T12:00:00Z"));
        snapshot.notes.push(Note::new(ts("2024-02-14T09:00:00Z"), "moved to window"));
        snapshot.photos = vec![
            Photo::new("p1", ts("2023-06-01T12:30:00Z"), "/p1.jpg"),
            Photo::new("p2", ts("2024-03-01T18:00:00Z"), "/p2.jpg"),
        ];
        snapshot
    }

    #[test]
    fn replace_all_sorts_photos_and_picks_newest_default() {
        let timeline = Timeline::from_snapshot(DateKeyer::utc(), snapshot());
        let keys: Vec<_> = timeline.photos().iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, ["p2", "p1"]);
        assert_eq!(timeline.default_photo().key(), Some("p2"));
        assert!(!timeline.default_photo().set);
    }

    #[test]
    fn replace_all_honors_explicit_default() {
        let mut snap = snapshot();
        snap.default_photo = DefaultPhoto::chosen(snap.photos[0].clone());
        let timeline = Timeline::from_snapshot(DateKeyer::utc(), snap);
        assert_eq!(timeline.default_photo().key(), Some("p1"));
        assert!(timeline.default_photo().set);
    }

    #[test]
    fn replace_all_twice_is_idempotent() {
        let mut timeline = Timeline::new(DateKeyer::utc());
        timeline.replace_all(snapshot());
        let first = (
            timeline.day_index().clone(),
            timeline.calendar_summary().clone(),
            timeline.navigation_index().clone(),
        );
        timeline.replace_all(snapshot());
        assert_eq!(first.0, *timeline.day_index());
        assert_eq!(first.1, *timeline.calendar_summary());
        assert_eq!(first.2, *timeline.navigation_index());
    }

    #[test]
    fn replace_all_discards_previous_state() {
        let mut timeline = Timeline::from_snapshot(DateKeyer::utc(), snapshot());
        timeline.replace_all(Snapshot::default());
        assert!(timeline.day_index().is_empty());
        assert!(timeline.calendar_summary().is_empty());
        assert!(timeline.navigation_index().is_empty());
        assert_eq!(timeline.default_photo(), &DefaultPhoto::default());
    }

    #[test]
    fn snapshot_round_trips_through_timeline() {
        let timeline = Timeline::from_snapshot(DateKeyer::utc(), snapshot());
        let again = Timeline::from_snapshot(DateKeyer::utc(), timeline.snapshot());
        assert_eq!(again.day_index(), timeline.day_index());
        assert_eq!(again.default_photo(), timeline.default_photo());
    }

    #[test]
    fn view_serializes_wire_shape() {
        let timeline = Timeline::from_snapshot(DateKeyer::utc(), snapshot());
        let json = serde_json::to_value(timeline.view()).expect("serialize");
        assert_eq!(json["dayIndex"]["2024-03-01"]["events"], serde_json::json!(["water"]));
        assert_eq!(json["calendarSummary"]["2023-06-01"], serde_json::json!(["repot"]));
        assert_eq!(json["navigationIndex"]["2024"], serde_json::json!(["03", "02"]));
        assert_eq!(json["defaultPhoto"]["key"], "p2");
    }

    #[test]
    fn month_has_content_checks_only_that_month() {
        let timeline = Timeline::from_snapshot(DateKeyer::utc(), snapshot());
        assert!(timeline.month_has_content(2024, 3));
        assert!(timeline.month_has_content(2024, 2));
        assert!(!timeline.month_has_content(2024, 1));
        assert!(!timeline.month_has_content(2023, 7));
    }
}
