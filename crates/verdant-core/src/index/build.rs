//! One-shot construction of the derived views.

use chrono::Datelike;

use super::{CalendarSummary, DayIndex, NavigationIndex};
use crate::datekey::DateKeyer;
use crate::model::media::sort_newest_first;
use crate::model::{EventHistory, Note, Photo};

/// Bucket every event, note, and photo by its local calendar date.
///
/// Buckets are only created on first reference, so no empty bucket can appear.
/// Photo lists inside each bucket are newest first regardless of input order.
#[must_use]
pub fn build_day_index(
    keyer: &DateKeyer,
    events: &EventHistory,
    notes: &[Note],
    photos: &[Photo],
) -> DayIndex {
    let mut index = DayIndex::new();

    for (event_type, timestamp) in events.iter() {
        index
            .entry(keyer.key(timestamp))
            .or_default()
            .events
            .insert(event_type);
    }

    for note in notes {
        index
            .entry(keyer.key(&note.timestamp))
            .or_default()
            .notes
            .push(note.clone());
    }

    for photo in photos {
        index
            .entry(keyer.key(&photo.timestamp))
            .or_default()
            .photos
            .push(photo.clone());
    }

    for bucket in index.values_mut() {
        sort_newest_first(&mut bucket.photos);
    }

    index
}

/// Project each date's event types. Dates without events are omitted.
#[must_use]
pub fn derive_calendar_summary(day_index: &DayIndex) -> CalendarSummary {
    day_index
        .iter()
        .filter(|(_, bucket)| !bucket.events.is_empty())
        .map(|(date, bucket)| (*date, bucket.events.clone()))
        .collect()
}

/// Collect the (year, month) of every bucket.
#[must_use]
pub fn derive_navigation_index(day_index: &DayIndex) -> NavigationIndex {
    let mut navigation = NavigationIndex::new();
    for date in day_index.keys() {
        navigation.add(date.year(), date.month());
    }
    navigation
}
