//! Care-event mutators.

use tracing::debug;

use super::Timeline;
use crate::model::{EventType, Timestamp};

impl Timeline {
    /// Record a confirmed care event.
    ///
    /// Several events of one type on the same day collapse into a single
    /// marker in the day bucket, but every timestamp is kept in the history.
    pub fn add_event(&mut self, event_type: EventType, timestamp: Timestamp) {
        self.events.insert(event_type, timestamp);

        let date = self.keyer.key(&timestamp);
        let newly_marked = self.bucket_mut(date).events.insert(event_type);
        if newly_marked {
            self.calendar.entry(date).or_default().insert(event_type);
        }

        debug!(%event_type, %date, newly_marked, "event added");
    }

    /// Remove a confirmed-deleted care event. Returns `false` (and changes
    /// nothing) if the event was not recorded.
    ///
    /// Whether the day keeps its marker is decided by re-keying the remaining
    /// timestamps of that type, never by counting.
    pub fn delete_event(&mut self, event_type: EventType, timestamp: &Timestamp) -> bool {
        if !self.events.remove(event_type, timestamp) {
            debug!(%event_type, %timestamp, "event delete ignored: not recorded");
            return false;
        }

        let date = self.keyer.key(timestamp);
        let still_marked = self
            .events
            .timestamps(event_type)
            .iter()
            .any(|remaining| self.keyer.key(remaining) == date);

        if !still_marked {
            if let Some(bucket) = self.day_index.get_mut(&date) {
                bucket.events.remove(&event_type);
            }
            if let Some(types) = self.calendar.get_mut(&date) {
                types.remove(&event_type);
                if types.is_empty() {
                    self.calendar.remove(&date);
                }
            }
            self.prune_bucket(date);
        }

        debug!(%event_type, %date, still_marked, "event deleted");
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::datekey::DateKeyer;
    use crate::model::{EventType, Note, Timestamp, parse_timestamp};
    use crate::timeline::Timeline;
    use chrono::NaiveDate;

    fn ts(raw: &str) -> Timestamp {
        parse_timestamp(raw).expect("timestamp")
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_event_creates_bucket_and_month() {
        let mut timeline = Timeline::new(DateKeyer::utc());
        timeline.add_event(EventType::Water, ts("2024-03-01T20:00:00Z"));

        assert!(timeline.day(day(2024, 3, 1)).is_some());
        assert_eq!(timeline.navigation_index().months(2024), &[3]);
        assert_eq!(
            timeline.calendar_summary()[&day(2024, 3, 1)].iter().copied().collect::<Vec<_>>(),
            [EventType::Water]
        );
        assert_eq!(timeline.last_event(EventType::Water), Some(ts("2024-03-01T20:00:00Z")));
    }

    #[test]
    fn same_day_same_type_collapses_but_history_grows() {
        let mut timeline = Timeline::new(DateKeyer::utc());
        timeline.add_event(EventType::Water, ts("2024-03-01T08:00:00Z"));
        timeline.add_event(EventType::Water, ts("2024-03-01T20:00:00Z"));

        assert_eq!(timeline.day(day(2024, 3, 1)).unwrap().events.len(), 1);
        assert_eq!(timeline.events().timestamps(EventType::Water).len(), 2);
        assert_eq!(timeline.last_event(EventType::Water), Some(ts("2024-03-01T20:00:00Z")));
    }

    #[test]
    fn deleting_one_of_two_same_day_events_keeps_marker() {
        let mut timeline = Timeline::new(DateKeyer::utc());
        timeline.add_event(EventType::Prune, ts("2024-03-01T08:00:00Z"));
        timeline.add_event(EventType::Prune, ts("2024-03-01T20:00:00Z"));

        assert!(timeline.delete_event(EventType::Prune, &ts("2024-03-01T08:00:00Z")));
        let bucket = timeline.day(day(2024, 3, 1)).expect("bucket survives");
        assert!(bucket.events.contains(&EventType::Prune));
        assert!(timeline.calendar_summary().contains_key(&day(2024, 3, 1)));
    }

    #[test]
    fn deleting_absent_event_is_noop() {
        let mut timeline = Timeline::new(DateKeyer::utc());
        timeline.add_event(EventType::Water, ts("2024-03-01T08:00:00Z"));
        let before = timeline.day_index().clone();

        assert!(!timeline.delete_event(EventType::Water, &ts("2024-03-02T08:00:00Z")));
        assert!(!timeline.delete_event(EventType::Repot, &ts("2024-03-01T08:00:00Z")));
        assert_eq!(timeline.day_index(), &before);
    }

    #[test]
    fn deleting_event_on_photo_day_keeps_bucket_drops_calendar() {
        let mut timeline = Timeline::new(DateKeyer::utc());
        timeline.add_event(EventType::Fertilize, ts("2024-05-05T10:00:00Z"));
        timeline
            .add_note(Note::new(ts("2024-05-05T11:00:00Z"), "looks hungry"))
            .expect("add note");

        timeline.delete_event(EventType::Fertilize, &ts("2024-05-05T10:00:00Z"));

        let bucket = timeline.day(day(2024, 5, 5)).expect("note keeps bucket");
        assert!(bucket.events.is_empty());
        assert!(!timeline.calendar_summary().contains_key(&day(2024, 5, 5)));
        assert_eq!(timeline.navigation_index().months(2024), &[5]);
    }

    #[test]
    fn month_survives_while_another_day_remains() {
        let mut timeline = Timeline::new(DateKeyer::utc());
        timeline.add_event(EventType::Water, ts("2024-03-01T08:00:00Z"));
        timeline.add_event(EventType::Water, ts("2024-03-20T08:00:00Z"));

        timeline.delete_event(EventType::Water, &ts("2024-03-01T08:00:00Z"));
        assert_eq!(timeline.navigation_index().months(2024), &[3]);

        timeline.delete_event(EventType::Water, &ts("2024-03-20T08:00:00Z"));
        assert!(timeline.navigation_index().is_empty());
        assert!(timeline.day_index().is_empty());
    }
}
