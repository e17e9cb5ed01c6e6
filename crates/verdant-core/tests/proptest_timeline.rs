use chrono::Datelike;
use proptest::prelude::*;
use verdant_core::Timeline;

use generators::*;

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    #[test]
    fn every_bucket_has_content_and_every_item_has_a_bucket(keyer in arb_keyer(), ops in arb_ops()) {
        let mut timeline = Timeline::new(keyer);
        apply_ops(&mut timeline, &ops);

        for bucket in timeline.day_index().values() {
            prop_assert!(!bucket.is_empty());
        }
        for (event_type, ts) in timeline.events().iter() {
            let bucket = timeline.day(keyer.key(ts));
            prop_assert!(bucket.is_some_and(|b| b.events.contains(&event_type)));
        }
        for note in timeline.notes() {
            prop_assert!(timeline.day(keyer.key(&note.timestamp)).is_some());
        }
        for photo in timeline.photos() {
            prop_assert!(timeline.day(keyer.key(&photo.timestamp)).is_some());
        }
    }

    #[test]
    fn navigation_matches_day_index_months(keyer in arb_keyer(), ops in arb_ops()) {
        let mut timeline = Timeline::new(keyer);
        apply_ops(&mut timeline, &ops);
        let navigation = timeline.navigation_index();

        for date in timeline.day_index().keys() {
            prop_assert!(navigation.contains(date.year(), date.month()));
        }
        for year in navigation.years() {
            let months = navigation.months(year);
            prop_assert!(months.windows(2).all(|w| w[0] > w[1]), "months not descending: {:?}", months);
            for month in months {
                prop_assert!(
                    timeline.day_index().keys().any(|d| d.year() == year && d.month() == *month),
                    "stale navigation entry {}-{:02}", year, month
                );
            }
        }
    }

    #[test]
    fn replace_all_is_idempotent(keyer in arb_keyer(), ops in arb_ops()) {
        let mut source = Timeline::new(keyer);
        apply_ops(&mut source, &ops);
        let snapshot = source.snapshot();

        let mut timeline = Timeline::new(keyer);
        timeline.replace_all(snapshot.clone());
        let first = (
            timeline.day_index().clone(),
            timeline.calendar_summary().clone(),
            timeline.navigation_index().clone(),
        );
        timeline.replace_all(snapshot);
        prop_assert_eq!(&first.0, timeline.day_index());
        prop_assert_eq!(&first.1, timeline.calendar_summary());
        prop_assert_eq!(&first.2, timeline.navigation_index());
    }

    #[test]
    fn incremental_equals_full_rebuild(keyer in arb_keyer(), ops in arb_ops()) {
        let mut incremental = Timeline::new(keyer);
        apply_ops(&mut incremental, &ops);

        let rebuilt = Timeline::from_snapshot(keyer, incremental.snapshot());
        prop_assert_eq!(incremental.day_index(), rebuilt.day_index());
        prop_assert_eq!(incremental.calendar_summary(), rebuilt.calendar_summary());
        prop_assert_eq!(incremental.navigation_index(), rebuilt.navigation_index());
        prop_assert_eq!(incremental.default_photo(), rebuilt.default_photo());
        prop_assert!(incremental.check_consistency().is_empty());
    }

    #[test]
    fn unpinned_default_is_always_newest(keyer in arb_keyer(), ops in arb_ops()) {
        let mut timeline = Timeline::new(keyer);
        apply_ops(&mut timeline, &ops);
        let default = timeline.default_photo();

        if default.set {
            let key = default.key().unwrap();
            prop_assert!(timeline.photos().iter().any(|p| p.key == key));
        } else {
            prop_assert_eq!(default.photo.as_ref(), timeline.photos().first());
        }
    }
}
