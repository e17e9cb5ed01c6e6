//! Local-zone keying. Kept in its own test binary: it changes `TZ`, which is
//! process-wide.

use std::env;
use std::thread;
use std::time::Duration;

use verdant_core::model::parse_timestamp;
use verdant_core::{DateKeyer, EventType, Timeline, Zone};

#[test]
fn local_zone_is_pinned_when_the_system_zone_changes() {
    // SAFETY: the only test in this binary; nothing else reads the environment concurrently.
    unsafe { env::set_var("TZ", "UTC0") };
    let keyer = DateKeyer::new(Zone::Local);
    let late = parse_timestamp("2024-03-01T23:30:00Z").expect("timestamp");
    let before = keyer.key(&late);

    let mut timeline = Timeline::new(keyer);
    timeline.add_event(EventType::Water, late);
    assert_eq!(timeline.day_index().keys().copied().collect::<Vec<_>>(), vec![before]);

    // SAFETY: as above.
    unsafe { env::set_var("TZ", "EST-5") };
    // Long enough for chrono to notice the new zone.
    thread::sleep(Duration::from_millis(1200));

    assert_eq!(keyer.key(&late), before);
    assert!(timeline.delete_event(EventType::Water, &late));
    assert!(timeline.day_index().is_empty());
    assert!(timeline.navigation_index().is_empty());
    assert!(timeline.check_consistency().is_empty());
}
