//! Derived, date-bucketed views over a plant's history.
//!
//! - [`DayIndex`]: calendar date → everything that happened that day.
//! - [`CalendarSummary`]: calendar date → event types, for the month widget.
//!   Days with only notes or photos are absent here.
//! - [`NavigationIndex`]: year → months with any content, newest first.
//!
//! The functions in [`build`] derive all three from raw collections in one
//! pass. [`crate::timeline::Timeline`] maintains the same views incrementally
//! and must always agree with a fresh build.

pub mod build;
pub mod navigation;

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{EventType, Note, Photo};

pub use build::{build_day_index, derive_calendar_summary, derive_navigation_index};
pub use navigation::NavigationIndex;

/// Everything recorded on one calendar date.
///
/// A bucket only lives in a [`DayIndex`] while at least one field is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    /// Distinct event types, in canonical order.
    pub events: BTreeSet<EventType>,
    /// Notes in insertion order.
    pub notes: Vec<Note>,
    /// Photos, newest first.
    pub photos: Vec<Photo>,
}

impl DayBucket {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.notes.is_empty() && self.photos.is_empty()
    }
}

pub type DayIndex = BTreeMap<NaiveDate, DayBucket>;

pub type CalendarSummary = BTreeMap<NaiveDate, BTreeSet<EventType>>;
