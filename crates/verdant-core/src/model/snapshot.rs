//! Raw, host-owned collections for one plant.

use serde::{Deserialize, Serialize};

use super::event::EventHistory;
use super::media::{DefaultPhoto, Note, Photo};

/// Everything the timeline derives its views from.
///
/// This is the payload a page hydrates from, the argument to
/// [`Timeline::replace_all`](crate::timeline::Timeline::replace_all), and the
/// on-disk state file format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, alias = "eventsByType", alias = "events_by_type")]
    pub events: EventHistory,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default, alias = "defaultPhoto")]
    pub default_photo: DefaultPhoto,
}

impl Snapshot {
    /// Returns true when there is no content of any kind.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.notes.is_empty() && self.photos.is_empty()
    }
}
