//! Note mutators. A note's timestamp is its key and never changes.

use tracing::debug;

use super::Timeline;
use crate::error::TimelineError;
use crate::model::{Note, Timestamp};

impl Timeline {
    /// Add a confirmed note.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::DuplicateTimestamp`] if a note already exists
    /// at exactly this timestamp. Nothing is changed in that case.
    pub fn add_note(&mut self, note: Note) -> Result<(), TimelineError> {
        if self.notes.iter().any(|n| n.timestamp == note.timestamp) {
            return Err(TimelineError::DuplicateTimestamp {
                timestamp: note.timestamp,
            });
        }

        let date = self.keyer.key(&note.timestamp);
        self.bucket_mut(date).notes.push(note.clone());
        self.notes.push(note);

        debug!(%date, "note added");
        Ok(())
    }

    /// Replace the text of the note at `timestamp`.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::NotFound`] if no note has this timestamp,
    /// which means local state has drifted from the server.
    pub fn edit_note(
        &mut self,
        timestamp: &Timestamp,
        text: impl Into<String>,
    ) -> Result<(), TimelineError> {
        let Some(note) = self.notes.iter_mut().find(|n| n.timestamp == *timestamp) else {
            return Err(TimelineError::NotFound {
                timestamp: *timestamp,
            });
        };
        note.text = text.into();
        let text = note.text.clone();

        let date = self.keyer.key(timestamp);
        if let Some(in_bucket) = self
            .day_index
            .get_mut(&date)
            .and_then(|bucket| bucket.notes.iter_mut().find(|n| n.timestamp == *timestamp))
        {
            in_bucket.text = text;
        }

        debug!(%date, "note edited");
        Ok(())
    }

    /// Remove the note at `timestamp`, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::NotFound`] if no note has this timestamp.
    pub fn delete_note(&mut self, timestamp: &Timestamp) -> Result<Note, TimelineError> {
        let Some(pos) = self.notes.iter().position(|n| n.timestamp == *timestamp) else {
            return Err(TimelineError::NotFound {
                timestamp: *timestamp,
            });
        };
        let removed = self.notes.remove(pos);

        let date = self.keyer.key(timestamp);
        if let Some(bucket) = self.day_index.get_mut(&date) {
            bucket.notes.retain(|n| n.timestamp != *timestamp);
        }
        self.prune_bucket(date);

        debug!(%date, "note deleted");
        Ok(removed)
    }
}
