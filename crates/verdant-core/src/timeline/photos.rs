//! Photo mutators and the default-photo policy.

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use tracing::debug;

use super::Timeline;
use crate::error::TimelineError;
use crate::model::media::sort_newest_first;
use crate::model::{DefaultPhoto, Photo};

/// Decide the default photo after `photos` changed.
///
/// - An explicit choice survives as long as its photo does, and is matched
///   by key: the copy is taken from `photos`, not from `current`.
/// - Otherwise (never chosen, or the chosen photo is gone) the newest photo
///   is the default with `set == false`, or empty if there are no photos.
///
/// `photos` must already be sorted newest first.
#[must_use]
pub fn recompute_default_photo(photos: &[Photo], current: &DefaultPhoto) -> DefaultPhoto {
    let pinned = current
        .key()
        .filter(|_| current.set)
        .and_then(|key| photos.iter().find(|photo| photo.key == key));
    match pinned {
        Some(photo) => DefaultPhoto::chosen(photo.clone()),
        None => DefaultPhoto::newest(photos),
    }
}

impl Timeline {
    /// Add confirmed uploads.
    pub fn add_photos(&mut self, photos: impl IntoIterator<Item = Photo>) {
        let mut touched = BTreeSet::new();
        for photo in photos {
            let date = self.keyer.key(&photo.timestamp);
            self.bucket_mut(date).photos.push(photo.clone());
            self.photos.push(photo);
            touched.insert(date);
        }

        for date in &touched {
            if let Some(bucket) = self.day_index.get_mut(date) {
                sort_newest_first(&mut bucket.photos);
            }
        }
        // Consumers read photos[0] as the newest photo.
        sort_newest_first(&mut self.photos);
        self.refresh_default_photo();

        debug!(days = touched.len(), total = self.photos.len(), "photos added");
    }

    /// Remove photos by key and return the removed photos. Unknown keys are
    /// ignored.
    pub fn delete_photos<I, S>(&mut self, keys: I) -> Vec<Photo>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: HashSet<String> = keys.into_iter().map(|k| k.as_ref().to_string()).collect();
        let (removed, kept): (Vec<Photo>, Vec<Photo>) = std::mem::take(&mut self.photos)
            .into_iter()
            .partition(|photo| keys.contains(&photo.key));
        self.photos = kept;

        let mut touched: BTreeSet<NaiveDate> = BTreeSet::new();
        for photo in &removed {
            let date = self.keyer.key(&photo.timestamp);
            if let Some(bucket) = self.day_index.get_mut(&date) {
                bucket.photos.retain(|p| p.key != photo.key);
            }
            touched.insert(date);
        }
        for date in touched {
            self.prune_bucket(date);
        }
        self.refresh_default_photo();

        debug!(requested = keys.len(), removed = removed.len(), "photos deleted");
        removed
    }

    /// Pin `key` as the default photo.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::PhotoNotFound`] if no photo has this key.
    pub fn set_default_photo(&mut self, key: &str) -> Result<(), TimelineError> {
        let photo = self
            .photos
            .iter()
            .find(|photo| photo.key == key)
            .cloned()
            .ok_or_else(|| TimelineError::PhotoNotFound {
                key: key.to_string(),
            })?;
        self.default_photo = DefaultPhoto::chosen(photo);
        debug!(key, "default photo pinned");
        Ok(())
    }

    /// Drop an explicit choice; the newest photo becomes the default again.
    pub fn clear_default_photo(&mut self) {
        self.default_photo = DefaultPhoto::newest(&self.photos);
        debug!(key = ?self.default_photo.key(), "default photo unpinned");
    }

    fn refresh_default_photo(&mut self) {
        let next = recompute_default_photo(&self.photos, &self.default_photo);
        if next != self.default_photo {
            debug!(from = ?self.default_photo.key(), to = ?next.key(), "default photo changed");
            self.default_photo = next;
        }
    }
}
