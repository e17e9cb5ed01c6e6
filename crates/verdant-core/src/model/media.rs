//! Notes, photos, and the default-photo register.

use serde::{Deserialize, Serialize};

use super::timestamp::{Timestamp, deserialize_lenient};

/// A free-text note. The timestamp is its identity and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(deserialize_with = "deserialize_lenient")]
    pub timestamp: Timestamp,
    pub text: String,
}

impl Note {
    pub fn new(timestamp: Timestamp, text: impl Into<String>) -> Self {
        Self {
            timestamp,
            text: text.into(),
        }
    }
}

/// A photo attached to a plant's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PhotoRecord")]
pub struct Photo {
    /// Opaque stable identifier assigned by the backend.
    pub key: String,
    /// Capture time (or upload time when EXIF data is missing).
    pub timestamp: Timestamp,
    /// Full-resolution image URL.
    pub image: String,
    /// Thumbnail URL. Falls back to the image URL when none is given.
    pub thumbnail: String,
}

/// Wire form of [`Photo`]; the thumbnail is optional.
#[derive(Deserialize)]
struct PhotoRecord {
    key: String,
    #[serde(deserialize_with = "deserialize_lenient")]
    timestamp: Timestamp,
    image: String,
    #[serde(default)]
    thumbnail: Option<String>,
}

impl From<PhotoRecord> for Photo {
    fn from(record: PhotoRecord) -> Self {
        let photo = Self::new(record.key, record.timestamp, record.image);
        match record.thumbnail.filter(|t| !t.is_empty()) {
            Some(thumbnail) => photo.with_thumbnail(thumbnail),
            None => photo,
        }
    }
}

impl Photo {
    pub fn new(key: impl Into<String>, timestamp: Timestamp, image: impl Into<String>) -> Self {
        let image = image.into();
        Self {
            key: key.into(),
            timestamp,
            thumbnail: image.clone(),
            image,
        }
    }

    #[must_use]
    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = thumbnail.into();
        self
    }
}

/// Sort photos newest first. Stable: equal timestamps keep their relative order.
pub fn sort_newest_first(photos: &mut [Photo]) {
    photos.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// The plant's primary thumbnail.
///
/// With `set == false` this tracks the newest photo automatically. With
/// `set == true` it holds a photo the user picked, until that photo is
/// deleted or the choice is cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultPhoto {
    pub set: bool,
    #[serde(flatten)]
    pub photo: Option<Photo>,
}

impl DefaultPhoto {
    /// The automatic default: newest photo, or empty.
    #[must_use]
    pub fn newest(photos: &[Photo]) -> Self {
        Self {
            set: false,
            photo: photos.first().cloned(),
        }
    }

    /// A user-chosen default.
    #[must_use]
    pub const fn chosen(photo: Photo) -> Self {
        Self {
            set: true,
            photo: Some(photo),
        }
    }

    /// Key of the current default photo, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.photo.as_ref().map(|photo| photo.key.as_str())
    }
}
