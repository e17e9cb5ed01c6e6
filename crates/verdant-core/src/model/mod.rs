//! Plain data types shared by the timeline engine and its hosts.

pub mod event;
pub mod media;
pub mod snapshot;
pub mod timestamp;

pub use event::{EventHistory, EventType, UnknownEventType};
pub use media::{DefaultPhoto, Note, Photo};
pub use snapshot::Snapshot;
pub use timestamp::{Timestamp, parse_timestamp};
