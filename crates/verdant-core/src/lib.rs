//! verdant-core: the plant timeline aggregation engine.
//!
//! A plant's history arrives as three sparse collections (events by type,
//! notes, photos). [`timeline::Timeline`] folds them into date-bucketed views
//! and keeps those views in step with every confirmed mutation, without a
//! full rebuild.
//!
//! # Conventions
//!
//! - **Errors**: [`error::TimelineError`] for engine operations;
//!   `anyhow::Result` at the file and config boundary.
//! - **Logging**: `tracing` macros only. Installing a subscriber is the
//!   host's job.

pub mod config;
pub mod datekey;
pub mod error;
pub mod index;
pub mod lock;
pub mod model;
pub mod reconcile;
pub mod store;
pub mod timeline;

pub use datekey::{DateKeyer, Zone};
pub use error::{ErrorCode, TimelineError};
pub use model::{DefaultPhoto, EventHistory, EventType, Note, Photo, Snapshot, Timestamp};
pub use timeline::{Timeline, TimelineView};
