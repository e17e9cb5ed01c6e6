//! Reconciliation rules for list pages that sit above a single timeline.
//!
//! - [`Overview`]: per-plant "last watered" style columns updated by bulk
//!   actions, newest timestamp wins.
//! - [`GroupRoster`]: a group's member / candidate option lists, kept disjoint.

pub mod overview;
pub mod roster;

pub use overview::{Overview, PlantRow};
pub use roster::GroupRoster;
