//! Overview rows and bulk care events.
//!
//! A bulk action ("water all selected") reports one timestamp for many
//! plants. A plant's "last" column only moves forward: a back-dated bulk
//! event never hides a newer event already shown.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{EventType, Timestamp};

/// One plant as shown on the overview page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantRow {
    pub id: String,
    pub name: String,
    /// Most recent event per type.
    #[serde(default)]
    pub last: BTreeMap<EventType, Timestamp>,
}

impl PlantRow {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            last: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn last_event(&self, event_type: EventType) -> Option<Timestamp> {
        self.last.get(&event_type).copied()
    }

    /// Move the `event_type` column to `timestamp` if it is strictly newer.
    pub fn observe(&mut self, event_type: EventType, timestamp: Timestamp) -> bool {
        match self.last.get(&event_type) {
            Some(current) if *current >= timestamp => false,
            _ => {
                self.last.insert(event_type, timestamp);
                true
            }
        }
    }
}

/// All plant rows on the overview page, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overview {
    rows: BTreeMap<String, PlantRow>,
}

impl Overview {
    pub fn new(rows: impl IntoIterator<Item = PlantRow>) -> Self {
        Self {
            rows: rows.into_iter().map(|row| (row.id.clone(), row)).collect(),
        }
    }

    #[must_use]
    pub fn row(&self, id: &str) -> Option<&PlantRow> {
        self.rows.get(id)
    }

    pub fn rows(&self) -> impl Iterator<Item = &PlantRow> {
        self.rows.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Apply a confirmed bulk event. Returns ids whose column moved.
    /// Unknown ids are skipped.
    pub fn apply_bulk_event<S: AsRef<str>>(
        &mut self,
        ids: &[S],
        event_type: EventType,
        timestamp: Timestamp,
    ) -> Vec<String> {
        let mut updated = Vec::new();
        for id in ids {
            let Some(row) = self.rows.get_mut(id.as_ref()) else {
                continue;
            };
            if row.observe(event_type, timestamp) && !updated.contains(&row.id) {
                updated.push(row.id.clone());
            }
        }
        debug!(%event_type, requested = ids.len(), updated = updated.len(), "bulk event applied");
        updated
    }

    /// Drop rows after a confirmed bulk delete. Returns the removed rows.
    pub fn remove<S: AsRef<str>>(&mut self, ids: &[S]) -> Vec<PlantRow> {
        ids.iter()
            .filter_map(|id| self.rows.remove(id.as_ref()))
            .collect()
    }
}
