//! Year → month index backing the "jump to date" menu.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Months with content, grouped by year.
///
/// Months are stored newest first so the menu renders them without sorting.
/// A year is dropped as soon as its last month is removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationIndex {
    years: BTreeMap<i32, Vec<u32>>,
}

impl NavigationIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `year`/`month` has content. Returns `true` if it was new.
    pub fn add(&mut self, year: i32, month: u32) -> bool {
        let months = self.years.entry(year).or_default();
        match months.binary_search_by_key(&Reverse(month), |m| Reverse(*m)) {
            Ok(_) => false,
            Err(pos) => {
                months.insert(pos, month);
                true
            }
        }
    }

    /// Forget `year`/`month`. Returns `true` if it was present.
    pub fn remove(&mut self, year: i32, month: u32) -> bool {
        let Some(months) = self.years.get_mut(&year) else {
            return false;
        };
        let Ok(pos) = months.binary_search_by_key(&Reverse(month), |m| Reverse(*m)) else {
            return false;
        };
        months.remove(pos);
        if months.is_empty() {
            self.years.remove(&year);
        }
        true
    }

    #[must_use]
    pub fn contains(&self, year: i32, month: u32) -> bool {
        self.months(year).contains(&month)
    }

    /// Months for `year`, newest first.
    #[must_use]
    pub fn months(&self, year: i32) -> &[u32] {
        self.years.get(&year).map_or(&[], Vec::as_slice)
    }

    /// Years with content, newest first.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().rev().copied()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Number of (year, month) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.years.values().map(Vec::len).sum()
    }
}

// Wire shape: {"2024": ["03", "01"], "2023": ["11"]}
impl Serialize for NavigationIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.years.len()))?;
        for (year, months) in self.years.iter().rev() {
            let months: Vec<String> = months.iter().map(|m| format!("{m:02}")).collect();
            map.serialize_entry(&format!("{year:04}"), &months)?;
        }
        map.end()
    }
}
