//! Group membership option lists.
//!
//! The "remove plants" modal lists members; the "add plants" modal lists
//! candidates. Every plant is in exactly one of the two, so moving a plant
//! is a transfer, never a copy.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

/// Members and candidates of one group, each `id → display name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupRoster {
    members: BTreeMap<String, String>,
    candidates: BTreeMap<String, String>,
}

impl GroupRoster {
    /// Build from server lists. An id listed as both is treated as a member.
    pub fn new(
        members: impl IntoIterator<Item = (String, String)>,
        candidates: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let members: BTreeMap<String, String> = members.into_iter().collect();
        let candidates = candidates
            .into_iter()
            .filter(|(id, _)| !members.contains_key(id))
            .collect();
        Self {
            members,
            candidates,
        }
    }

    #[must_use]
    pub const fn members(&self) -> &BTreeMap<String, String> {
        &self.members
    }

    #[must_use]
    pub const fn candidates(&self) -> &BTreeMap<String, String> {
        &self.candidates
    }

    #[must_use]
    pub fn is_member(&self, id: &str) -> bool {
        self.members.contains_key(id)
    }

    /// Move confirmed additions from candidates to members. Returns the ids
    /// that moved; ids already members or unknown are ignored.
    pub fn add_members<S: AsRef<str>>(&mut self, ids: &[S]) -> Vec<String> {
        let moved = transfer(&mut self.candidates, &mut self.members, ids);
        debug!(moved = moved.len(), members = self.members.len(), "plants added to group");
        moved
    }

    /// Move confirmed removals from members back to candidates.
    pub fn remove_members<S: AsRef<str>>(&mut self, ids: &[S]) -> Vec<String> {
        let moved = transfer(&mut self.members, &mut self.candidates, ids);
        debug!(moved = moved.len(), members = self.members.len(), "plants removed from group");
        moved
    }
}

fn transfer<S: AsRef<str>>(
    from: &mut BTreeMap<String, String>,
    to: &mut BTreeMap<String, String>,
    ids: &[S],
) -> Vec<String> {
    // A selection submitted twice (modal reopened) must only move once.
    let unique: BTreeSet<&str> = ids.iter().map(|id| id.as_ref()).collect();
    unique
        .into_iter()
        .filter_map(|id| from.remove_entry(id))
        .map(|(id, name)| {
            to.insert(id.clone(), name);
            id
        })
        .collect()
}
