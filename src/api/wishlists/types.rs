use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    pub saved: bool,
}

/// Local view of which listings are saved, kept in step with toggle results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedSet {
    ids: HashSet<u64>,
}

impl SavedSet {
    pub fn new(ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn contains(&self, listing_id: u64) -> bool {
        self.ids.contains(&listing_id)
    }

    /// The backend's answer is authoritative, whatever the local guess was.
    pub fn apply(&mut self, listing_id: u64, outcome: ToggleOutcome) {
        if outcome.saved {
            self.ids.insert(listing_id);
        } else {
            self.ids.remove(&listing_id);
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn sorted(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}
