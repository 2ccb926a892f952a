// src/list.rs
use crate::render::WorkoutEntry;
use crate::workout::WorkoutId;

/// Render target for workout entries. New entries go to the top, so the
/// view reads newest first.
pub trait WorkoutListView {
    fn insert_entry(&mut self, entry: WorkoutEntry);
    /// Removes the oldest entry with `id`; returns false if none matched.
    fn remove_entry(&mut self, id: &WorkoutId) -> bool;
    fn clear(&mut self);
}

#[derive(Debug, Default, Clone)]
pub struct EntryList {
    entries: Vec<WorkoutEntry>,
}

impl EntryList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> &[WorkoutEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&WorkoutEntry> {
        self.entries.get(index)
    }

    /// Index of the oldest entry with `id`. Entries are stored newest first,
    /// so this is the last match, the same record the collection finds first.
    #[must_use]
    pub fn position(&self, id: &WorkoutId) -> Option<usize> {
        self.entries.iter().rposition(|e| &e.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl WorkoutListView for EntryList {
    fn insert_entry(&mut self, entry: WorkoutEntry) {
        self.entries.insert(0, entry);
    }

    fn remove_entry(&mut self, id: &WorkoutId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}
