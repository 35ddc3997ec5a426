//! Ordered diary cache keyed by entry id.

use std::collections::HashMap;

use crate::models::{DiaryEntry, DiaryId};

/// Entries in display order with at most one entry per id.
///
/// Appending a page that contains already-cached ids refreshes those entries
/// in place, so repeated or out-of-order page fetches never duplicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryCache {
    entries: Vec<DiaryEntry>,
    positions: HashMap<DiaryId, usize>,
}

impl EntryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[DiaryEntry] {
        &self.entries
    }

    pub fn get(&self, id: DiaryId) -> Option<&DiaryEntry> {
        self.positions.get(&id).map(|&index| &self.entries[index])
    }

    pub fn contains(&self, id: DiaryId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Drop everything and take `entries` as the new content.
    pub fn replace_all(&mut self, entries: Vec<DiaryEntry>) {
        self.entries.clear();
        self.positions.clear();
        self.append(entries);
    }

    /// Append entries in order, refreshing ones already cached.
    pub fn append(&mut self, entries: Vec<DiaryEntry>) {
        for entry in entries {
            if let Some(&index) = self.positions.get(&entry.id) {
                self.entries[index] = entry;
            } else {
                self.positions.insert(entry.id, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Put `entry` first. An existing entry with the same id is moved.
    pub fn prepend(&mut self, entry: DiaryEntry) {
        if self.contains(entry.id) {
            self.remove(entry.id);
        }
        self.entries.insert(0, entry);
        self.reindex();
    }

    /// Replace the entry with the same id. Returns false when it is not cached.
    pub fn replace(&mut self, entry: DiaryEntry) -> bool {
        match self.positions.get(&entry.id) {
            Some(&index) => {
                self.entries[index] = entry;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: DiaryId) -> Option<DiaryEntry> {
        let index = self.positions.remove(&id)?;
        let removed = self.entries.remove(index);
        self.reindex();
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.positions.clear();
    }

    pub fn to_vec(&self) -> Vec<DiaryEntry> {
        self.entries.clone()
    }

    fn reindex(&mut self) {
        self.positions = self
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (entry.id, index))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn entry(id: i64, content: &str) -> DiaryEntry {
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        DiaryEntry {
            id: DiaryId::new(id),
            title: None,
            content: content.to_string(),
            mood: None,
            weather: None,
            entry_date: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn ids(cache: &EntryCache) -> Vec<i64> {
        cache.as_slice().iter().map(|entry| entry.id.get()).collect()
    }

    #[test]
    fn append_refreshes_existing_ids_in_place() {
        let mut cache = EntryCache::new();
        cache.replace_all(vec![entry(3, "c"), entry(2, "b")]);

        cache.append(vec![entry(2, "b2"), entry(1, "a")]);

        assert_eq!(ids(&cache), vec![3, 2, 1]);
        assert_eq!(cache.get(DiaryId::new(2)).unwrap().content, "b2");
    }

    #[test]
    fn replace_all_discards_previous_entries() {
        let mut cache = EntryCache::new();
        cache.replace_all(vec![entry(1, "a"), entry(2, "b")]);
        cache.replace_all(vec![entry(9, "z")]);
        assert_eq!(ids(&cache), vec![9]);
        assert!(!cache.contains(DiaryId::new(1)));
    }

    #[test]
    fn prepend_moves_existing_entry_to_front() {
        let mut cache = EntryCache::new();
        cache.replace_all(vec![entry(1, "a"), entry(2, "b"), entry(3, "c")]);

        cache.prepend(entry(3, "c2"));
        cache.prepend(entry(4, "d"));

        assert_eq!(ids(&cache), vec![4, 3, 1, 2]);
        assert_eq!(cache.get(DiaryId::new(3)).unwrap().content, "c2");
    }

    #[test]
    fn remove_keeps_positions_consistent() {
        let mut cache = EntryCache::new();
        cache.replace_all(vec![entry(1, "a"), entry(2, "b"), entry(3, "c")]);

        assert!(cache.remove(DiaryId::new(1)).is_some());
        assert!(cache.remove(DiaryId::new(1)).is_none());

        assert!(cache.replace(entry(3, "c2")));
        assert_eq!(ids(&cache), vec![2, 3]);
        assert_eq!(cache.get(DiaryId::new(3)).unwrap().content, "c2");
    }

    #[test]
    fn replace_ignores_unknown_ids() {
        let mut cache = EntryCache::new();
        cache.replace_all(vec![entry(1, "a")]);
        assert!(!cache.replace(entry(2, "b")));
        assert_eq!(cache.len(), 1);
    }
}
