//! Character selection and its persistence
//!
//! The selection is a list of (character, checked) pairs in frequency table
//! order. It survives restarts through a small sled database keyed by an
//! opaque storage key.

use crate::dataset::CharFrequencyRecord;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use sled::{Db, Tree};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Storage key used when none is configured
pub const DEFAULT_SELECTION_KEY: &str = "checkedChars";

/// Name of the sled tree holding saved selections
const SELECTION_TREE: &str = "selection";

/// Checked state of every row of the frequency table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    entries: Vec<(String, bool)>,
}

impl Selection {
    /// One unchecked entry per frequency row
    pub fn from_table(records: &[CharFrequencyRecord]) -> Self {
        Selection {
            entries: records.iter().map(|r| (r.char.clone(), false)).collect(),
        }
    }

    /// Apply previously saved pairs. Characters not in the table are ignored.
    pub fn apply_saved(&mut self, saved: &[(String, bool)]) {
        let saved: HashMap<&str, bool> = saved.iter().map(|(c, b)| (c.as_str(), *b)).collect();
        for (ch, checked) in &mut self.entries {
            if let Some(&value) = saved.get(ch.as_str()) {
                *checked = value;
            }
        }
    }

    /// Set one character. Returns false if it is not in the table.
    pub fn set(&mut self, ch: &str, checked: bool) -> bool {
        match self.entries.iter_mut().find(|(c, _)| c == ch) {
            Some(entry) => {
                entry.1 = checked;
                true
            }
            None => false,
        }
    }

    /// Set every row between two table indices, inclusive, in either order.
    /// Indices past the end are clamped.
    pub fn set_range(&mut self, from: usize, to: usize, checked: bool) {
        if self.entries.is_empty() {
            return;
        }
        let last = self.entries.len() - 1;
        let start = from.min(to).min(last);
        let end = from.max(to).min(last);

        for entry in &mut self.entries[start..=end] {
            entry.1 = checked;
        }
    }

    pub fn set_all(&mut self, checked: bool) {
        for entry in &mut self.entries {
            entry.1 = checked;
        }
    }

    pub fn is_checked(&self, ch: &str) -> bool {
        self.entries.iter().any(|(c, checked)| *checked && c == ch)
    }

    /// Checked characters in table order
    pub fn checked_chars(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, checked)| *checked)
            .map(|(c, _)| c.as_str())
            .collect()
    }

    pub fn entries(&self) -> &[(String, bool)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Stored form of one pair
#[derive(Debug, Serialize, Deserialize)]
struct SavedChoice {
    char: String,
    checked: bool,
}

/// Sled-backed persistence for selections
pub struct SelectionStore {
    db: Db,
    tree: Tree,
}

impl SelectionStore {
    /// Open or create a selection store
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path.as_ref())?;
        let tree = db.open_tree(SELECTION_TREE)?;
        debug!("Selection store opened at {:?}", path.as_ref());
        Ok(SelectionStore { db, tree })
    }

    /// Save pairs under `key`, replacing what was there
    pub fn save(&self, key: &str, pairs: &[(String, bool)]) -> Result<()> {
        let stored: Vec<SavedChoice> = pairs
            .iter()
            .map(|(c, b)| SavedChoice {
                char: c.clone(),
                checked: *b,
            })
            .collect();
        let bytes = serde_json::to_vec(&stored)?;

        self.tree.insert(key.as_bytes(), bytes)?;
        self.db.flush()?;
        debug!("Saved {} selection entries under {}", pairs.len(), key);
        Ok(())
    }

    /// Load pairs saved under `key`. Missing or unreadable data is an empty
    /// list.
    pub fn load(&self, key: &str) -> Result<Vec<(String, bool)>> {
        let Some(bytes) = self.tree.get(key.as_bytes())? else {
            return Ok(Vec::new());
        };

        match serde_json::from_slice::<Vec<SavedChoice>>(&bytes) {
            Ok(stored) => Ok(stored.into_iter().map(|s| (s.char, s.checked)).collect()),
            Err(e) => {
                warn!("Ignoring unreadable selection under {}: {}", key, e);
                Ok(Vec::new())
            }
        }
    }

    /// Forget the selection under `key`
    pub fn remove(&self, key: &str) -> Result<()> {
        self.tree.remove(key.as_bytes())?;
        self.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table() -> Vec<CharFrequencyRecord> {
        ["之", "人", "天", "地"]
            .iter()
            .enumerate()
            .map(|(i, c)| CharFrequencyRecord {
                char: c.to_string(),
                freq: 10 - i as u64,
            })
            .collect()
    }

    #[test]
    fn test_from_table_unchecked() {
        let selection = Selection::from_table(&table());
        assert_eq!(selection.len(), 4);
        assert!(selection.checked_chars().is_empty());
    }

    #[test]
    fn test_set() {
        let mut selection = Selection::from_table(&table());

        assert!(selection.set("天", true));
        assert!(!selection.set("海", true));
        assert!(selection.is_checked("天"));
        assert!(!selection.is_checked("海"));

        selection.set("天", false);
        assert!(!selection.is_checked("天"));
    }

    #[test]
    fn test_set_range_either_direction() {
        let mut selection = Selection::from_table(&table());
        selection.set_range(2, 0, true);
        assert_eq!(selection.checked_chars(), vec!["之", "人", "天"]);

        selection.set_range(1, 2, false);
        assert_eq!(selection.checked_chars(), vec!["之"]);
    }

    #[test]
    fn test_set_range_clamped() {
        let mut selection = Selection::from_table(&table());
        selection.set_range(2, 99, true);
        assert_eq!(selection.checked_chars(), vec!["天", "地"]);

        let mut empty = Selection::default();
        empty.set_range(0, 3, true);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_set_all() {
        let mut selection = Selection::from_table(&table());
        selection.set_all(true);
        assert_eq!(selection.checked_chars().len(), 4);
    }

    #[test]
    fn test_apply_saved_ignores_unknown() {
        let mut selection = Selection::from_table(&table());
        selection.apply_saved(&[
            ("人".to_string(), true),
            ("海".to_string(), true),
            ("地".to_string(), false),
        ]);

        assert_eq!(selection.checked_chars(), vec!["人"]);
        assert_eq!(selection.len(), 4);
    }

    #[test]
    fn test_store_round_trip() {
        let temp = TempDir::new().unwrap();
        let store = SelectionStore::open(temp.path().join("selection.db")).unwrap();

        let mut selection = Selection::from_table(&table());
        selection.set("之", true);
        selection.set("地", true);
        store.save(DEFAULT_SELECTION_KEY, selection.entries()).unwrap();

        let loaded = store.load(DEFAULT_SELECTION_KEY).unwrap();
        assert_eq!(loaded, selection.entries());
    }

    #[test]
    fn test_store_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("selection.db");

        {
            let store = SelectionStore::open(&path).unwrap();
            store.save("k", &[("人".to_string(), true)]).unwrap();
        }

        let store = SelectionStore::open(&path).unwrap();
        assert_eq!(store.load("k").unwrap(), vec![("人".to_string(), true)]);
    }

    #[test]
    fn test_store_missing_and_removed() {
        let temp = TempDir::new().unwrap();
        let store = SelectionStore::open(temp.path().join("selection.db")).unwrap();

        assert!(store.load("k").unwrap().is_empty());

        store.save("k", &[("人".to_string(), true)]).unwrap();
        store.remove("k").unwrap();
        assert!(store.load("k").unwrap().is_empty());
    }

    #[test]
    fn test_store_unreadable_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = SelectionStore::open(temp.path().join("selection.db")).unwrap();
        store.tree.insert(b"k", b"not json".to_vec()).unwrap();

        assert!(store.load("k").unwrap().is_empty());
    }
}
