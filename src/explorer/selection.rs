//! Selection manager.
//!
//! Tracks the set of user-selected document ids, independent of filtering
//! and grouping. Selection survives filter/sort/group changes; ids that
//! disappear from the backing collection are dropped so bulk operations
//! never see ghosts.

use std::collections::HashSet;

/// Owner of the selection set. Mutated only through these operations.
#[derive(Debug, Default, Clone)]
pub struct SelectionManager {
    selected: HashSet<String>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one id in or out of the selection.
    pub fn toggle(&mut self, id: &str) {
        if !self.selected.remove(id) {
            self.selected.insert(id.to_string());
        }
    }

    /// Replace the selection with exactly the given (currently visible) ids.
    pub fn select_all<I, S>(&mut self, visible_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected = visible_ids.into_iter().map(Into::into).collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected ids in a deterministic order.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.selected.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Drop ids no longer present in the backing collection.
    pub fn retain_known(&mut self, known: &HashSet<&str>) {
        self.selected.retain(|id| known.contains(id.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_idempotent_in_pairs() {
        let mut sel = SelectionManager::new();
        sel.toggle("f1");
        assert!(sel.is_selected("f1"));
        sel.toggle("f1");
        assert!(!sel.is_selected("f1"));
        assert!(sel.is_empty());
    }

    #[test]
    fn test_select_all_replaces() {
        let mut sel = SelectionManager::new();
        sel.toggle("stale");
        sel.select_all(["f1", "f2"]);

        assert!(sel.is_selected("f1"));
        assert!(sel.is_selected("f2"));
        assert!(!sel.is_selected("stale"));
        assert_eq!(sel.len(), 2);

        // Repeating with the same visible set changes nothing.
        sel.select_all(["f1", "f2"]);
        assert_eq!(sel.len(), 2);
    }

    #[test]
    fn test_retain_known_drops_ghosts() {
        let mut sel = SelectionManager::new();
        sel.select_all(["f1", "f2", "f3"]);

        let known: HashSet<&str> = ["f1", "f3"].into_iter().collect();
        sel.retain_known(&known);

        assert_eq!(sel.ids(), vec!["f1".to_string(), "f3".to_string()]);
    }

    #[test]
    fn test_clear() {
        let mut sel = SelectionManager::new();
        sel.select_all(["f1", "f2"]);
        sel.clear();
        assert!(sel.is_empty());
        assert_eq!(sel.len(), 0);
    }
}
