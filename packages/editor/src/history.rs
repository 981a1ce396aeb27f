//! # History
//!
//! Bounded linear undo/redo over whole-document snapshots.
//!
//! - `entries[index]` is always the live document
//! - Pushing discards the redo branch
//! - Past the limit the oldest entry is evicted and the cursor follows it
//!
//! ```rust,ignore
//! let mut history = History::new(page);
//! history.push(edited);
//! assert_eq!(history.undo(), Some(page));
//! ```

use std::sync::Arc;
use tracing::warn;

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub document: Arc<str>,
    pub label: Option<String>,
}

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    index: usize,
    max_levels: usize,
}

impl History {
    pub fn new(initial: impl Into<Arc<str>>) -> Self {
        Self::with_max_levels(initial, DEFAULT_HISTORY_LIMIT)
    }

    /// `max_levels` below 1 is treated as 1.
    pub fn with_max_levels(initial: impl Into<Arc<str>>, max_levels: usize) -> Self {
        Self {
            entries: vec![HistoryEntry {
                document: initial.into(),
                label: None,
            }],
            index: 0,
            max_levels: max_levels.max(1),
        }
    }

    pub fn push(&mut self, document: impl Into<Arc<str>>) {
        self.push_entry(HistoryEntry {
            document: document.into(),
            label: None,
        });
    }

    pub fn push_labeled(&mut self, document: impl Into<Arc<str>>, label: impl Into<String>) {
        self.push_entry(HistoryEntry {
            document: document.into(),
            label: Some(label.into()),
        });
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        self.clamp();
        self.entries.truncate(self.index + 1);
        self.entries.push(entry);
        self.index = self.entries.len() - 1;

        while self.entries.len() > self.max_levels {
            self.entries.remove(0);
            self.index -= 1;
        }
    }

    pub fn undo(&mut self) -> Option<&str> {
        self.clamp();
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(&*self.entries[self.index].document)
    }

    pub fn redo(&mut self) -> Option<&str> {
        self.clamp();
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(&*self.entries[self.index].document)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    pub fn current(&self) -> &str {
        &self.entries[self.index.min(self.entries.len() - 1)].document
    }

    pub fn current_shared(&self) -> Arc<str> {
        Arc::clone(&self.entries[self.index.min(self.entries.len() - 1)].document)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Start over from a single entry (page switch).
    pub fn reset(&mut self, document: impl Into<Arc<str>>) {
        self.entries.clear();
        self.entries.push(HistoryEntry {
            document: document.into(),
            label: None,
        });
        self.index = 0;
    }

    /// Label of the entry `undo` would leave.
    pub fn undo_label(&self) -> Option<&str> {
        if !self.can_undo() {
            return None;
        }
        self.entries[self.index].label.as_deref()
    }

    /// Label of the entry `redo` would enter.
    pub fn redo_label(&self) -> Option<&str> {
        self.entries.get(self.index + 1)?.label.as_deref()
    }

    fn clamp(&mut self) {
        if self.index >= self.entries.len() {
            warn!(
                index = self.index,
                len = self.entries.len(),
                "History cursor out of range, clamping"
            );
            self.index = self.entries.len().saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_undo_redo_round_trip() {
        let mut history = History::new("a");
        history.push("b");
        assert_eq!(history.undo(), Some("a"));
        assert_eq!(history.redo(), Some("b"));
        assert_eq!(history.current(), "b");
    }

    #[test]
    fn test_boundaries_are_no_ops() {
        let mut history = History::new("a");
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);
        assert_eq!(history.index(), 0);
    }

    #[test]
    fn test_push_discards_redo_branch() {
        let mut history = History::new("a");
        history.push("b");
        history.push("c");
        history.undo();
        history.undo();
        history.push("d");
        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert_eq!(history.undo(), Some("a"));
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut history = History::new("0");
        for i in 1..=101 {
            history.push(i.to_string());
        }
        assert_eq!(history.len(), DEFAULT_HISTORY_LIMIT);
        assert_eq!(history.index(), DEFAULT_HISTORY_LIMIT - 1);

        let mut oldest = history.current().to_string();
        while let Some(document) = history.undo() {
            oldest = document.to_string();
        }
        assert_eq!(oldest, "2");
    }

    #[test]
    fn test_cap_with_cursor_in_the_middle() {
        let mut history = History::with_max_levels("0", 3);
        history.push("1");
        history.push("2");
        history.undo();
        history.push("3");
        history.push("4");
        let documents: Vec<&str> = history.entries().iter().map(|e| &*e.document).collect();
        assert_eq!(documents, vec!["1", "3", "4"]);
        assert_eq!(history.index(), 2);
    }

    #[test]
    fn test_labels() {
        let mut history = History::new("a");
        history.push_labeled("b", "Bold");
        assert_eq!(history.undo_label(), Some("Bold"));
        history.undo();
        assert_eq!(history.redo_label(), Some("Bold"));
        assert_eq!(history.undo_label(), None);
    }
}
