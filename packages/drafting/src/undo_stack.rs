//! # Undo/Redo Stack
//!
//! Snapshot-based history for a [`DocumentStructure`].
//!
//! ## Design
//!
//! - Before each mutation the whole structure is recorded (a deep clone,
//!   sharing nothing with the live value)
//! - Undo swaps the live structure with the newest snapshot and keeps the
//!   replaced state for redo
//! - Redo swaps back the other way
//! - Recording a new snapshot clears the redo stack
//! - The oldest snapshot is evicted once `max_levels` is exceeded
//!
//! Each snapshot costs O(size of structure). Undo and redo restore the
//! exact structural state, entity IDs included.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//!
//! stack.record(&structure);
//! mutate(&mut structure);
//!
//! stack.undo(&mut structure); // structure is back to its old value
//! stack.redo(&mut structure); // and forward again
//! ```

use crate::structure::DocumentStructure;

/// Undo/redo stack of whole-structure snapshots
#[derive(Debug, Clone)]
pub struct UndoStack {
    /// Snapshots taken before each mutation (most recent last)
    history: Vec<DocumentStructure>,

    /// States replaced by undo (most recent last)
    future: Vec<DocumentStructure>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl UndoStack {
    /// Create an undo stack with the default limit (50)
    pub fn new() -> Self {
        Self::with_max_levels(50)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            history: Vec::new(),
            future: Vec::new(),
            max_levels,
        }
    }

    /// Record the state about to be mutated
    pub fn record(&mut self, snapshot: &DocumentStructure) {
        self.push(snapshot.clone());
    }

    /// Record an already-cloned snapshot
    pub(crate) fn push(&mut self, snapshot: DocumentStructure) {
        self.history.push(snapshot);

        if self.max_levels > 0 && self.history.len() > self.max_levels {
            self.history.remove(0);
            tracing::trace!(max_levels = self.max_levels, "Evicted oldest undo snapshot");
        }

        // New action invalidates the future
        self.future.clear();
    }

    /// Restore the most recent snapshot into `current`
    pub fn undo(&mut self, current: &mut DocumentStructure) -> bool {
        match self.history.pop() {
            Some(previous) => {
                let replaced = std::mem::replace(current, previous);
                self.future.push(replaced);
                true
            }
            None => false,
        }
    }

    /// Reapply the most recently undone state into `current`
    pub fn redo(&mut self, current: &mut DocumentStructure) -> bool {
        match self.future.pop() {
            Some(next) => {
                let replaced = std::mem::replace(current, next);
                self.history.push(replaced);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.history.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.future.len()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.history.clear();
        self.future.clear();
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
