use log::debug;

use crate::document::{Document, DocumentSnapshot};

/// Undo steps kept before the oldest is dropped.
pub const DEFAULT_HISTORY_DEPTH: usize = 64;

/// Snapshot-based undo/redo. Committing operations push the pre-edit
/// snapshot; undoing swaps the current state onto the redo stack and brings
/// the pushed one back. Starting a new edit after an undo clears redo.
pub struct History {
    undo_stack: Vec<DocumentSnapshot>,
    redo_stack: Vec<DocumentSnapshot>,
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Pushes the document's current state as the next undo step.
    pub fn checkpoint(&mut self, document: &Document) {
        self.push(document.snapshot());
    }

    /// Pushes an already-captured snapshot, e.g. the state a drag gesture
    /// started from. Clears redo and drops the oldest step past the cap.
    pub fn push(&mut self, snapshot: DocumentSnapshot) {
        self.redo_stack.clear();
        self.undo_stack.push(snapshot);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
        debug!("history: push, depth {}", self.undo_stack.len());
    }

    /// Restores the newest undo step. No-op on an empty stack.
    pub fn undo(&mut self, document: &mut Document) -> bool {
        match self.undo_stack.pop() {
            Some(snapshot) => {
                self.redo_stack.push(document.snapshot());
                document.restore(snapshot);
                debug!("history: undo, {} steps left", self.undo_stack.len());
                true
            }
            None => false,
        }
    }

    /// Re-applies the newest redo step. No-op on an empty stack.
    pub fn redo(&mut self, document: &mut Document) -> bool {
        match self.redo_stack.pop() {
            Some(snapshot) => {
                self.undo_stack.push(document.snapshot());
                document.restore(snapshot);
                debug!("history: redo, {} steps left", self.redo_stack.len());
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
