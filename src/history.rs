use std::collections::VecDeque;

/// Maximum number of past snapshots kept for undo
pub const HISTORY_LIMIT: usize = 100;

/// Linear undo/redo history over whole-document snapshots.
///
/// `present` is the current document. `past` holds older documents with the
/// most recent at the back; `future` holds documents reachable by redo with
/// the next one at the front. Any commit clears `future`, so history is a
/// line, never a tree.
#[derive(Debug, Clone)]
pub struct History<T> {
    past: VecDeque<T>,
    present: T,
    future: VecDeque<T>,
    limit: usize,
}

impl<T: Clone> History<T> {
    pub fn new(initial: T) -> Self {
        Self::with_limit(initial, HISTORY_LIMIT)
    }

    /// A limit of zero disables undo entirely.
    pub fn with_limit(initial: T, limit: usize) -> Self {
        History {
            past: VecDeque::new(),
            present: initial,
            future: VecDeque::new(),
            limit,
        }
    }

    pub fn present(&self) -> &T {
        &self.present
    }

    /// Edit the present in place without recording an undo step. Used for
    /// repairs that every snapshot should get, such as re-homing tasks.
    pub fn amend<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut T),
    {
        edit(&mut self.present);
    }

    /// Replace the present document. The previous one becomes undoable and
    /// the redo stack is discarded.
    pub fn commit(&mut self, next: T) {
        let prev = std::mem::replace(&mut self.present, next);
        self.push_past(prev);
        self.future.clear();
        log::debug!("history commit: past={} future=0", self.past.len());
    }

    /// Commit a document derived from the current one.
    pub fn commit_with<F>(&mut self, derive: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = derive(&self.present);
        self.commit(next);
    }

    /// Step back one document. Returns false (and does nothing) when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(prev) = self.past.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, prev);
        self.future.push_front(current);
        log::debug!(
            "history undo: past={} future={}",
            self.past.len(),
            self.future.len()
        );
        true
    }

    /// Step forward one document. Returns false (and does nothing) when there
    /// is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.push_past(current);
        log::debug!(
            "history redo: past={} future={}",
            self.past.len(),
            self.future.len()
        );
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }

    /// Replace the present and forget all history (e.g. after reloading from
    /// storage).
    pub fn reset(&mut self, document: T) {
        self.present = document;
        self.past.clear();
        self.future.clear();
    }

    fn push_past(&mut self, doc: T) {
        if self.limit == 0 {
            return;
        }
        self.past.push_back(doc);
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
    }
}

impl<T: Clone + PartialEq> History<T> {
    /// Commit only if the new document differs from the present. Returns
    /// whether a commit happened.
    pub fn commit_if_changed(&mut self, next: T) -> bool {
        if next == self.present {
            return false;
        }
        self.commit(next);
        true
    }
}

impl<T: Clone + Default> Default for History<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
