//! Lazily grown array of per-row metadata.
//!
//! Rows are discovered front to back as the viewport scans the stream. The store
//! tracks how many rows have been laid out (`last`); row `last` itself has a
//! known start offset but no layout yet. Slots beyond that are allocated in
//! advance and sit in their default, unclassified state.

use crate::model::{LineRecord, LineType};

const MIN_CAPACITY: usize = 64;

/// Backing array of [`LineRecord`]s for one session.
#[derive(Debug, Clone)]
pub struct LineStore {
    rows: Vec<LineRecord>,
    last: usize,
}

impl Default for LineStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LineStore {
    /// Create a store with one screenful of empty slots.
    pub fn new() -> Self {
        Self::with_capacity(MIN_CAPACITY)
    }

    /// Create a store with at least `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut rows = Vec::new();
        rows.resize_with(capacity.max(1), LineRecord::default);
        Self { rows, last: 0 }
    }

    /// Make sure slot `index` exists, doubling the backing array as needed.
    ///
    /// New slots start unclassified with empty chunk lists. The array never
    /// shrinks.
    pub fn ensure(&mut self, index: usize) {
        if index < self.rows.len() {
            return;
        }
        let new_len = (self.rows.len() * 2).max(index + 1).max(MIN_CAPACITY);
        self.rows.resize_with(new_len, LineRecord::default);
    }

    /// Number of allocated slots.
    pub fn capacity(&self) -> usize {
        self.rows.len()
    }

    /// Number of rows laid out so far.
    pub fn last(&self) -> usize {
        self.last
    }

    /// Record that row `index` has been laid out, returning true if it is new.
    pub fn mark_laid_out(&mut self, index: usize) -> bool {
        if index == self.last {
            self.last += 1;
            self.ensure(self.last);
            true
        } else {
            false
        }
    }

    /// Undo [`LineStore::mark_laid_out`] for a row that turned out to be past EOF.
    pub fn unmark_laid_out(&mut self, index: usize) {
        if index + 1 == self.last {
            self.last = index;
        }
    }

    /// True if row `index` has been laid out, so its successor's offset is known.
    pub fn is_laid_out(&self, index: usize) -> bool {
        index < self.last
    }

    /// Record at `index`, if allocated.
    pub fn get(&self, index: usize) -> Option<&LineRecord> {
        self.rows.get(index)
    }

    /// Record at `index`, allocating the slot if needed.
    pub fn record(&mut self, index: usize) -> &LineRecord {
        self.ensure(index);
        &self.rows[index]
    }

    /// Mutable record at `index`, allocating the slot if needed.
    pub fn record_mut(&mut self, index: usize) -> &mut LineRecord {
        self.ensure(index);
        &mut self.rows[index]
    }

    /// All allocated slots.
    pub fn rows(&self) -> &[LineRecord] {
        &self.rows
    }

    /// Type of row `index`, `Unclassified` for unallocated slots.
    pub fn line_type(&self, index: usize) -> LineType {
        self.rows
            .get(index)
            .map_or(LineType::Unclassified, |r| r.line_type)
    }

    /// Origin row of the logical line that `index` belongs to.
    pub fn origin_of(&self, index: usize) -> usize {
        self.rows
            .get(index)
            .and_then(|r| r.continuation)
            .map_or(index, |c| c.origin)
    }

    /// Copy an origin row's type to the continuation rows that follow it.
    pub fn propagate_type(&mut self, origin: usize) {
        let line_type = self.line_type(origin);
        let mut i = origin + 1;
        while let Some(row) = self.rows.get_mut(i) {
            match row.continuation {
                Some(c) if c.origin == origin => row.line_type = line_type,
                _ => break,
            }
            i += 1;
        }
    }

    /// Forget layout and classification from `index` onward.
    ///
    /// Row `index` keeps its byte offset, so callers pass the first row of a
    /// logical line (row 0 for a full re-scan). Slots are reset in place.
    pub fn invalidate_from(&mut self, index: usize) {
        for (i, row) in self.rows.iter_mut().enumerate().skip(index) {
            if i == index {
                row.reset_classification();
                row.continuation = None;
            } else {
                *row = LineRecord::default();
            }
        }
        self.last = self.last.min(index);
    }

    /// Drop every row's search chunks so they are recomputed for a new pattern.
    pub fn reset_search(&mut self) {
        for row in &mut self.rows {
            row.search_chunks = None;
        }
    }

    /// Number of logical lines starting before row `index`.
    pub fn logical_index(&self, index: usize) -> usize {
        self.rows
            .iter()
            .take(index.min(self.rows.len()))
            .filter(|r| !r.is_continuation())
            .count()
    }
}
