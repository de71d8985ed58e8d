//! The queue of rows awaiting (re)tokenization.

/// Ascending multiset of rows whose inherited state is unverified.
///
/// Each entry means "recompute from this row on". Entries may repeat; they are collapsed by
/// [`InvalidRows::validate`] once the covering work is done.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidRows {
    rows: Vec<usize>,
}

impl InvalidRows {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Smallest invalid row.
    pub fn first(&self) -> Option<usize> {
        self.rows.first().copied()
    }

    /// Remove and return the smallest invalid row.
    pub fn pop_first(&mut self) -> Option<usize> {
        if self.rows.is_empty() {
            None
        } else {
            Some(self.rows.remove(0))
        }
    }

    /// Mark `row` invalid.
    pub fn invalidate(&mut self, row: usize) {
        self.rows.push(row);
        self.rows.sort_unstable();
    }

    /// Drop every entry `<= row`.
    pub fn validate(&mut self, row: usize) {
        let keep_from = self.rows.partition_point(|&r| r <= row);
        self.rows.drain(..keep_from);
    }

    /// Reindex entries for an edit that replaced rows `start..=end` and shifted later rows by
    /// `delta`.
    ///
    /// - entries before `start` are unchanged
    /// - entries inside `start..=end` collapse to `end + delta + 1` (the first row after the
    ///   new text)
    /// - entries after `end` shift by `delta`
    pub fn shift_for_edit(&mut self, start: usize, end: usize, delta: isize) {
        for row in &mut self.rows {
            if *row < start {
                continue;
            }
            if *row <= end {
                *row = end.saturating_add_signed(delta) + 1;
            } else {
                *row = row.saturating_add_signed(delta);
            }
        }
        self.rows.sort_unstable();
    }

    /// Forget every entry.
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Whether no rows are pending.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Queued entries in ascending order.
    pub fn as_slice(&self) -> &[usize] {
        &self.rows
    }
}
