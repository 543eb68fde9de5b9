//! Iteration over a list that shrinks while it is walked.
//!
//! Removing slot `i` shifts every later slot one position left, so the
//! element that was at `i + 1` is now at `i`. A cursor that advanced after
//! a removal would skip it. [`RemovalCursor`] stays put after a removal and
//! moves on only after a slot is kept.

/// Cursor over slot indices that accounts for removals.
///
/// ```
/// use sheaf_collection::RemovalCursor;
///
/// let mut items = vec![1, 2, 2, 3];
/// let mut cursor = RemovalCursor::new();
/// while let Some(i) = cursor.current(items.len()) {
///     if items[i] == 2 {
///         items.remove(i);
///         cursor.removed();
///     } else {
///         cursor.kept();
///     }
/// }
/// assert_eq!(items, vec![1, 3]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RemovalCursor {
    index: usize,
    removed: usize,
}

impl RemovalCursor {
    /// Start at slot 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot to visit next, or `None` once the list is exhausted.
    pub fn current(&self, len: usize) -> Option<usize> {
        (self.index < len).then_some(self.index)
    }

    /// The visited slot stayed; move to the next one.
    pub fn kept(&mut self) {
        self.index += 1;
    }

    /// The visited slot was removed; the next element has shifted into it.
    pub fn removed(&mut self) {
        self.removed += 1;
    }

    /// Index the current slot had before any removal in this pass.
    pub fn original_index(&self) -> usize {
        self.index + self.removed
    }

    /// Number of removals recorded so far.
    pub fn removed_count(&self) -> usize {
        self.removed
    }
}
