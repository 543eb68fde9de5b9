//! Per-collection UI state.
//!
//! Every collection shown in a session gets its own [`SessionState`], keyed
//! by [`CollectionKey`]. State is created by `open` and dropped by `close` or
//! `close_all`; nothing is shared between collections.

use std::collections::HashMap;

use sheaf_collection::CollectionKey;

use crate::layout::Layout;

/// Cached display state of one collection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionState {
    pub expanded: bool,
    /// Member count at the last update.
    pub list_count: usize,
    /// Display height at the last update.
    pub height: f32,
}

impl SessionState {
    /// Record a new member count and recompute the height.
    pub fn update(&mut self, list_count: usize, layout: &Layout) {
        self.list_count = list_count;
        self.height = layout.height(list_count, self.expanded);
    }
}

/// All open collections of a UI session.
#[derive(Debug, Default)]
pub struct SessionMap {
    states: HashMap<CollectionKey, SessionState>,
}

impl SessionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `key` with `list_count` members, or return its existing state.
    ///
    /// New collections start expanded.
    pub fn open(&mut self, key: &CollectionKey, list_count: usize, layout: &Layout) -> &mut SessionState {
        self.states.entry(key.clone()).or_insert_with(|| {
            let mut state = SessionState {
                expanded: true,
                list_count: 0,
                height: 0.0,
            };
            state.update(list_count, layout);
            state
        })
    }

    pub fn get(&self, key: &CollectionKey) -> Option<&SessionState> {
        self.states.get(key)
    }

    pub fn get_mut(&mut self, key: &CollectionKey) -> Option<&mut SessionState> {
        self.states.get_mut(key)
    }

    /// Drop the state of `key`. Returns `false` if it was not open.
    pub fn close(&mut self, key: &CollectionKey) -> bool {
        self.states.remove(key).is_some()
    }

    /// Drop every state, ending the session.
    pub fn close_all(&mut self) {
        self.states.clear();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
