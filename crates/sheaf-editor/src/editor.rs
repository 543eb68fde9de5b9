use std::sync::Arc;

use sheaf_collection::{Collection, CollectionKey, RemovalCursor};
use sheaf_store::AssetStore;
use sheaf_transfer::{OwnershipTransferEngine, TransferError};
use sheaf_types::{AssetObject, ObjectId};
use tracing::debug;

use crate::config::EditorConfig;
use crate::error::EditorResult;
use crate::event::{EditorEvent, EditorOutcome};
use crate::layout::Layout;
use crate::session::{SessionMap, SessionState};
use crate::strategy::StrategyRegistry;

const ALREADY_IN_COLLECTION: &str = "Can't add an object that's already in a collection.";

/// One row as the UI shell should draw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowView {
    pub index: usize,
    /// `None` for empty and orphaned rows.
    pub member: Option<ObjectId>,
    pub label: String,
}

/// Applies [`EditorEvent`]s to collections.
///
/// The editor owns the transfer engine, the strategy registry and the
/// session state of every collection it has shown. Collections themselves
/// are loaded from the store on each call, so the store stays the single
/// source of truth.
pub struct CollectionEditor {
    engine: OwnershipTransferEngine,
    registry: StrategyRegistry,
    layout: Layout,
    sessions: SessionMap,
}

impl CollectionEditor {
    /// Create an editor with the default strategy registry.
    pub fn new(store: Arc<dyn AssetStore>, config: EditorConfig) -> Self {
        Self {
            engine: OwnershipTransferEngine::new(store, config.transfer),
            registry: StrategyRegistry::new(),
            layout: config.layout,
            sessions: SessionMap::new(),
        }
    }

    /// Replace the strategy registry. Call before the first event.
    pub fn with_registry(mut self, registry: StrategyRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn engine(&self) -> &OwnershipTransferEngine {
        &self.engine
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn sessions(&self) -> &SessionMap {
        &self.sessions
    }

    fn store(&self) -> Arc<dyn AssetStore> {
        Arc::clone(self.engine.store())
    }

    // ---------------------------------------------------------------
    // Session lifecycle
    // ---------------------------------------------------------------

    /// Start showing the collection `key`, or refresh its state if shown.
    pub fn open(&mut self, key: &CollectionKey) -> EditorResult<SessionState> {
        let collection = Collection::load(self.store().as_ref(), key.owner, &key.property)?;
        Ok(self.sync_session(key, collection.count()))
    }

    /// Stop showing `key`.
    pub fn close(&mut self, key: &CollectionKey) -> bool {
        self.sessions.close(key)
    }

    /// End the session, dropping every collection's state.
    pub fn close_all(&mut self) {
        self.sessions.close_all();
    }

    /// Required display height of `key`.
    pub fn height(&mut self, key: &CollectionKey) -> EditorResult<f32> {
        Ok(self.open(key)?.height)
    }

    /// Rows of `key` with labels from the element kind's strategy.
    pub fn rows(&self, key: &CollectionKey) -> EditorResult<Vec<RowView>> {
        let store = self.store();
        let collection = Collection::load(store.as_ref(), key.owner, &key.property)?;
        let strategy = self.registry.resolve(collection.element_kind());
        let mut rows = Vec::with_capacity(collection.count());
        for index in 0..collection.count() {
            let member = collection.resolve(store.as_ref(), index)?;
            rows.push(RowView {
                index,
                member: member.as_ref().map(|m| m.id),
                label: strategy.label(index, member.as_ref()),
            });
        }
        Ok(rows)
    }

    // ---------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------

    /// Apply `event` to the collection `key`.
    ///
    /// Rejected actions leave the collection as it was and show up in
    /// [`EditorOutcome::warnings`]. Only store failures are errors.
    pub fn handle(&mut self, key: &CollectionKey, event: EditorEvent) -> EditorResult<EditorOutcome> {
        let store = self.store();
        let mut collection = Collection::load(store.as_ref(), key.owner, &key.property)?;
        let mut outcome = EditorOutcome::default();
        debug!(collection = %key, event = event.label(), "handling editor event");

        match event {
            EditorEvent::Dropped { candidate } => {
                self.on_dropped(&mut collection, candidate, &mut outcome)?
            }
            EditorEvent::Replaced { index, candidate } => {
                self.on_replaced(&mut collection, index, candidate, &mut outcome)?
            }
            EditorEvent::Add => {
                collection.append(None);
                outcome.changed = true;
            }
            EditorEvent::Clone => self.on_clone(&mut collection, &mut outcome)?,
            EditorEvent::Remove { index } => self.on_remove(&mut collection, index, &mut outcome)?,
            EditorEvent::Rename { index, name } => {
                self.on_rename(&collection, index, &name, &mut outcome)?
            }
            EditorEvent::Toggle => {
                let state = self.sessions.open(key, collection.count(), &self.layout);
                state.expanded = !state.expanded;
            }
        }

        self.commit(&collection, &outcome)?;
        self.sync_session(key, collection.count());
        Ok(outcome)
    }

    /// Remove every row for which `pred` returns `true`, evicting members.
    ///
    /// `pred` sees each row exactly once, with the index the row had before
    /// this call. A row whose eviction is refused stays and produces a
    /// warning.
    pub fn remove_where<F>(&mut self, key: &CollectionKey, mut pred: F) -> EditorResult<EditorOutcome>
    where
        F: FnMut(usize, Option<&AssetObject>) -> bool,
    {
        let store = self.store();
        let mut collection = Collection::load(store.as_ref(), key.owner, &key.property)?;
        let mut outcome = EditorOutcome::default();
        let mut cursor = RemovalCursor::new();

        while let Some(index) = cursor.current(collection.count()) {
            let member = collection.resolve(store.as_ref(), index)?;
            if !pred(cursor.original_index(), member.as_ref()) {
                cursor.kept();
                continue;
            }
            if let Some(member) = &member {
                if !self.evict_member(&collection, member, &mut outcome)? {
                    cursor.kept();
                    continue;
                }
            }
            collection.remove_at(index);
            cursor.removed();
            outcome.changed = true;
        }
        debug!(collection = %key, removed = cursor.removed_count(), "bulk removal");

        self.commit(&collection, &outcome)?;
        self.sync_session(key, collection.count());
        Ok(outcome)
    }

    // ---------------------------------------------------------------
    // Event handlers
    // ---------------------------------------------------------------

    fn on_dropped(
        &self,
        collection: &mut Collection,
        candidate: ObjectId,
        outcome: &mut EditorOutcome,
    ) -> EditorResult<()> {
        if !self.check_candidate(collection, &candidate, outcome)? {
            return Ok(());
        }
        let container = collection.container_path(self.store().as_ref())?;
        match self.engine.adopt(&candidate, &container) {
            Ok(member) => {
                collection.append(Some(member.id));
                outcome.changed = true;
            }
            Err(TransferError::InvalidAdoptionSource { .. }) => outcome.warn(ALREADY_IN_COLLECTION),
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    fn on_replaced(
        &self,
        collection: &mut Collection,
        index: usize,
        candidate: Option<ObjectId>,
        outcome: &mut EditorOutcome,
    ) -> EditorResult<()> {
        let store = self.store();
        if index >= collection.count() {
            outcome.warn(format!("Row {index} does not exist."));
            return Ok(());
        }
        let Some(candidate) = candidate else {
            outcome.warn("A row can't be cleared; remove it instead.");
            return Ok(());
        };
        if collection.get(index) == Some(candidate) {
            return Ok(());
        }
        if !self.check_candidate(collection, &candidate, outcome)? {
            return Ok(());
        }
        let container = collection.container_path(store.as_ref())?;
        match store.location(&candidate)? {
            Some(loc) if loc.is_main && loc.path != container => {}
            _ => {
                outcome.warn(ALREADY_IN_COLLECTION);
                return Ok(());
            }
        }

        if let Some(old) = collection.resolve(store.as_ref(), index)? {
            if !self.evict_member(collection, &old, outcome)? {
                return Ok(());
            }
        }
        let slot = match self.engine.adopt(&candidate, &container) {
            Ok(member) => Some(member.id),
            Err(TransferError::InvalidAdoptionSource { .. }) => {
                outcome.warn(ALREADY_IN_COLLECTION);
                None
            }
            Err(e) => return Err(e.into()),
        };
        collection.set(index, slot)?;
        outcome.changed = true;
        Ok(())
    }

    fn on_clone(&self, collection: &mut Collection, outcome: &mut EditorOutcome) -> EditorResult<()> {
        let store = self.store();
        let last = match collection.count().checked_sub(1) {
            Some(index) => collection.resolve(store.as_ref(), index)?,
            None => None,
        };
        let slot = match last {
            Some(member) => {
                let container = collection.container_path(store.as_ref())?;
                Some(self.engine.duplicate(&member.id, &container)?.id)
            }
            None => None,
        };
        collection.append(slot);
        outcome.changed = true;
        Ok(())
    }

    fn on_remove(
        &self,
        collection: &mut Collection,
        index: usize,
        outcome: &mut EditorOutcome,
    ) -> EditorResult<()> {
        if index >= collection.count() {
            debug!(collection = %collection.key(), index, "remove past end ignored");
            return Ok(());
        }
        if let Some(member) = collection.resolve(self.store().as_ref(), index)? {
            if !self.evict_member(collection, &member, outcome)? {
                return Ok(());
            }
        }
        collection.remove_at(index);
        outcome.changed = true;
        Ok(())
    }

    fn on_rename(
        &self,
        collection: &Collection,
        index: usize,
        name: &str,
        outcome: &mut EditorOutcome,
    ) -> EditorResult<()> {
        match collection.resolve(self.store().as_ref(), index)? {
            Some(member) if member.name == name => {}
            Some(member) => self.engine.rename(&member.id, name)?,
            None => outcome.warn(format!("Row {index} has no member to rename.")),
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------

    /// Existence and kind checks shared by drop and replace.
    fn check_candidate(
        &self,
        collection: &Collection,
        candidate: &ObjectId,
        outcome: &mut EditorOutcome,
    ) -> EditorResult<bool> {
        let Some(object) = self.store().load_object(candidate)? else {
            outcome.warn(format!("Object {candidate} no longer exists."));
            return Ok(false);
        };
        let kind = collection.element_kind();
        if !self.registry.resolve(kind).accepts(kind, &object) {
            outcome.warn(format!("{} is a {}, not a {kind}.", object.name, object.kind));
            return Ok(false);
        }
        Ok(true)
    }

    /// Evict `member`; `false` when the eviction was refused.
    fn evict_member(
        &self,
        collection: &Collection,
        member: &AssetObject,
        outcome: &mut EditorOutcome,
    ) -> EditorResult<bool> {
        match self.engine.evict(&member.id, &collection.owner()) {
            Ok(path) => {
                outcome.evicted.push(path);
                Ok(true)
            }
            Err(TransferError::PathCollision { base, attempts }) => {
                outcome.warn(format!(
                    "Can't remove {}: no free path near {base} after {attempts} attempts.",
                    member.name
                ));
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn commit(&self, collection: &Collection, outcome: &EditorOutcome) -> EditorResult<()> {
        if outcome.changed {
            let store = self.store();
            collection.save(store.as_ref())?;
            store.persist()?;
        }
        Ok(())
    }

    fn sync_session(&mut self, key: &CollectionKey, count: usize) -> SessionState {
        let state = self.sessions.open(key, count, &self.layout);
        state.update(count, &self.layout);
        *state
    }
}

impl std::fmt::Debug for CollectionEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionEditor")
            .field("engine", &self.engine)
            .field("registry", &self.registry)
            .field("layout", &self.layout)
            .field("open_sessions", &self.sessions.len())
            .finish()
    }
}
