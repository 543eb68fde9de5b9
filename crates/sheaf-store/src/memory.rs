use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use sheaf_types::{AssetObject, AssetPath, ObjectId};

use crate::catalog::{BackingFile, Catalog, Location};
use crate::error::{StoreError, StoreResult};
use crate::traits::AssetStore;

/// In-memory asset store.
///
/// Intended for tests and embedding. Every mutation is immediately visible,
/// so `save_assets` and `refresh` only count how often they were called;
/// tests use the counters to check that callers hit the persistence barrier.
pub struct InMemoryAssetStore {
    catalog: RwLock<Catalog>,
    saves: AtomicU64,
    refreshes: AtomicU64,
}

impl InMemoryAssetStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            catalog: RwLock::new(Catalog::new()),
            saves: AtomicU64::new(0),
            refreshes: AtomicU64::new(0),
        }
    }

    /// Number of backing files currently stored.
    pub fn len(&self) -> usize {
        self.read().map(|cat| cat.len()).unwrap_or(0)
    }

    /// Returns `true` if the store holds no backing files.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the backing file at `path`.
    pub fn backing_file(&self, path: &AssetPath) -> StoreResult<Option<BackingFile>> {
        Ok(self.read()?.file(path).cloned())
    }

    /// How many times `save_assets` has been called.
    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::SeqCst)
    }

    /// How many times `refresh` has been called.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::SeqCst)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Catalog>> {
        self.catalog
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Catalog>> {
        self.catalog
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl Default for InMemoryAssetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetStore for InMemoryAssetStore {
    fn location(&self, id: &ObjectId) -> StoreResult<Option<Location>> {
        Ok(self.read()?.location(id))
    }

    fn load_object(&self, id: &ObjectId) -> StoreResult<Option<AssetObject>> {
        Ok(self.read()?.object(id).cloned())
    }

    fn load_main_asset_at_path(&self, path: &AssetPath) -> StoreResult<Option<AssetObject>> {
        Ok(self.read()?.file(path).map(|file| file.main.clone()))
    }

    fn load_asset_at_path(
        &self,
        path: &AssetPath,
        kind: Option<&str>,
    ) -> StoreResult<Option<AssetObject>> {
        let cat = self.read()?;
        Ok(cat.file(path).and_then(|file| {
            file.objects()
                .find(|obj| kind.map_or(true, |k| obj.kind == k))
                .cloned()
        }))
    }

    fn embedded_objects(&self, path: &AssetPath) -> StoreResult<Vec<AssetObject>> {
        let cat = self.read()?;
        let file = cat
            .file(path)
            .ok_or_else(|| StoreError::PathNotFound(path.clone()))?;
        Ok(file.embedded.clone())
    }

    fn delete_asset(&self, path: &AssetPath) -> StoreResult<bool> {
        Ok(self.write()?.remove_file(path).is_some())
    }

    fn add_embedded_object(&self, object: AssetObject, container: &AssetPath) -> StoreResult<()> {
        self.write()?.embed(object, container)
    }

    fn create_asset(&self, object: AssetObject, path: &AssetPath) -> StoreResult<()> {
        self.write()?.create(object, path)
    }

    fn destroy_immediate(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.write()?.destroy(id).is_some())
    }

    fn write_object(&self, object: &AssetObject) -> StoreResult<()> {
        self.write()?.update(object).map(|_| ())
    }

    fn list_assets(&self, dir: &str) -> StoreResult<Vec<AssetPath>> {
        Ok(self.read()?.list(dir))
    }

    fn save_assets(&self) -> StoreResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn refresh(&self) -> StoreResult<()> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryAssetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryAssetStore")
            .field("file_count", &self.len())
            .finish()
    }
}
