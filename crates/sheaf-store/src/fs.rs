//! Directory-backed asset store.
//!
//! Each backing file is a pretty-printed JSON document at
//! `<root>/<asset path>`:
//!
//! ```text
//! { "main": { "id": ..., "name": ..., "kind": ..., "fields": {...} },
//!   "embedded": [ ... ] }
//! ```
//!
//! Mutations land in an in-memory [`Catalog`] and mark the touched file
//! dirty. `save_assets` writes dirty files atomically (temp file in the same
//! directory, then rename). `delete_asset` removes the file from disk right
//! away, matching host semantics. `refresh` rescans the root and rebuilds the
//! catalog, keeping unsaved dirty files as they are in memory.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use sheaf_types::{AssetObject, AssetPath, ObjectId};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::catalog::{BackingFile, Catalog, Location};
use crate::error::{StoreError, StoreResult};
use crate::traits::AssetStore;

struct FsState {
    catalog: Catalog,
    /// Files changed in memory but not yet written.
    dirty: BTreeSet<AssetPath>,
}

/// Asset store persisted as JSON files under a root directory.
pub struct FsAssetStore {
    root: PathBuf,
    state: RwLock<FsState>,
}

impl FsAssetStore {
    /// Open (or create) a store rooted at `root` and load every backing file.
    pub fn open(root: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(root)?;
        let store = Self {
            root: root.to_path_buf(),
            state: RwLock::new(FsState {
                catalog: Catalog::new(),
                dirty: BTreeSet::new(),
            }),
        };
        store.refresh()?;
        Ok(store)
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location of a backing file.
    pub fn disk_path(&self, path: &AssetPath) -> PathBuf {
        path.as_str()
            .split('/')
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }

    /// Number of files with unsaved changes.
    pub fn pending_writes(&self) -> usize {
        self.read().map(|state| state.dirty.len()).unwrap_or(0)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, FsState>> {
        self.state
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, FsState>> {
        self.state
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn remove_from_disk(&self, path: &AssetPath) -> StoreResult<()> {
        match std::fs::remove_file(self.disk_path(path)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_file(&self, path: &AssetPath, file: &BackingFile) -> StoreResult<()> {
        let target = self.disk_path(path);
        let parent = target.parent().unwrap_or(&self.root);
        std::fs::create_dir_all(parent)?;

        let bytes = serde_json::to_vec_pretty(file)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&target).map_err(|e| StoreError::Io(e.error))?;
        debug!(%path, bytes = bytes.len(), "wrote asset file");
        Ok(())
    }

    fn read_file(disk: &Path) -> StoreResult<BackingFile> {
        let bytes = std::fs::read(disk)?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::CorruptFile {
            path: disk.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Scan the root and decode every backing file found.
    fn scan(&self) -> StoreResult<Vec<(AssetPath, BackingFile)>> {
        let mut found = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                StoreError::Io(
                    e.into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
                )
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let rel: Vec<String> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            let Ok(path) = AssetPath::parse(&rel.join("/")) else {
                continue;
            };
            match Self::read_file(entry.path()) {
                Ok(file) => found.push((path, file)),
                Err(e) => warn!(%path, error = %e, "skipping unreadable asset file"),
            }
        }
        Ok(found)
    }
}

impl AssetStore for FsAssetStore {
    fn location(&self, id: &ObjectId) -> StoreResult<Option<Location>> {
        Ok(self.read()?.catalog.location(id))
    }

    fn load_object(&self, id: &ObjectId) -> StoreResult<Option<AssetObject>> {
        Ok(self.read()?.catalog.object(id).cloned())
    }

    fn load_main_asset_at_path(&self, path: &AssetPath) -> StoreResult<Option<AssetObject>> {
        Ok(self.read()?.catalog.file(path).map(|file| file.main.clone()))
    }

    fn load_asset_at_path(
        &self,
        path: &AssetPath,
        kind: Option<&str>,
    ) -> StoreResult<Option<AssetObject>> {
        let state = self.read()?;
        Ok(state.catalog.file(path).and_then(|file| {
            file.objects()
                .find(|obj| kind.map_or(true, |k| obj.kind == k))
                .cloned()
        }))
    }

    fn embedded_objects(&self, path: &AssetPath) -> StoreResult<Vec<AssetObject>> {
        let state = self.read()?;
        let file = state
            .catalog
            .file(path)
            .ok_or_else(|| StoreError::PathNotFound(path.clone()))?;
        Ok(file.embedded.clone())
    }

    fn delete_asset(&self, path: &AssetPath) -> StoreResult<bool> {
        let mut state = self.write()?;
        let existed = state.catalog.remove_file(path).is_some();
        state.dirty.remove(path);
        drop(state);
        if existed {
            self.remove_from_disk(path)?;
        }
        Ok(existed)
    }

    fn add_embedded_object(&self, object: AssetObject, container: &AssetPath) -> StoreResult<()> {
        let mut state = self.write()?;
        state.catalog.embed(object, container)?;
        state.dirty.insert(container.clone());
        Ok(())
    }

    fn create_asset(&self, object: AssetObject, path: &AssetPath) -> StoreResult<()> {
        if self.disk_path(path).exists() && self.read()?.catalog.file(path).is_none() {
            // Present on disk but not yet picked up by a refresh.
            return Err(StoreError::AlreadyExists(path.clone()));
        }
        let mut state = self.write()?;
        state.catalog.create(object, path)?;
        state.dirty.insert(path.clone());
        Ok(())
    }

    fn destroy_immediate(&self, id: &ObjectId) -> StoreResult<bool> {
        let mut state = self.write()?;
        let Some((path, file_removed)) = state.catalog.destroy(id) else {
            return Ok(false);
        };
        if file_removed {
            state.dirty.remove(&path);
            drop(state);
            self.remove_from_disk(&path)?;
        } else {
            state.dirty.insert(path);
        }
        Ok(true)
    }

    fn write_object(&self, object: &AssetObject) -> StoreResult<()> {
        let mut state = self.write()?;
        let path = state.catalog.update(object)?;
        state.dirty.insert(path);
        Ok(())
    }

    fn list_assets(&self, dir: &str) -> StoreResult<Vec<AssetPath>> {
        Ok(self.read()?.catalog.list(dir))
    }

    fn save_assets(&self) -> StoreResult<()> {
        let mut state = self.write()?;
        let dirty = std::mem::take(&mut state.dirty);
        for path in &dirty {
            if let Some(file) = state.catalog.file(path) {
                if let Err(e) = self.write_file(path, file) {
                    // Keep everything not yet written queued for the next save.
                    state.dirty = dirty.range(path..).cloned().collect();
                    return Err(e);
                }
            }
        }
        debug!(files = dirty.len(), "saved assets");
        Ok(())
    }

    fn refresh(&self) -> StoreResult<()> {
        let found = self.scan()?;
        let mut state = self.write()?;

        let mut catalog = Catalog::new();
        for path in &state.dirty {
            if let Some(file) = state.catalog.file(path) {
                catalog.insert_file(path.clone(), file.clone())?;
            }
        }
        for (path, file) in found {
            if state.dirty.contains(&path) {
                continue;
            }
            if let Err(e) = catalog.insert_file(path.clone(), file) {
                warn!(%path, error = %e, "skipping conflicting asset file");
            }
        }

        debug!(files = catalog.len(), pending = state.dirty.len(), "refreshed asset store");
        state.catalog = catalog;
        Ok(())
    }
}

impl std::fmt::Debug for FsAssetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsAssetStore")
            .field("root", &self.root)
            .field("pending_writes", &self.pending_writes())
            .finish()
    }
}
