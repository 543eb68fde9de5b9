//! The in-memory model shared by every backend.
//!
//! A [`Catalog`] maps paths to [`BackingFile`]s and keeps a reverse index
//! from object id to path so ownership checks are O(1). Backends wrap a
//! catalog in a lock and add durability on top.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use sheaf_types::{AssetObject, AssetPath, ObjectId};
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Where an object is stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    /// Path of the backing file holding the object.
    pub path: AssetPath,
    /// `true` for the file's main object, `false` for embedded objects.
    pub is_main: bool,
}

/// One physical asset file: a main object plus embedded objects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackingFile {
    /// The canonical top-level object of the file.
    pub main: AssetObject,
    /// Sub-objects stored inside the file, in insertion order.
    #[serde(default)]
    pub embedded: Vec<AssetObject>,
}

impl BackingFile {
    /// A file holding only `main`.
    pub fn new(main: AssetObject) -> Self {
        Self {
            main,
            embedded: Vec::new(),
        }
    }

    /// Main object first, then embedded objects.
    pub fn objects(&self) -> impl Iterator<Item = &AssetObject> {
        std::iter::once(&self.main).chain(self.embedded.iter())
    }

    /// Find an object in this file by id.
    pub fn get(&self, id: &ObjectId) -> Option<&AssetObject> {
        self.objects().find(|obj| obj.id == *id)
    }

    fn get_mut(&mut self, id: &ObjectId) -> Option<&mut AssetObject> {
        if self.main.id == *id {
            return Some(&mut self.main);
        }
        self.embedded.iter_mut().find(|obj| obj.id == *id)
    }
}

/// Path → file map with an id → path reverse index.
#[derive(Debug, Default)]
pub(crate) struct Catalog {
    files: BTreeMap<AssetPath, BackingFile>,
    index: HashMap<ObjectId, AssetPath>,
}

impl Catalog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.files.len()
    }

    pub(crate) fn file(&self, path: &AssetPath) -> Option<&BackingFile> {
        self.files.get(path)
    }

    pub(crate) fn files(&self) -> impl Iterator<Item = (&AssetPath, &BackingFile)> {
        self.files.iter()
    }

    pub(crate) fn location(&self, id: &ObjectId) -> Option<Location> {
        let path = self.index.get(id)?;
        let file = self.files.get(path)?;
        Some(Location {
            path: path.clone(),
            is_main: file.main.id == *id,
        })
    }

    pub(crate) fn object(&self, id: &ObjectId) -> Option<&AssetObject> {
        let path = self.index.get(id)?;
        self.files.get(path)?.get(id)
    }

    /// Insert a whole backing file, rejecting occupied paths and ids that
    /// are already stored elsewhere.
    pub(crate) fn insert_file(&mut self, path: AssetPath, file: BackingFile) -> StoreResult<()> {
        if self.files.contains_key(&path) {
            return Err(StoreError::AlreadyExists(path));
        }
        for obj in file.objects() {
            self.check_unstored(&obj.id)?;
        }
        let mut seen = std::collections::HashSet::new();
        for obj in file.objects() {
            if !seen.insert(obj.id) {
                return Err(StoreError::CorruptFile {
                    path: path.to_string(),
                    reason: format!("object {} appears twice", obj.id),
                });
            }
        }
        for obj in file.objects() {
            self.index.insert(obj.id, path.clone());
        }
        self.files.insert(path, file);
        Ok(())
    }

    pub(crate) fn create(&mut self, object: AssetObject, path: &AssetPath) -> StoreResult<()> {
        debug!(id = %object.id, %path, "create asset");
        self.insert_file(path.clone(), BackingFile::new(object))
    }

    pub(crate) fn embed(&mut self, object: AssetObject, container: &AssetPath) -> StoreResult<()> {
        self.check_unstored(&object.id)?;
        let file = self
            .files
            .get_mut(container)
            .ok_or_else(|| StoreError::PathNotFound(container.clone()))?;
        debug!(id = %object.id, %container, "embed object");
        self.index.insert(object.id, container.clone());
        file.embedded.push(object);
        Ok(())
    }

    /// Remove a backing file and every object in it.
    pub(crate) fn remove_file(&mut self, path: &AssetPath) -> Option<BackingFile> {
        let file = self.files.remove(path)?;
        for obj in file.objects() {
            self.index.remove(&obj.id);
        }
        debug!(%path, embedded = file.embedded.len(), "delete asset");
        Some(file)
    }

    /// Destroy one object. Returns the path of the file that changed and
    /// whether that whole file went away with it.
    pub(crate) fn destroy(&mut self, id: &ObjectId) -> Option<(AssetPath, bool)> {
        let location = self.location(id)?;
        if location.is_main {
            self.remove_file(&location.path);
            return Some((location.path, true));
        }
        let file = self.files.get_mut(&location.path)?;
        file.embedded.retain(|obj| obj.id != *id);
        self.index.remove(id);
        debug!(%id, path = %location.path, "destroy embedded object");
        Some((location.path, false))
    }

    /// Overwrite a stored object; returns the path of its file.
    pub(crate) fn update(&mut self, object: &AssetObject) -> StoreResult<AssetPath> {
        let path = self
            .index
            .get(&object.id)
            .cloned()
            .ok_or(StoreError::ObjectNotFound(object.id))?;
        let slot = self
            .files
            .get_mut(&path)
            .and_then(|file| file.get_mut(&object.id))
            .ok_or(StoreError::ObjectNotFound(object.id))?;
        *slot = object.clone();
        Ok(path)
    }

    pub(crate) fn list(&self, dir: &str) -> Vec<AssetPath> {
        self.files
            .keys()
            .filter(|path| path.is_under(dir))
            .cloned()
            .collect()
    }

    fn check_unstored(&self, id: &ObjectId) -> StoreResult<()> {
        match self.index.get(id) {
            Some(path) => Err(StoreError::AlreadyStored {
                id: *id,
                path: path.clone(),
            }),
            None => Ok(()),
        }
    }
}
