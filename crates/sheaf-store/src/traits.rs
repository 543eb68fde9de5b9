use sheaf_types::{AssetObject, AssetPath, ObjectId};

use crate::catalog::Location;
use crate::error::StoreResult;

/// Path-keyed backing store for asset objects.
///
/// All implementations must satisfy these invariants:
/// - An object id is stored in at most one backing file, either as that
///   file's main object or embedded in it.
/// - A path holds at most one backing file, and every backing file has
///   exactly one main object.
/// - Deleting a backing file (or destroying its main object) destroys
///   every object embedded in it.
/// - Mutations become durable on `save_assets` and visible to fresh
///   lookups after `refresh`.
pub trait AssetStore: Send + Sync {
    /// Where an object is stored, or `None` if it is not stored.
    fn location(&self, id: &ObjectId) -> StoreResult<Option<Location>>;

    /// Resolve an object reference.
    ///
    /// Returns `Ok(None)` for references that no longer resolve.
    fn load_object(&self, id: &ObjectId) -> StoreResult<Option<AssetObject>>;

    /// The main object of the backing file at `path`.
    fn load_main_asset_at_path(&self, path: &AssetPath) -> StoreResult<Option<AssetObject>>;

    /// First object at `path` whose kind matches, main object first.
    ///
    /// `kind = None` matches any object; this is the existence check.
    fn load_asset_at_path(
        &self,
        path: &AssetPath,
        kind: Option<&str>,
    ) -> StoreResult<Option<AssetObject>>;

    /// Objects embedded in the backing file at `path`, in insertion order.
    fn embedded_objects(&self, path: &AssetPath) -> StoreResult<Vec<AssetObject>>;

    /// Delete the backing file at `path`, cascading to embedded objects.
    ///
    /// Returns `true` if a file existed.
    fn delete_asset(&self, path: &AssetPath) -> StoreResult<bool>;

    /// Embed `object` in the existing backing file at `container`.
    fn add_embedded_object(&self, object: AssetObject, container: &AssetPath) -> StoreResult<()>;

    /// Create a new backing file at `path` with `object` as its main object.
    fn create_asset(&self, object: AssetObject, path: &AssetPath) -> StoreResult<()>;

    /// Destroy a single object right away.
    ///
    /// Destroying a main object deletes its whole backing file. Returns
    /// `true` if the object existed.
    fn destroy_immediate(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Replace the stored state of an existing object, in place.
    fn write_object(&self, object: &AssetObject) -> StoreResult<()>;

    /// Every backing file path under `dir` (recursively), sorted.
    fn list_assets(&self, dir: &str) -> StoreResult<Vec<AssetPath>>;

    /// Make pending changes durable.
    fn save_assets(&self) -> StoreResult<()>;

    /// Make the durable state visible to subsequent lookups.
    fn refresh(&self) -> StoreResult<()>;

    /// Returns `true` if the object is the main object of its backing file.
    fn is_main_asset(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.location(id)?.is_some_and(|loc| loc.is_main))
    }

    /// Path of the backing file holding the object.
    fn asset_path(&self, id: &ObjectId) -> StoreResult<Option<AssetPath>> {
        Ok(self.location(id)?.map(|loc| loc.path))
    }

    /// Returns `true` if a backing file exists at `path`.
    fn exists(&self, path: &AssetPath) -> StoreResult<bool> {
        Ok(self.load_asset_at_path(path, None)?.is_some())
    }

    /// `save_assets` followed by `refresh`.
    fn persist(&self) -> StoreResult<()> {
        self.save_assets()?;
        self.refresh()
    }
}
