use std::sync::Arc;

use sheaf_store::AssetStore;
use sheaf_types::{stem_from_name, strip_clone_suffix, AssetObject, AssetPath, ObjectId};
use tracing::{debug, info, warn};

use crate::config::{CollisionPolicy, TransferConfig};
use crate::dedup::{deduplicate_path, PathChoice};
use crate::error::{TransferError, TransferResult};

/// Moves objects between independent and embedded storage.
///
/// The engine never touches collection slot lists; callers splice the list
/// themselves after `adopt` / `evict` return. It does own the persistence
/// barrier: every mutating operation ends with `save_assets` + `refresh`.
pub struct OwnershipTransferEngine {
    store: Arc<dyn AssetStore>,
    config: TransferConfig,
}

impl std::fmt::Debug for OwnershipTransferEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnershipTransferEngine")
            .field("config", &self.config)
            .finish()
    }
}

impl OwnershipTransferEngine {
    /// Create an engine over `store`.
    pub fn new(store: Arc<dyn AssetStore>, config: TransferConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<dyn AssetStore> {
        &self.store
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    // ---------------------------------------------------------------
    // Adoption
    // ---------------------------------------------------------------

    /// Turn the independent asset `candidate` into an object embedded in
    /// `container`, returning the embedded copy.
    ///
    /// The candidate must be the main object of its own backing file; that
    /// file is deleted. The copy gets a fresh id and the candidate's name
    /// with any clone suffix removed.
    pub fn adopt(&self, candidate: &ObjectId, container: &AssetPath) -> TransferResult<AssetObject> {
        let location = self.store.location(candidate)?;
        let source_path = match location {
            Some(loc) if loc.is_main => loc.path,
            Some(loc) => {
                return Err(self.reject(candidate, format!("already embedded in {}", loc.path)))
            }
            None => return Err(self.reject(candidate, "not a stored asset".into())),
        };
        if source_path == *container {
            return Err(self.reject(candidate, "it is the collection's own container".into()));
        }
        if !self.store.exists(container)? {
            return Err(TransferError::ContainerMissing(container.clone()));
        }

        let original = self
            .store
            .load_object(candidate)?
            .ok_or(TransferError::OrphanReference(*candidate))?;
        let copy = self.sanitized_copy(&original);
        debug!(from = %source_path, to = %container, copy = %copy.id, "adopting");

        if self.config.write_ahead {
            self.store.add_embedded_object(copy.clone(), container)?;
            self.verify_staged(&copy, container)?;
            self.store.delete_asset(&source_path)?;
        } else {
            self.store.delete_asset(&source_path)?;
            self.store.add_embedded_object(copy.clone(), container)?;
        }
        self.store.persist()?;

        info!(name = %copy.name, from = %source_path, into = %container, "adopted asset");
        Ok(copy)
    }

    /// Embed a copy of `member` in `container`, leaving `member` untouched.
    ///
    /// This is the duplicate action; the copy's name drops the clone suffix
    /// like any other copy.
    pub fn duplicate(&self, member: &ObjectId, container: &AssetPath) -> TransferResult<AssetObject> {
        let original = self
            .store
            .load_object(member)?
            .ok_or(TransferError::OrphanReference(*member))?;
        if !self.store.exists(container)? {
            return Err(TransferError::ContainerMissing(container.clone()));
        }
        let copy = self.sanitized_copy(&original);
        self.store.add_embedded_object(copy.clone(), container)?;
        self.store.persist()?;

        info!(name = %copy.name, source = %member, into = %container, "duplicated member");
        Ok(copy)
    }

    // ---------------------------------------------------------------
    // Eviction
    // ---------------------------------------------------------------

    /// Turn the embedded `member` of the collection owned by `owner` into a
    /// new independent asset, returning its path.
    ///
    /// The new file goes next to the root file of the owner's container,
    /// named after the member, with a numeric suffix if that path is taken.
    /// The member's slot in the collection is left for the caller to remove.
    pub fn evict(&self, member: &ObjectId, owner: &ObjectId) -> TransferResult<AssetPath> {
        let container = self
            .store
            .asset_path(owner)?
            .ok_or(TransferError::OrphanReference(*owner))?;
        match self.store.location(member)? {
            Some(loc) if loc.path == container && !loc.is_main => {}
            _ => {
                return Err(TransferError::NotEmbedded {
                    id: *member,
                    container,
                })
            }
        }

        let original = self
            .store
            .load_object(member)?
            .ok_or(TransferError::OrphanReference(*member))?;
        let copy = self.sanitized_copy(&original);

        let main = self.resolve_main_asset(owner)?;
        let main_path = self
            .store
            .asset_path(&main.id)?
            .ok_or(TransferError::OrphanReference(main.id))?;
        let base = self.eviction_target(&main_path, &copy.name)?;
        // The collection's own files are never eviction targets, even when
        // overwriting is allowed.
        let reserved = [main_path.clone(), container.clone()];
        let target = self.choose_path(&base, &reserved)?;
        debug!(member = %member, from = %container, to = %target, "evicting");

        if self.config.write_ahead {
            self.create_at(copy.clone(), &target)?;
            self.verify_staged(&copy, &target)?;
            self.store.destroy_immediate(member)?;
        } else {
            self.store.destroy_immediate(member)?;
            self.create_at(copy, &target)?;
        }
        self.store.persist()?;

        info!(from = %container, to = %target, "evicted member");
        Ok(target)
    }

    /// The main object of the backing file holding `owner`.
    ///
    /// When the collection sits on an embedded object (a collection nested
    /// in another collection), this is the root file's main object, not
    /// `owner` itself.
    pub fn resolve_main_asset(&self, owner: &ObjectId) -> TransferResult<AssetObject> {
        let path = self
            .store
            .asset_path(owner)?
            .ok_or(TransferError::OrphanReference(*owner))?;
        if self.store.is_main_asset(owner)? {
            return self
                .store
                .load_object(owner)?
                .ok_or(TransferError::OrphanReference(*owner));
        }
        self.store
            .load_main_asset_at_path(&path)?
            .ok_or(TransferError::ContainerMissing(path))
    }

    /// Undeduplicated eviction path: the main asset's directory, the name
    /// without clone suffix, and the configured extension.
    pub fn eviction_target(&self, main_path: &AssetPath, name: &str) -> TransferResult<AssetPath> {
        let stem = stem_from_name(&strip_clone_suffix(name, &self.config.clone_suffix))?;
        Ok(AssetPath::join(
            main_path.parent(),
            &stem,
            &self.config.asset_extension,
        )?)
    }

    // ---------------------------------------------------------------
    // Rename
    // ---------------------------------------------------------------

    /// Rename a stored object in place.
    ///
    /// No deduplication: embedded siblings may share a name. Uniqueness is
    /// only enforced when an object becomes independent.
    pub fn rename(&self, id: &ObjectId, new_name: &str) -> TransferResult<()> {
        let mut object = self
            .store
            .load_object(id)?
            .ok_or(TransferError::OrphanReference(*id))?;
        debug!(%id, from = %object.name, to = new_name, "renaming");
        object.name = new_name.to_string();
        self.store.write_object(&object)?;
        self.store.persist()?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------

    fn sanitized_copy(&self, original: &AssetObject) -> AssetObject {
        let mut copy = original.instantiate();
        copy.name = strip_clone_suffix(&copy.name, &self.config.clone_suffix);
        copy
    }

    fn choose_path(&self, base: &AssetPath, reserved: &[AssetPath]) -> TransferResult<AssetPath> {
        let choice = deduplicate_path(
            self.store.as_ref(),
            base,
            self.config.max_dedup_attempts,
            reserved,
        )?;
        match (choice, self.config.collision_policy) {
            (PathChoice::Free(path), _) => Ok(path),
            (PathChoice::Exhausted { last: Some(last), attempts }, CollisionPolicy::BestEffort) => {
                warn!(%base, path = %last, attempts, "no free eviction path; overwriting");
                Ok(last)
            }
            (PathChoice::Exhausted { attempts, .. }, _) => {
                warn!(%base, attempts, "no free eviction path");
                Err(TransferError::PathCollision {
                    base: base.clone(),
                    attempts,
                })
            }
        }
    }

    /// Check that `expected` reads back unchanged before its original is
    /// removed. On mismatch the staged copy is destroyed.
    fn verify_staged(&self, expected: &AssetObject, path: &AssetPath) -> TransferResult<()> {
        let want = expected.content_digest()?;
        let stored = self.store.load_object(&expected.id)?;
        let got = stored.as_ref().map(AssetObject::content_digest).transpose()?;
        if got == Some(want) {
            debug!(id = %expected.id, %path, digest = %want.short_hex(), "staged copy verified");
            return Ok(());
        }
        warn!(id = %expected.id, %path, "staged copy does not match; keeping original");
        self.store.destroy_immediate(&expected.id)?;
        Err(TransferError::StagedCopyMismatch {
            id: expected.id,
            path: path.clone(),
        })
    }

    fn create_at(&self, object: AssetObject, path: &AssetPath) -> TransferResult<()> {
        if self.config.collision_policy == CollisionPolicy::BestEffort && self.store.exists(path)? {
            self.store.delete_asset(path)?;
        }
        self.store.create_asset(object, path)?;
        Ok(())
    }

    fn reject(&self, id: &ObjectId, reason: String) -> TransferError {
        warn!(%id, %reason, "adoption rejected");
        TransferError::InvalidAdoptionSource { id: *id, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use sheaf_collection::Collection;
    use sheaf_store::{FsAssetStore, InMemoryAssetStore};

    fn path(s: &str) -> AssetPath {
        AssetPath::parse(s).unwrap()
    }

    struct Fixture {
        store: Arc<InMemoryAssetStore>,
        engine: OwnershipTransferEngine,
        owner: ObjectId,
        container: AssetPath,
    }

    fn fixture_with(config: TransferConfig) -> Fixture {
        let store = Arc::new(InMemoryAssetStore::new());
        let owner = AssetObject::new("Collection", "Inventory");
        let owner_id = owner.id;
        store.create_asset(owner, &path("/A/Collection.asset")).unwrap();
        let engine = OwnershipTransferEngine::new(store.clone(), config);
        Fixture {
            store,
            engine,
            owner: owner_id,
            container: path("/A/Collection.asset"),
        }
    }

    fn fixture() -> Fixture {
        fixture_with(TransferConfig::default())
    }

    fn independent(store: &InMemoryAssetStore, p: &str, name: &str) -> ObjectId {
        let obj = AssetObject::new(name, "Weapon").with_field("damage", json!(5));
        let id = obj.id;
        store.create_asset(obj, &path(p)).unwrap();
        id
    }

    // -----------------------------------------------------------------------
    // Adoption
    // -----------------------------------------------------------------------

    #[test]
    fn adopt_embeds_copy_and_consumes_original() {
        let fx = fixture();
        let candidate = independent(&fx.store, "/B/Item.asset", "Item");

        let member = fx.engine.adopt(&candidate, &fx.container).unwrap();

        assert_ne!(member.id, candidate);
        assert_eq!(member.name, "Item");
        assert_eq!(member.field("damage"), Some(&json!(5)));
        assert!(!fx.store.exists(&path("/B/Item.asset")).unwrap());
        assert!(fx.store.load_object(&candidate).unwrap().is_none());
        assert!(!fx.store.is_main_asset(&member.id).unwrap());
        assert_eq!(fx.store.asset_path(&member.id).unwrap(), Some(fx.container.clone()));
    }

    #[test]
    fn adopt_strips_clone_suffix() {
        let fx = fixture();
        let candidate = independent(&fx.store, "B/Item(Clone).asset", "Item(Clone)");
        let member = fx.engine.adopt(&candidate, &fx.container).unwrap();
        assert_eq!(member.name, "Item");
    }

    #[test]
    fn adopt_rejects_embedded_candidate() {
        let fx = fixture();
        let candidate = independent(&fx.store, "B/Item.asset", "Item");
        let member = fx.engine.adopt(&candidate, &fx.container).unwrap();
        let before = fx.store.embedded_objects(&fx.container).unwrap();

        let err = fx.engine.adopt(&member.id, &fx.container).unwrap_err();
        assert!(matches!(err, TransferError::InvalidAdoptionSource { .. }));
        assert_eq!(fx.store.embedded_objects(&fx.container).unwrap(), before);
    }

    #[test]
    fn adopt_rejects_unknown_and_self() {
        let fx = fixture();
        assert!(matches!(
            fx.engine.adopt(&ObjectId::new(), &fx.container),
            Err(TransferError::InvalidAdoptionSource { .. })
        ));
        assert!(matches!(
            fx.engine.adopt(&fx.owner, &fx.container),
            Err(TransferError::InvalidAdoptionSource { .. })
        ));
        assert!(fx.store.exists(&fx.container).unwrap());
    }

    #[test]
    fn adopt_into_missing_container_keeps_candidate() {
        let fx = fixture();
        let candidate = independent(&fx.store, "B/Item.asset", "Item");
        let err = fx.engine.adopt(&candidate, &path("Z/None.asset")).unwrap_err();
        assert!(matches!(err, TransferError::ContainerMissing(_)));
        assert!(fx.store.exists(&path("B/Item.asset")).unwrap());
    }

    #[test]
    fn adopt_runs_persistence_barrier() {
        let fx = fixture();
        let candidate = independent(&fx.store, "B/Item.asset", "Item");
        fx.engine.adopt(&candidate, &fx.container).unwrap();
        assert_eq!(fx.store.save_count(), 1);
        assert_eq!(fx.store.refresh_count(), 1);
    }

    #[test]
    fn write_ahead_adopt_has_same_outcome() {
        let fx = fixture_with(TransferConfig {
            write_ahead: true,
            ..Default::default()
        });
        let candidate = independent(&fx.store, "B/Item.asset", "Item");
        let member = fx.engine.adopt(&candidate, &fx.container).unwrap();
        assert!(!fx.store.exists(&path("B/Item.asset")).unwrap());
        assert_eq!(fx.store.asset_path(&member.id).unwrap(), Some(fx.container.clone()));
    }

    // -----------------------------------------------------------------------
    // Duplicate
    // -----------------------------------------------------------------------

    #[test]
    fn duplicate_keeps_source() {
        let fx = fixture();
        let candidate = independent(&fx.store, "B/Item.asset", "Item");
        let member = fx.engine.adopt(&candidate, &fx.container).unwrap();

        let copy = fx.engine.duplicate(&member.id, &fx.container).unwrap();
        assert_ne!(copy.id, member.id);
        assert_eq!(copy.name, "Item");
        assert!(fx.store.load_object(&member.id).unwrap().is_some());
        assert_eq!(fx.store.embedded_objects(&fx.container).unwrap().len(), 2);
    }

    // -----------------------------------------------------------------------
    // Eviction
    // -----------------------------------------------------------------------

    #[test]
    fn concrete_adopt_evict_scenario() {
        let fx = fixture();
        let candidate = independent(&fx.store, "/B/Item.asset", "Item");
        let member = fx.engine.adopt(&candidate, &fx.container).unwrap();

        let evicted = fx.engine.evict(&member.id, &fx.owner).unwrap();
        assert_eq!(evicted, path("/A/Item.asset"));
        assert!(fx.store.load_object(&member.id).unwrap().is_none());
        assert!(fx.store.embedded_objects(&fx.container).unwrap().is_empty());

        let fresh = fx.store.load_main_asset_at_path(&evicted).unwrap().unwrap();
        assert_eq!(fresh.name, "Item");
        assert_eq!(fresh.field("damage"), Some(&json!(5)));
    }

    #[test]
    fn evict_into_occupied_path_gets_suffix() {
        let fx = fixture();
        independent(&fx.store, "/A/Item.asset", "Existing");
        let candidate = independent(&fx.store, "/B/Item.asset", "Item");
        let member = fx.engine.adopt(&candidate, &fx.container).unwrap();

        let evicted = fx.engine.evict(&member.id, &fx.owner).unwrap();
        assert_eq!(evicted, path("/A/Item1.asset"));
    }

    #[test]
    fn three_same_named_members_get_distinct_paths() {
        let fx = fixture();
        let mut members = Vec::new();
        for dir in ["B", "C", "D"] {
            let candidate = independent(&fx.store, &format!("{dir}/X.asset"), "X");
            members.push(fx.engine.adopt(&candidate, &fx.container).unwrap());
        }

        let paths: Vec<AssetPath> = members
            .iter()
            .map(|m| fx.engine.evict(&m.id, &fx.owner).unwrap())
            .collect();
        assert_eq!(
            paths,
            vec![path("A/X.asset"), path("A/X1.asset"), path("A/X2.asset")]
        );
    }

    #[test]
    fn evict_strips_clone_suffix_from_name_and_path() {
        let fx = fixture();
        let candidate = independent(&fx.store, "B/Item.asset", "Item");
        let member = fx.engine.adopt(&candidate, &fx.container).unwrap();
        fx.engine.rename(&member.id, "Blade(Clone)").unwrap();

        let evicted = fx.engine.evict(&member.id, &fx.owner).unwrap();
        assert_eq!(evicted, path("A/Blade.asset"));
        let fresh = fx.store.load_main_asset_at_path(&evicted).unwrap().unwrap();
        assert_eq!(fresh.name, "Blade");
    }

    #[test]
    fn evict_from_nested_collection_lands_next_to_root_file() {
        let fx = fixture();
        // A nested collection owner embedded in the root container.
        let nested_owner = AssetObject::new("Nested", "Inventory");
        let nested_id = nested_owner.id;
        fx.store
            .add_embedded_object(nested_owner, &fx.container)
            .unwrap();

        let main = fx.engine.resolve_main_asset(&nested_id).unwrap();
        assert_eq!(main.id, fx.owner);

        let candidate = independent(&fx.store, "B/Deep/Gem.asset", "Gem");
        let member = fx.engine.adopt(&candidate, &fx.container).unwrap();
        let evicted = fx.engine.evict(&member.id, &nested_id).unwrap();
        assert_eq!(evicted, path("A/Gem.asset"));
    }

    #[test]
    fn evict_rejects_non_members() {
        let fx = fixture();
        let stray = independent(&fx.store, "B/Item.asset", "Item");
        let err = fx.engine.evict(&stray, &fx.owner).unwrap_err();
        assert!(matches!(err, TransferError::NotEmbedded { .. }));
        assert!(fx.store.exists(&path("B/Item.asset")).unwrap());
    }

    #[test]
    fn exhausted_dedup_fails_without_losing_member() {
        let fx = fixture_with(TransferConfig {
            max_dedup_attempts: 2,
            ..Default::default()
        });
        independent(&fx.store, "A/X.asset", "X");
        independent(&fx.store, "A/X1.asset", "X");
        let candidate = independent(&fx.store, "B/X.asset", "X");
        let member = fx.engine.adopt(&candidate, &fx.container).unwrap();

        let err = fx.engine.evict(&member.id, &fx.owner).unwrap_err();
        assert!(matches!(err, TransferError::PathCollision { attempts: 2, .. }));
        assert!(fx.store.load_object(&member.id).unwrap().is_some());
    }

    #[test]
    fn best_effort_overwrites_last_candidate() {
        let fx = fixture_with(TransferConfig {
            max_dedup_attempts: 2,
            collision_policy: CollisionPolicy::BestEffort,
            ..Default::default()
        });
        independent(&fx.store, "A/X.asset", "X");
        let squatter = independent(&fx.store, "A/X1.asset", "X");
        let candidate = independent(&fx.store, "B/X.asset", "X");
        let member = fx.engine.adopt(&candidate, &fx.container).unwrap();

        let evicted = fx.engine.evict(&member.id, &fx.owner).unwrap();
        assert_eq!(evicted, path("A/X1.asset"));
        assert!(fx.store.load_object(&squatter).unwrap().is_none());
        assert!(fx.store.load_object(&member.id).unwrap().is_none());
    }

    #[test]
    fn write_ahead_evict_has_same_outcome() {
        let fx = fixture_with(TransferConfig {
            write_ahead: true,
            ..Default::default()
        });
        let candidate = independent(&fx.store, "B/Item.asset", "Item");
        let member = fx.engine.adopt(&candidate, &fx.container).unwrap();
        let evicted = fx.engine.evict(&member.id, &fx.owner).unwrap();
        assert_eq!(evicted, path("A/Item.asset"));
        assert!(fx.store.embedded_objects(&fx.container).unwrap().is_empty());
    }

    #[test]
    fn evict_then_adopt_round_trips_content() {
        let fx = fixture();
        let candidate = independent(&fx.store, "B/Item.asset", "Item");
        let member = fx.engine.adopt(&candidate, &fx.container).unwrap();
        let digest = member.content_digest().unwrap();

        let evicted = fx.engine.evict(&member.id, &fx.owner).unwrap();
        let independent_obj = fx.store.load_main_asset_at_path(&evicted).unwrap().unwrap();
        let readopted = fx.engine.adopt(&independent_obj.id, &fx.container).unwrap();

        assert_eq!(readopted.content_digest().unwrap(), digest);
        assert_eq!(fx.store.asset_path(&readopted.id).unwrap(), Some(fx.container.clone()));
    }

    #[test]
    fn best_effort_never_overwrites_the_collection_file() {
        let store = Arc::new(InMemoryAssetStore::new());
        let owner = AssetObject::new("Item19", "Inventory");
        let owner_id = owner.id;
        let container = path("A/Item19.asset");
        store.create_asset(owner, &container).unwrap();
        independent(&store, "A/Item.asset", "Item");
        for n in 1..=18 {
            independent(&store, &format!("A/Item{n}.asset"), "Item");
        }
        let engine = OwnershipTransferEngine::new(
            store.clone(),
            TransferConfig {
                collision_policy: CollisionPolicy::BestEffort,
                ..Default::default()
            },
        );
        let sibling = engine
            .adopt(&independent(&store, "B/Other.asset", "Other"), &container)
            .unwrap();
        let member = engine
            .adopt(&independent(&store, "B/Item.asset", "Item"), &container)
            .unwrap();

        let evicted = engine.evict(&member.id, &owner_id).unwrap();
        assert_eq!(evicted, path("A/Item18.asset"));
        assert_eq!(store.asset_path(&owner_id).unwrap(), Some(container.clone()));
        assert!(store.load_object(&sibling.id).unwrap().is_some());
        assert_eq!(store.load_main_asset_at_path(&container).unwrap().unwrap().id, owner_id);
    }

    #[test]
    fn best_effort_fails_when_only_the_collection_file_is_left() {
        let store = Arc::new(InMemoryAssetStore::new());
        let owner = AssetObject::new("Item", "Inventory");
        let owner_id = owner.id;
        let container = path("A/Item.asset");
        store.create_asset(owner, &container).unwrap();
        let engine = OwnershipTransferEngine::new(
            store.clone(),
            TransferConfig {
                max_dedup_attempts: 1,
                collision_policy: CollisionPolicy::BestEffort,
                ..Default::default()
            },
        );
        let member = engine
            .adopt(&independent(&store, "B/Item.asset", "Item"), &container)
            .unwrap();

        let err = engine.evict(&member.id, &owner_id).unwrap_err();
        assert!(matches!(err, TransferError::PathCollision { attempts: 1, .. }));
        assert!(store.load_object(&owner_id).unwrap().is_some());
        assert!(store.load_object(&member.id).unwrap().is_some());
    }

    // -----------------------------------------------------------------------
    // Staged write verification
    // -----------------------------------------------------------------------

    /// Store that alters every object it embeds or creates once armed, so
    /// staged copies never read back intact.
    struct Garbling {
        inner: InMemoryAssetStore,
        armed: std::sync::atomic::AtomicBool,
    }

    impl Garbling {
        fn new() -> Self {
            Self {
                inner: InMemoryAssetStore::new(),
                armed: std::sync::atomic::AtomicBool::new(false),
            }
        }

        fn arm(&self) {
            self.armed.store(true, std::sync::atomic::Ordering::SeqCst);
        }

        fn garble(&self, mut object: AssetObject) -> AssetObject {
            if self.armed.load(std::sync::atomic::Ordering::SeqCst) {
                object.set_field("damage", json!(-1));
            }
            object
        }
    }

    impl AssetStore for Garbling {
        fn location(&self, id: &ObjectId) -> sheaf_store::StoreResult<Option<sheaf_store::Location>> {
            self.inner.location(id)
        }
        fn load_object(&self, id: &ObjectId) -> sheaf_store::StoreResult<Option<AssetObject>> {
            self.inner.load_object(id)
        }
        fn load_main_asset_at_path(&self, path: &AssetPath) -> sheaf_store::StoreResult<Option<AssetObject>> {
            self.inner.load_main_asset_at_path(path)
        }
        fn load_asset_at_path(
            &self,
            path: &AssetPath,
            kind: Option<&str>,
        ) -> sheaf_store::StoreResult<Option<AssetObject>> {
            self.inner.load_asset_at_path(path, kind)
        }
        fn embedded_objects(&self, path: &AssetPath) -> sheaf_store::StoreResult<Vec<AssetObject>> {
            self.inner.embedded_objects(path)
        }
        fn delete_asset(&self, path: &AssetPath) -> sheaf_store::StoreResult<bool> {
            self.inner.delete_asset(path)
        }
        fn add_embedded_object(&self, object: AssetObject, container: &AssetPath) -> sheaf_store::StoreResult<()> {
            self.inner.add_embedded_object(self.garble(object), container)
        }
        fn create_asset(&self, object: AssetObject, path: &AssetPath) -> sheaf_store::StoreResult<()> {
            self.inner.create_asset(self.garble(object), path)
        }
        fn destroy_immediate(&self, id: &ObjectId) -> sheaf_store::StoreResult<bool> {
            self.inner.destroy_immediate(id)
        }
        fn write_object(&self, object: &AssetObject) -> sheaf_store::StoreResult<()> {
            self.inner.write_object(object)
        }
        fn list_assets(&self, dir: &str) -> sheaf_store::StoreResult<Vec<AssetPath>> {
            self.inner.list_assets(dir)
        }
        fn save_assets(&self) -> sheaf_store::StoreResult<()> {
            self.inner.save_assets()
        }
        fn refresh(&self) -> sheaf_store::StoreResult<()> {
            self.inner.refresh()
        }
    }

    fn write_ahead() -> TransferConfig {
        TransferConfig {
            write_ahead: true,
            ..Default::default()
        }
    }

    #[test]
    fn write_ahead_adopt_keeps_original_when_copy_is_damaged() {
        let store = Arc::new(Garbling::new());
        store
            .create_asset(AssetObject::new("Collection", "Inventory"), &path("A/Collection.asset"))
            .unwrap();
        let candidate = AssetObject::new("Item", "Weapon").with_field("damage", json!(5));
        let candidate_id = candidate.id;
        store.create_asset(candidate, &path("B/Item.asset")).unwrap();
        store.arm();

        let engine = OwnershipTransferEngine::new(store.clone(), write_ahead());
        let err = engine.adopt(&candidate_id, &path("A/Collection.asset")).unwrap_err();

        assert!(matches!(err, TransferError::StagedCopyMismatch { .. }));
        assert!(store.exists(&path("B/Item.asset")).unwrap());
        assert!(store.embedded_objects(&path("A/Collection.asset")).unwrap().is_empty());
    }

    #[test]
    fn write_ahead_evict_keeps_member_when_copy_is_damaged() {
        let store = Arc::new(Garbling::new());
        let owner = AssetObject::new("Collection", "Inventory");
        let owner_id = owner.id;
        store.create_asset(owner, &path("A/Collection.asset")).unwrap();
        let member = AssetObject::new("Item", "Weapon").with_field("damage", json!(5));
        let member_id = member.id;
        store
            .add_embedded_object(member, &path("A/Collection.asset"))
            .unwrap();
        store.arm();

        let engine = OwnershipTransferEngine::new(store.clone(), write_ahead());
        let err = engine.evict(&member_id, &owner_id).unwrap_err();

        assert!(matches!(err, TransferError::StagedCopyMismatch { .. }));
        assert!(!store.exists(&path("A/Item.asset")).unwrap());
        assert!(store.load_object(&member_id).unwrap().is_some());
    }

    // -----------------------------------------------------------------------
    // Rename
    // -----------------------------------------------------------------------

    #[test]
    fn rename_allows_duplicate_sibling_names() {
        let fx = fixture();
        let a = fx
            .engine
            .adopt(&independent(&fx.store, "B/A.asset", "A"), &fx.container)
            .unwrap();
        let b = fx
            .engine
            .adopt(&independent(&fx.store, "B/B.asset", "B"), &fx.container)
            .unwrap();

        fx.engine.rename(&b.id, "A").unwrap();
        let names: Vec<String> = fx
            .store
            .embedded_objects(&fx.container)
            .unwrap()
            .into_iter()
            .map(|o| o.name)
            .collect();
        assert_eq!(names, vec!["A", "A"]);
        assert!(fx.store.load_object(&a.id).unwrap().is_some());
    }

    #[test]
    fn rename_unknown_is_orphan() {
        let fx = fixture();
        assert!(matches!(
            fx.engine.rename(&ObjectId::new(), "x"),
            Err(TransferError::OrphanReference(_))
        ));
    }

    // -----------------------------------------------------------------------
    // Filesystem backend end to end
    // -----------------------------------------------------------------------

    #[test]
    fn adopt_and_evict_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FsAssetStore::open(dir.path()).unwrap());
        let owner = AssetObject::new("Collection", "Inventory");
        let owner_id = owner.id;
        store.create_asset(owner, &path("A/Collection.asset")).unwrap();
        store
            .create_asset(AssetObject::new("Item", "Weapon"), &path("B/Item.asset"))
            .unwrap();
        store.persist().unwrap();
        let candidate = store
            .load_main_asset_at_path(&path("B/Item.asset"))
            .unwrap()
            .unwrap();

        let engine = OwnershipTransferEngine::new(store.clone(), TransferConfig::default());
        let mut coll = Collection::init(store.as_ref(), owner_id, "items", "Weapon").unwrap();
        let member = engine.adopt(&candidate.id, &path("A/Collection.asset")).unwrap();
        coll.append(Some(member.id));
        coll.save(store.as_ref()).unwrap();
        store.persist().unwrap();

        assert!(!dir.path().join("B").join("Item.asset").exists());

        let evicted = engine.evict(&member.id, &owner_id).unwrap();
        let index = coll.position(&member.id).unwrap();
        coll.remove_at(index);
        coll.save(store.as_ref()).unwrap();
        store.persist().unwrap();

        assert_eq!(evicted, path("A/Item.asset"));
        assert!(dir.path().join("A").join("Item.asset").is_file());
        let reopened = FsAssetStore::open(dir.path()).unwrap();
        assert!(reopened.embedded_objects(&path("A/Collection.asset")).unwrap().is_empty());
        let loaded = Collection::load(&reopened, owner_id, "items").unwrap();
        assert!(loaded.is_empty());
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    #[derive(Clone, Debug)]
    enum Op {
        Adopt(u8),
        Evict(u8),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![(0u8..3).prop_map(Op::Adopt), (0u8..8).prop_map(Op::Evict)]
    }

    proptest! {
        #[test]
        fn independent_paths_stay_unique_and_members_stay_exclusive(ops in proptest::collection::vec(op(), 1..24)) {
            let fx = fixture();
            let names = ["X", "Y", "X(Clone)"];
            let mut members: Vec<ObjectId> = Vec::new();
            let mut counter = 0u32;
            let mut evictions = 0usize;

            for op in ops {
                match op {
                    Op::Adopt(n) => {
                        counter += 1;
                        let name = names[n as usize];
                        let p = format!("In/{counter}/{}.asset", strip_clone_suffix(name, "(Clone)"));
                        let id = independent(&fx.store, &p, name);
                        let member = fx.engine.adopt(&id, &fx.container).unwrap();
                        prop_assert!(!member.name.contains("(Clone)"));
                        members.push(member.id);
                    }
                    Op::Evict(i) if !members.is_empty() => {
                        let member = members.remove(i as usize % members.len());
                        let target = fx.engine.evict(&member, &fx.owner).unwrap();
                        let fresh = fx.store.load_main_asset_at_path(&target).unwrap().unwrap();
                        prop_assert!(!fresh.name.contains("(Clone)"));
                        evictions += 1;
                    }
                    Op::Evict(_) => {}
                }

                // Every remaining member is embedded exactly in the container.
                for id in &members {
                    let loc = fx.store.location(id).unwrap().unwrap();
                    prop_assert_eq!(&loc.path, &fx.container);
                    prop_assert!(!loc.is_main);
                }
                prop_assert_eq!(fx.store.embedded_objects(&fx.container).unwrap().len(), members.len());

                // One new file per eviction: nothing was overwritten.
                prop_assert_eq!(fx.store.list_assets("A").unwrap().len(), 1 + evictions);
            }
        }
    }
}
