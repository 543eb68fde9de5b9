//! The [`Collection`] slot list and its persistence inside the owner object.
//!
//! A collection is stored as one field of its owner:
//!
//! ```text
//! "<property>": { "element_kind": "Weapon", "members": ["0190…", null, …] }
//! ```
//!
//! All list operations are in-memory; `save` writes the list back into the
//! owner through the store.

use std::fmt;

use serde::{Deserialize, Serialize};
use sheaf_store::AssetStore;
use sheaf_types::{AssetObject, AssetPath, ObjectId};
use tracing::debug;

use crate::error::{CollectionError, CollectionResult};

/// Identity of a collection: the owning object plus the property name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollectionKey {
    pub owner: ObjectId,
    pub property: String,
}

impl CollectionKey {
    pub fn new(owner: ObjectId, property: impl Into<String>) -> Self {
        Self {
            owner,
            property: property.into(),
        }
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner.short_id(), self.property)
    }
}

/// On-disk shape of a collection field.
#[derive(Serialize, Deserialize)]
struct CollectionField {
    element_kind: String,
    #[serde(default)]
    members: Vec<Option<ObjectId>>,
}

/// Ordered list of member slots.
///
/// A slot is `None` when it was added empty, when an adoption was rejected,
/// or when its member was destroyed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collection {
    key: CollectionKey,
    element_kind: String,
    slots: Vec<Option<ObjectId>>,
}

impl Collection {
    /// Create an empty, unsaved collection.
    pub fn new(key: CollectionKey, element_kind: impl Into<String>) -> Self {
        Self {
            key,
            element_kind: element_kind.into(),
            slots: Vec::new(),
        }
    }

    /// Create an empty collection on `owner` and save it.
    ///
    /// Fails if the owner already has a field under `property`.
    pub fn init(
        store: &dyn AssetStore,
        owner: ObjectId,
        property: &str,
        element_kind: &str,
    ) -> CollectionResult<Self> {
        let owner_obj = store
            .load_object(&owner)?
            .ok_or(CollectionError::OwnerNotFound(owner))?;
        if owner_obj.field(property).is_some() {
            return Err(CollectionError::MalformedProperty {
                property: property.to_string(),
                reason: "property is already set".into(),
            });
        }
        let collection = Self::new(CollectionKey::new(owner, property), element_kind);
        collection.save(store)?;
        Ok(collection)
    }

    /// Load the collection stored on `owner` under `property`.
    pub fn load(store: &dyn AssetStore, owner: ObjectId, property: &str) -> CollectionResult<Self> {
        let owner_obj = store
            .load_object(&owner)?
            .ok_or(CollectionError::OwnerNotFound(owner))?;
        Self::from_owner(&owner_obj, property)
    }

    /// Decode the collection from an owner object already in hand.
    pub fn from_owner(owner: &AssetObject, property: &str) -> CollectionResult<Self> {
        let value = owner
            .field(property)
            .ok_or_else(|| CollectionError::PropertyMissing {
                owner: owner.id,
                property: property.to_string(),
            })?;
        let field: CollectionField = serde_json::from_value(value.clone()).map_err(|e| {
            CollectionError::MalformedProperty {
                property: property.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            key: CollectionKey::new(owner.id, property),
            element_kind: field.element_kind,
            slots: field.members,
        })
    }

    /// Write the slot list back into the owner object.
    pub fn save(&self, store: &dyn AssetStore) -> CollectionResult<()> {
        let mut owner = store
            .load_object(&self.key.owner)?
            .ok_or(CollectionError::OwnerNotFound(self.key.owner))?;
        let field = CollectionField {
            element_kind: self.element_kind.clone(),
            members: self.slots.clone(),
        };
        let value = serde_json::to_value(&field).map_err(|e| CollectionError::MalformedProperty {
            property: self.key.property.clone(),
            reason: e.to_string(),
        })?;
        owner.set_field(self.key.property.clone(), value);
        store.write_object(&owner)?;
        debug!(collection = %self.key, count = self.slots.len(), "saved collection");
        Ok(())
    }

    pub fn key(&self) -> &CollectionKey {
        &self.key
    }

    /// The object owning this collection.
    pub fn owner(&self) -> ObjectId {
        self.key.owner
    }

    /// Element type name members are expected to have.
    pub fn element_kind(&self) -> &str {
        &self.element_kind
    }

    // ---------------------------------------------------------------
    // List operations
    // ---------------------------------------------------------------

    /// Number of slots, empty ones included.
    pub fn count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Member id at `index`; `None` for empty or out-of-range slots.
    pub fn get(&self, index: usize) -> Option<ObjectId> {
        self.slots.get(index).copied().flatten()
    }

    /// All slots in order.
    pub fn slots(&self) -> &[Option<ObjectId>] {
        &self.slots
    }

    /// Iterate over `(index, slot)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<ObjectId>)> + '_ {
        self.slots.iter().copied().enumerate()
    }

    /// Index of the slot holding `id`.
    pub fn position(&self, id: &ObjectId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.as_ref() == Some(id))
    }

    /// Add a slot at the end. Always succeeds.
    pub fn append(&mut self, slot: Option<ObjectId>) {
        self.slots.push(slot);
    }

    /// Remove the slot at `index`, shifting later slots left.
    ///
    /// Out-of-range indices are a silent no-op returning `None`; otherwise
    /// the removed slot is returned.
    pub fn remove_at(&mut self, index: usize) -> Option<Option<ObjectId>> {
        if index >= self.slots.len() {
            return None;
        }
        Some(self.slots.remove(index))
    }

    /// Replace the slot at `index`, returning the previous slot.
    pub fn set(&mut self, index: usize, slot: Option<ObjectId>) -> CollectionResult<Option<ObjectId>> {
        let len = self.slots.len();
        let current = self
            .slots
            .get_mut(index)
            .ok_or(CollectionError::IndexOutOfRange { index, len })?;
        Ok(std::mem::replace(current, slot))
    }

    /// Remove and return the last slot.
    pub fn pop(&mut self) -> Option<Option<ObjectId>> {
        self.slots.pop()
    }

    // ---------------------------------------------------------------
    // Store-backed reads
    // ---------------------------------------------------------------

    /// Path of the backing file holding the owner, i.e. where members live.
    pub fn container_path(&self, store: &dyn AssetStore) -> CollectionResult<AssetPath> {
        store
            .asset_path(&self.key.owner)?
            .ok_or(CollectionError::OwnerNotFound(self.key.owner))
    }

    /// Resolve the member at `index`.
    ///
    /// A slot whose id no longer resolves, or resolves to an object outside
    /// this collection's container file, is an orphan and reads as empty.
    pub fn resolve(&self, store: &dyn AssetStore, index: usize) -> CollectionResult<Option<AssetObject>> {
        let Some(id) = self.get(index) else {
            return Ok(None);
        };
        let container = self.container_path(store)?;
        match store.location(&id)? {
            Some(loc) if loc.path == container && !loc.is_main => Ok(store.load_object(&id)?),
            _ => {
                debug!(collection = %self.key, index, %id, "orphan reference treated as empty");
                Ok(None)
            }
        }
    }

    /// Indices of slots holding ids that do not resolve to a live member.
    pub fn orphans(&self, store: &dyn AssetStore) -> CollectionResult<Vec<usize>> {
        let mut orphans = Vec::new();
        for (index, slot) in self.iter() {
            if slot.is_some() && self.resolve(store, index)?.is_none() {
                orphans.push(index);
            }
        }
        Ok(orphans)
    }
}
