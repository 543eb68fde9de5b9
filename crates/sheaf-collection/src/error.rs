//! Error types for the collection crate.

use sheaf_types::ObjectId;

/// Errors that can occur during collection operations.
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    /// The object owning the collection is not stored.
    #[error("collection owner not found: {0}")]
    OwnerNotFound(ObjectId),

    /// The owner has no collection under this property.
    #[error("object {owner} has no collection property {property:?}")]
    PropertyMissing { owner: ObjectId, property: String },

    /// The property exists but does not decode as a collection.
    #[error("malformed collection property {property:?}: {reason}")]
    MalformedProperty { property: String, reason: String },

    /// Slot index past the end of the list.
    #[error("slot index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] sheaf_store::StoreError),
}

/// Convenience alias for collection results.
pub type CollectionResult<T> = Result<T, CollectionError>;
