use sheaf_types::{AssetPath, ObjectId, TypeError};

/// Errors from asset store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No backing file exists at the path.
    #[error("no asset at path: {0}")]
    PathNotFound(AssetPath),

    /// The object is not stored anywhere.
    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    /// A backing file already occupies the path.
    #[error("an asset already exists at path: {0}")]
    AlreadyExists(AssetPath),

    /// The object is already stored (possibly in another file).
    #[error("object {id} is already stored in {path}")]
    AlreadyStored { id: ObjectId, path: AssetPath },

    /// A backing file on disk could not be decoded.
    #[error("corrupt asset file {path}: {reason}")]
    CorruptFile { path: String, reason: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid path or name.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock guarding store state was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
