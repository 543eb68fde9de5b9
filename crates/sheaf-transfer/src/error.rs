use sheaf_store::StoreError;
use sheaf_types::{AssetPath, ObjectId, TypeError};
use thiserror::Error;

/// Errors from ownership transfer operations.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The adoption candidate is not an independent top-level asset.
    #[error("cannot adopt {id}: {reason}")]
    InvalidAdoptionSource { id: ObjectId, reason: String },

    /// Every candidate eviction path was taken.
    #[error("no free path for {base} after {attempts} attempts")]
    PathCollision { base: AssetPath, attempts: u32 },

    /// A reference did not resolve to a stored object.
    #[error("reference does not resolve: {0}")]
    OrphanReference(ObjectId),

    /// The object to evict is not embedded in the collection's container.
    #[error("object {id} is not embedded in {container}")]
    NotEmbedded { id: ObjectId, container: AssetPath },

    /// A copy written ahead of removing its original did not read back
    /// intact; the copy was discarded and the original kept.
    #[error("staged copy {id} at {path} does not match what was written")]
    StagedCopyMismatch { id: ObjectId, path: AssetPath },

    /// The container file does not exist.
    #[error("container missing: {0}")]
    ContainerMissing(AssetPath),

    /// Configuration could not be parsed or is invalid.
    #[error("invalid transfer config: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Type(#[from] TypeError),
}

pub type TransferResult<T> = Result<T, TransferError>;
