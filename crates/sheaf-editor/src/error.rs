use sheaf_collection::CollectionError;
use sheaf_store::StoreError;
use sheaf_transfer::TransferError;

/// Errors that abort an editor operation.
///
/// Rejected user actions are not errors; they come back as warnings in
/// [`EditorOutcome`](crate::EditorOutcome).
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("collection error: {0}")]
    Collection(#[from] CollectionError),

    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid editor config: {0}")]
    Config(String),
}

pub type EditorResult<T> = Result<T, EditorError>;
