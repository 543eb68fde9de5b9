use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidId(String),

    #[error("invalid asset path: {path}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("invalid asset name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}
