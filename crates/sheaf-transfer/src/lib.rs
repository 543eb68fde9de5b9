//! Ownership transfer engine for sheaf.
//!
//! Objects move between two storage identities:
//!
//! ```text
//! Independent --adopt--> Embedded --evict--> Independent (new path, new id)
//!                        Embedded --container deleted--> Gone
//! ```
//!
//! Adoption consumes the original file; there is no way back to the same
//! independent identity. Eviction always produces a fresh, deduplicated path
//! next to the root file of the collection's container.
//!
//! Every operation runs its own persist + refresh barrier before returning.
//! Multi-step sequences are not transactional: a crash between steps can
//! leave content in neither place unless [`TransferConfig::write_ahead`] is
//! enabled, which writes the new copy before removing the old one.

pub mod config;
pub mod dedup;
pub mod engine;
pub mod error;

pub use config::{CollisionPolicy, TransferConfig};
pub use dedup::{deduplicate_path, PathChoice};
pub use engine::OwnershipTransferEngine;
pub use error::{TransferError, TransferResult};
