//! Backing asset store for sheaf.
//!
//! The store is a flat, path-keyed collection of backing files. Each backing
//! file holds exactly one *main* object and any number of *embedded*
//! objects. The store tracks where every object lives; higher layers decide
//! when objects move.
//!
//! # Storage Backends
//!
//! All backends implement the [`AssetStore`] trait:
//!
//! - [`InMemoryAssetStore`] -- `BTreeMap`-based store for tests and embedding
//! - [`FsAssetStore`] -- one JSON document per backing file under a root directory
//!
//! # Design Rules
//!
//! 1. An object is stored in exactly one place at a time.
//! 2. A path holds at most one backing file.
//! 3. Deleting a backing file destroys every object embedded in it.
//! 4. `save_assets` makes changes durable; `refresh` makes the durable state
//!    visible to lookups. Callers run both after every mutating sequence.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod catalog;
pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use catalog::{BackingFile, Location};
pub use error::{StoreError, StoreResult};
pub use fs::FsAssetStore;
pub use memory::InMemoryAssetStore;
pub use traits::AssetStore;
