//! Collection store for sheaf.
//!
//! A [`Collection`] is an ordered list of member slots owned by one object
//! (its *owner*) under a named property. Slots hold object ids or nothing.
//! Every live member is embedded in the backing file that holds the owner.
//!
//! This crate only manages the list. Moving objects in and out of the
//! container file is the transfer engine's job.
//!
//! # Key Types
//!
//! - [`Collection`] -- The slot list plus load/save against an [`AssetStore`]
//! - [`CollectionKey`] -- Identity of a collection (owner + property)
//! - [`RemovalCursor`] -- Iteration cursor that survives removals
//!
//! [`AssetStore`]: sheaf_store::AssetStore

pub mod collection;
pub mod cursor;
pub mod error;

pub use collection::{Collection, CollectionKey};
pub use cursor::RemovalCursor;
pub use error::{CollectionError, CollectionResult};
