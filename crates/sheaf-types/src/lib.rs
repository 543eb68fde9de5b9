//! Foundation types for sheaf.
//!
//! This crate provides the identity, path, and object types shared by every
//! other sheaf crate. Nothing here touches storage: these are plain values.
//!
//! # Key Types
//!
//! - [`ObjectId`] — Identity of one live asset object (UUID v7)
//! - [`AssetPath`] — Validated store-relative path of a backing file
//! - [`AssetObject`] — A named, typed bag of fields that can live either as
//!   the main object of a backing file or embedded inside another one
//! - [`ContentDigest`] — BLAKE3 digest of an object's content (identity excluded)

pub mod asset;
pub mod error;
pub mod id;
pub mod path;

pub use asset::{strip_clone_suffix, AssetObject, ContentDigest, HOST_CLONE_SUFFIX};
pub use error::TypeError;
pub use id::ObjectId;
pub use path::{stem_from_name, AssetPath, DEFAULT_ASSET_EXTENSION};
