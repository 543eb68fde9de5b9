//! Finding a free path for an evicted object.
//!
//! Embedded siblings may share a name, but independent assets in one
//! directory may not. The base path is tried first, then the same path with
//! `1`, `2`, ... inserted before the extension.

use sheaf_store::{AssetStore, StoreResult};
use sheaf_types::AssetPath;
use tracing::debug;

/// Outcome of a deduplication search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathChoice {
    /// Nothing exists at this path.
    Free(AssetPath),
    /// Every candidate was taken. `last` is the final candidate that may be
    /// overwritten, or `None` when every candidate was reserved.
    Exhausted {
        last: Option<AssetPath>,
        attempts: u32,
    },
}

/// Try `base`, then `base` with suffixes `1..max_attempts`, returning the
/// first path with no asset at it.
///
/// `max_attempts` counts every candidate, the unsuffixed one included, and
/// is treated as at least 1. Paths in `reserved` always count as taken and
/// are never offered for overwriting.
pub fn deduplicate_path(
    store: &dyn AssetStore,
    base: &AssetPath,
    max_attempts: u32,
    reserved: &[AssetPath],
) -> StoreResult<PathChoice> {
    let max_attempts = max_attempts.max(1);
    let mut last = None;
    for attempt in 0..max_attempts {
        let candidate = if attempt == 0 {
            base.clone()
        } else {
            base.with_stem_suffix(attempt)
        };
        if reserved.contains(&candidate) {
            continue;
        }
        if !store.exists(&candidate)? {
            debug!(%base, path = %candidate, attempt, "found free path");
            return Ok(PathChoice::Free(candidate));
        }
        last = Some(candidate);
    }
    Ok(PathChoice::Exhausted {
        last,
        attempts: max_attempts,
    })
}
