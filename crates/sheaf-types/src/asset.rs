use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TypeError;
use crate::id::ObjectId;

/// Suffix the host's duplicator appends to a copied object's name.
pub const HOST_CLONE_SUFFIX: &str = "(Clone)";

/// Remove every occurrence of `suffix` from `name`, including ones formed
/// by an earlier removal.
///
/// ```
/// use sheaf_types::{strip_clone_suffix, HOST_CLONE_SUFFIX};
///
/// assert_eq!(strip_clone_suffix("Item(Clone)", HOST_CLONE_SUFFIX), "Item");
/// assert_eq!(strip_clone_suffix("Item(Clone)(Clone)", HOST_CLONE_SUFFIX), "Item");
/// ```
pub fn strip_clone_suffix(name: &str, suffix: &str) -> String {
    if suffix.is_empty() {
        return name.to_string();
    }
    let mut stripped = name.replace(suffix, "");
    while stripped.contains(suffix) {
        stripped = stripped.replace(suffix, "");
    }
    stripped
}

/// A named, typed object that lives in a backing file.
///
/// Where the object lives (as the main object of its own file, or embedded
/// in a container) is tracked by the store, not by the object itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetObject {
    /// Identity of this object.
    pub id: ObjectId,
    /// Display name; also the basis for file names when the object becomes
    /// independent.
    pub name: String,
    /// Element type name (e.g. `"Weapon"`), used for strategy lookup.
    pub kind: String,
    /// Serialized field values.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl AssetObject {
    /// Create a new object with no fields.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.into(),
            kind: kind.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Read a field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set a field, returning the previous value.
    pub fn set_field(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(key.into(), value)
    }

    /// Deep-copy this object the way the host duplicator does.
    ///
    /// The copy gets a fresh id and `(Clone)` appended to its name. Callers
    /// that want the original name back strip the suffix themselves.
    pub fn instantiate(&self) -> Self {
        Self {
            id: ObjectId::new(),
            name: format!("{}{HOST_CLONE_SUFFIX}", self.name),
            kind: self.kind.clone(),
            fields: self.fields.clone(),
        }
    }

    /// Digest of name, kind, and fields. The id is excluded, so a duplicate
    /// with the same name has the same digest as its source.
    pub fn content_digest(&self) -> Result<ContentDigest, TypeError> {
        #[derive(Serialize)]
        struct Content<'a> {
            name: &'a str,
            kind: &'a str,
            fields: &'a Map<String, Value>,
        }

        let bytes = serde_json::to_vec(&Content {
            name: &self.name,
            kind: &self.kind,
            fields: &self.fields,
        })
        .map_err(|e| TypeError::Serialization(e.to_string()))?;

        let mut hasher = blake3::Hasher::new();
        hasher.update(b"sheaf-asset-v1:");
        hasher.update(&bytes);
        Ok(ContentDigest(*hasher.finalize().as_bytes()))
    }
}

/// BLAKE3 digest of an object's content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({})", self.short_hex())
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn sword() -> AssetObject {
        AssetObject::new("Sword", "Weapon")
            .with_field("damage", json!(12))
            .with_field("tags", json!(["sharp", "iron"]))
    }

    #[test]
    fn instantiate_copies_content_with_new_identity() {
        let original = sword();
        let copy = original.instantiate();
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.name, "Sword(Clone)");
        assert_eq!(copy.kind, original.kind);
        assert_eq!(copy.fields, original.fields);
    }

    #[test]
    fn instantiate_is_deep() {
        let original = sword();
        let mut copy = original.instantiate();
        copy.set_field("damage", json!(99));
        assert_eq!(original.field("damage"), Some(&json!(12)));
    }

    #[test]
    fn digest_ignores_identity() {
        let original = sword();
        let mut copy = original.instantiate();
        copy.name = strip_clone_suffix(&copy.name, HOST_CLONE_SUFFIX);
        assert_eq!(
            original.content_digest().unwrap(),
            copy.content_digest().unwrap()
        );
    }

    #[test]
    fn digest_tracks_content() {
        let a = sword();
        let b = sword().with_field("damage", json!(13));
        assert_ne!(a.content_digest().unwrap(), b.content_digest().unwrap());
    }

    #[test]
    fn strip_handles_suffix_anywhere() {
        assert_eq!(strip_clone_suffix("Item", HOST_CLONE_SUFFIX), "Item");
        assert_eq!(strip_clone_suffix("Item(Clone) 2", HOST_CLONE_SUFFIX), "Item 2");
        assert_eq!(strip_clone_suffix("Item(Clone)", ""), "Item(Clone)");
        assert_eq!(strip_clone_suffix("(Clo(Clone)ne)", HOST_CLONE_SUFFIX), "");
    }

    #[test]
    fn serde_roundtrip() {
        let obj = sword();
        let json = serde_json::to_string(&obj).unwrap();
        let parsed: AssetObject = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, obj);
    }

    proptest! {
        #[test]
        fn stripped_names_never_contain_suffix(name in ".{0,24}", clones in 0usize..4) {
            let mut obj = AssetObject::new(name, "Any");
            for _ in 0..clones {
                obj = obj.instantiate();
            }
            let stripped = strip_clone_suffix(&obj.name, HOST_CLONE_SUFFIX);
            prop_assert!(!stripped.contains(HOST_CLONE_SUFFIX));
        }
    }
}
