//! Store-relative paths of backing files.
//!
//! Valid asset paths:
//! - Must be non-empty
//! - Use `/` as the only separator (a single leading `/` is accepted and dropped)
//! - Must not contain `\`, control characters, or `..` components
//! - Must not contain empty components (`a//b`, trailing `/`)
//! - The file name must have a non-empty stem and an extension

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Extension used for independent assets unless configured otherwise.
pub const DEFAULT_ASSET_EXTENSION: &str = ".asset";

/// Characters that may not appear in a file stem derived from an object name.
const FORBIDDEN_STEM_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Path of a backing file, relative to the asset store root.
///
/// The path is a weak reference: holding one says nothing about whether a
/// file exists there. Ordering is lexicographic, which keeps directory
/// listings stable.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetPath(String);

impl AssetPath {
    /// Parse and validate a path.
    ///
    /// ```
    /// use sheaf_types::AssetPath;
    ///
    /// let path = AssetPath::parse("/A/Collection.asset").unwrap();
    /// assert_eq!(path.as_str(), "A/Collection.asset");
    /// assert!(AssetPath::parse("A/../B.asset").is_err());
    /// assert!(AssetPath::parse("A/noext").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let path = raw.strip_prefix('/').unwrap_or(raw);
        let invalid = |reason: &str| TypeError::InvalidPath {
            path: raw.to_string(),
            reason: reason.to_string(),
        };

        if path.is_empty() {
            return Err(invalid("path must not be empty"));
        }
        if path.contains('\\') {
            return Err(invalid("use '/' as separator"));
        }
        if path.chars().any(char::is_control) {
            return Err(invalid("contains control characters"));
        }
        for component in path.split('/') {
            if component.is_empty() {
                return Err(invalid("path components must not be empty"));
            }
            if component == "." || component == ".." {
                return Err(invalid("relative components are not allowed"));
            }
        }

        let file_name = path.rsplit('/').next().unwrap_or(path);
        match file_name.rfind('.') {
            Some(0) => return Err(invalid("file stem must not be empty")),
            Some(dot) if dot + 1 == file_name.len() => {
                return Err(invalid("extension must not be empty"))
            }
            Some(_) => {}
            None => return Err(invalid("missing file extension")),
        }

        Ok(Self(path.to_string()))
    }

    /// Build `<dir>/<stem><extension>`, validating the result.
    ///
    /// `extension` includes its leading dot (e.g. `".asset"`). An empty
    /// `dir` places the file at the store root.
    pub fn join(dir: &str, stem: &str, extension: &str) -> Result<Self, TypeError> {
        let dir = dir.trim_matches('/');
        if dir.is_empty() {
            Self::parse(&format!("{stem}{extension}"))
        } else {
            Self::parse(&format!("{dir}/{stem}{extension}"))
        }
    }

    /// The path as a string (never starts with `/`).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Directory holding this file; empty for files at the store root.
    pub fn parent(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }

    /// File name including the extension.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// File name without the extension.
    pub fn file_stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(idx) => &name[..idx],
            None => name,
        }
    }

    /// Extension including the leading dot.
    pub fn extension(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(idx) => &name[idx..],
            None => "",
        }
    }

    /// Insert `n` immediately before the extension: `A/X.asset` → `A/X3.asset`.
    pub fn with_stem_suffix(&self, n: u32) -> Self {
        let ext_len = self.extension().len();
        let split = self.0.len() - ext_len;
        Self(format!("{}{n}{}", &self.0[..split], &self.0[split..]))
    }

    /// Returns `true` if this file sits inside `dir` or any of its subdirectories.
    pub fn is_under(&self, dir: &str) -> bool {
        let dir = dir.trim_matches('/');
        dir.is_empty()
            || self
                .0
                .strip_prefix(dir)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Turn an object name into a file stem.
///
/// Path separators and characters most filesystems reject become `_`;
/// surrounding whitespace is trimmed. An empty result is an error.
pub fn stem_from_name(name: &str) -> Result<String, TypeError> {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| {
            if FORBIDDEN_STEM_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    if stem.is_empty() || stem.chars().all(|c| c == '.') {
        return Err(TypeError::InvalidName {
            name: name.to_string(),
            reason: "name does not produce a usable file name".into(),
        });
    }
    Ok(stem)
}

impl TryFrom<String> for AssetPath {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AssetPath> for String {
    fn from(path: AssetPath) -> Self {
        path.0
    }
}

impl fmt::Debug for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetPath({})", self.0)
    }
}

impl fmt::Display for AssetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
