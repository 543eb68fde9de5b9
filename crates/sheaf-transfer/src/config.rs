use serde::{Deserialize, Serialize};
use sheaf_types::{DEFAULT_ASSET_EXTENSION, HOST_CLONE_SUFFIX};

use crate::error::{TransferError, TransferResult};

/// What eviction does when every candidate path is taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Fail with `PathCollision` and leave the member where it is.
    #[default]
    Fail,
    /// Overwrite whatever sits at the last candidate path and warn.
    BestEffort,
}

/// Configuration for the ownership transfer engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Extension of independent asset files, leading dot included.
    pub asset_extension: String,
    /// Suffix the duplicator appends to copies; stripped from every copy.
    pub clone_suffix: String,
    /// Total candidate paths tried on eviction, the unsuffixed one
    /// included. The default of 20 tries suffixes 1 through 19.
    pub max_dedup_attempts: u32,
    /// Behavior once `max_dedup_attempts` is exhausted.
    pub collision_policy: CollisionPolicy,
    /// Write the new copy before removing the original.
    ///
    /// Off by default: adoption deletes the source file before embedding the
    /// copy, and eviction destroys the member before creating the new file.
    pub write_ahead: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            asset_extension: DEFAULT_ASSET_EXTENSION.to_string(),
            clone_suffix: HOST_CLONE_SUFFIX.to_string(),
            max_dedup_attempts: 20,
            collision_policy: CollisionPolicy::Fail,
            write_ahead: false,
        }
    }
}

impl TransferConfig {
    /// Parse from TOML; missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> TransferResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| TransferError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> TransferResult<()> {
        if !self.asset_extension.starts_with('.') || self.asset_extension.len() < 2 {
            return Err(TransferError::Config(format!(
                "asset_extension must look like \".asset\", got {:?}",
                self.asset_extension
            )));
        }
        if self.asset_extension[1..].contains(['.', '/']) {
            return Err(TransferError::Config(format!(
                "asset_extension must be a single extension, got {:?}",
                self.asset_extension
            )));
        }
        if self.max_dedup_attempts == 0 {
            return Err(TransferError::Config(
                "max_dedup_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
