use serde::{Deserialize, Serialize};
use sheaf_transfer::TransferConfig;

use crate::error::{EditorError, EditorResult};
use crate::layout::Layout;

/// Settings for an editor session.
///
/// ```toml
/// [transfer]
/// max_dedup_attempts = 20
/// collision_policy = "fail"
///
/// [layout]
/// row_height = 20.0
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub transfer: TransferConfig,
    pub layout: Layout,
}

impl EditorConfig {
    /// Parse and validate a TOML document. Missing tables keep defaults.
    pub fn from_toml_str(s: &str) -> EditorResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| EditorError::Config(e.to_string()))?;
        config.transfer.validate()?;
        if config.layout.row_height < 0.0 || config.layout.header < 0.0 || config.layout.padding < 0.0 {
            return Err(EditorError::Config("layout metrics must not be negative".into()));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheaf_transfer::CollisionPolicy;

    #[test]
    fn empty_document_is_default() {
        let config = EditorConfig::from_toml_str("").unwrap();
        assert_eq!(config.transfer.max_dedup_attempts, 20);
        assert_eq!(config.layout, Layout::default());
    }

    #[test]
    fn nested_tables() {
        let config = EditorConfig::from_toml_str(
            "[transfer]\ncollision_policy = \"best_effort\"\nwrite_ahead = true\n\n[layout]\nrow_height = 24.0\n",
        )
        .unwrap();
        assert_eq!(config.transfer.collision_policy, CollisionPolicy::BestEffort);
        assert!(config.transfer.write_ahead);
        assert_eq!(config.layout.row_height, 24.0);
        assert_eq!(config.layout.header, 20.0);
    }

    #[test]
    fn invalid_transfer_section_is_rejected() {
        assert!(EditorConfig::from_toml_str("[transfer]\nasset_extension = \"asset\"\n").is_err());
        assert!(EditorConfig::from_toml_str("[layout]\npadding = -1.0\n").is_err());
    }
}
