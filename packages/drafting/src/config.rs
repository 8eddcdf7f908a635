use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::DraftError;

pub const DEFAULT_CONFIG_NAME: &str = "drafting.config.json";

/// Engine configuration file format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Maximum undo snapshots kept (0 = unlimited)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Text inserted between two sentences when they are merged
    #[serde(default)]
    pub merge_separator: String,

    /// Title for sections created without one
    #[serde(default = "default_section_title")]
    pub new_section_title: String,

    /// Run the invariant check after every mutation (debug builds only)
    #[serde(default = "default_check_invariants")]
    pub check_invariants: bool,
}

fn default_history_limit() -> usize {
    50
}

fn default_section_title() -> String {
    "New Section".to_string()
}

fn default_check_invariants() -> bool {
    true
}

impl EngineConfig {
    /// Load config from a directory, falling back to defaults
    pub fn load(dir: &Path) -> Result<Self, DraftError> {
        let config_path = dir.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: EngineConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(EngineConfig::default())
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            merge_separator: String::new(),
            new_section_title: default_section_title(),
            check_invariants: default_check_invariants(),
        }
    }
}
