//! Persistence boundary: a draft is one whole structure plus metadata.
//!
//! There is no partial or incremental format. Callers store the JSON of a
//! [`Draft`] keyed by its ID and hand it back unmodified to reload.

use crate::errors::DraftError;
use crate::structure::DocumentStructure;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

pub const DRAFT_ID_PREFIX: &str = "draft-";
pub const UNTITLED_DRAFT: &str = "Untitled Draft";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub id: String,
    pub title: String,
    pub structure: DocumentStructure,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_modified: DateTime<Utc>,
}

/// Registry entry for a stored draft (no structure)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftMetadata {
    pub id: String,
    pub title: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_modified: DateTime<Utc>,
}

impl Draft {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        structure: DocumentStructure,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            structure,
            last_modified: now(),
        }
    }

    /// Fresh ID and the default title
    pub fn untitled(structure: DocumentStructure) -> Self {
        Self::new(generate_draft_id(), UNTITLED_DRAFT, structure)
    }

    pub fn metadata(&self) -> DraftMetadata {
        DraftMetadata {
            id: self.id.clone(),
            title: self.title.clone(),
            last_modified: self.last_modified,
        }
    }

    /// Bump `last_modified` to now
    pub fn touch(&mut self) {
        self.last_modified = now();
    }

    pub fn to_json(&self) -> Result<String, DraftError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode and check the structure's invariants
    pub fn from_json(json: &str) -> Result<Self, DraftError> {
        let draft: Draft = serde_json::from_str(json)?;
        draft.structure.check_invariants()?;
        Ok(draft)
    }

    pub fn load(path: &Path) -> Result<Self, DraftError> {
        let content = std::fs::read_to_string(path)?;
        let draft = Self::from_json(&content)?;
        info!(path = %path.display(), draft_id = %draft.id, "Loaded draft");
        Ok(draft)
    }

    pub fn save(&self, path: &Path) -> Result<(), DraftError> {
        std::fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), draft_id = %self.id, "Saved draft");
        Ok(())
    }
}

// Stored as epoch milliseconds, so keep no finer precision in memory
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

pub fn generate_draft_id() -> String {
    format!("{}{}", DRAFT_ID_PREFIX, uuid::Uuid::new_v4())
}
