pub mod apply;
pub mod check;
pub mod delete;
pub mod list;
pub mod new;
pub mod outline;
pub mod reconcile;

pub use apply::{apply, ApplyArgs};
pub use check::{check, CheckArgs};
pub use delete::{delete, DeleteArgs};
pub use list::{list, ListArgs};
pub use new::{new, NewArgs};
pub use outline::{outline, OutlineArgs};
pub use reconcile::{reconcile, ReconcileArgs};

use anyhow::{Context, Result};
use drafting_editor::{Draft, DraftCollection, DraftEngine, DraftMetadata, EngineConfig};
use std::path::{Path, PathBuf};

/// A loaded draft file ready for editing
pub(crate) struct OpenDraft {
    pub path: PathBuf,
    pub metadata: DraftMetadata,
    pub engine: DraftEngine,
    /// Registry to update on save, when the file belongs to a collection
    collection: Option<DraftCollection>,
}

impl OpenDraft {
    /// Load `file` (relative to `cwd`) with the engine config found in `cwd`
    pub fn open(cwd: &Path, file: &Path) -> Result<Self> {
        let path = cwd.join(file);
        let config = EngineConfig::load(cwd).context("Failed to load engine config")?;
        tracing::debug!(?config, "Engine config");
        let draft =
            Draft::load(&path).with_context(|| format!("Failed to load {}", path.display()))?;
        let collection = DraftCollection::containing(&path)
            .with_context(|| format!("Failed to read the registry next to {}", path.display()))?
            .filter(|c| c.path_of(&draft.id).is_ok_and(|registered| registered == path));
        let metadata = draft.metadata();
        let engine = DraftEngine::from_draft(draft, config)?;

        Ok(Self {
            path,
            metadata,
            engine,
            collection,
        })
    }

    /// Write back if anything changed; returns whether a write happened
    pub fn save(&mut self) -> Result<bool> {
        if !self.engine.is_dirty() {
            return Ok(false);
        }

        let mut draft = self.engine.to_draft(&self.metadata);
        draft.touch();
        let written = match &mut self.collection {
            Some(collection) => collection.save(&draft),
            None => draft.save(&self.path),
        };
        written.with_context(|| format!("Failed to write {}", self.path.display()))?;

        self.metadata = draft.metadata();
        self.engine.mark_clean();
        Ok(true)
    }
}
