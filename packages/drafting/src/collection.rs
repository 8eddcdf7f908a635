//! A directory of drafts plus a registry of their metadata.
//!
//! Layout: `<dir>/drafts.json` holds the [`DraftMetadata`] list, newest
//! first, and each draft lives in `<dir>/<id>.json`. The registry is the
//! index only; a draft's own file stays the full [`Draft`] JSON.

use crate::draft::{Draft, DraftMetadata};
use crate::errors::DraftError;
use crate::structure::DocumentStructure;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const REGISTRY_NAME: &str = "drafts.json";

const DRAFT_EXTENSION: &str = "json";

#[derive(Debug)]
pub struct DraftCollection {
    dir: PathBuf,
    entries: Vec<DraftMetadata>,
}

impl DraftCollection {
    /// Open the collection in `dir`, creating the directory when missing
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, DraftError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let entries = match fs::read_to_string(dir.join(REGISTRY_NAME)) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };

        let mut collection = Self { dir, entries };
        collection.sort();
        debug!(
            dir = %collection.dir.display(),
            drafts = collection.entries.len(),
            "Opened draft collection"
        );
        Ok(collection)
    }

    /// The collection a draft file belongs to, if its directory has a
    /// registry listing it under the file's name
    pub fn containing(path: &Path) -> Result<Option<Self>, DraftError> {
        let (Some(dir), Some(id)) = (path.parent(), path.file_stem().and_then(|s| s.to_str()))
        else {
            return Ok(None);
        };
        if path.extension().and_then(|e| e.to_str()) != Some(DRAFT_EXTENSION)
            || !dir.join(REGISTRY_NAME).is_file()
        {
            return Ok(None);
        }

        let collection = Self::open(dir)?;
        Ok(collection.contains(id).then_some(collection))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Registry entries, most recently modified first
    pub fn list(&self) -> &[DraftMetadata] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&DraftMetadata> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// File holding the draft `id`
    pub fn path_of(&self, id: &str) -> Result<PathBuf, DraftError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            && format!("{}.{}", id, DRAFT_EXTENSION) != REGISTRY_NAME;
        if !valid {
            return Err(DraftError::InvalidDraftId(id.to_string()));
        }
        Ok(self.dir.join(format!("{}.{}", id, DRAFT_EXTENSION)))
    }

    /// Register a new untitled draft around `structure`
    pub fn create(&mut self, structure: DocumentStructure) -> Result<Draft, DraftError> {
        let draft = Draft::untitled(structure);
        self.save(&draft)?;
        Ok(draft)
    }

    /// Write the draft's file and record its metadata
    pub fn save(&mut self, draft: &Draft) -> Result<(), DraftError> {
        draft.save(&self.path_of(&draft.id)?)?;

        self.entries.retain(|entry| entry.id != draft.id);
        self.entries.push(draft.metadata());
        self.sort();
        self.write_registry()?;

        info!(draft_id = %draft.id, title = %draft.title, "Registered draft");
        Ok(())
    }

    pub fn load(&self, id: &str) -> Result<Draft, DraftError> {
        if !self.contains(id) {
            return Err(DraftError::UnknownDraft(id.to_string()));
        }
        Draft::load(&self.path_of(id)?)
    }

    /// Drop a draft and its file; `Ok(false)` when it was not registered
    pub fn delete(&mut self, id: &str) -> Result<bool, DraftError> {
        let path = self.path_of(id)?;
        if !self.contains(id) {
            return Ok(false);
        }

        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        self.entries.retain(|entry| entry.id != id);
        self.write_registry()?;

        info!(draft_id = %id, "Deleted draft");
        Ok(true)
    }

    fn sort(&mut self) {
        self.entries
            .sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
    }

    fn write_registry(&self) -> Result<(), DraftError> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(self.dir.join(REGISTRY_NAME), json)?;
        Ok(())
    }
}
