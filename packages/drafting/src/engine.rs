//! # Draft Engine
//!
//! The stateful core: owns one [`DocumentStructure`], applies every
//! structural operation to it and keeps the undo/redo history.
//!
//! ## Lifecycle of a mutation
//!
//! ```text
//! validate → snapshot → mutate → mark dirty
//!    ↓
//! rejected: EditError, nothing recorded
//! ```
//!
//! A mutation either completes fully (one history entry, dirty flag set)
//! or is rolled back to the snapshot; no partial state is ever observable.
//! The engine is single-writer: every method takes `&mut self`, so a
//! multi-threaded host wraps the engine in one mutex and each call stays a
//! single atomic transaction.
//!
//! ## Text reconciliation
//!
//! The engine never reconciles on its own. Callers run
//! [`crate::reconcile`] on the edited text and hand the result to
//! [`DraftEngine::update_paragraph_sentences`].

use crate::config::EngineConfig;
use crate::draft::{Draft, DraftMetadata};
use crate::errors::{DraftError, EditError};
use crate::ids::IdGenerator;
use crate::mutations::{
    self, ApplyOptions, CreatedParagraph, CursorTarget, MergeResult, Mutation, MutationOutcome,
    SelectionRange,
};
use crate::reconcile::{self, ReconciledSentence};
use crate::structure::{DocumentStructure, ParagraphStyle, SectionId, SentenceId};
use crate::undo_stack::UndoStack;
use tracing::{debug, error, info};

/// Editing façade over one draft structure
#[derive(Debug)]
pub struct DraftEngine {
    structure: DocumentStructure,
    history: UndoStack,
    ids: IdGenerator,
    config: EngineConfig,
    dirty: bool,
}

impl DraftEngine {
    /// Empty structure with default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::from_parts(DocumentStructure::default(), config, IdGenerator::new())
    }

    /// Engine over an existing structure; rejects structures that break an
    /// invariant
    pub fn from_structure(
        structure: DocumentStructure,
        config: EngineConfig,
    ) -> Result<Self, DraftError> {
        structure.check_invariants()?;
        Ok(Self::from_parts(structure, config, IdGenerator::new()))
    }

    /// Engine over a loaded draft
    pub fn from_draft(draft: Draft, config: EngineConfig) -> Result<Self, DraftError> {
        info!(
            draft_id = %draft.id,
            sections = draft.structure.section_count(),
            sentences = draft.structure.sentence_count(),
            "Loading draft"
        );
        Self::from_structure(draft.structure, config)
    }

    /// Use a fixed ID generator (reproducible IDs in tests and scripts)
    pub fn with_id_generator(mut self, ids: IdGenerator) -> Self {
        self.ids = ids;
        self
    }

    fn from_parts(structure: DocumentStructure, config: EngineConfig, ids: IdGenerator) -> Self {
        Self {
            structure,
            history: UndoStack::with_max_levels(config.history_limit),
            ids,
            config,
            dirty: false,
        }
    }

    pub fn structure(&self) -> &DocumentStructure {
        &self.structure
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Deep copy of the current structure under existing draft metadata.
    /// The timestamp is kept as is; [`Draft::touch`] it to record an edit.
    pub fn to_draft(&self, metadata: &DraftMetadata) -> Draft {
        Draft {
            id: metadata.id.clone(),
            title: metadata.title.clone(),
            structure: self.structure.clone(),
            last_modified: metadata.last_modified,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Call after the structure has been persisted
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn is_empty(&self) -> bool {
        self.structure.is_empty()
    }

    /// Current raw text of a paragraph, ready for free-form editing
    pub fn paragraph_text(&self, paragraph_id: &str) -> Option<String> {
        self.structure.paragraph_text(paragraph_id)
    }

    /// Reconcile edited paragraph text against the paragraph's current
    /// sentence IDs. Nothing is applied; pass the result to
    /// [`Self::update_paragraph_sentences`].
    pub fn reconcile_paragraph(
        &mut self,
        paragraph_id: &str,
        raw_text: &str,
    ) -> Result<Vec<ReconciledSentence>, EditError> {
        let existing = self
            .structure
            .paragraph(paragraph_id)
            .ok_or_else(|| EditError::ParagraphNotFound(paragraph_id.to_string()))?
            .sentence_ids
            .clone();
        let structure = &self.structure;
        Ok(reconcile::reconcile_avoiding(
            raw_text,
            &existing,
            &mut self.ids,
            |id| structure.sentence(id).is_some(),
        ))
    }

    // ------------------------------------------------------------------
    // Command surface
    // ------------------------------------------------------------------

    /// Apply a serialized command
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationOutcome, EditError> {
        if mutation.is_noop(&self.structure) {
            debug!(op = mutation.name(), "Skipped mutation without effect");
            return Ok(MutationOutcome::Unchanged);
        }

        let name = mutation.name();
        self.transact(name, |doc, ids, options| mutation.apply(doc, ids, options))
    }

    /// Apply a sequence of commands, stopping at the first rejection
    pub fn apply_all(
        &mut self,
        mutations: impl IntoIterator<Item = Mutation>,
    ) -> Result<Vec<MutationOutcome>, EditError> {
        mutations.into_iter().map(|m| self.apply(m)).collect()
    }

    // ------------------------------------------------------------------
    // Sentence operations
    // ------------------------------------------------------------------

    /// Replace a sentence's text; `Ok(false)` when the text is unchanged
    /// (no history entry is written then)
    pub fn update_sentence(&mut self, sentence_id: &str, text: &str) -> Result<bool, EditError> {
        let outcome = self.apply(Mutation::UpdateSentence {
            sentence_id: sentence_id.to_string(),
            text: text.to_string(),
        })?;
        Ok(outcome != MutationOutcome::Unchanged)
    }

    pub fn update_paragraph_sentences(
        &mut self,
        paragraph_id: &str,
        sentences: &[ReconciledSentence],
    ) -> Result<(), EditError> {
        self.transact("update_paragraph_sentences", |doc, _, _| {
            mutations::update_paragraph_sentences(doc, paragraph_id, sentences)
        })
    }

    /// Split at a char offset; returns the new second sentence
    pub fn split_sentence(
        &mut self,
        sentence_id: &str,
        cursor_index: usize,
    ) -> Result<SentenceId, EditError> {
        self.transact("split_sentence", |doc, ids, _| {
            mutations::split_sentence(doc, ids, sentence_id, cursor_index)
        })
    }

    pub fn merge_sentences(
        &mut self,
        current_id: &str,
        previous_id: &str,
    ) -> Result<MergeResult, EditError> {
        self.transact("merge_sentences", |doc, _, options| {
            mutations::merge_sentences(doc, current_id, previous_id, options.merge_separator)
        })
    }

    pub fn delete_sentence(&mut self, sentence_id: &str) -> Result<(), EditError> {
        self.transact("delete_sentence", |doc, _, _| {
            mutations::delete_sentence(doc, sentence_id)
        })
    }

    pub fn delete_selection_range(
        &mut self,
        range: &SelectionRange,
    ) -> Result<CursorTarget, EditError> {
        self.transact("delete_selection_range", |doc, _, _| {
            mutations::delete_selection_range(doc, range)
        })
    }

    pub fn create_sentence_after(&mut self, sentence_id: &str) -> Result<SentenceId, EditError> {
        self.transact("create_sentence_after", |doc, ids, _| {
            mutations::create_sentence_after(doc, ids, sentence_id)
        })
    }

    // ------------------------------------------------------------------
    // Paragraph operations
    // ------------------------------------------------------------------

    pub fn delete_paragraph(&mut self, paragraph_id: &str) -> Result<(), EditError> {
        self.transact("delete_paragraph", |doc, _, _| {
            mutations::delete_paragraph(doc, paragraph_id)
        })
    }

    /// Empty paragraph (with one empty sentence) at the front of a section
    pub fn create_paragraph_in_section(
        &mut self,
        section_id: &str,
    ) -> Result<CreatedParagraph, EditError> {
        self.transact("create_paragraph_in_section", |doc, ids, _| {
            mutations::create_paragraph_in_section(doc, ids, section_id)
        })
    }

    pub fn create_paragraph_after(
        &mut self,
        paragraph_id: &str,
    ) -> Result<CreatedParagraph, EditError> {
        self.transact("create_paragraph_after", |doc, ids, _| {
            mutations::create_paragraph_after(doc, ids, paragraph_id)
        })
    }

    // ------------------------------------------------------------------
    // Section operations
    // ------------------------------------------------------------------

    pub fn add_section(
        &mut self,
        parent_id: Option<&str>,
        index: usize,
    ) -> Result<SectionId, EditError> {
        self.transact("add_section", |doc, ids, options| {
            mutations::add_section(doc, ids, parent_id, index, options.new_section_title)
        })
    }

    /// Delete a section with all descendant sections, paragraphs and
    /// sentences
    pub fn delete_section(&mut self, section_id: &str) -> Result<(), EditError> {
        self.transact("delete_section", |doc, _, _| {
            mutations::delete_section(doc, section_id).map(|removed| {
                debug!(section_id, removed, "Removed section subtree");
            })
        })
    }

    pub fn promote_section(&mut self, section_id: &str) -> Result<(), EditError> {
        self.transact("promote_section", |doc, _, _| {
            mutations::promote_section(doc, section_id)
        })
    }

    pub fn demote_section(&mut self, section_id: &str) -> Result<(), EditError> {
        self.transact("demote_section", |doc, _, _| {
            mutations::demote_section(doc, section_id)
        })
    }

    pub fn split_section_at_paragraph(&mut self, paragraph_id: &str) -> Result<SectionId, EditError> {
        self.transact("split_section_at_paragraph", |doc, ids, options| {
            mutations::split_section_at_paragraph(doc, ids, paragraph_id, options.new_section_title)
        })
    }

    pub fn merge_section_into_previous(&mut self, section_id: &str) -> Result<(), EditError> {
        self.transact("merge_section_into_previous", |doc, _, _| {
            mutations::merge_section_into_previous(doc, section_id)
        })
    }

    /// Operations kept for list and block features that are not wired to
    /// keyboard editing
    pub fn reserved(&mut self) -> ReservedOps<'_> {
        ReservedOps { engine: self }
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.structure);
        if undone {
            self.dirty = true;
            debug!(remaining = self.history.undo_levels(), "Undo");
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.structure);
        if redone {
            self.dirty = true;
            debug!(remaining = self.history.redo_levels(), "Redo");
        }
        redone
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_levels(&self) -> usize {
        self.history.undo_levels()
    }

    pub fn redo_levels(&self) -> usize {
        self.history.redo_levels()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Run one operation as a transaction: snapshot, mutate, and either
    /// commit the snapshot to history or roll back to it.
    fn transact<T>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(
            &mut DocumentStructure,
            &mut IdGenerator,
            &ApplyOptions<'_>,
        ) -> Result<T, EditError>,
    ) -> Result<T, EditError> {
        let snapshot = self.structure.clone();
        let options = ApplyOptions {
            merge_separator: &self.config.merge_separator,
            new_section_title: &self.config.new_section_title,
        };

        match f(&mut self.structure, &mut self.ids, &options) {
            Ok(value) => {
                self.history.push(snapshot);
                self.dirty = true;
                debug!(op, undo_levels = self.history.undo_levels(), "Applied mutation");
                self.debug_check_invariants(op);
                Ok(value)
            }
            Err(err) => {
                self.structure = snapshot;
                debug!(op, error = %err, "Rejected mutation");
                Err(err)
            }
        }
    }

    fn debug_check_invariants(&self, op: &'static str) {
        if cfg!(debug_assertions) && self.config.check_invariants {
            if let Err(violation) = self.structure.check_invariants() {
                error!(op, %violation, "Structural invariant broken");
                panic!("{} broke a structural invariant: {}", op, violation);
            }
        }
    }
}

impl Default for DraftEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-default entry point for operations outside primary editing flows
pub struct ReservedOps<'a> {
    engine: &'a mut DraftEngine,
}

impl ReservedOps<'_> {
    /// Turn a paragraph into a child section titled by its first sentence;
    /// following paragraphs move into the new section
    pub fn convert_paragraph_to_section(
        &mut self,
        paragraph_id: &str,
    ) -> Result<SectionId, EditError> {
        self.engine
            .transact("convert_paragraph_to_section", |doc, ids, options| {
                mutations::convert_paragraph_to_section(
                    doc,
                    ids,
                    paragraph_id,
                    options.new_section_title,
                )
            })
    }

    /// `Ok(false)` when the paragraph already has this style
    pub fn set_paragraph_style(
        &mut self,
        paragraph_id: &str,
        style: ParagraphStyle,
    ) -> Result<bool, EditError> {
        let current = self
            .engine
            .structure
            .paragraph(paragraph_id)
            .ok_or_else(|| EditError::ParagraphNotFound(paragraph_id.to_string()))?
            .style;
        if current == Some(style) {
            return Ok(false);
        }
        self.engine.transact("set_paragraph_style", |doc, _, _| {
            mutations::set_paragraph_style(doc, paragraph_id, style)
        })
    }
}
