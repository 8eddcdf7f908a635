//! # Drafting Editor
//!
//! Structural editing engine for legal drafts.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ edit surface: raw paragraph text, caret     │
//! └─────────────────────────────────────────────┘
//!          ↓ reconcile            ↓ translate
//! ┌─────────────────────────────────────────────┐
//! │ engine: DocumentStructure + mutations       │
//! │  - Section → Paragraph → Sentence tree      │
//! │  - Validate-first operations                │
//! │  - Snapshot undo/redo                       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ views: outline numbering, cursor, drafts    │
//! │ storage: draft files, collection registry   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Structure is source of truth**: text and labels are derived views
//! 2. **Stable identity**: an edit keeps sentence IDs wherever it can
//! 3. **Structural cursor**: a native caret is advisory input only
//! 4. **All or nothing**: a rejected operation changes nothing
//!
//! ## Usage
//!
//! ```rust,ignore
//! use drafting_editor::{DraftEngine, EngineConfig, Mutation};
//!
//! let mut engine = DraftEngine::from_draft(draft, EngineConfig::default())?;
//!
//! // Keyboard command
//! let second = engine.split_sentence("sn-1", 5)?;
//!
//! // Free-form paragraph edit
//! let reconciled = engine.reconcile_paragraph("p-1", "First. Second.")?;
//! engine.update_paragraph_sentences("p-1", &reconciled)?;
//!
//! // Serialized command
//! engine.apply(Mutation::DeleteSentence { sentence_id: second })?;
//!
//! engine.undo();
//! ```

mod collection;
mod config;
mod cursor;
mod draft;
mod engine;
mod errors;
mod ids;
mod mutations;
pub mod numbering;
pub mod reconcile;
pub mod sample;
mod structure;
mod undo_stack;

pub use collection::{DraftCollection, REGISTRY_NAME};
pub use config::{EngineConfig, DEFAULT_CONFIG_NAME};
pub use cursor::{CursorContext, CursorTracker, PositionType};
pub use draft::{generate_draft_id, Draft, DraftMetadata};
pub use engine::{DraftEngine, ReservedOps};
pub use errors::{DraftError, EditError, InvariantViolation};
pub use ids::IdGenerator;
pub use mutations::{
    CreatedParagraph, CursorTarget, MergeResult, Mutation, MutationOutcome, SelectionRange,
};
pub use reconcile::ReconciledSentence;
pub use structure::{
    DocumentStructure, Paragraph, ParagraphId, ParagraphStyle, Section, SectionId, Sentence,
    SentenceId,
};
pub use undo_stack::UndoStack;
