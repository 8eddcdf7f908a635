//! Error types for the drafting engine

use thiserror::Error;

/// Why a structural operation was rejected.
///
/// Rejection is never fatal: the structure, history and dirty flag are left
/// exactly as they were, and the caller decides what to tell the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Sentence not found: {0}")]
    SentenceNotFound(String),

    #[error("Paragraph not found: {0}")]
    ParagraphNotFound(String),

    #[error("Section not found: {0}")]
    SectionNotFound(String),

    #[error("Sentences {current} and {previous} are in different paragraphs")]
    CrossParagraphMerge { current: String, previous: String },

    #[error("Cannot merge sentence {0} into itself")]
    SameSentence(String),

    #[error("Section {0} has no previous sibling")]
    NoPreviousSibling(String),

    #[error("Section {0} is already a root section")]
    AlreadyRoot(String),

    #[error("Sentence {sentence_id} belongs to paragraph {owner}")]
    SentenceOwnedElsewhere { sentence_id: String, owner: String },

    #[error("Sentence {0} appears more than once")]
    DuplicateSentence(String),
}

/// A broken structural invariant.
///
/// Seeing one of these means the engine has a defect; operations used as
/// documented never produce them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("{list} of {owner} references missing {kind} {id}")]
    DanglingReference {
        list: &'static str,
        owner: String,
        kind: &'static str,
        id: String,
    },

    #[error("{kind} {id} is listed more than once")]
    DuplicateEntry { kind: &'static str, id: String },

    #[error("{kind} {id} points at {field} {actual}, expected {expected}")]
    BackReference {
        kind: &'static str,
        id: String,
        field: &'static str,
        expected: String,
        actual: String,
    },

    #[error("Section {id} has level {actual}, expected {expected}")]
    Level {
        id: String,
        expected: u32,
        actual: u32,
    },

    #[error("{kind} {id} is stored under key {key}")]
    KeyMismatch {
        kind: &'static str,
        id: String,
        key: String,
    },

    #[error("{kind} {id} is not reachable from the root sections")]
    Unreachable { kind: &'static str, id: String },
}

/// Failures at the persistence boundary
#[derive(Error, Debug)]
pub enum DraftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Draft structure is invalid: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("No draft with ID {0} in the collection")]
    UnknownDraft(String),

    #[error("Draft ID {0:?} cannot name a file")]
    InvalidDraftId(String),
}
