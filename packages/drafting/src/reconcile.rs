//! # Paragraph Reconciliation
//!
//! Turns free-form paragraph text back into an ordered list of sentence
//! records while keeping sentence IDs stable.
//!
//! ## Identity is positional
//!
//! The i-th sentence of the new text takes the i-th existing ID. Surplus
//! existing IDs are dropped, missing ones are freshly generated. Annotations
//! keyed on a sentence ID therefore follow the *position* of the sentence:
//! inserting a sentence at the front of a paragraph shifts every later
//! sentence onto its predecessor's ID.
//!
//! ## Tokenizing
//!
//! A sentence ends at a run of `.`, `!` or `?` (plus any closing quotes or
//! brackets) followed by whitespace or the end of the text. A terminator
//! followed by anything else (`3.5`, `e.g.,`) does not end the sentence.
//! Trailing text without a terminator is still a sentence.

use crate::ids::IdGenerator;
use crate::structure::SentenceId;
use serde::{Deserialize, Serialize};

/// One sentence of reconciled paragraph text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledSentence {
    /// Reused from the paragraph when the position existed, fresh otherwise
    pub id: SentenceId,
    pub text: String,
}

impl ReconciledSentence {
    pub fn new(id: impl Into<SentenceId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Split text into trimmed, non-empty sentence spans
pub fn tokenize_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((_, c)) = chars.next() {
        if !is_terminator(c) {
            continue;
        }

        while let Some(&(_, next)) = chars.peek() {
            if is_terminator(next) || is_closer(next) {
                chars.next();
            } else {
                break;
            }
        }

        match chars.peek() {
            None => {
                push_span(&mut sentences, &text[start..]);
                start = text.len();
            }
            Some(&(end, next)) if next.is_whitespace() => {
                push_span(&mut sentences, &text[start..end]);
                start = end;
            }
            Some(_) => {}
        }
    }

    if start < text.len() {
        push_span(&mut sentences, &text[start..]);
    }

    sentences
}

/// Align the sentences of `raw_text` with a paragraph's existing IDs.
///
/// Identical `(raw_text, existing_ids)` and an identically seeded generator
/// always give identical output.
pub fn reconcile(
    raw_text: &str,
    existing_ids: &[SentenceId],
    ids: &mut IdGenerator,
) -> Vec<ReconciledSentence> {
    reconcile_avoiding(raw_text, existing_ids, ids, |_| false)
}

/// [`reconcile`], but fresh IDs also skip anything `taken` reports as in use
pub fn reconcile_avoiding(
    raw_text: &str,
    existing_ids: &[SentenceId],
    ids: &mut IdGenerator,
    taken: impl Fn(&str) -> bool,
) -> Vec<ReconciledSentence> {
    tokenize_sentences(raw_text)
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let id = match existing_ids.get(i) {
                Some(existing) => existing.clone(),
                None => ids.unused_sentence_id(|id| {
                    taken(id) || existing_ids.iter().any(|existing| existing == id)
                }),
            };
            ReconciledSentence::new(id, text)
        })
        .collect()
}

fn push_span<'a>(out: &mut Vec<&'a str>, span: &'a str) {
    let trimmed = span.trim();
    if !trimmed.is_empty() {
        out.push(trimmed);
    }
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '\u{201D}' | '\u{2019}')
}
