//! # Structural Cursor
//!
//! Where editing intent is anchored. A native text caret is advisory
//! only: it must be translated into a [`CursorContext`] (see
//! [`CursorTracker::set_cursor_to_sentence_in`]) before callers act on it.

use crate::structure::{DocumentStructure, ParagraphId, SectionId, SentenceId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PositionType {
    SectionHeader,
    Sentence,
    Paragraph,
}

/// One structural edit position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorContext {
    pub section_id: SectionId,
    pub paragraph_id: Option<ParagraphId>,
    pub sentence_id: Option<SentenceId>,
    /// Char offset; only set while `position_type` is `Sentence`
    pub offset_in_sentence: Option<usize>,
    pub position_type: PositionType,
}

/// Holds at most one active [`CursorContext`]
#[derive(Debug, Clone, Default)]
pub struct CursorTracker {
    context: Option<CursorContext>,
}

impl CursorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> Option<&CursorContext> {
        self.context.as_ref()
    }

    pub fn has_active_target(&self) -> bool {
        self.context.is_some()
    }

    pub fn position_type(&self) -> Option<PositionType> {
        self.context.as_ref().map(|ctx| ctx.position_type)
    }

    pub fn set_cursor(&mut self, context: CursorContext) {
        self.context = Some(context);
    }

    pub fn set_cursor_to_section_header(&mut self, section_id: impl Into<SectionId>) {
        self.context = Some(CursorContext {
            section_id: section_id.into(),
            paragraph_id: None,
            sentence_id: None,
            offset_in_sentence: None,
            position_type: PositionType::SectionHeader,
        });
    }

    pub fn set_cursor_to_sentence(
        &mut self,
        section_id: impl Into<SectionId>,
        paragraph_id: impl Into<ParagraphId>,
        sentence_id: impl Into<SentenceId>,
        offset: usize,
    ) {
        self.context = Some(CursorContext {
            section_id: section_id.into(),
            paragraph_id: Some(paragraph_id.into()),
            sentence_id: Some(sentence_id.into()),
            offset_in_sentence: Some(offset),
            position_type: PositionType::Sentence,
        });
    }

    /// Cursor on a paragraph without a sentence target (an empty paragraph)
    pub fn set_cursor_to_paragraph(
        &mut self,
        section_id: impl Into<SectionId>,
        paragraph_id: impl Into<ParagraphId>,
    ) {
        self.context = Some(CursorContext {
            section_id: section_id.into(),
            paragraph_id: Some(paragraph_id.into()),
            sentence_id: None,
            offset_in_sentence: None,
            position_type: PositionType::Paragraph,
        });
    }

    /// Move within the current sentence. Ignored unless the cursor is on a
    /// sentence.
    pub fn update_offset(&mut self, offset: usize) {
        if let Some(ctx) = self.context.as_mut() {
            if ctx.position_type == PositionType::Sentence {
                ctx.offset_in_sentence = Some(offset);
            }
        }
    }

    pub fn clear_cursor(&mut self) {
        self.context = None;
    }

    /// Anchor the cursor on a sentence looked up in `structure`, clamping
    /// the offset to the sentence length. Returns `false` (and leaves the
    /// cursor alone) when the sentence does not exist.
    pub fn set_cursor_to_sentence_in(
        &mut self,
        structure: &DocumentStructure,
        sentence_id: &str,
        offset: usize,
    ) -> bool {
        let Some(sentence) = structure.sentence(sentence_id) else {
            return false;
        };
        let offset = offset.min(sentence.text.chars().count());
        self.set_cursor_to_sentence(
            sentence.section_id.clone(),
            sentence.paragraph_id.clone(),
            sentence.id.clone(),
            offset,
        );
        true
    }

    /// Re-check the context against `structure` after it changed underneath
    /// (undo, redo, deletes). A context whose anchor is gone is cleared; a
    /// sentence context picks up moved back-references and a clamped offset.
    pub fn revalidate(&mut self, structure: &DocumentStructure) {
        let Some(ctx) = self.context.as_mut() else {
            return;
        };

        let valid = match ctx.position_type {
            PositionType::SectionHeader => structure.section(&ctx.section_id).is_some(),
            PositionType::Paragraph => match ctx
                .paragraph_id
                .as_deref()
                .and_then(|id| structure.paragraph(id))
            {
                Some(paragraph) => {
                    ctx.section_id = paragraph.section_id.clone();
                    true
                }
                None => false,
            },
            PositionType::Sentence => match ctx
                .sentence_id
                .as_deref()
                .and_then(|id| structure.sentence(id))
            {
                Some(sentence) => {
                    let len = sentence.text.chars().count();
                    ctx.section_id = sentence.section_id.clone();
                    ctx.paragraph_id = Some(sentence.paragraph_id.clone());
                    ctx.offset_in_sentence = Some(ctx.offset_in_sentence.unwrap_or(0).min(len));
                    true
                }
                None => false,
            },
        };

        if !valid {
            tracing::trace!("Cursor anchor no longer exists, clearing");
            self.context = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdGenerator;
    use crate::mutations::{add_section, create_paragraph_in_section, delete_sentence, update_sentence};

    #[test]
    fn test_setters_fill_expected_fields() {
        let mut cursor = CursorTracker::new();
        assert!(!cursor.has_active_target());

        cursor.set_cursor_to_section_header("s-1");
        let ctx = cursor.context().unwrap();
        assert_eq!(ctx.position_type, PositionType::SectionHeader);
        assert_eq!(ctx.paragraph_id, None);
        assert_eq!(ctx.offset_in_sentence, None);

        cursor.set_cursor_to_paragraph("s-1", "p-1");
        assert_eq!(cursor.position_type(), Some(PositionType::Paragraph));
        assert_eq!(cursor.context().unwrap().paragraph_id.as_deref(), Some("p-1"));

        cursor.clear_cursor();
        assert!(cursor.context().is_none());
    }

    #[test]
    fn test_update_offset_only_on_sentence() {
        let mut cursor = CursorTracker::new();
        cursor.set_cursor_to_section_header("s-1");
        cursor.update_offset(4);
        assert_eq!(cursor.context().unwrap().offset_in_sentence, None);

        cursor.set_cursor_to_sentence("s-1", "p-1", "sn-1", 0);
        cursor.update_offset(4);
        assert_eq!(cursor.context().unwrap().offset_in_sentence, Some(4));
    }

    #[test]
    fn test_context_serializes_camel_case() {
        let mut cursor = CursorTracker::new();
        cursor.set_cursor_to_sentence("s-1", "p-1", "sn-1", 2);
        let json = serde_json::to_value(cursor.context().unwrap()).unwrap();

        assert_eq!(json["positionType"], "sentence");
        assert_eq!(json["offsetInSentence"], 2);
        assert_eq!(json["sentenceId"], "sn-1");
    }

    #[test]
    fn test_caret_translation_clamps_and_validates() {
        let mut doc = DocumentStructure::default();
        let mut ids = IdGenerator::from_seed("c");
        let section = add_section(&mut doc, &mut ids, None, 0, "Intro").unwrap();
        let created = create_paragraph_in_section(&mut doc, &mut ids, &section).unwrap();
        update_sentence(&mut doc, &created.sentence_id, "Short.").unwrap();

        let mut cursor = CursorTracker::new();
        assert!(!cursor.set_cursor_to_sentence_in(&doc, "sn-missing", 0));
        assert!(cursor.context().is_none());

        assert!(cursor.set_cursor_to_sentence_in(&doc, &created.sentence_id, 99));
        let ctx = cursor.context().unwrap();
        assert_eq!(ctx.offset_in_sentence, Some(6));
        assert_eq!(ctx.section_id, section);
        assert_eq!(ctx.paragraph_id.as_deref(), Some(created.paragraph_id.as_str()));
    }

    #[test]
    fn test_revalidate_clears_missing_anchor() {
        let mut doc = DocumentStructure::default();
        let mut ids = IdGenerator::from_seed("c");
        let section = add_section(&mut doc, &mut ids, None, 0, "Intro").unwrap();
        let created = create_paragraph_in_section(&mut doc, &mut ids, &section).unwrap();
        update_sentence(&mut doc, &created.sentence_id, "Long sentence.").unwrap();

        let mut cursor = CursorTracker::new();
        cursor.set_cursor_to_sentence_in(&doc, &created.sentence_id, 10);

        update_sentence(&mut doc, &created.sentence_id, "Tiny").unwrap();
        cursor.revalidate(&doc);
        assert_eq!(cursor.context().unwrap().offset_in_sentence, Some(4));

        delete_sentence(&mut doc, &created.sentence_id).unwrap();
        cursor.revalidate(&doc);
        assert!(!cursor.has_active_target());
    }
}
