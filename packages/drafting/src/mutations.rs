//! # Structural Mutations
//!
//! Operations on a [`DocumentStructure`], plus the serializable
//! [`Mutation`] command type that names them.
//!
//! ## Contract
//!
//! 1. **Validate first**: every precondition is checked before the first
//!    write, so a rejected operation leaves the structure untouched
//! 2. **Unlink and remove together**: deleting an entity also removes it
//!    from every list that references it, cascading to owned children
//! 3. **Back-references follow moves**: moving a paragraph rewrites the
//!    `section_id` of the paragraph and all of its sentences
//! 4. **Levels follow moves**: reparenting a section relevels its subtree
//!
//! The engine wraps each operation with the undo snapshot; the functions
//! here know nothing about history.
//!
//! ## Offsets
//!
//! Text offsets count `char`s and clamp to the sentence length.

use crate::errors::EditError;
use crate::ids::IdGenerator;
use crate::reconcile::ReconciledSentence;
use crate::structure::{
    unlink, DocumentStructure, Paragraph, ParagraphId, ParagraphStyle, Section, SectionId,
    Sentence, SentenceId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Primary editing operations (intent-preserving commands)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Replace the text of one sentence
    UpdateSentence { sentence_id: SentenceId, text: String },

    /// Replace all sentences of a paragraph (reconciler output)
    UpdateParagraphSentences {
        paragraph_id: ParagraphId,
        sentences: Vec<ReconciledSentence>,
    },

    /// Split a sentence in two at a character offset
    SplitSentence {
        sentence_id: SentenceId,
        cursor_index: usize,
    },

    /// Append `current` onto `previous` and delete `current`
    MergeSentences {
        current_id: SentenceId,
        previous_id: SentenceId,
    },

    DeleteSentence { sentence_id: SentenceId },

    DeleteParagraph { paragraph_id: ParagraphId },

    /// Delete a possibly cross-sentence selection
    DeleteSelectionRange(SelectionRange),

    /// Insert an empty section at a sibling position
    AddSection {
        #[serde(default)]
        parent_id: Option<SectionId>,
        index: usize,
    },

    /// Delete a section with its whole subtree
    DeleteSection { section_id: SectionId },

    /// Move a section up one level, right after its former parent
    PromoteSection { section_id: SectionId },

    /// Nest a section under its preceding sibling
    DemoteSection { section_id: SectionId },

    /// Empty paragraph at the front of a section
    CreateParagraphInSection { section_id: SectionId },

    CreateSentenceAfter { sentence_id: SentenceId },

    CreateParagraphAfter { paragraph_id: ParagraphId },

    /// Start a sibling section at an (empty) marker paragraph
    SplitSectionAtParagraph { paragraph_id: ParagraphId },

    /// Fold a section into its preceding sibling
    MergeSectionIntoPrevious { section_id: SectionId },
}

/// Selection handed over by the edit surface for deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRange {
    pub start_sentence_id: SentenceId,
    pub start_offset: usize,
    pub end_sentence_id: SentenceId,
    pub end_offset: usize,
    /// Sentences strictly between start and end, deleted whole
    #[serde(default)]
    pub fully_selected_sentence_ids: Vec<SentenceId>,
}

/// Where the caret lands after a merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResult {
    pub merged_id: SentenceId,
    /// Offset of the seam inside the merged sentence
    pub cursor_position: usize,
}

/// Sentence and offset the caret should move to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorTarget {
    pub sentence_id: SentenceId,
    pub cursor_offset: usize,
}

/// A freshly created paragraph and its single empty sentence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedParagraph {
    pub paragraph_id: ParagraphId,
    pub sentence_id: SentenceId,
}

/// What applying a [`Mutation`] produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MutationOutcome {
    /// Nothing changed; no history entry was written
    Unchanged,
    Applied,
    Sentence { sentence_id: SentenceId },
    Merged(MergeResult),
    Cursor(CursorTarget),
    Paragraph(CreatedParagraph),
    Section { section_id: SectionId },
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::UpdateSentence { .. } => "update_sentence",
            Mutation::UpdateParagraphSentences { .. } => "update_paragraph_sentences",
            Mutation::SplitSentence { .. } => "split_sentence",
            Mutation::MergeSentences { .. } => "merge_sentences",
            Mutation::DeleteSentence { .. } => "delete_sentence",
            Mutation::DeleteParagraph { .. } => "delete_paragraph",
            Mutation::DeleteSelectionRange(_) => "delete_selection_range",
            Mutation::AddSection { .. } => "add_section",
            Mutation::DeleteSection { .. } => "delete_section",
            Mutation::PromoteSection { .. } => "promote_section",
            Mutation::DemoteSection { .. } => "demote_section",
            Mutation::CreateParagraphInSection { .. } => "create_paragraph_in_section",
            Mutation::CreateSentenceAfter { .. } => "create_sentence_after",
            Mutation::CreateParagraphAfter { .. } => "create_paragraph_after",
            Mutation::SplitSectionAtParagraph { .. } => "split_section_at_paragraph",
            Mutation::MergeSectionIntoPrevious { .. } => "merge_section_into_previous",
        }
    }

    /// True when applying would succeed without changing anything
    pub fn is_noop(&self, doc: &DocumentStructure) -> bool {
        match self {
            Mutation::UpdateSentence { sentence_id, text } => doc
                .sentence(sentence_id)
                .is_some_and(|sentence| sentence.text == *text),
            _ => false,
        }
    }

    /// Apply to a structure, validating first
    pub(crate) fn apply(
        &self,
        doc: &mut DocumentStructure,
        ids: &mut IdGenerator,
        options: &ApplyOptions<'_>,
    ) -> Result<MutationOutcome, EditError> {
        match self {
            Mutation::UpdateSentence { sentence_id, text } => {
                update_sentence(doc, sentence_id, text).map(|changed| {
                    if changed {
                        MutationOutcome::Applied
                    } else {
                        MutationOutcome::Unchanged
                    }
                })
            }

            Mutation::UpdateParagraphSentences {
                paragraph_id,
                sentences,
            } => update_paragraph_sentences(doc, paragraph_id, sentences)
                .map(|()| MutationOutcome::Applied),

            Mutation::SplitSentence {
                sentence_id,
                cursor_index,
            } => split_sentence(doc, ids, sentence_id, *cursor_index)
                .map(|sentence_id| MutationOutcome::Sentence { sentence_id }),

            Mutation::MergeSentences {
                current_id,
                previous_id,
            } => merge_sentences(doc, current_id, previous_id, options.merge_separator)
                .map(MutationOutcome::Merged),

            Mutation::DeleteSentence { sentence_id } => {
                delete_sentence(doc, sentence_id).map(|()| MutationOutcome::Applied)
            }

            Mutation::DeleteParagraph { paragraph_id } => {
                delete_paragraph(doc, paragraph_id).map(|()| MutationOutcome::Applied)
            }

            Mutation::DeleteSelectionRange(range) => {
                delete_selection_range(doc, range).map(MutationOutcome::Cursor)
            }

            Mutation::AddSection { parent_id, index } => add_section(
                doc,
                ids,
                parent_id.as_deref(),
                *index,
                options.new_section_title,
            )
            .map(|section_id| MutationOutcome::Section { section_id }),

            Mutation::DeleteSection { section_id } => {
                delete_section(doc, section_id).map(|_| MutationOutcome::Applied)
            }

            Mutation::PromoteSection { section_id } => {
                promote_section(doc, section_id).map(|()| MutationOutcome::Applied)
            }

            Mutation::DemoteSection { section_id } => {
                demote_section(doc, section_id).map(|()| MutationOutcome::Applied)
            }

            Mutation::CreateParagraphInSection { section_id } => {
                create_paragraph_in_section(doc, ids, section_id).map(MutationOutcome::Paragraph)
            }

            Mutation::CreateSentenceAfter { sentence_id } => {
                create_sentence_after(doc, ids, sentence_id)
                    .map(|sentence_id| MutationOutcome::Sentence { sentence_id })
            }

            Mutation::CreateParagraphAfter { paragraph_id } => {
                create_paragraph_after(doc, ids, paragraph_id).map(MutationOutcome::Paragraph)
            }

            Mutation::SplitSectionAtParagraph { paragraph_id } => split_section_at_paragraph(
                doc,
                ids,
                paragraph_id,
                options.new_section_title,
            )
            .map(|section_id| MutationOutcome::Section { section_id }),

            Mutation::MergeSectionIntoPrevious { section_id } => {
                merge_section_into_previous(doc, section_id).map(|()| MutationOutcome::Applied)
            }
        }
    }
}

/// Configuration-dependent inputs to [`Mutation::apply`]
#[derive(Debug, Clone, Copy)]
pub(crate) struct ApplyOptions<'a> {
    pub merge_separator: &'a str,
    pub new_section_title: &'a str,
}

// ----------------------------------------------------------------------
// Sentence operations
// ----------------------------------------------------------------------

pub(crate) fn update_sentence(
    doc: &mut DocumentStructure,
    sentence_id: &str,
    text: &str,
) -> Result<bool, EditError> {
    let sentence = sentence_mut(doc, sentence_id)?;
    if sentence.text == text {
        return Ok(false);
    }
    sentence.text = text.to_string();
    Ok(true)
}

pub(crate) fn update_paragraph_sentences(
    doc: &mut DocumentStructure,
    paragraph_id: &str,
    sentences: &[ReconciledSentence],
) -> Result<(), EditError> {
    let paragraph = paragraph(doc, paragraph_id)?;
    let section_id = paragraph.section_id.clone();
    let old_ids = paragraph.sentence_ids.clone();

    let mut new_ids = HashSet::with_capacity(sentences.len());
    for sentence in sentences {
        if !new_ids.insert(sentence.id.as_str()) {
            return Err(EditError::DuplicateSentence(sentence.id.clone()));
        }
        if let Some(existing) = doc.sentence(&sentence.id) {
            if existing.paragraph_id != paragraph_id {
                return Err(EditError::SentenceOwnedElsewhere {
                    sentence_id: sentence.id.clone(),
                    owner: existing.paragraph_id.clone(),
                });
            }
        }
    }

    for old_id in &old_ids {
        if !new_ids.contains(old_id.as_str()) {
            doc.remove_sentence_entry(old_id);
        }
    }

    for sentence in sentences {
        match doc.sentence_mut(&sentence.id) {
            Some(existing) => existing.text = sentence.text.clone(),
            None => doc.insert_sentence(Sentence {
                id: sentence.id.clone(),
                text: sentence.text.clone(),
                paragraph_id: paragraph_id.to_string(),
                section_id: section_id.clone(),
            }),
        }
    }

    paragraph_mut(doc, paragraph_id)?.sentence_ids =
        sentences.iter().map(|s| s.id.clone()).collect();
    Ok(())
}

pub(crate) fn split_sentence(
    doc: &mut DocumentStructure,
    ids: &mut IdGenerator,
    sentence_id: &str,
    cursor_index: usize,
) -> Result<SentenceId, EditError> {
    let sentence = sentence(doc, sentence_id)?;
    let paragraph_id = sentence.paragraph_id.clone();
    let section_id = sentence.section_id.clone();
    let (head, tail) = split_at_char(&sentence.text, cursor_index);
    let (head, tail) = (head.to_string(), tail.to_string());
    paragraph(doc, &paragraph_id)?;

    let new_id = fresh_sentence_id(doc, ids);
    sentence_mut(doc, sentence_id)?.text = head;
    doc.insert_sentence(Sentence {
        id: new_id.clone(),
        text: tail,
        paragraph_id: paragraph_id.clone(),
        section_id,
    });
    insert_after(
        &mut paragraph_mut(doc, &paragraph_id)?.sentence_ids,
        sentence_id,
        new_id.clone(),
    );

    Ok(new_id)
}

pub(crate) fn merge_sentences(
    doc: &mut DocumentStructure,
    current_id: &str,
    previous_id: &str,
    separator: &str,
) -> Result<MergeResult, EditError> {
    if current_id == previous_id {
        return Err(EditError::SameSentence(current_id.to_string()));
    }
    let current = sentence(doc, current_id)?;
    let previous = sentence(doc, previous_id)?;
    if current.paragraph_id != previous.paragraph_id {
        return Err(EditError::CrossParagraphMerge {
            current: current_id.to_string(),
            previous: previous_id.to_string(),
        });
    }

    let paragraph_id = current.paragraph_id.clone();
    let tail = current.text.clone();
    let mut merged = previous.text.clone();
    if !merged.is_empty() && !tail.is_empty() {
        merged.push_str(separator);
    }
    let cursor_position = merged.chars().count();
    merged.push_str(&tail);

    sentence_mut(doc, previous_id)?.text = merged;
    unlink(&mut paragraph_mut(doc, &paragraph_id)?.sentence_ids, current_id);
    doc.remove_sentence_entry(current_id);

    Ok(MergeResult {
        merged_id: previous_id.to_string(),
        cursor_position,
    })
}

pub(crate) fn delete_sentence(doc: &mut DocumentStructure, sentence_id: &str) -> Result<(), EditError> {
    let paragraph_id = sentence(doc, sentence_id)?.paragraph_id.clone();
    remove_sentence(doc, sentence_id, &paragraph_id);
    Ok(())
}

pub(crate) fn create_sentence_after(
    doc: &mut DocumentStructure,
    ids: &mut IdGenerator,
    sentence_id: &str,
) -> Result<SentenceId, EditError> {
    let anchor = sentence(doc, sentence_id)?;
    let paragraph_id = anchor.paragraph_id.clone();
    let section_id = anchor.section_id.clone();
    paragraph(doc, &paragraph_id)?;

    let new_id = fresh_sentence_id(doc, ids);
    doc.insert_sentence(Sentence {
        id: new_id.clone(),
        text: String::new(),
        paragraph_id: paragraph_id.clone(),
        section_id,
    });
    insert_after(
        &mut paragraph_mut(doc, &paragraph_id)?.sentence_ids,
        sentence_id,
        new_id.clone(),
    );

    Ok(new_id)
}

pub(crate) fn delete_selection_range(
    doc: &mut DocumentStructure,
    range: &SelectionRange,
) -> Result<CursorTarget, EditError> {
    let start = sentence(doc, &range.start_sentence_id)?;
    let end = sentence(doc, &range.end_sentence_id)?;

    if range.start_sentence_id == range.end_sentence_id {
        let (from, to) = if range.start_offset <= range.end_offset {
            (range.start_offset, range.end_offset)
        } else {
            (range.end_offset, range.start_offset)
        };
        let (head, rest) = split_at_char(&start.text, from);
        let (_, tail) = split_at_char(rest, to - from);
        let cursor_offset = head.chars().count();
        let text = format!("{}{}", head, tail);

        sentence_mut(doc, &range.start_sentence_id)?.text = text;
        return Ok(CursorTarget {
            sentence_id: range.start_sentence_id.clone(),
            cursor_offset,
        });
    }

    let (start_keep, _) = split_at_char(&start.text, range.start_offset);
    let (_, end_keep) = split_at_char(&end.text, range.end_offset);
    let cursor_offset = start_keep.chars().count();
    let text = format!("{}{}", start_keep, end_keep);
    let end_paragraph_id = end.paragraph_id.clone();

    sentence_mut(doc, &range.start_sentence_id)?.text = text;

    for id in &range.fully_selected_sentence_ids {
        if *id == range.start_sentence_id || *id == range.end_sentence_id {
            continue;
        }
        if let Some(paragraph_id) = doc.sentence(id).map(|s| s.paragraph_id.clone()) {
            remove_sentence(doc, id, &paragraph_id);
        }
    }
    remove_sentence(doc, &range.end_sentence_id, &end_paragraph_id);

    Ok(CursorTarget {
        sentence_id: range.start_sentence_id.clone(),
        cursor_offset,
    })
}

// ----------------------------------------------------------------------
// Paragraph operations
// ----------------------------------------------------------------------

pub(crate) fn delete_paragraph(doc: &mut DocumentStructure, paragraph_id: &str) -> Result<(), EditError> {
    let section_id = paragraph(doc, paragraph_id)?.section_id.clone();
    if let Some(section) = doc.section_mut(&section_id) {
        unlink(&mut section.paragraph_ids, paragraph_id);
    }
    doc.remove_paragraph_tree(paragraph_id);
    Ok(())
}

pub(crate) fn create_paragraph_in_section(
    doc: &mut DocumentStructure,
    ids: &mut IdGenerator,
    section_id: &str,
) -> Result<CreatedParagraph, EditError> {
    section(doc, section_id)?;

    let created = new_paragraph(doc, ids, section_id);
    section_mut(doc, section_id)?
        .paragraph_ids
        .insert(0, created.paragraph_id.clone());

    Ok(created)
}

pub(crate) fn create_paragraph_after(
    doc: &mut DocumentStructure,
    ids: &mut IdGenerator,
    paragraph_id: &str,
) -> Result<CreatedParagraph, EditError> {
    let section_id = paragraph(doc, paragraph_id)?.section_id.clone();
    section(doc, &section_id)?;

    let created = new_paragraph(doc, ids, &section_id);
    insert_after(
        &mut section_mut(doc, &section_id)?.paragraph_ids,
        paragraph_id,
        created.paragraph_id.clone(),
    );

    Ok(created)
}

/// Set a paragraph's block style; `Ok(false)` when it already has it
pub(crate) fn set_paragraph_style(
    doc: &mut DocumentStructure,
    paragraph_id: &str,
    style: ParagraphStyle,
) -> Result<bool, EditError> {
    let paragraph = paragraph_mut(doc, paragraph_id)?;
    if paragraph.style == Some(style) {
        return Ok(false);
    }
    paragraph.style = Some(style);
    Ok(true)
}

/// Turn a paragraph into a child section titled by its first sentence.
///
/// Paragraphs after the trigger move into the new section, which goes to
/// the front of the parent's child list: the parent's remaining paragraphs
/// still read first, and the moved text still precedes the older children.
pub(crate) fn convert_paragraph_to_section(
    doc: &mut DocumentStructure,
    ids: &mut IdGenerator,
    paragraph_id: &str,
    fallback_title: &str,
) -> Result<SectionId, EditError> {
    let trigger = paragraph(doc, paragraph_id)?;
    let parent_id = trigger.section_id.clone();
    let title = trigger
        .sentence_ids
        .first()
        .and_then(|id| doc.sentence(id))
        .map(|s| s.text.as_str())
        .filter(|text| !text.is_empty())
        .unwrap_or(fallback_title)
        .to_string();
    let parent = section(doc, &parent_id)?;
    let position = position_of(&parent.paragraph_ids, paragraph_id)?;
    let level = parent.level + 1;
    let moving = parent.paragraph_ids[position + 1..].to_vec();

    let new_id = fresh_section_id(doc, ids);
    {
        let parent = section_mut(doc, &parent_id)?;
        parent.paragraph_ids.truncate(position);
        parent.child_section_ids.insert(0, new_id.clone());
    }
    doc.remove_paragraph_tree(paragraph_id);
    doc.insert_section(Section {
        id: new_id.clone(),
        title,
        level,
        child_section_ids: vec![],
        paragraph_ids: moving.clone(),
        parent_id: Some(parent_id),
    });
    for moved in &moving {
        doc.rehome_paragraph(moved, &new_id);
    }

    Ok(new_id)
}

// ----------------------------------------------------------------------
// Section operations
// ----------------------------------------------------------------------

pub(crate) fn add_section(
    doc: &mut DocumentStructure,
    ids: &mut IdGenerator,
    parent_id: Option<&str>,
    index: usize,
    title: &str,
) -> Result<SectionId, EditError> {
    let level = match parent_id {
        Some(parent_id) => section(doc, parent_id)?.level + 1,
        None => 1,
    };

    let new_id = fresh_section_id(doc, ids);
    doc.insert_section(Section {
        id: new_id.clone(),
        title: title.to_string(),
        level,
        child_section_ids: vec![],
        paragraph_ids: vec![],
        parent_id: parent_id.map(str::to_string),
    });
    let siblings = sibling_list_mut(doc, parent_id)?;
    let index = index.min(siblings.len());
    siblings.insert(index, new_id.clone());

    Ok(new_id)
}

/// Delete a section and everything beneath it; returns sections removed
pub(crate) fn delete_section(doc: &mut DocumentStructure, section_id: &str) -> Result<usize, EditError> {
    let parent_id = section(doc, section_id)?.parent_id.clone();
    unlink(sibling_list_mut(doc, parent_id.as_deref())?, section_id);
    Ok(doc.remove_section_tree(section_id))
}

pub(crate) fn promote_section(doc: &mut DocumentStructure, section_id: &str) -> Result<(), EditError> {
    let parent_id = section(doc, section_id)?
        .parent_id
        .clone()
        .ok_or_else(|| EditError::AlreadyRoot(section_id.to_string()))?;
    let grandparent_id = section(doc, &parent_id)?.parent_id.clone();
    let level = match &grandparent_id {
        Some(grandparent_id) => section(doc, grandparent_id)?.level + 1,
        None => 1,
    };

    unlink(&mut section_mut(doc, &parent_id)?.child_section_ids, section_id);
    insert_after(
        sibling_list_mut(doc, grandparent_id.as_deref())?,
        &parent_id,
        section_id.to_string(),
    );
    section_mut(doc, section_id)?.parent_id = grandparent_id;
    doc.relevel(section_id, level);

    Ok(())
}

pub(crate) fn demote_section(doc: &mut DocumentStructure, section_id: &str) -> Result<(), EditError> {
    let (parent_id, previous_id) = previous_sibling(doc, section_id)?;
    let level = section(doc, &previous_id)?.level + 1;

    unlink(sibling_list_mut(doc, parent_id.as_deref())?, section_id);
    section_mut(doc, &previous_id)?
        .child_section_ids
        .push(section_id.to_string());
    section_mut(doc, section_id)?.parent_id = Some(previous_id);
    doc.relevel(section_id, level);

    Ok(())
}

/// Close the current section at a marker paragraph and open a sibling
/// holding everything after it. The marker itself is deleted.
pub(crate) fn split_section_at_paragraph(
    doc: &mut DocumentStructure,
    ids: &mut IdGenerator,
    paragraph_id: &str,
    title: &str,
) -> Result<SectionId, EditError> {
    let section_id = paragraph(doc, paragraph_id)?.section_id.clone();
    let current = section(doc, &section_id)?;
    let position = position_of(&current.paragraph_ids, paragraph_id)?;
    let level = current.level;
    let parent_id = current.parent_id.clone();
    let trailing = current.paragraph_ids[position + 1..].to_vec();
    sibling_list(doc, parent_id.as_deref())?;

    let new_id = fresh_section_id(doc, ids);
    section_mut(doc, &section_id)?.paragraph_ids.truncate(position);
    doc.remove_paragraph_tree(paragraph_id);
    doc.insert_section(Section {
        id: new_id.clone(),
        title: title.to_string(),
        level,
        child_section_ids: vec![],
        paragraph_ids: trailing.clone(),
        parent_id: parent_id.clone(),
    });
    for moved in &trailing {
        doc.rehome_paragraph(moved, &new_id);
    }
    insert_after(
        sibling_list_mut(doc, parent_id.as_deref())?,
        &section_id,
        new_id.clone(),
    );

    Ok(new_id)
}

pub(crate) fn merge_section_into_previous(
    doc: &mut DocumentStructure,
    section_id: &str,
) -> Result<(), EditError> {
    let (parent_id, previous_id) = previous_sibling(doc, section_id)?;
    let child_level = section(doc, &previous_id)?.level + 1;

    unlink(sibling_list_mut(doc, parent_id.as_deref())?, section_id);
    let merged = doc
        .remove_section_entry(section_id)
        .ok_or_else(|| EditError::SectionNotFound(section_id.to_string()))?;

    for moved in &merged.paragraph_ids {
        doc.rehome_paragraph(moved, &previous_id);
    }
    for child in &merged.child_section_ids {
        section_mut(doc, child)?.parent_id = Some(previous_id.clone());
        doc.relevel(child, child_level);
    }

    let previous = section_mut(doc, &previous_id)?;
    previous.paragraph_ids.extend(merged.paragraph_ids);
    previous.child_section_ids.extend(merged.child_section_ids);

    Ok(())
}

// ----------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------

fn sentence<'a>(doc: &'a DocumentStructure, id: &str) -> Result<&'a Sentence, EditError> {
    doc.sentence(id)
        .ok_or_else(|| EditError::SentenceNotFound(id.to_string()))
}

fn sentence_mut<'a>(doc: &'a mut DocumentStructure, id: &str) -> Result<&'a mut Sentence, EditError> {
    doc.sentence_mut(id)
        .ok_or_else(|| EditError::SentenceNotFound(id.to_string()))
}

fn paragraph<'a>(doc: &'a DocumentStructure, id: &str) -> Result<&'a Paragraph, EditError> {
    doc.paragraph(id)
        .ok_or_else(|| EditError::ParagraphNotFound(id.to_string()))
}

fn paragraph_mut<'a>(
    doc: &'a mut DocumentStructure,
    id: &str,
) -> Result<&'a mut Paragraph, EditError> {
    doc.paragraph_mut(id)
        .ok_or_else(|| EditError::ParagraphNotFound(id.to_string()))
}

fn section<'a>(doc: &'a DocumentStructure, id: &str) -> Result<&'a Section, EditError> {
    doc.section(id)
        .ok_or_else(|| EditError::SectionNotFound(id.to_string()))
}

fn section_mut<'a>(doc: &'a mut DocumentStructure, id: &str) -> Result<&'a mut Section, EditError> {
    doc.section_mut(id)
        .ok_or_else(|| EditError::SectionNotFound(id.to_string()))
}

fn sibling_list<'a>(
    doc: &'a DocumentStructure,
    parent_id: Option<&str>,
) -> Result<&'a [SectionId], EditError> {
    match parent_id {
        Some(parent_id) => Ok(&section(doc, parent_id)?.child_section_ids),
        None => Ok(doc.root_section_ids()),
    }
}

fn sibling_list_mut<'a>(
    doc: &'a mut DocumentStructure,
    parent_id: Option<&str>,
) -> Result<&'a mut Vec<SectionId>, EditError> {
    doc.sibling_list_mut(parent_id)
        .ok_or_else(|| EditError::SectionNotFound(parent_id.unwrap_or_default().to_string()))
}

/// Parent and preceding sibling of a section
fn previous_sibling(
    doc: &DocumentStructure,
    section_id: &str,
) -> Result<(Option<SectionId>, SectionId), EditError> {
    let parent_id = section(doc, section_id)?.parent_id.clone();
    let siblings = doc
        .siblings_of(section_id)
        .ok_or_else(|| EditError::SectionNotFound(parent_id.clone().unwrap_or_default()))?;
    match siblings.iter().position(|id| id == section_id) {
        Some(index) if index > 0 => Ok((parent_id, siblings[index - 1].clone())),
        _ => Err(EditError::NoPreviousSibling(section_id.to_string())),
    }
}

fn position_of(list: &[String], paragraph_id: &str) -> Result<usize, EditError> {
    list.iter()
        .position(|id| id == paragraph_id)
        .ok_or_else(|| EditError::ParagraphNotFound(paragraph_id.to_string()))
}

/// Insert `id` right after `anchor`, or at the end when `anchor` is absent
fn insert_after(list: &mut Vec<String>, anchor: &str, id: String) {
    match list.iter().position(|entry| entry == anchor) {
        Some(index) => list.insert(index + 1, id),
        None => list.push(id),
    }
}

fn remove_sentence(doc: &mut DocumentStructure, sentence_id: &str, paragraph_id: &str) {
    if let Some(paragraph) = doc.paragraph_mut(paragraph_id) {
        unlink(&mut paragraph.sentence_ids, sentence_id);
    }
    doc.remove_sentence_entry(sentence_id);
}

fn fresh_sentence_id(doc: &DocumentStructure, ids: &mut IdGenerator) -> SentenceId {
    ids.unused_sentence_id(|id| doc.sentence(id).is_some())
}

fn fresh_section_id(doc: &DocumentStructure, ids: &mut IdGenerator) -> SectionId {
    ids.unused_section_id(|id| doc.section(id).is_some())
}

fn new_paragraph(
    doc: &mut DocumentStructure,
    ids: &mut IdGenerator,
    section_id: &str,
) -> CreatedParagraph {
    let paragraph_id = ids.unused_paragraph_id(|id| doc.paragraph(id).is_some());
    let sentence_id = fresh_sentence_id(doc, ids);

    doc.insert_sentence(Sentence {
        id: sentence_id.clone(),
        text: String::new(),
        paragraph_id: paragraph_id.clone(),
        section_id: section_id.to_string(),
    });
    doc.insert_paragraph(Paragraph {
        id: paragraph_id.clone(),
        section_id: section_id.to_string(),
        sentence_ids: vec![sentence_id.clone()],
        style: None,
    });

    CreatedParagraph {
        paragraph_id,
        sentence_id,
    }
}

/// Split at a char offset, clamped to the text length
pub(crate) fn split_at_char(text: &str, at: usize) -> (&str, &str) {
    let byte = text
        .char_indices()
        .nth(at)
        .map_or(text.len(), |(index, _)| index);
    text.split_at(byte)
}
