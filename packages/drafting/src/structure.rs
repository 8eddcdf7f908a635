//! # Document Structure
//!
//! The Section → Paragraph → Sentence tree of one draft.
//!
//! Entities live in flat maps keyed by ID; ordering lives only in the ID
//! lists (`root_section_ids`, `child_section_ids`, `paragraph_ids`,
//! `sentence_ids`). Sentences and paragraphs carry denormalized
//! back-references to their owners so a lookup never has to walk the tree.
//!
//! ## Invariants
//!
//! - every listed ID exists in the matching map, and every map entry is
//!   listed exactly once (reachable from the roots, no second parent)
//! - back-references agree with the list that owns the entity
//! - `level` is 1 for roots and `parent.level + 1` otherwise
//!
//! [`DocumentStructure::check_invariants`] verifies all of them. Only the
//! engine mutates a structure, so outside code gets read access only.

use crate::errors::InvariantViolation;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub type SectionId = String;
pub type ParagraphId = String;
pub type SentenceId = String;

/// Smallest editable text unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentence {
    pub id: SentenceId,
    /// May be empty while it serves as an insertion point
    pub text: String,
    pub paragraph_id: ParagraphId,
    /// Always equal to the owning paragraph's `section_id`
    pub section_id: SectionId,
}

/// Block style of a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParagraphStyle {
    #[default]
    Body,
    ListItem,
    BlockQuote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    pub id: ParagraphId,
    pub section_id: SectionId,
    pub sentence_ids: Vec<SentenceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ParagraphStyle>,
}

impl Paragraph {
    /// Style with the unset case resolved to `Body`
    pub fn effective_style(&self) -> ParagraphStyle {
        self.style.unwrap_or_default()
    }
}

/// Titled outline node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: SectionId,
    pub title: String,
    /// Nesting depth, 1-based
    pub level: u32,
    pub child_section_ids: Vec<SectionId>,
    pub paragraph_ids: Vec<ParagraphId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<SectionId>,
}

impl Section {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Aggregate root owning every entity of one draft
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStructure {
    root_section_ids: Vec<SectionId>,
    sections: BTreeMap<SectionId, Section>,
    paragraphs: BTreeMap<ParagraphId, Paragraph>,
    sentences: BTreeMap<SentenceId, Sentence>,
}

impl DocumentStructure {
    pub fn root_section_ids(&self) -> &[SectionId] {
        &self.root_section_ids
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.get(id)
    }

    pub fn paragraph(&self, id: &str) -> Option<&Paragraph> {
        self.paragraphs.get(id)
    }

    pub fn sentence(&self, id: &str) -> Option<&Sentence> {
        self.sentences.get(id)
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.values()
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.paragraphs.values()
    }

    pub fn sentences(&self) -> impl Iterator<Item = &Sentence> {
        self.sentences.values()
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    /// True when the draft has no sections at all
    pub fn is_empty(&self) -> bool {
        self.root_section_ids.is_empty()
    }

    /// Sentences of a paragraph in reading order
    pub fn paragraph_sentences(&self, paragraph_id: &str) -> Option<Vec<&Sentence>> {
        let paragraph = self.paragraphs.get(paragraph_id)?;
        Some(
            paragraph
                .sentence_ids
                .iter()
                .filter_map(|id| self.sentences.get(id))
                .collect(),
        )
    }

    /// Raw text of a paragraph, sentences joined by a single space.
    ///
    /// This is what an edit surface shows for free-form editing before the
    /// result goes back through the reconciler.
    pub fn paragraph_text(&self, paragraph_id: &str) -> Option<String> {
        let sentences = self.paragraph_sentences(paragraph_id)?;
        Some(
            sentences
                .iter()
                .map(|s| s.text.as_str())
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    /// Sibling list that contains `section_id` (parent's children or roots)
    pub fn siblings_of(&self, section_id: &str) -> Option<&[SectionId]> {
        let section = self.sections.get(section_id)?;
        match &section.parent_id {
            Some(parent_id) => self
                .sections
                .get(parent_id)
                .map(|parent| parent.child_section_ids.as_slice()),
            None => Some(self.root_section_ids.as_slice()),
        }
    }

    /// Sections in document reading order (pre-order)
    pub fn sections_in_order(&self) -> Vec<&Section> {
        let mut out = Vec::with_capacity(self.sections.len());
        let mut stack: Vec<&SectionId> = self.root_section_ids.iter().rev().collect();
        while let Some(id) = stack.pop() {
            if let Some(section) = self.sections.get(id) {
                out.push(section);
                stack.extend(section.child_section_ids.iter().rev());
            }
        }
        out
    }

    /// Verify every structural invariant
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        self.check_keys()?;

        let mut seen_sections = HashSet::new();
        let mut seen_paragraphs = HashSet::new();
        let mut seen_sentences = HashSet::new();

        // Explicit stack: a deep outline must not exhaust the call stack
        let mut pending: Vec<(&str, Option<&Section>, &'static str, &str)> = self
            .root_section_ids
            .iter()
            .rev()
            .map(|id| (id.as_str(), None, "rootSectionIds", "document"))
            .collect();

        while let Some((id, parent, list, owner)) = pending.pop() {
            let section = self.check_section(id, parent, list, owner, &mut seen_sections)?;

            for paragraph_id in &section.paragraph_ids {
                self.check_paragraph(
                    paragraph_id,
                    section,
                    &mut seen_paragraphs,
                    &mut seen_sentences,
                )?;
            }

            pending.extend(section.child_section_ids.iter().rev().map(move |child_id| {
                (
                    child_id.as_str(),
                    Some(section),
                    "childSectionIds",
                    section.id.as_str(),
                )
            }));
        }

        if let Some(id) = self.sections.keys().find(|id| !seen_sections.contains(*id)) {
            return Err(InvariantViolation::Unreachable {
                kind: "section",
                id: id.clone(),
            });
        }
        if let Some(id) = self
            .paragraphs
            .keys()
            .find(|id| !seen_paragraphs.contains(*id))
        {
            return Err(InvariantViolation::Unreachable {
                kind: "paragraph",
                id: id.clone(),
            });
        }
        if let Some(id) = self.sentences.keys().find(|id| !seen_sentences.contains(*id)) {
            return Err(InvariantViolation::Unreachable {
                kind: "sentence",
                id: id.clone(),
            });
        }

        Ok(())
    }

    fn check_keys(&self) -> Result<(), InvariantViolation> {
        fn mismatch(kind: &'static str, key: &str, id: &str) -> InvariantViolation {
            InvariantViolation::KeyMismatch {
                kind,
                id: id.to_string(),
                key: key.to_string(),
            }
        }

        for (key, section) in &self.sections {
            if *key != section.id {
                return Err(mismatch("section", key, &section.id));
            }
        }
        for (key, paragraph) in &self.paragraphs {
            if *key != paragraph.id {
                return Err(mismatch("paragraph", key, &paragraph.id));
            }
        }
        for (key, sentence) in &self.sentences {
            if *key != sentence.id {
                return Err(mismatch("sentence", key, &sentence.id));
            }
        }
        Ok(())
    }

    /// Checks one section against its parent; children are the caller's job
    fn check_section(
        &self,
        id: &str,
        parent: Option<&Section>,
        list: &'static str,
        owner: &str,
        seen_sections: &mut HashSet<SectionId>,
    ) -> Result<&Section, InvariantViolation> {
        let section = self
            .sections
            .get(id)
            .ok_or_else(|| InvariantViolation::DanglingReference {
                list,
                owner: owner.to_string(),
                kind: "section",
                id: id.to_string(),
            })?;

        if !seen_sections.insert(id.to_string()) {
            return Err(InvariantViolation::DuplicateEntry {
                kind: "section",
                id: id.to_string(),
            });
        }

        let expected_parent = parent.map(|p| p.id.as_str());
        if section.parent_id.as_deref() != expected_parent {
            return Err(InvariantViolation::BackReference {
                kind: "section",
                id: id.to_string(),
                field: "parentId",
                expected: expected_parent.unwrap_or("<none>").to_string(),
                actual: section.parent_id.clone().unwrap_or_else(|| "<none>".to_string()),
            });
        }

        let expected_level = parent.map_or(1, |p| p.level + 1);
        if section.level != expected_level {
            return Err(InvariantViolation::Level {
                id: id.to_string(),
                expected: expected_level,
                actual: section.level,
            });
        }

        Ok(section)
    }

    fn check_paragraph(
        &self,
        id: &str,
        section: &Section,
        seen_paragraphs: &mut HashSet<ParagraphId>,
        seen_sentences: &mut HashSet<SentenceId>,
    ) -> Result<(), InvariantViolation> {
        let paragraph = self
            .paragraphs
            .get(id)
            .ok_or_else(|| InvariantViolation::DanglingReference {
                list: "paragraphIds",
                owner: section.id.clone(),
                kind: "paragraph",
                id: id.to_string(),
            })?;

        if !seen_paragraphs.insert(id.to_string()) {
            return Err(InvariantViolation::DuplicateEntry {
                kind: "paragraph",
                id: id.to_string(),
            });
        }

        if paragraph.section_id != section.id {
            return Err(InvariantViolation::BackReference {
                kind: "paragraph",
                id: id.to_string(),
                field: "sectionId",
                expected: section.id.clone(),
                actual: paragraph.section_id.clone(),
            });
        }

        for sentence_id in &paragraph.sentence_ids {
            let sentence = self.sentences.get(sentence_id).ok_or_else(|| {
                InvariantViolation::DanglingReference {
                    list: "sentenceIds",
                    owner: id.to_string(),
                    kind: "sentence",
                    id: sentence_id.clone(),
                }
            })?;

            if !seen_sentences.insert(sentence_id.clone()) {
                return Err(InvariantViolation::DuplicateEntry {
                    kind: "sentence",
                    id: sentence_id.clone(),
                });
            }

            if sentence.paragraph_id != paragraph.id {
                return Err(InvariantViolation::BackReference {
                    kind: "sentence",
                    id: sentence_id.clone(),
                    field: "paragraphId",
                    expected: paragraph.id.clone(),
                    actual: sentence.paragraph_id.clone(),
                });
            }
            if sentence.section_id != section.id {
                return Err(InvariantViolation::BackReference {
                    kind: "sentence",
                    id: sentence_id.clone(),
                    field: "sectionId",
                    expected: section.id.clone(),
                    actual: sentence.section_id.clone(),
                });
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Engine-only mutation helpers. None of these keep the tree consistent
    // on their own; the operations in `mutations` compose them.
    // ------------------------------------------------------------------

    pub(crate) fn section_mut(&mut self, id: &str) -> Option<&mut Section> {
        self.sections.get_mut(id)
    }

    pub(crate) fn paragraph_mut(&mut self, id: &str) -> Option<&mut Paragraph> {
        self.paragraphs.get_mut(id)
    }

    pub(crate) fn sentence_mut(&mut self, id: &str) -> Option<&mut Sentence> {
        self.sentences.get_mut(id)
    }

    pub(crate) fn insert_section(&mut self, section: Section) {
        self.sections.insert(section.id.clone(), section);
    }

    pub(crate) fn insert_paragraph(&mut self, paragraph: Paragraph) {
        self.paragraphs.insert(paragraph.id.clone(), paragraph);
    }

    pub(crate) fn insert_sentence(&mut self, sentence: Sentence) {
        self.sentences.insert(sentence.id.clone(), sentence);
    }

    pub(crate) fn remove_sentence_entry(&mut self, id: &str) -> Option<Sentence> {
        self.sentences.remove(id)
    }

    pub(crate) fn remove_section_entry(&mut self, id: &str) -> Option<Section> {
        self.sections.remove(id)
    }

    /// Mutable sibling list under `parent_id` (roots when `None`)
    pub(crate) fn sibling_list_mut(&mut self, parent_id: Option<&str>) -> Option<&mut Vec<SectionId>> {
        match parent_id {
            Some(parent_id) => self
                .sections
                .get_mut(parent_id)
                .map(|parent| &mut parent.child_section_ids),
            None => Some(&mut self.root_section_ids),
        }
    }

    /// Drop a paragraph and its sentences from the maps (no unlinking)
    pub(crate) fn remove_paragraph_tree(&mut self, id: &str) -> Option<Paragraph> {
        let paragraph = self.paragraphs.remove(id)?;
        for sentence_id in &paragraph.sentence_ids {
            self.sentences.remove(sentence_id);
        }
        Some(paragraph)
    }

    /// Drop a section with every descendant section, paragraph and
    /// sentence from the maps (no unlinking from its parent)
    pub(crate) fn remove_section_tree(&mut self, id: &str) -> usize {
        let mut removed = 0;
        let mut stack = vec![id.to_string()];
        while let Some(section_id) = stack.pop() {
            if let Some(section) = self.sections.remove(&section_id) {
                removed += 1;
                for paragraph_id in &section.paragraph_ids {
                    self.remove_paragraph_tree(paragraph_id);
                }
                stack.extend(section.child_section_ids);
            }
        }
        removed
    }

    /// Point a paragraph and all its sentences at a new owning section
    pub(crate) fn rehome_paragraph(&mut self, paragraph_id: &str, section_id: &str) {
        let Some(paragraph) = self.paragraphs.get_mut(paragraph_id) else {
            return;
        };
        paragraph.section_id = section_id.to_string();
        for sentence_id in &paragraph.sentence_ids {
            if let Some(sentence) = self.sentences.get_mut(sentence_id) {
                sentence.section_id = section_id.to_string();
            }
        }
    }

    /// Set `level` on a section and recompute it for all descendants
    pub(crate) fn relevel(&mut self, section_id: &str, level: u32) {
        let mut stack = vec![(section_id.to_string(), level)];
        while let Some((id, level)) = stack.pop() {
            if let Some(section) = self.sections.get_mut(&id) {
                section.level = level;
                stack.extend(
                    section
                        .child_section_ids
                        .iter()
                        .map(|child| (child.clone(), level + 1)),
                );
            }
        }
    }
}

/// Remove the first occurrence of `id` from an ID list, returning its index
pub(crate) fn unlink(list: &mut Vec<String>, id: &str) -> Option<usize> {
    let index = list.iter().position(|entry| entry == id)?;
    list.remove(index);
    Some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(id: &str, level: u32, parent: Option<&str>) -> Section {
        Section {
            id: id.to_string(),
            title: id.to_uppercase(),
            level,
            child_section_ids: vec![],
            paragraph_ids: vec![],
            parent_id: parent.map(str::to_string),
        }
    }

    fn small_structure() -> DocumentStructure {
        let mut doc = DocumentStructure::default();
        let mut root = section("s-1", 1, None);
        root.child_section_ids.push("s-2".to_string());
        root.paragraph_ids.push("p-1".to_string());
        doc.root_section_ids.push("s-1".to_string());
        doc.insert_section(root);
        doc.insert_section(section("s-2", 2, Some("s-1")));
        doc.insert_paragraph(Paragraph {
            id: "p-1".to_string(),
            section_id: "s-1".to_string(),
            sentence_ids: vec!["sn-1".to_string()],
            style: None,
        });
        doc.insert_sentence(Sentence {
            id: "sn-1".to_string(),
            text: "Hello.".to_string(),
            paragraph_id: "p-1".to_string(),
            section_id: "s-1".to_string(),
        });
        doc
    }

    #[test]
    fn test_valid_structure_passes() {
        assert_eq!(small_structure().check_invariants(), Ok(()));
        assert_eq!(DocumentStructure::default().check_invariants(), Ok(()));
    }

    #[test]
    fn test_dangling_sentence_reference() {
        let mut doc = small_structure();
        doc.remove_sentence_entry("sn-1");

        assert!(matches!(
            doc.check_invariants(),
            Err(InvariantViolation::DanglingReference { kind: "sentence", .. })
        ));
    }

    #[test]
    fn test_wrong_level_detected() {
        let mut doc = small_structure();
        doc.section_mut("s-2").unwrap().level = 3;

        assert_eq!(
            doc.check_invariants(),
            Err(InvariantViolation::Level {
                id: "s-2".to_string(),
                expected: 2,
                actual: 3,
            })
        );
    }

    #[test]
    fn test_stale_sentence_section_detected() {
        let mut doc = small_structure();
        doc.sentence_mut("sn-1").unwrap().section_id = "s-2".to_string();

        assert!(matches!(
            doc.check_invariants(),
            Err(InvariantViolation::BackReference { field: "sectionId", .. })
        ));
    }

    #[test]
    fn test_orphan_detected() {
        let mut doc = small_structure();
        doc.insert_section(section("s-9", 1, None));

        assert_eq!(
            doc.check_invariants(),
            Err(InvariantViolation::Unreachable {
                kind: "section",
                id: "s-9".to_string(),
            })
        );
    }

    #[test]
    fn test_section_listed_twice_detected() {
        let mut doc = small_structure();
        doc.root_section_ids.push("s-1".to_string());

        assert!(matches!(
            doc.check_invariants(),
            Err(InvariantViolation::DuplicateEntry { kind: "section", .. })
        ));
    }

    fn deep_chain(depth: u32) -> DocumentStructure {
        let mut doc = DocumentStructure::default();
        doc.root_section_ids.push("s-1".to_string());
        for level in 1..=depth {
            let parent = (level > 1).then(|| format!("s-{}", level - 1));
            let mut node = section(&format!("s-{}", level), level, parent.as_deref());
            if level < depth {
                node.child_section_ids.push(format!("s-{}", level + 1));
            }
            doc.insert_section(node);
        }
        doc
    }

    #[test]
    fn test_deep_outline_checks_without_overflow() {
        let mut doc = deep_chain(10_000);
        assert_eq!(doc.check_invariants(), Ok(()));
        assert_eq!(doc.sections_in_order().len(), 10_000);

        doc.section_mut("s-9000").unwrap().level = 1;
        assert_eq!(
            doc.check_invariants(),
            Err(InvariantViolation::Level {
                id: "s-9000".to_string(),
                expected: 9000,
                actual: 1,
            })
        );
    }

    #[test]
    fn test_section_cycle_detected() {
        let mut doc = small_structure();
        doc.section_mut("s-2")
            .unwrap()
            .child_section_ids
            .push("s-1".to_string());

        assert!(matches!(
            doc.check_invariants(),
            Err(InvariantViolation::DuplicateEntry { kind: "section", .. })
        ));
    }

    #[test]
    fn test_siblings_and_root_lookup() {
        let doc = small_structure();

        assert!(doc.section("s-1").unwrap().is_root());
        assert!(!doc.section("s-2").unwrap().is_root());
        assert_eq!(doc.siblings_of("s-2"), Some(&["s-2".to_string()][..]));
        assert_eq!(doc.siblings_of("s-1"), Some(doc.root_section_ids()));
        assert_eq!(doc.siblings_of("s-404"), None);
        assert_eq!(
            doc.paragraph("p-1").unwrap().effective_style(),
            ParagraphStyle::Body
        );
    }

    #[test]
    fn test_remove_section_tree_cascades() {
        let mut doc = small_structure();
        let removed = doc.remove_section_tree("s-1");

        assert_eq!(removed, 2);
        assert_eq!(doc.paragraph_count(), 0);
        assert_eq!(doc.sentence_count(), 0);
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(small_structure()).unwrap();

        assert_eq!(json["rootSectionIds"][0], "s-1");
        assert_eq!(json["sections"]["s-2"]["parentId"], "s-1");
        assert!(json["sections"]["s-1"].get("parentId").is_none());
        assert_eq!(json["sentences"]["sn-1"]["paragraphId"], "p-1");
    }
}
