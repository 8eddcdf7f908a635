//! Demonstration draft used by `drafter new` and the tests

use crate::draft::{generate_draft_id, Draft};
use crate::ids::IdGenerator;
use crate::structure::{DocumentStructure, Paragraph, ParagraphStyle, Section, Sentence};

pub const SAMPLE_TITLE: &str = "Motion for Summary Judgment";

/// Two root sections, one nested subsection, three paragraphs and four
/// sentences:
///
/// ```text
/// I. INTRODUCTION
///    (2 sentences)
/// II. FACTUAL BACKGROUND
///    A. The Incident
///       (1 sentence)
///       (1 sentence)
/// ```
pub fn motion_draft() -> Draft {
    motion_draft_with(&mut IdGenerator::new())
}

pub fn motion_draft_with(ids: &mut IdGenerator) -> Draft {
    let mut doc = DocumentStructure::default();

    let introduction = root_section(&mut doc, ids, "INTRODUCTION");
    let background = root_section(&mut doc, ids, "FACTUAL BACKGROUND");
    let incident = child_section(&mut doc, ids, &background, "The Incident");

    paragraph(
        &mut doc,
        ids,
        &introduction,
        &[
            "COMES NOW, Plaintiff, and files this Motion for Summary Judgment.",
            "This case arises from a breach of contract dispute.",
        ],
    );
    paragraph(
        &mut doc,
        ids,
        &incident,
        &["On or about January 1, 2024, the parties entered into an agreement."],
    );
    paragraph(
        &mut doc,
        ids,
        &incident,
        &["Defendant failed to perform their obligations under the contract."],
    );

    Draft::new(generate_draft_id(), SAMPLE_TITLE, doc)
}

fn root_section(doc: &mut DocumentStructure, ids: &mut IdGenerator, title: &str) -> String {
    let id = ids.section_id();
    doc.insert_section(Section {
        id: id.clone(),
        title: title.to_string(),
        level: 1,
        child_section_ids: Vec::new(),
        paragraph_ids: Vec::new(),
        parent_id: None,
    });
    if let Some(roots) = doc.sibling_list_mut(None) {
        roots.push(id.clone());
    }
    id
}

fn child_section(
    doc: &mut DocumentStructure,
    ids: &mut IdGenerator,
    parent_id: &str,
    title: &str,
) -> String {
    let id = ids.section_id();
    let level = doc.section(parent_id).map_or(1, |parent| parent.level + 1);
    doc.insert_section(Section {
        id: id.clone(),
        title: title.to_string(),
        level,
        child_section_ids: Vec::new(),
        paragraph_ids: Vec::new(),
        parent_id: Some(parent_id.to_string()),
    });
    if let Some(children) = doc.sibling_list_mut(Some(parent_id)) {
        children.push(id.clone());
    }
    id
}

fn paragraph(doc: &mut DocumentStructure, ids: &mut IdGenerator, section_id: &str, texts: &[&str]) {
    let paragraph_id = ids.paragraph_id();
    let mut sentence_ids = Vec::with_capacity(texts.len());
    for text in texts {
        let id = ids.sentence_id();
        doc.insert_sentence(Sentence {
            id: id.clone(),
            text: (*text).to_string(),
            paragraph_id: paragraph_id.clone(),
            section_id: section_id.to_string(),
        });
        sentence_ids.push(id);
    }
    doc.insert_paragraph(Paragraph {
        id: paragraph_id.clone(),
        section_id: section_id.to_string(),
        sentence_ids,
        style: Some(ParagraphStyle::Body),
    });
    if let Some(section) = doc.section_mut(section_id) {
        section.paragraph_ids.push(paragraph_id);
    }
}
