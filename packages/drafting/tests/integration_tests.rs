//! Integration tests for the drafting engine

use drafting_editor::numbering::{label, outline_labels};
use drafting_editor::sample::{motion_draft, motion_draft_with};
use drafting_editor::{
    CursorTracker, Draft, DraftEngine, DraftError, EditError, EngineConfig, IdGenerator, Mutation,
    MutationOutcome, PositionType, ReconciledSentence, SelectionRange,
};

/// Engine with one root section holding one paragraph of one empty sentence
fn single_paragraph_engine() -> (DraftEngine, String, String, String) {
    let mut engine = DraftEngine::new().with_id_generator(IdGenerator::from_seed("it"));
    let section_id = engine.add_section(None, 0).unwrap();
    let created = engine.create_paragraph_in_section(&section_id).unwrap();
    engine.clear_history();
    engine.mark_clean();
    (engine, section_id, created.paragraph_id, created.sentence_id)
}

#[test]
fn test_paragraph_split_scenario() {
    let (mut engine, _, paragraph_id, s1) = single_paragraph_engine();
    engine.update_sentence(&s1, "Hello world.").unwrap();

    let s2 = engine.split_sentence(&s1, 5).unwrap();

    let doc = engine.structure();
    assert_eq!(doc.sentence(&s1).unwrap().text, "Hello");
    assert_eq!(doc.sentence(&s2).unwrap().text, " world.");
    assert_eq!(doc.paragraph(&paragraph_id).unwrap().sentence_ids, vec![s1, s2]);
}

#[test]
fn test_section_split_scenario() {
    let (mut engine, section_id, p1, _) = single_paragraph_engine();
    let p2 = engine.create_paragraph_after(&p1).unwrap().paragraph_id;
    let p3 = engine.create_paragraph_after(&p2).unwrap();

    let new_section = engine.split_section_at_paragraph(&p2).unwrap();

    let doc = engine.structure();
    assert_eq!(doc.root_section_ids(), &[section_id.clone(), new_section.clone()]);
    assert_eq!(doc.section(&section_id).unwrap().paragraph_ids, vec![p1]);
    assert_eq!(
        doc.section(&new_section).unwrap().paragraph_ids,
        vec![p3.paragraph_id.clone()]
    );
    assert!(doc.paragraph(&p2).is_none());
    assert_eq!(doc.paragraph(&p3.paragraph_id).unwrap().section_id, new_section);
    assert_eq!(doc.sentence(&p3.sentence_id).unwrap().section_id, new_section);
    assert_eq!(doc.section(&new_section).unwrap().level, 1);
    assert!(doc.check_invariants().is_ok());
}

#[test]
fn test_cross_sentence_delete_scenario() {
    let (mut engine, _, paragraph_id, s1) = single_paragraph_engine();
    engine
        .update_paragraph_sentences(
            &paragraph_id,
            &[
                ReconciledSentence::new(s1.clone(), "ABCDE"),
                ReconciledSentence::new("sn-second", "FGHIJ"),
            ],
        )
        .unwrap();

    let cursor = engine
        .delete_selection_range(&SelectionRange {
            start_sentence_id: s1.clone(),
            start_offset: 2,
            end_sentence_id: "sn-second".to_string(),
            end_offset: 3,
            fully_selected_sentence_ids: vec![],
        })
        .unwrap();

    let doc = engine.structure();
    assert_eq!(doc.sentence(&s1).unwrap().text, "ABHIJ");
    assert!(doc.sentence("sn-second").is_none());
    assert_eq!(doc.paragraph(&paragraph_id).unwrap().sentence_ids, vec![s1.clone()]);
    assert_eq!(cursor.sentence_id, s1);
    assert_eq!(cursor.cursor_offset, 2);
}

#[test]
fn test_selection_delete_removes_fully_selected_sentences() {
    let (mut engine, _, paragraph_id, s1) = single_paragraph_engine();
    let reconciled = engine
        .reconcile_paragraph(&paragraph_id, "One here. Two here. Three here.")
        .unwrap();
    engine
        .update_paragraph_sentences(&paragraph_id, &reconciled)
        .unwrap();
    let ids: Vec<String> = reconciled.iter().map(|s| s.id.clone()).collect();
    assert_eq!(ids[0], s1);

    engine
        .delete_selection_range(&SelectionRange {
            start_sentence_id: ids[0].clone(),
            start_offset: 4,
            end_sentence_id: ids[2].clone(),
            end_offset: 6,
            fully_selected_sentence_ids: vec![ids[1].clone(), "sn-gone".to_string()],
        })
        .unwrap();

    let doc = engine.structure();
    assert_eq!(doc.sentence(&s1).unwrap().text, "One here.");
    assert_eq!(doc.paragraph(&paragraph_id).unwrap().sentence_ids, vec![s1]);
    assert_eq!(doc.sentence_count(), 1);
}

#[test]
fn test_merge_rejects_cross_paragraph() {
    let (mut engine, _, p1, s1) = single_paragraph_engine();
    let created = engine.create_paragraph_after(&p1).unwrap();
    let before = engine.structure().clone();
    let levels = engine.undo_levels();

    let err = engine.merge_sentences(&created.sentence_id, &s1).unwrap_err();

    assert!(matches!(err, EditError::CrossParagraphMerge { .. }));
    assert_eq!(engine.structure(), &before);
    assert_eq!(engine.undo_levels(), levels);
}

#[test]
fn test_merge_rejects_same_sentence() {
    let (mut engine, _, _, s1) = single_paragraph_engine();
    engine.update_sentence(&s1, "Alone.").unwrap();
    let before = engine.structure().clone();
    let levels = engine.undo_levels();

    let err = engine.merge_sentences(&s1, &s1).unwrap_err();

    assert_eq!(err, EditError::SameSentence(s1.clone()));
    assert_eq!(engine.structure(), &before);
    assert_eq!(engine.undo_levels(), levels);
}

#[test]
fn test_paragraph_update_rejects_repeated_sentence() {
    let (mut engine, _, paragraph_id, s1) = single_paragraph_engine();
    let before = engine.structure().clone();
    let levels = engine.undo_levels();

    let err = engine
        .update_paragraph_sentences(
            &paragraph_id,
            &[
                ReconciledSentence::new(s1.clone(), "First."),
                ReconciledSentence::new(s1.clone(), "Again."),
            ],
        )
        .unwrap_err();

    assert_eq!(err, EditError::DuplicateSentence(s1));
    assert_eq!(engine.structure(), &before);
    assert_eq!(engine.undo_levels(), levels);
}

#[test]
fn test_paragraph_update_rejects_foreign_sentence() {
    let (mut engine, _, p1, s1) = single_paragraph_engine();
    let p2 = engine.create_paragraph_after(&p1).unwrap();
    let before = engine.structure().clone();
    let levels = engine.undo_levels();

    let err = engine
        .update_paragraph_sentences(
            &p2.paragraph_id,
            &[ReconciledSentence::new(s1.clone(), "Stolen.")],
        )
        .unwrap_err();

    assert_eq!(
        err,
        EditError::SentenceOwnedElsewhere {
            sentence_id: s1,
            owner: p1,
        }
    );
    assert_eq!(engine.structure(), &before);
    assert_eq!(engine.undo_levels(), levels);
}

#[test]
fn test_generated_ids_skip_ids_already_in_draft() {
    // Same seed for the draft and the engine, so the counters collide
    let draft = motion_draft_with(&mut IdGenerator::from_seed("s"));
    let mut engine = DraftEngine::from_draft(draft, EngineConfig::default())
        .unwrap()
        .with_id_generator(IdGenerator::from_seed("s"));
    let original: Vec<String> = engine.structure().sentences().map(|s| s.id.clone()).collect();
    let texts: Vec<String> = engine.structure().sentences().map(|s| s.text.clone()).collect();
    let anchor = original[0].clone();

    let mut created = Vec::new();
    for _ in 0..12 {
        created.push(engine.create_sentence_after(&anchor).unwrap());
    }
    created.push(engine.split_sentence(&anchor, 3).unwrap());
    let section = engine.add_section(None, 0).unwrap();
    let paragraph = engine.create_paragraph_in_section(&section).unwrap();

    let doc = engine.structure();
    assert_eq!(doc.sentence_count(), original.len() + created.len() + 1);
    assert!(created.iter().all(|id| !original.contains(id)));
    assert!(!original.contains(&paragraph.sentence_id));
    for (id, text) in original.iter().zip(&texts).skip(1) {
        assert_eq!(&doc.sentence(id).unwrap().text, text);
    }
    assert_eq!(doc.check_invariants(), Ok(()));

    let paragraph_id = doc.sentence(&anchor).unwrap().paragraph_id.clone();
    let raw = format!("{} Extra one. Extra two.", engine.paragraph_text(&paragraph_id).unwrap());
    let reconciled = engine.reconcile_paragraph(&paragraph_id, &raw).unwrap();
    engine.update_paragraph_sentences(&paragraph_id, &reconciled).unwrap();
    assert_eq!(engine.structure().check_invariants(), Ok(()));
}

#[test]
fn test_merge_returns_seam_position() {
    let (mut engine, _, _, s1) = single_paragraph_engine();
    engine.update_sentence(&s1, "First.").unwrap();
    let s2 = engine.create_sentence_after(&s1).unwrap();
    engine.update_sentence(&s2, "Second.").unwrap();

    let merged = engine.merge_sentences(&s2, &s1).unwrap();

    assert_eq!(merged.merged_id, s1);
    assert_eq!(merged.cursor_position, 6);
    assert_eq!(engine.structure().sentence(&s1).unwrap().text, "First.Second.");
}

#[test]
fn test_configured_merge_separator() {
    let config = EngineConfig {
        merge_separator: " ".to_string(),
        ..EngineConfig::default()
    };
    let mut engine = DraftEngine::with_config(config);
    let section = engine.add_section(None, 0).unwrap();
    let s1 = engine.create_paragraph_in_section(&section).unwrap().sentence_id;
    engine.update_sentence(&s1, "First.").unwrap();
    let s2 = engine.create_sentence_after(&s1).unwrap();
    engine.update_sentence(&s2, "Second.").unwrap();

    let merged = engine.merge_sentences(&s2, &s1).unwrap();

    assert_eq!(merged.cursor_position, 7);
    assert_eq!(engine.structure().sentence(&s1).unwrap().text, "First. Second.");
}

#[test]
fn test_section_outline_operations() {
    let mut engine = DraftEngine::new();
    let first = engine.add_section(None, 0).unwrap();
    let second = engine.add_section(None, 1).unwrap();
    let nested = engine.add_section(Some(&second), 0).unwrap();

    // Demote second under first; its child follows at level 3
    engine.demote_section(&second).unwrap();
    let doc = engine.structure();
    assert_eq!(doc.root_section_ids(), &[first.clone()]);
    assert_eq!(doc.section(&second).unwrap().level, 2);
    assert_eq!(doc.section(&nested).unwrap().level, 3);

    // Promote it back right after its former parent
    engine.promote_section(&second).unwrap();
    let doc = engine.structure();
    assert_eq!(doc.root_section_ids(), &[first.clone(), second.clone()]);
    assert_eq!(doc.section(&nested).unwrap().level, 2);

    assert_eq!(
        engine.demote_section(&first).unwrap_err(),
        EditError::NoPreviousSibling(first.clone())
    );
    assert_eq!(
        engine.promote_section(&first).unwrap_err(),
        EditError::AlreadyRoot(first.clone())
    );
    assert!(engine.structure().check_invariants().is_ok());
}

#[test]
fn test_delete_section_cascades() {
    let mut engine = DraftEngine::from_draft(motion_draft(), EngineConfig::default()).unwrap();
    let background = engine.structure().root_section_ids()[1].clone();

    engine.delete_section(&background).unwrap();

    let doc = engine.structure();
    assert_eq!(doc.section_count(), 1);
    assert_eq!(doc.paragraph_count(), 1);
    assert_eq!(doc.sentence_count(), 2);
    assert!(doc.check_invariants().is_ok());
}

#[test]
fn test_merge_section_into_previous() {
    let mut engine = DraftEngine::from_draft(motion_draft(), EngineConfig::default()).unwrap();
    let roots = engine.structure().root_section_ids().to_vec();

    engine.merge_section_into_previous(&roots[1]).unwrap();

    let doc = engine.structure();
    assert_eq!(doc.root_section_ids(), &[roots[0].clone()]);
    let introduction = doc.section(&roots[0]).unwrap();
    assert_eq!(introduction.child_section_ids.len(), 1);
    assert_eq!(
        doc.section(&introduction.child_section_ids[0]).unwrap().parent_id.as_deref(),
        Some(roots[0].as_str())
    );
    assert!(doc.check_invariants().is_ok());
}

#[test]
fn test_reserved_convert_paragraph_to_section() {
    let (mut engine, section_id, p1, s1) = single_paragraph_engine();
    let p2 = engine.create_paragraph_after(&p1).unwrap();
    let p3 = engine.create_paragraph_after(&p2.paragraph_id).unwrap();
    engine.update_sentence(&p2.sentence_id, "Damages").unwrap();

    let child = engine
        .reserved()
        .convert_paragraph_to_section(&p2.paragraph_id)
        .unwrap();

    let doc = engine.structure();
    let parent = doc.section(&section_id).unwrap();
    assert_eq!(parent.paragraph_ids, vec![p1]);
    assert_eq!(parent.child_section_ids, vec![child.clone()]);

    let converted = doc.section(&child).unwrap();
    assert_eq!(converted.title, "Damages");
    assert_eq!(converted.level, 2);
    assert_eq!(converted.paragraph_ids, vec![p3.paragraph_id.clone()]);
    assert_eq!(doc.sentence(&p3.sentence_id).unwrap().section_id, child);
    assert!(doc.sentence(&p2.sentence_id).is_none());
    assert!(doc.sentence(&s1).is_some());
    assert!(doc.check_invariants().is_ok());
}

#[test]
fn test_serialized_mutations_apply() -> anyhow::Result<()> {
    let mut engine = DraftEngine::from_draft(motion_draft(), EngineConfig::default())?;
    let first_root = engine.structure().root_section_ids()[0].clone();
    let script = format!(
        r#"[
            {{"type": "addSection", "index": 0}},
            {{"type": "createParagraphInSection", "sectionId": "{first_root}"}}
        ]"#
    );

    let mutations: Vec<Mutation> = serde_json::from_str(&script)?;
    let outcomes = engine.apply_all(mutations)?;

    assert!(matches!(outcomes[0], MutationOutcome::Section { .. }));
    assert!(matches!(outcomes[1], MutationOutcome::Paragraph(_)));
    assert_eq!(engine.structure().root_section_ids().len(), 3);
    assert_eq!(engine.undo_levels(), 2);
    Ok(())
}

#[test]
fn test_draft_lifecycle() -> anyhow::Result<()> {
    let draft = motion_draft();
    let draft_id = draft.id.clone();
    let metadata = draft.metadata();
    let mut engine = DraftEngine::from_draft(draft, EngineConfig::default())?;
    assert!(!engine.is_dirty());

    let doc = engine.structure();
    let paragraph_id = doc.section(&doc.root_section_ids()[0]).unwrap().paragraph_ids[0].clone();
    let text = engine.paragraph_text(&paragraph_id).unwrap();
    assert!(text.starts_with("COMES NOW"));

    let reconciled = engine.reconcile_paragraph(&paragraph_id, "Rewritten opening.")?;
    engine.update_paragraph_sentences(&paragraph_id, &reconciled)?;
    assert!(engine.is_dirty());

    let path = std::env::temp_dir().join(format!("{}.json", draft_id));
    let mut edited = engine.to_draft(&metadata);
    assert_eq!(edited.metadata(), metadata);
    edited.touch();
    assert!(edited.last_modified >= metadata.last_modified);
    edited.save(&path)?;
    engine.mark_clean();

    let reloaded = Draft::load(&path)?;
    assert_eq!(&reloaded.structure, engine.structure());
    assert_eq!(reloaded.id, draft_id);
    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn test_broken_draft_is_refused() {
    let mut draft = motion_draft();
    let json = draft.to_json().unwrap().replace("\"level\": 2", "\"level\": 5");
    draft = serde_json::from_str(&json).unwrap();

    assert!(matches!(
        DraftEngine::from_draft(draft, EngineConfig::default()),
        Err(DraftError::Invariant(_))
    ));
}

#[test]
fn test_cursor_follows_undo() {
    let (mut engine, _, _, s1) = single_paragraph_engine();
    engine.update_sentence(&s1, "Hello world.").unwrap();
    let s2 = engine.split_sentence(&s1, 5).unwrap();

    let mut cursor = CursorTracker::new();
    assert!(cursor.set_cursor_to_sentence_in(engine.structure(), &s2, 0));

    engine.undo();
    cursor.revalidate(engine.structure());
    assert!(!cursor.has_active_target());

    assert!(cursor.set_cursor_to_sentence_in(engine.structure(), &s1, 5));
    assert_eq!(cursor.position_type(), Some(PositionType::Sentence));
}

#[test]
fn test_numbering_labels() {
    assert_eq!(label(0, 0).as_deref(), Some("I."));
    assert_eq!(label(1, 0).as_deref(), Some("A."));
    assert_eq!(label(2, 0).as_deref(), Some("1."));
    assert_eq!(label(3, 0).as_deref(), Some("a."));
    assert_eq!(label(0, 1).as_deref(), Some("II."));

    let draft = motion_draft();
    let labels = outline_labels(&draft.structure);
    let roots = draft.structure.root_section_ids();
    assert_eq!(labels[&roots[0]].as_deref(), Some("I."));
    assert_eq!(labels[&roots[1]].as_deref(), Some("II."));
}
