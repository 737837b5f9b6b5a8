use super::*;
use crate::document::{ContainerId, SentenceBlock};
use crate::html::{ParseOptions, parse_document};

fn editor_for(html: &str) -> DocumentEditor {
    DocumentEditor::new(parse_document(html, &ParseOptions::default()), "passim")
}

fn sentence_ids(editor: &DocumentEditor) -> Vec<BlockId> {
    editor.document().sentences().map(|s| s.id).collect()
}

#[test]
fn selection_toggle_round_trips() {
    let id = BlockId::new();
    let mut selection = Selection::new();
    assert!(selection.toggle(id));
    assert!(selection.contains(id));
    assert!(!selection.toggle(id));
    assert!(selection.is_empty());
}

#[test]
fn selection_collects_from_ids() {
    let ids = [BlockId::new(), BlockId::new(), BlockId::new()];
    let selection: Selection = ids.iter().copied().collect();
    assert_eq!(selection.len(), 3);
    assert!(ids.iter().all(|id| selection.contains(*id)));
}

#[test]
fn dispatch_reports_success_with_confirmation() {
    let mut editor = editor_for("<p>Body text.</p>");
    let mut toasts: Vec<(String, Severity)> = Vec::new();

    let applied = editor.dispatch(
        &EditAction::SetFontFamily("Georgia".to_string()),
        &Selection::new(),
        &mut toasts,
    );

    assert!(applied);
    assert_eq!(
        toasts,
        vec![("Font changed to Georgia".to_string(), Severity::Success)]
    );
}

#[test]
fn dispatch_turns_precondition_failures_into_warnings() {
    let mut editor = editor_for("<p>Body text.</p>");
    let before = editor.document().clone();
    let mut toasts: Vec<(String, Severity)> = Vec::new();

    let actions = [
        EditAction::ApplyHeading(SentenceTag::Heading1),
        EditAction::MarkCitation,
        EditAction::StartPlacement,
        EditAction::PlaceToa(0),
        EditAction::UpdateToa,
        EditAction::AcceptSelected,
        EditAction::RejectSelected,
    ];
    for action in &actions {
        assert!(!editor.dispatch(action, &Selection::new(), &mut toasts));
    }

    assert_eq!(editor.document(), &before);
    let messages: Vec<&str> = toasts.iter().map(|(message, _)| message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Select at least one sentence to apply a heading",
            "Select a sentence to mark as a citation",
            "No citations marked. Mark citations before inserting TOA.",
            "No citations marked. Mark citations before inserting TOA.",
            "No Table of Authorities to update. Insert the TOA first.",
            "Select a tracked change to accept",
            "Select a tracked change to reject",
        ]
    );
    assert!(toasts.iter().all(|(_, severity)| *severity == Severity::Warning));
}

#[test]
fn heading_messages_name_the_style() {
    let mut editor = editor_for("<p>One.</p>");
    let selection: Selection = sentence_ids(&editor).into_iter().collect();
    let mut toasts: Vec<(String, Severity)> = Vec::new();

    editor.dispatch(&EditAction::ApplyHeading(SentenceTag::Heading2), &selection, &mut toasts);
    editor.dispatch(&EditAction::ApplyHeading(SentenceTag::Paragraph), &selection, &mut toasts);

    assert_eq!(toasts[0].0, "Applied Heading 2 style");
    assert_eq!(toasts[1].0, "Applied Normal paragraph style");
}

#[test]
fn placement_messages_distinguish_top_and_count() {
    let mut editor = editor_for("<p>Intro.</p><p><mark>Roe v. Wade, 410 U.S. 113 (1973)</mark></p>");
    let mut toasts: Vec<(String, Severity)> = Vec::new();
    let none = Selection::new();

    assert!(editor.dispatch(&EditAction::StartPlacement, &none, &mut toasts));
    assert_eq!(toasts[0].1, Severity::Info);
    assert!(editor.is_placing());

    assert!(editor.dispatch(&EditAction::PlaceToa(0), &none, &mut toasts));
    assert_eq!(
        toasts[1].0,
        "Table of Authorities placed at the top with 1 citation"
    );

    assert!(editor.dispatch(&EditAction::PlaceToa(1), &none, &mut toasts));
    assert_eq!(toasts[2].0, "Table of Authorities placed with 1 citation");

    assert!(editor.dispatch(&EditAction::RemoveToa, &none, &mut toasts));
    assert_eq!(toasts[3].1, Severity::Info);
    assert_eq!(editor.document().toa_count(), 0);
}

#[test]
fn clears_selection_only_for_sentence_actions() {
    assert!(EditAction::MarkCitation.clears_selection());
    assert!(EditAction::AcceptAll.clears_selection());
    assert!(!EditAction::StartPlacement.clears_selection());
    assert!(!EditAction::PlaceToa(3).clears_selection());
}

#[test]
fn editor_keeps_page_label_and_hands_back_document() {
    let container = ContainerId::new();
    let document = Document::from_blocks(vec![
        SentenceBlock::new(container, SentenceTag::Paragraph, "Only.").into(),
    ]);
    let editor = DocumentEditor::new(document.clone(), "1");
    assert_eq!(editor.page_label(), "1");
    assert_eq!(editor.placement(), Placement::Idle);
    assert_eq!(editor.into_document(), document);
}
