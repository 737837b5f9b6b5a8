use brief_tui::document::{ChangeType, Document, ReviewState, SentenceTag};
use brief_tui::editor::{DocumentEditor, EditAction, Selection};
use brief_tui::html::serialize_document;
use brief_tui::level::Level;
use brief_tui::notify::Severity;

fn editor_for(id: u32) -> DocumentEditor {
    let level = Level::builtin(id).expect("built-in level");
    DocumentEditor::new(level.document(), level.page_label())
}

fn select(document: &Document, predicate: impl Fn(&str) -> bool) -> Selection {
    document
        .sentences()
        .filter(|s| predicate(&s.text))
        .map(|s| s.id)
        .collect()
}

fn run(editor: &mut DocumentEditor, action: EditAction, selection: &Selection) -> String {
    let mut toasts: Vec<(String, Severity)> = Vec::new();
    let applied = editor.dispatch(&action, selection, &mut toasts);
    let (message, severity) = toasts.pop().expect("every dispatch notifies");
    assert!(applied, "{action:?} failed: {message}");
    assert_ne!(severity, Severity::Warning);
    message
}

#[test]
fn improper_brief_can_be_cleaned_up() {
    let mut editor = editor_for(1);
    let none = Selection::new();

    run(
        &mut editor,
        EditAction::SetFontFamily("Times New Roman".to_string()),
        &none,
    );
    let title = select(editor.document(), |text| text == "CASE BRIEF");
    run(&mut editor, EditAction::ApplyHeading(SentenceTag::Heading1), &title);
    let sections = select(editor.document(), |text| {
        matches!(text, "Statement of Facts" | "Legal Issues" | "Applicable Law")
    });
    assert_eq!(sections.len(), 3);
    let message = run(&mut editor, EditAction::ApplyHeading(SentenceTag::Heading2), &sections);
    assert_eq!(message, "Applied Heading 2 style");
    run(&mut editor, EditAction::SetFontSize("12pt".to_string()), &none);

    let html = serialize_document(editor.document());
    assert!(!html.contains("Comic Sans MS"));
    assert!(!html.contains("11pt"));
    assert!(html.starts_with(
        r#"<h1 style="font-family: Times New Roman; text-align: center; font-size: 18pt">CASE BRIEF</h1>"#
    ));
    assert_eq!(html.matches("<h2").count(), 3);
    assert!(html.contains(r#"<h2 style="font-family: Times New Roman; font-size: 14pt">Legal Issues</h2>"#));
}

#[test]
fn citation_nightmare_builds_a_table_at_the_top() {
    let mut editor = editor_for(2);
    let citations = select(editor.document(), |text| text.contains(" v. "));
    assert_eq!(citations.len(), 6);

    run(&mut editor, EditAction::MarkCitation, &citations);
    run(&mut editor, EditAction::StartPlacement, &Selection::new());
    let message = run(&mut editor, EditAction::PlaceToa(0), &Selection::new());
    assert_eq!(
        message,
        "Table of Authorities placed at the top with 6 citations"
    );

    let html = serialize_document(editor.document());
    assert!(html.starts_with(r#"<div class="toa-block" data-toa="true">"#));
    assert_eq!(html.matches(r#"<span class="toa-page">1</span>"#).count(), 6);
    let knight = html.find("Knight v. Jewett").unwrap();
    let li = html.find("Li v. Yellow Cab").unwrap();
    assert!(knight < li);
    assert_eq!(html.matches("citation-marked").count(), 6);
}

#[test]
fn citation_nightmare_update_picks_up_new_marks() {
    let mut editor = editor_for(2);
    let anderson = select(editor.document(), |text| text.starts_with("Anderson v."));
    run(&mut editor, EditAction::MarkCitation, &anderson);
    run(&mut editor, EditAction::PlaceToa(0), &Selection::new());

    let rowland = select(editor.document(), |text| text.starts_with("Rowland v."));
    run(&mut editor, EditAction::MarkCitation, &rowland);
    let message = run(&mut editor, EditAction::UpdateToa, &Selection::new());

    assert_eq!(message, "Table of Authorities updated with 2 citations");
    let toa = editor.document().toa().unwrap();
    assert!(toa.html.contains("Rowland v. Christian"));
    assert_eq!(editor.document().toa_count(), 1);
}

#[test]
fn redline_review_protects_the_tenant() {
    let mut editor = editor_for(3);
    let insertions = select(editor.document(), |text| {
        text.starts_with("Tenant shall have the option") || text.starts_with("A late fee")
    });
    let deletion = select(editor.document(), |text| text.starts_with("Either party may"));

    run(&mut editor, EditAction::AcceptSelected, &insertions);
    run(&mut editor, EditAction::RejectSelected, &deletion);

    let document = editor.document();
    assert!(document.sentences().all(|s| s.change_type.is_none()));
    let states: Vec<ReviewState> = document.sentences().filter_map(|s| s.review_state).collect();
    assert_eq!(
        states,
        vec![ReviewState::Accepted, ReviewState::Accepted, ReviewState::Rejected]
    );

    let html = serialize_document(document);
    assert!(!html.contains("<ins") && !html.contains("<del"));
    assert!(html.contains("Either party may terminate this Agreement"));
}

#[test]
fn redline_review_accept_all_keeps_the_deletion_marked() {
    let mut editor = editor_for(3);
    run(&mut editor, EditAction::AcceptAll, &Selection::new());

    let changes: Vec<Option<ChangeType>> = editor
        .document()
        .sentences()
        .filter(|s| s.review_state.is_some())
        .map(|s| s.change_type)
        .collect();
    assert_eq!(changes, vec![None, None, Some(ChangeType::Deletion)]);
    assert!(serialize_document(editor.document()).contains("<del"));
}

#[test]
fn filing_desk_check_places_the_table_under_the_title() {
    let mut editor = editor_for(4);
    let cases = select(editor.document(), |text| text.contains(" v. "));
    assert_eq!(cases.len(), 3);
    run(&mut editor, EditAction::MarkCitation, &cases);

    run(&mut editor, EditAction::StartPlacement, &Selection::new());
    let message = run(&mut editor, EditAction::PlaceToa(2), &Selection::new());
    assert_eq!(message, "Table of Authorities placed with 3 citations");

    let html = serialize_document(editor.document());
    let title = html.find("MOTION IN LIMINE").unwrap();
    let toa = html.find(r#"<div class="toa-block""#).unwrap();
    let background = html.find(">Background<").unwrap();
    assert!(title < toa && toa < background);
    let entries: Vec<usize> = ["Daubert v.", "Kumho Tire", "People v. Sanchez"]
        .iter()
        .map(|name| html[toa..].find(name).unwrap())
        .collect();
    assert!(entries.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn warnings_leave_the_level_untouched() {
    let mut editor = editor_for(4);
    let before = editor.document().clone();
    let mut toasts: Vec<(String, Severity)> = Vec::new();

    assert!(!editor.dispatch(&EditAction::UpdateToa, &Selection::new(), &mut toasts));
    assert!(!editor.dispatch(&EditAction::AcceptSelected, &Selection::new(), &mut toasts));

    assert_eq!(editor.document(), &before);
    assert_eq!(toasts.len(), 2);
    assert!(toasts.iter().all(|(_, severity)| *severity == Severity::Warning));
}
