use super::{escape_attribute, escape_html};
use crate::document::{BlockGroup, ChangeType, Document, SentenceBlock};

/// Renders blocks back to markup.
///
/// Special blocks are written verbatim. Each sentence group becomes one
/// element whose attributes come from the group's first sentence; the
/// sentences inside are joined by a single space.
pub fn serialize_document(document: &Document) -> String {
    let mut html = String::new();

    for group in document.groups() {
        match group {
            BlockGroup::Special { block, .. } => html.push_str(&block.html),
            BlockGroup::Sentences { tag, items, .. } => {
                let Some(first) = items.first() else {
                    continue;
                };
                let name = tag.tag_name();
                html.push('<');
                html.push_str(name);
                push_attribute(&mut html, "style", first.style.as_deref());
                push_attribute(&mut html, "class", first.class_name.as_deref());
                html.push('>');

                let body: Vec<String> = items.iter().map(|sentence| inline_html(sentence)).collect();
                html.push_str(&body.join(" "));

                html.push_str("</");
                html.push_str(name);
                html.push('>');
            }
        }
    }

    html
}

fn push_attribute(html: &mut String, name: &str, value: Option<&str>) {
    let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) else {
        return;
    };
    html.push(' ');
    html.push_str(name);
    html.push_str("=\"");
    html.push_str(&escape_attribute(value));
    html.push('"');
}

/// Sentence text with its citation and tracked-change wrappers. The change
/// wrapper is always outermost.
fn inline_html(sentence: &SentenceBlock) -> String {
    let mut content = escape_html(&sentence.text);
    if sentence.is_citation {
        content = format!(r#"<mark data-citation="true" class="citation-marked">{content}</mark>"#);
    }
    match sentence.change_type {
        Some(ChangeType::Insertion) => {
            format!(r#"<ins data-insertion="true" class="track-insertion-inline">{content}</ins>"#)
        }
        Some(ChangeType::Deletion) => {
            format!(r#"<del data-deletion="true" class="track-deletion-inline">{content}</del>"#)
        }
        None => content,
    }
}
