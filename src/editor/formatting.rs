use tracing::debug;

use super::{DocumentEditor, EditError, Selection, SelectionPurpose};
use crate::document::{SentenceBlock, SentenceTag};
use crate::style::{merge_styles, style_value};

/// Fonts offered by the ribbon.
pub const FONT_FAMILIES: &[&str] = &[
    "Times New Roman",
    "Arial",
    "Calibri",
    "Georgia",
    "Courier New",
    "Comic Sans MS",
];

/// Sizes offered by the ribbon.
pub const FONT_SIZES: &[&str] = &[
    "10pt", "11pt", "12pt", "14pt", "16pt", "18pt", "20pt", "24pt", "28pt",
];

pub const DEFAULT_FONT_FAMILY: &str = "Times New Roman";
pub const DEFAULT_FONT_SIZE: &str = "12pt";

fn heading_font_size(tag: SentenceTag) -> &'static str {
    match tag {
        SentenceTag::Paragraph => "12pt",
        SentenceTag::Heading1 => "18pt",
        SentenceTag::Heading2 => "14pt",
        SentenceTag::Heading3 => "12pt",
    }
}

fn merge_into(sentence: &mut SentenceBlock, key: &str, value: &str) {
    sentence.style = Some(merge_styles(sentence.style.as_deref(), &[(key, Some(value))]));
}

impl DocumentEditor {
    /// Retags the selected sentences and gives them the tag's default size.
    /// Container ids stay put, so retagging part of a paragraph splits it
    /// into several elements on output.
    pub fn apply_heading_style(
        &mut self,
        tag: SentenceTag,
        selection: &Selection,
    ) -> Result<(), EditError> {
        if selection.is_empty() {
            return Err(EditError::EmptySelection(SelectionPurpose::Heading));
        }

        let size = heading_font_size(tag);
        let mut touched = 0;
        for sentence in self.document.sentences_mut() {
            if !selection.contains(sentence.id) {
                continue;
            }
            sentence.tag = tag;
            merge_into(sentence, "font-size", size);
            touched += 1;
        }
        debug!(tag = tag.tag_name(), touched, "applied heading style");
        Ok(())
    }

    /// Sets the font of the selected sentences, or of every sentence when
    /// nothing is selected.
    pub fn set_font_family(&mut self, font: &str, selection: &Selection) {
        for sentence in self.document.sentences_mut() {
            if selection.is_empty() || selection.contains(sentence.id) {
                merge_into(sentence, "font-family", font);
            }
        }
    }

    /// Sets the size of the selected sentences. With nothing selected only
    /// body text changes; headings keep their size.
    pub fn set_font_size(&mut self, size: &str, selection: &Selection) {
        for sentence in self.document.sentences_mut() {
            let targeted = if selection.is_empty() {
                sentence.tag == SentenceTag::Paragraph
            } else {
                selection.contains(sentence.id)
            };
            if targeted {
                merge_into(sentence, "font-size", size);
            }
        }
    }

    /// The sentence whose style the ribbon reflects: the first selected one
    /// in document order, or the first sentence overall.
    fn style_source(&self, selection: &Selection) -> Option<&SentenceBlock> {
        let mut sentences = self.document.sentences();
        if selection.is_empty() {
            sentences.next()
        } else {
            sentences.find(|sentence| selection.contains(sentence.id))
        }
    }

    pub fn current_font_family(&self, selection: &Selection) -> String {
        self.style_source(selection)
            .and_then(|sentence| style_value(sentence.style.as_deref(), "font-family"))
            .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string())
    }

    pub fn current_font_size(&self, selection: &Selection) -> String {
        self.style_source(selection)
            .and_then(|sentence| style_value(sentence.style.as_deref(), "font-size"))
            .unwrap_or_else(|| DEFAULT_FONT_SIZE.to_string())
    }
}
