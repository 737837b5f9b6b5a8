use std::collections::BTreeSet;

use tracing::{debug, info};

use super::{DocumentEditor, EditError, Placement, Selection, SelectionPurpose, ToaStep};
use crate::document::{ContentBlock, SpecialBlock, SpecialType};
use crate::html::escape_html;

pub const TOA_TITLE: &str = "TABLE OF AUTHORITIES";

/// Where a Table of Authorities landed and how many entries it lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedToa {
    pub index: usize,
    pub count: usize,
}

/// Renders a Table of Authorities listing each distinct citation once, in
/// lexicographic order. Duplicates are detected case-sensitively.
pub fn toa_html(citations: &[String], page_label: &str) -> String {
    render_toa(citations, page_label).0
}

fn render_toa(citations: &[String], page_label: &str) -> (String, usize) {
    let entries: BTreeSet<&str> = citations.iter().map(String::as_str).collect();
    let page = escape_html(page_label);

    let mut html = format!(
        r#"<div class="toa-block" data-toa="true"><div class="toa-title">{TOA_TITLE}</div><div class="toa-subtitle">Cases</div>"#
    );
    for entry in &entries {
        html.push_str(&format!(
            r#"<div class="toa-entry"><span class="toa-case">{}</span><span class="toa-page">{page}</span></div>"#,
            escape_html(entry)
        ));
    }
    html.push_str("</div>");
    (html, entries.len())
}

impl DocumentEditor {
    /// Cites every selected sentence. There is no way back.
    pub fn mark_citation(&mut self, selection: &Selection) -> Result<(), EditError> {
        if selection.is_empty() {
            return Err(EditError::EmptySelection(SelectionPurpose::Citation));
        }
        for sentence in self.document.sentences_mut() {
            if selection.contains(sentence.id) {
                sentence.is_citation = true;
            }
        }
        Ok(())
    }

    /// Enters placement mode. An existing preview slot survives a restart.
    pub fn start_placement(&mut self) -> Result<(), EditError> {
        if self.document.marked_citations().is_empty() {
            return Err(EditError::NoMarkedCitations(ToaStep::Insert));
        }
        let preview = self.placement_preview().unwrap_or(0);
        self.placement = Placement::Placing { preview };
        Ok(())
    }

    /// Moves the highlighted slot. Ignored outside placement mode.
    pub fn set_placement_preview(&mut self, index: usize) -> bool {
        if !self.is_placing() {
            return false;
        }
        let preview = index.min(self.document.non_toa_len());
        self.placement = Placement::Placing { preview };
        true
    }

    /// Builds a fresh Table of Authorities from the marked citations and
    /// inserts it before the `target`-th non-TOA block, replacing any
    /// existing one. Placement mode ends either way.
    pub fn place_at(&mut self, target: usize) -> Result<PlacedToa, EditError> {
        self.placement = Placement::Idle;

        let citations = self.document.marked_citations();
        if citations.is_empty() {
            return Err(EditError::NoMarkedCitations(ToaStep::Insert));
        }
        let (html, count) = render_toa(&citations, &self.page_label);

        let blocks = self.document.blocks_mut();
        blocks.retain(|block| !block.is_toa());
        let index = target.min(blocks.len());
        blocks.insert(index, SpecialBlock::new_toa(html).into());

        info!(index, count, "placed table of authorities");
        Ok(PlacedToa { index, count })
    }

    /// Regenerates the first Table of Authorities in place. Returns the
    /// number of entries.
    pub fn update_from_current_citations(&mut self) -> Result<usize, EditError> {
        if self.document.toa().is_none() {
            return Err(EditError::NoExistingToa);
        }
        let citations = self.document.marked_citations();
        if citations.is_empty() {
            return Err(EditError::NoMarkedCitations(ToaStep::Update));
        }
        let (html, count) = render_toa(&citations, &self.page_label);

        let existing = self
            .document
            .blocks_mut()
            .iter_mut()
            .find_map(|block| match block {
                ContentBlock::Special(special) if special.is_toa() => Some(special),
                _ => None,
            });
        if let Some(special) = existing {
            special.html = html;
            special.special_type = Some(SpecialType::Toa);
        }
        debug!(count, "updated table of authorities");
        Ok(count)
    }

    /// Drops every Table of Authorities and leaves placement mode.
    pub fn remove_toa(&mut self) {
        self.document.blocks_mut().retain(|block| !block.is_toa());
        self.placement = Placement::Idle;
    }

    pub fn cancel_placement(&mut self) {
        self.placement = Placement::Idle;
    }
}
