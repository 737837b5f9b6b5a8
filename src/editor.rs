//! Edit operations over a [`Document`].
//!
//! Every operation takes the caller's [`Selection`] explicitly. Precondition
//! failures come back as [`EditError`] and leave the document untouched;
//! [`DocumentEditor::dispatch`] turns outcomes into notifications.

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

use crate::document::{BlockId, Document, SentenceTag};
use crate::notify::{Notifier, Severity};

mod authorities;
mod formatting;
mod review;

pub use authorities::{PlacedToa, TOA_TITLE, toa_html};
pub use formatting::{DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, FONT_FAMILIES, FONT_SIZES};
pub use review::ReviewDecision;

/// The set of sentence blocks the user has picked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<BlockId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.ids.contains(&id)
    }

    pub fn insert(&mut self, id: BlockId) {
        self.ids.insert(id);
    }

    /// Adds or removes `id`; returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: BlockId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.ids.iter().copied()
    }
}

impl FromIterator<BlockId> for Selection {
    fn from_iter<I: IntoIterator<Item = BlockId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// What an operation needed a selection for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionPurpose {
    Heading,
    Citation,
}

impl fmt::Display for SelectionPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Heading => "Select at least one sentence to apply a heading",
            Self::Citation => "Select a sentence to mark as a citation",
        })
    }
}

/// The Table of Authorities step that found no citations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToaStep {
    Insert,
    Update,
}

impl fmt::Display for ToaStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Insert => "inserting TOA",
            Self::Update => "updating the TOA",
        })
    }
}

/// User-correctable precondition failures.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("{0}")]
    EmptySelection(SelectionPurpose),
    #[error("No citations marked. Mark citations before {0}.")]
    NoMarkedCitations(ToaStep),
    #[error("No Table of Authorities to update. Insert the TOA first.")]
    NoExistingToa,
    #[error("Select a tracked change to {0}")]
    NoQualifyingChange(ReviewDecision),
}

/// Table of Authorities placement mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Placement {
    #[default]
    Idle,
    /// Waiting for a target; `preview` is the slot currently highlighted,
    /// counted over non-TOA blocks.
    Placing { preview: usize },
}

/// A ribbon command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditAction {
    ApplyHeading(SentenceTag),
    SetFontFamily(String),
    SetFontSize(String),
    MarkCitation,
    StartPlacement,
    PlaceToa(usize),
    UpdateToa,
    RemoveToa,
    CancelPlacement,
    AcceptSelected,
    RejectSelected,
    AcceptAll,
}

impl EditAction {
    /// Whether a successful run of this action consumes the selection.
    pub fn clears_selection(&self) -> bool {
        matches!(
            self,
            Self::ApplyHeading(_)
                | Self::SetFontFamily(_)
                | Self::SetFontSize(_)
                | Self::MarkCitation
                | Self::AcceptSelected
                | Self::RejectSelected
                | Self::AcceptAll
        )
    }
}

pub struct DocumentEditor {
    document: Document,
    page_label: String,
    placement: Placement,
}

impl DocumentEditor {
    /// `page_label` is what each Table of Authorities entry shows in its page
    /// column.
    pub fn new(document: Document, page_label: impl Into<String>) -> Self {
        Self {
            document,
            page_label: page_label.into(),
            placement: Placement::Idle,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn page_label(&self) -> &str {
        &self.page_label
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn is_placing(&self) -> bool {
        matches!(self.placement, Placement::Placing { .. })
    }

    /// The highlighted placement slot while placing.
    pub fn placement_preview(&self) -> Option<usize> {
        match self.placement {
            Placement::Placing { preview } => Some(preview),
            Placement::Idle => None,
        }
    }

    /// Runs `action` and reports the outcome through `notifier`. Returns
    /// whether the action took effect.
    pub fn dispatch(
        &mut self,
        action: &EditAction,
        selection: &Selection,
        notifier: &mut impl Notifier,
    ) -> bool {
        match self.run(action, selection) {
            Ok((message, severity)) => {
                debug!(?action, selected = selection.len(), "edit applied");
                notifier.notify(&message, severity);
                true
            }
            Err(err) => {
                warn!(?action, %err, "edit rejected");
                notifier.notify(&err.to_string(), Severity::Warning);
                false
            }
        }
    }

    fn run(
        &mut self,
        action: &EditAction,
        selection: &Selection,
    ) -> Result<(String, Severity), EditError> {
        let outcome = match action {
            EditAction::ApplyHeading(tag) => {
                self.apply_heading_style(*tag, selection)?;
                let message = match tag {
                    SentenceTag::Paragraph => "Applied Normal paragraph style".to_string(),
                    heading => format!("Applied Heading {} style", heading.level()),
                };
                (message, Severity::Success)
            }
            EditAction::SetFontFamily(font) => {
                self.set_font_family(font, selection);
                (format!("Font changed to {font}"), Severity::Success)
            }
            EditAction::SetFontSize(size) => {
                self.set_font_size(size, selection);
                (format!("Font size set to {size}"), Severity::Success)
            }
            EditAction::MarkCitation => {
                self.mark_citation(selection)?;
                ("Citation marked".to_string(), Severity::Success)
            }
            EditAction::StartPlacement => {
                self.start_placement()?;
                (
                    "Placement mode: move between paragraphs to preview, Enter places the TOA, Esc exits placement.".to_string(),
                    Severity::Info,
                )
            }
            EditAction::PlaceToa(target) => {
                let placed = self.place_at(*target)?;
                let location = if placed.index == 0 { " at the top" } else { "" };
                (
                    format!(
                        "Table of Authorities placed{location} with {}",
                        citation_count_label(placed.count)
                    ),
                    Severity::Success,
                )
            }
            EditAction::UpdateToa => {
                let count = self.update_from_current_citations()?;
                (
                    format!(
                        "Table of Authorities updated with {}",
                        citation_count_label(count)
                    ),
                    Severity::Success,
                )
            }
            EditAction::RemoveToa => {
                self.remove_toa();
                (
                    "Table of Authorities removed. Re-run Insert TOA to place it again.".to_string(),
                    Severity::Info,
                )
            }
            EditAction::CancelPlacement => {
                self.cancel_placement();
                ("TOA placement cancelled".to_string(), Severity::Info)
            }
            EditAction::AcceptSelected => {
                self.accept_selected(selection)?;
                ("Selected changes accepted".to_string(), Severity::Success)
            }
            EditAction::RejectSelected => {
                self.reject_selected(selection)?;
                ("Selected changes rejected".to_string(), Severity::Success)
            }
            EditAction::AcceptAll => {
                self.accept_all();
                ("All changes accepted".to_string(), Severity::Success)
            }
        };
        Ok(outcome)
    }
}

fn citation_count_label(count: usize) -> String {
    if count == 1 {
        "1 citation".to_string()
    } else {
        format!("{count} citations")
    }
}

#[cfg(test)]
#[path = "editor_tests.rs"]
mod tests;
