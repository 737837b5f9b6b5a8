use std::fmt;

use tracing::debug;

use super::{DocumentEditor, EditError, Selection};
use crate::document::{ChangeType, ReviewState, SentenceBlock};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReviewDecision {
    Accept,
    Reject,
}

impl fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
        })
    }
}

impl ReviewDecision {
    /// Records the decision on one sentence.
    ///
    /// Neither decision drops text: an accepted deletion and a rejected
    /// insertion stay in the document with their change marker, so the
    /// decision can still be seen and revisited.
    fn apply(self, sentence: &mut SentenceBlock) {
        match (self, sentence.change_type) {
            (Self::Accept, Some(ChangeType::Deletion)) => {
                sentence.review_state = Some(ReviewState::Accepted);
            }
            (Self::Accept, _) => {
                sentence.change_type = None;
                sentence.review_state = Some(ReviewState::Accepted);
            }
            (Self::Reject, Some(ChangeType::Insertion)) => {
                sentence.review_state = Some(ReviewState::Rejected);
            }
            (Self::Reject, Some(ChangeType::Deletion)) => {
                sentence.change_type = None;
                sentence.review_state = Some(ReviewState::Rejected);
            }
            (Self::Reject, None) => {
                sentence.review_state = Some(ReviewState::Rejected);
            }
        }
    }
}

impl DocumentEditor {
    /// True when the selection holds a sentence that has a tracked change or
    /// an earlier review decision.
    pub fn has_reviewable_selection(&self, selection: &Selection) -> bool {
        !selection.is_empty()
            && self
                .document
                .sentences()
                .any(|sentence| selection.contains(sentence.id) && sentence.is_reviewable())
    }

    pub fn accept_selected(&mut self, selection: &Selection) -> Result<(), EditError> {
        self.review_selected(ReviewDecision::Accept, selection)
    }

    pub fn reject_selected(&mut self, selection: &Selection) -> Result<(), EditError> {
        self.review_selected(ReviewDecision::Reject, selection)
    }

    fn review_selected(
        &mut self,
        decision: ReviewDecision,
        selection: &Selection,
    ) -> Result<(), EditError> {
        if !self.has_reviewable_selection(selection) {
            return Err(EditError::NoQualifyingChange(decision));
        }

        let mut reviewed = 0;
        for sentence in self.document.sentences_mut() {
            if selection.contains(sentence.id) && sentence.is_reviewable() {
                decision.apply(sentence);
                reviewed += 1;
            }
        }
        debug!(%decision, reviewed, "reviewed selected changes");
        Ok(())
    }

    /// Accepts every tracked change in the document regardless of selection.
    /// Sentences without a change marker are left alone.
    pub fn accept_all(&mut self) {
        let mut reviewed = 0;
        for sentence in self.document.sentences_mut() {
            if sentence.change_type.is_some() {
                ReviewDecision::Accept.apply(sentence);
                reviewed += 1;
            }
        }
        debug!(reviewed, "accepted all changes");
    }
}
