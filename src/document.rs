//! The block model: a legal document as an ordered run of sentence blocks and
//! opaque special blocks.
//!
//! Order in [`Document::blocks`] is reading order. Sentences that share a
//! container and a tag are one structural element when serialized; see
//! [`Document::groups`].

use std::fmt;

/// Identifier of a single block (UUIDv7).
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct BlockId(uuid::Uuid);

/// Identifier of the source element a sentence was split from (UUIDv7).
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ContainerId(uuid::Uuid);

macro_rules! impl_block_id {
    ($T:ident, $prefix:literal) => {
        impl $T {
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }
        }

        impl Default for $T {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0.as_simple())
            }
        }

        impl fmt::Debug for $T {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($T), "({})"), self)
            }
        }
    };
}

impl_block_id!(BlockId, "blk");
impl_block_id!(ContainerId, "ctr");

/// Structural role of a sentence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SentenceTag {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
}

impl SentenceTag {
    pub fn from_tag_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "p" => Some(Self::Paragraph),
            "h1" => Some(Self::Heading1),
            "h2" => Some(Self::Heading2),
            "h3" => Some(Self::Heading3),
            _ => None,
        }
    }

    pub fn tag_name(self) -> &'static str {
        match self {
            Self::Paragraph => "p",
            Self::Heading1 => "h1",
            Self::Heading2 => "h2",
            Self::Heading3 => "h3",
        }
    }

    pub fn level(self) -> u8 {
        match self {
            Self::Paragraph => 0,
            Self::Heading1 => 1,
            Self::Heading2 => 2,
            Self::Heading3 => 3,
        }
    }

    pub fn is_heading(self) -> bool {
        self != Self::Paragraph
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Paragraph => "Normal",
            Self::Heading1 => "Heading 1",
            Self::Heading2 => "Heading 2",
            Self::Heading3 => "Heading 3",
        }
    }
}

/// Kind of a proposed tracked change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeType {
    Insertion,
    Deletion,
}

/// Review decision recorded on a tracked sentence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReviewState {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpecialType {
    Toa,
    Other,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SentenceBlock {
    pub id: BlockId,
    pub container_id: ContainerId,
    pub tag: SentenceTag,
    pub text: String,
    pub style: Option<String>,
    pub class_name: Option<String>,
    pub change_type: Option<ChangeType>,
    pub review_state: Option<ReviewState>,
    pub is_citation: bool,
}

impl SentenceBlock {
    pub fn new(container_id: ContainerId, tag: SentenceTag, text: impl Into<String>) -> Self {
        Self {
            id: BlockId::new(),
            container_id,
            tag,
            text: text.into(),
            style: None,
            class_name: None,
            change_type: None,
            review_state: None,
            is_citation: false,
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Marks the sentence as a pending tracked change.
    pub fn with_change(mut self, change_type: ChangeType) -> Self {
        self.change_type = Some(change_type);
        self.review_state = Some(ReviewState::Pending);
        self
    }

    pub fn with_citation(mut self) -> Self {
        self.is_citation = true;
        self
    }

    /// True when the sentence carries a change proposal or a past review decision.
    pub fn is_reviewable(&self) -> bool {
        self.change_type.is_some() || self.review_state.is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpecialBlock {
    pub id: BlockId,
    pub container_id: ContainerId,
    pub html: String,
    pub special_type: Option<SpecialType>,
}

impl SpecialBlock {
    pub fn new(html: impl Into<String>, special_type: Option<SpecialType>) -> Self {
        Self {
            id: BlockId::new(),
            container_id: ContainerId::new(),
            html: html.into(),
            special_type,
        }
    }

    pub fn new_toa(html: impl Into<String>) -> Self {
        Self::new(html, Some(SpecialType::Toa))
    }

    /// A special block counts as a Table of Authorities when tagged as one or
    /// when its markup carries the title.
    pub fn is_toa(&self) -> bool {
        self.special_type == Some(SpecialType::Toa)
            || self.html.to_lowercase().contains("table of authorities")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ContentBlock {
    Sentence(SentenceBlock),
    Special(SpecialBlock),
}

impl ContentBlock {
    pub fn id(&self) -> BlockId {
        match self {
            Self::Sentence(sentence) => sentence.id,
            Self::Special(special) => special.id,
        }
    }

    pub fn container_id(&self) -> ContainerId {
        match self {
            Self::Sentence(sentence) => sentence.container_id,
            Self::Special(special) => special.container_id,
        }
    }

    pub fn as_sentence(&self) -> Option<&SentenceBlock> {
        match self {
            Self::Sentence(sentence) => Some(sentence),
            Self::Special(_) => None,
        }
    }

    pub fn as_sentence_mut(&mut self) -> Option<&mut SentenceBlock> {
        match self {
            Self::Sentence(sentence) => Some(sentence),
            Self::Special(_) => None,
        }
    }

    pub fn is_toa(&self) -> bool {
        matches!(self, Self::Special(special) if special.is_toa())
    }
}

impl From<SentenceBlock> for ContentBlock {
    fn from(block: SentenceBlock) -> Self {
        Self::Sentence(block)
    }
}

impl From<SpecialBlock> for ContentBlock {
    fn from(block: SpecialBlock) -> Self {
        Self::Special(block)
    }
}

/// A run of blocks that becomes one element on output.
#[derive(Debug)]
pub enum BlockGroup<'a> {
    Special {
        start: usize,
        block: &'a SpecialBlock,
    },
    Sentences {
        start: usize,
        tag: SentenceTag,
        items: Vec<&'a SentenceBlock>,
    },
}

impl BlockGroup<'_> {
    /// Position of the group's first block in the document.
    pub fn start(&self) -> usize {
        match self {
            Self::Special { start, .. } | Self::Sentences { start, .. } => *start,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    blocks: Vec<ContentBlock>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: Vec<ContentBlock>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut Vec<ContentBlock> {
        &mut self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, id: BlockId) -> Option<&ContentBlock> {
        self.blocks.iter().find(|block| block.id() == id)
    }

    pub fn sentences(&self) -> impl Iterator<Item = &SentenceBlock> {
        self.blocks.iter().filter_map(ContentBlock::as_sentence)
    }

    pub fn sentences_mut(&mut self) -> impl Iterator<Item = &mut SentenceBlock> {
        self.blocks.iter_mut().filter_map(ContentBlock::as_sentence_mut)
    }

    pub fn toa(&self) -> Option<&SpecialBlock> {
        self.blocks.iter().find_map(|block| match block {
            ContentBlock::Special(special) if special.is_toa() => Some(special),
            _ => None,
        })
    }

    pub fn toa_count(&self) -> usize {
        self.blocks.iter().filter(|block| block.is_toa()).count()
    }

    /// Texts of every cited sentence in document order, trimmed, blanks skipped.
    pub fn marked_citations(&self) -> Vec<String> {
        self.sentences()
            .filter(|sentence| sentence.is_citation)
            .map(|sentence| sentence.text.trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn citation_count(&self) -> usize {
        self.sentences().filter(|sentence| sentence.is_citation).count()
    }

    /// Translates a block position into the coordinate space that skips TOA
    /// blocks, which is what placement targets are expressed in.
    pub fn placement_index_for_block(&self, index: usize) -> usize {
        let bounded = index.min(self.blocks.len());
        self.blocks[..bounded]
            .iter()
            .filter(|block| !block.is_toa())
            .count()
    }

    /// Number of placement slots' upper bound (non-TOA block count).
    pub fn non_toa_len(&self) -> usize {
        self.blocks.iter().filter(|block| !block.is_toa()).count()
    }

    /// Placement targets that fall on element boundaries: the start of every
    /// non-TOA group plus the end of the document, ascending.
    pub fn placement_slots(&self) -> Vec<usize> {
        let mut slots: Vec<usize> = self
            .groups()
            .iter()
            .filter(|group| !matches!(group, BlockGroup::Special { block, .. } if block.is_toa()))
            .map(|group| self.placement_index_for_block(group.start()))
            .collect();
        slots.push(self.non_toa_len());
        slots.dedup();
        slots
    }

    /// Splits the document into output elements. A sentence run continues
    /// only while both the container and the tag stay the same.
    pub fn groups(&self) -> Vec<BlockGroup<'_>> {
        let mut groups = Vec::new();
        let mut idx = 0;

        while idx < self.blocks.len() {
            let first = match &self.blocks[idx] {
                ContentBlock::Special(special) => {
                    groups.push(BlockGroup::Special {
                        start: idx,
                        block: special,
                    });
                    idx += 1;
                    continue;
                }
                ContentBlock::Sentence(sentence) => sentence,
            };

            let mut items = vec![first];
            let mut next = idx + 1;
            while let Some(ContentBlock::Sentence(candidate)) = self.blocks.get(next) {
                if candidate.container_id != first.container_id || candidate.tag != first.tag {
                    break;
                }
                items.push(candidate);
                next += 1;
            }

            groups.push(BlockGroup::Sentences {
                start: idx,
                tag: first.tag,
                items,
            });
            idx = next;
        }

        groups
    }
}

impl FromIterator<ContentBlock> for Document {
    fn from_iter<I: IntoIterator<Item = ContentBlock>>(iter: I) -> Self {
        Self::from_blocks(iter.into_iter().collect())
    }
}
