use std::collections::HashMap;

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthChar;

use crate::document::{
    BlockGroup, BlockId, ChangeType, Document, ReviewState, SentenceBlock, SentenceTag,
    SpecialBlock,
};
use crate::editor::Selection;
use crate::html::special_text_lines;
use crate::theme::Theme;

const SLOT_LABEL: &str = " Table of Authorities goes here ";
const SPECIAL_PREFIX: &str = "│ ";

/// What the view needs beyond the document itself.
pub struct RenderState<'a> {
    pub focus: Option<BlockId>,
    pub selection: &'a Selection,
    pub placement_preview: Option<usize>,
    pub theme: &'a Theme,
}

#[derive(Debug)]
pub struct RenderResult {
    pub lines: Vec<Line<'static>>,
    pub total_lines: usize,
    /// First visual line of every sentence.
    pub sentence_lines: HashMap<BlockId, usize>,
    pub focus_line: Option<usize>,
    /// Line of the placement preview marker, while placing.
    pub slot_line: Option<usize>,
}

pub fn render_document(
    document: &Document,
    width: usize,
    state: &RenderState<'_>,
) -> RenderResult {
    let mut renderer = Renderer::new(width.max(1), state);
    renderer.render_document(document);
    renderer.finish()
}

struct Renderer<'a> {
    wrap_width: usize,
    state: &'a RenderState<'a>,
    lines: Vec<Line<'static>>,
    sentence_lines: HashMap<BlockId, usize>,
    slot_line: Option<usize>,
}

impl<'a> Renderer<'a> {
    fn new(wrap_width: usize, state: &'a RenderState<'a>) -> Self {
        Self {
            wrap_width,
            state,
            lines: Vec::new(),
            sentence_lines: HashMap::new(),
            slot_line: None,
        }
    }

    fn render_document(&mut self, document: &Document) {
        for (idx, group) in document.groups().iter().enumerate() {
            if idx > 0 {
                self.push_blank_line();
            }
            if self.wants_slot_before(document, group) {
                self.push_slot_line();
                self.push_blank_line();
            }
            match group {
                BlockGroup::Special { block, .. } => self.render_special(block),
                BlockGroup::Sentences { tag, items, .. } => self.render_sentences(*tag, items),
            }
        }

        if self.state.placement_preview.is_some() && self.slot_line.is_none() {
            if !self.lines.is_empty() {
                self.push_blank_line();
            }
            self.push_slot_line();
        }
    }

    /// The preview slot goes in front of the first non-TOA element that
    /// still covers the previewed index.
    fn wants_slot_before(&self, document: &Document, group: &BlockGroup<'_>) -> bool {
        let Some(preview) = self.state.placement_preview else {
            return false;
        };
        if self.slot_line.is_some() {
            return false;
        }
        let covered = match group {
            BlockGroup::Special { block, .. } if block.is_toa() => return false,
            BlockGroup::Special { .. } => 1,
            BlockGroup::Sentences { items, .. } => items.len(),
        };
        preview < document.placement_index_for_block(group.start()) + covered
    }

    fn render_sentences(&mut self, tag: SentenceTag, items: &[&SentenceBlock]) {
        let mut fragments = Vec::new();
        for (idx, sentence) in items.iter().enumerate() {
            if idx > 0 {
                tokenize_text(" ", Style::default(), None, &mut fragments);
            }
            let style = self.sentence_style(tag, sentence);
            tokenize_text(&sentence.text, style, Some(sentence.id), &mut fragments);
        }
        let lines = wrap_fragments(&fragments, "", "", self.wrap_width);
        self.consume_lines(lines);

        let underline_char = match tag {
            SentenceTag::Heading1 => '=',
            SentenceTag::Heading2 => '-',
            SentenceTag::Heading3 | SentenceTag::Paragraph => return,
        };
        let width = self.lines.last().map(line_width).unwrap_or(0);
        self.push_styled_line(
            underline_string(width, underline_char),
            Style::default().add_modifier(Modifier::BOLD),
        );
    }

    fn render_special(&mut self, block: &SpecialBlock) {
        let theme = self.state.theme;
        let style = if block.is_toa() {
            theme.toa_style()
        } else {
            theme.special_style()
        };

        let texts = special_text_lines(&block.html);
        if texts.is_empty() {
            self.push_styled_line(SPECIAL_PREFIX.trim_end().to_string(), style);
            return;
        }

        for (idx, text) in texts.iter().enumerate() {
            let line_style = if idx == 0 && block.is_toa() {
                style.add_modifier(Modifier::BOLD)
            } else {
                style
            };
            let mut fragments = Vec::new();
            tokenize_text(text, line_style, None, &mut fragments);
            let mut lines =
                wrap_fragments(&fragments, SPECIAL_PREFIX, SPECIAL_PREFIX, self.wrap_width);
            for line in &mut lines {
                if let Some(prefix) = line.spans.first_mut() {
                    prefix.style = style;
                }
            }
            self.consume_lines(lines);
        }
    }

    fn sentence_style(&self, tag: SentenceTag, sentence: &SentenceBlock) -> Style {
        let theme = self.state.theme;
        let mut style = Style::default();
        if tag.is_heading() {
            style = style.add_modifier(Modifier::BOLD);
        }
        style = match (sentence.change_type, sentence.review_state) {
            (Some(ChangeType::Insertion), Some(ReviewState::Rejected)) => {
                style.patch(theme.rejected_style())
            }
            (Some(ChangeType::Insertion), _) => style.patch(theme.insertion_style()),
            (Some(ChangeType::Deletion), _) => style.patch(theme.deletion_style()),
            (None, _) => style,
        };
        if sentence.is_citation {
            style = style.patch(theme.citation_style());
        }
        if self.state.selection.contains(sentence.id) {
            style = style.patch(theme.selection_style());
        }
        if self.state.focus == Some(sentence.id) {
            style = style.patch(theme.focus_style());
        }
        style
    }

    fn push_slot_line(&mut self) {
        let label_width = visible_width(SLOT_LABEL);
        let side = self.wrap_width.saturating_sub(label_width) / 2;
        let rule = "┄".repeat(side.max(2));
        self.slot_line = Some(self.lines.len());
        self.push_styled_line(
            format!("{rule}{SLOT_LABEL}{rule}"),
            self.state.theme.placement_style(),
        );
    }

    fn push_blank_line(&mut self) {
        self.lines.push(Line::from(""));
    }

    fn push_styled_line(&mut self, content: String, style: Style) {
        self.lines.push(Line::from(vec![Span::styled(content, style)]));
    }

    fn consume_lines(&mut self, outputs: Vec<LineOutput>) {
        for output in outputs {
            let line_index = self.lines.len();
            for id in output.starts {
                self.sentence_lines.entry(id).or_insert(line_index);
            }
            let spans: Vec<Span<'static>> = output
                .spans
                .into_iter()
                .map(|segment| Span::styled(segment.text, segment.style))
                .collect();
            self.lines.push(Line::from(spans));
        }
    }

    fn finish(mut self) -> RenderResult {
        if self.lines.is_empty() {
            self.lines.push(Line::from(""));
        }
        let total_lines = self.lines.len();
        let focus_line = self
            .state
            .focus
            .and_then(|id| self.sentence_lines.get(&id).copied());

        RenderResult {
            lines: self.lines,
            total_lines,
            sentence_lines: self.sentence_lines,
            focus_line,
            slot_line: self.slot_line,
        }
    }
}

#[derive(Clone)]
struct LineSegment {
    text: String,
    style: Style,
}

struct LineOutput {
    spans: Vec<LineSegment>,
    starts: Vec<BlockId>,
}

#[derive(Clone)]
struct Fragment {
    text: String,
    style: Style,
    kind: FragmentKind,
    width: usize,
    /// Sentences whose text begins with this fragment.
    starts: Vec<BlockId>,
}

#[derive(Clone, Copy)]
enum FragmentKind {
    Word,
    Whitespace,
}

#[derive(Clone)]
enum FragmentItem {
    Token(Fragment),
    LineBreak,
}

fn tokenize_text(
    text: &str,
    style: Style,
    start: Option<BlockId>,
    fragments: &mut Vec<FragmentItem>,
) {
    let mut builder: Option<TokenBuilder> = None;
    let mut pending: Vec<BlockId> = start.into_iter().collect();
    let mut buffer: Vec<char> = Vec::new();

    for ch in text.chars() {
        if ch == '\r' {
            continue;
        }
        if ch == '\n' {
            if let Some(mut token) = builder.take() {
                token.starts.append(&mut pending);
                fragments.push(FragmentItem::Token(token.finish()));
            }
            fragments.push(FragmentItem::LineBreak);
            continue;
        }

        buffer.clear();
        if ch == '\t' {
            buffer.extend_from_slice(&[' '; 4]);
        } else {
            buffer.push(ch);
        }
        for actual in &buffer {
            let is_whitespace = actual.is_whitespace();
            match builder.as_mut() {
                Some(current) if current.kind_matches(is_whitespace) => {
                    current.push_char(*actual);
                }
                _ => {
                    if let Some(existing) = builder.take() {
                        fragments.push(FragmentItem::Token(existing.finish()));
                    }
                    let mut next = TokenBuilder::new(style, is_whitespace);
                    next.starts.append(&mut pending);
                    next.push_char(*actual);
                    builder = Some(next);
                }
            }
        }
    }

    if let Some(token) = builder {
        fragments.push(FragmentItem::Token(token.finish()));
    } else if !pending.is_empty() {
        fragments.push(FragmentItem::Token(Fragment {
            text: String::new(),
            style,
            kind: FragmentKind::Word,
            width: 0,
            starts: pending,
        }));
    }
}

struct TokenBuilder {
    text: String,
    style: Style,
    kind: FragmentKind,
    width: usize,
    starts: Vec<BlockId>,
}

impl TokenBuilder {
    fn new(style: Style, is_whitespace: bool) -> Self {
        Self {
            text: String::new(),
            style,
            kind: if is_whitespace {
                FragmentKind::Whitespace
            } else {
                FragmentKind::Word
            },
            width: 0,
            starts: Vec::new(),
        }
    }

    fn kind_matches(&self, is_whitespace: bool) -> bool {
        matches!(
            (self.kind, is_whitespace),
            (FragmentKind::Whitespace, true) | (FragmentKind::Word, false)
        )
    }

    fn push_char(&mut self, ch: char) {
        self.text.push(ch);
        self.width += UnicodeWidthChar::width(ch).unwrap_or(0);
    }

    fn finish(self) -> Fragment {
        Fragment {
            text: self.text,
            style: self.style,
            kind: self.kind,
            width: self.width,
            starts: self.starts,
        }
    }
}

fn wrap_fragments(
    fragments: &[FragmentItem],
    first_prefix: &str,
    continuation_prefix: &str,
    width: usize,
) -> Vec<LineOutput> {
    let mut outputs = Vec::new();
    let mut builder = LineBuilder::new(first_prefix);
    let mut pending_whitespace: Vec<Fragment> = Vec::new();

    for fragment in fragments {
        match fragment {
            FragmentItem::LineBreak => {
                builder.consume_pending(&mut pending_whitespace);
                outputs.push(builder.build_line());
                builder = LineBuilder::new(continuation_prefix);
            }
            FragmentItem::Token(token) => match token.kind {
                FragmentKind::Whitespace => {
                    pending_whitespace.push(token.clone());
                }
                FragmentKind::Word => {
                    let whitespace_width: usize =
                        pending_whitespace.iter().map(|item| item.width).sum();
                    if builder.width > builder.prefix_width
                        && builder.width + whitespace_width + token.width > width
                    {
                        // Whitespace at a wrap point is dropped; a sentence
                        // that started there moves along with the word.
                        let mut carried = Vec::new();
                        for item in pending_whitespace.drain(..) {
                            carried.extend(item.starts);
                        }
                        outputs.push(builder.build_line());
                        builder = LineBuilder::new(continuation_prefix);
                        builder.starts.extend(carried);
                    }

                    builder.consume_pending(&mut pending_whitespace);
                    builder.append_token(token.clone());
                }
            },
        }
    }

    builder.consume_pending(&mut pending_whitespace);
    outputs.push(builder.build_line());
    outputs
}

struct LineBuilder {
    segments: Vec<LineSegment>,
    starts: Vec<BlockId>,
    width: usize,
    prefix_width: usize,
}

impl LineBuilder {
    fn new(prefix: &str) -> Self {
        let prefix_width = visible_width(prefix);
        let mut segments = Vec::new();
        if !prefix.is_empty() {
            segments.push(LineSegment {
                text: prefix.to_string(),
                style: Style::default(),
            });
        }
        Self {
            segments,
            starts: Vec::new(),
            width: prefix_width,
            prefix_width,
        }
    }

    fn consume_pending(&mut self, pending_whitespace: &mut Vec<Fragment>) {
        for fragment in pending_whitespace.drain(..) {
            self.append_token(fragment);
        }
    }

    fn append_token(&mut self, fragment: Fragment) {
        self.starts.extend(fragment.starts);
        if !fragment.text.is_empty() {
            self.segments.push(LineSegment {
                text: fragment.text,
                style: fragment.style,
            });
            self.width += fragment.width;
        }
    }

    fn build_line(mut self) -> LineOutput {
        if self.segments.is_empty() {
            self.segments.push(LineSegment {
                text: String::new(),
                style: Style::default(),
            });
        }
        LineOutput {
            spans: self.segments,
            starts: self.starts,
        }
    }
}

fn visible_width(text: &str) -> usize {
    text.chars()
        .map(|ch| UnicodeWidthChar::width(ch).unwrap_or(0))
        .sum()
}

fn line_width(line: &Line<'_>) -> usize {
    line.spans
        .iter()
        .map(|span| visible_width(span.content.as_ref()))
        .sum()
}

fn underline_string(width: usize, ch: char) -> String {
    std::iter::repeat_n(ch, width.max(1)).collect()
}
