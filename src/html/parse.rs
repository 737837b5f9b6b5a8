use kuchiki::traits::*;
use kuchiki::{ElementData, NodeRef};
use tracing::debug;

use crate::document::{
    ChangeType, ContainerId, ContentBlock, Document, SentenceBlock, SentenceTag, SpecialBlock,
};
use crate::sentences::{CitationSplitter, SentenceSplitter};

/// Level-specific knobs for [`parse_document`].
#[derive(Clone, Debug, Default)]
pub struct ParseOptions {
    /// Exact citation strings to carve out of body sentences.
    pub citation_splits: Vec<String>,
}

impl ParseOptions {
    pub fn with_citation_splits<S: Into<String>>(
        mut self,
        citations: impl IntoIterator<Item = S>,
    ) -> Self {
        self.citation_splits = citations.into_iter().map(Into::into).collect();
        self
    }
}

/// Flags a text run contributes to every sentence cut from it.
#[derive(Clone, Copy, Default)]
struct RunFlags {
    change_type: Option<ChangeType>,
    is_citation: bool,
}

impl RunFlags {
    /// Flags for an inline element. A change wrapper and a citation mark may
    /// nest either way round; both count.
    fn for_inline(node: &NodeRef, name: &str) -> Self {
        let nested = |wanted: &[&str]| {
            node.descendants()
                .any(|inner| inner.as_element().is_some_and(|el| wanted.contains(&&*el.name.local)))
        };
        let change_type = match name {
            "ins" => Some(ChangeType::Insertion),
            "del" => Some(ChangeType::Deletion),
            _ if name == "mark" && nested(&["ins"]) => Some(ChangeType::Insertion),
            _ if name == "mark" && nested(&["del"]) => Some(ChangeType::Deletion),
            _ => None,
        };
        let is_citation = match name {
            "mark" => true,
            "ins" | "del" => nested(&["mark"]),
            _ => false,
        };
        Self {
            change_type,
            is_citation,
        }
    }
}

struct BlockBuilder {
    sentences: SentenceSplitter,
    citations: CitationSplitter,
    output: Vec<ContentBlock>,
}

impl BlockBuilder {
    fn push_element(&mut self, node: &NodeRef, element: &ElementData, tag: SentenceTag) {
        let attributes = element.attributes.borrow();
        let style = non_empty(attributes.get("style"));
        let class_name = non_empty(attributes.get("class"));
        let context = RunContext {
            container_id: ContainerId::new(),
            tag,
            style: style.as_deref(),
            class_name: class_name.as_deref(),
        };

        if !node.children().any(|child| child.as_element().is_some()) {
            self.push_run(&context, &node.text_contents(), RunFlags::default());
            return;
        }

        for child in node.children() {
            if let Some(text) = child.as_text() {
                self.push_run(&context, &text.borrow(), RunFlags::default());
            } else if let Some(inline) = child.as_element() {
                let flags = RunFlags::for_inline(&child, &inline.name.local);
                self.push_run(&context, &child.text_contents(), flags);
            }
        }
    }

    fn push_run(&mut self, context: &RunContext<'_>, text: &str, flags: RunFlags) {
        let fragments = if context.tag.is_heading() {
            vec![text.trim().to_string()]
        } else {
            self.sentences
                .split(text)
                .into_iter()
                .flat_map(|sentence| self.citations.split(&sentence))
                .collect()
        };

        for fragment in fragments.into_iter().filter(|f| !f.is_empty()) {
            let mut block = SentenceBlock::new(context.container_id, context.tag, fragment);
            block.style = context.style.map(str::to_string);
            block.class_name = context.class_name.map(str::to_string);
            if let Some(change_type) = flags.change_type {
                block = block.with_change(change_type);
            }
            block.is_citation = flags.is_citation;
            self.output.push(block.into());
        }
    }
}

struct RunContext<'a> {
    container_id: ContainerId,
    tag: SentenceTag,
    style: Option<&'a str>,
    class_name: Option<&'a str>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn is_toa_container(element: &ElementData) -> bool {
    let attributes = element.attributes.borrow();
    &*element.name.local == "div"
        && (attributes
            .get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == "toa-block"))
            || attributes.get("data-toa") == Some("true"))
}

/// Children of `<body>` once the markup has been through the HTML parser,
/// which supplies the `<html>`/`<body>` wrapper when the input has none.
pub(crate) fn body_children(html: &str) -> Vec<NodeRef> {
    let document = kuchiki::parse_html().one(html.to_string());
    match document.select_first("body") {
        Ok(body) => body.as_node().children().collect(),
        Err(()) => Vec::new(),
    }
}

/// Parses a level document into blocks.
///
/// Only direct children of the body are considered. `p` and `h1`..`h3`
/// become sentence blocks, a Table of Authorities container becomes a
/// special block, and everything else is dropped.
pub fn parse_document(html: &str, options: &ParseOptions) -> Document {
    let mut builder = BlockBuilder {
        sentences: SentenceSplitter::new(),
        citations: CitationSplitter::new(&options.citation_splits),
        output: Vec::new(),
    };
    let mut skipped = 0usize;

    for node in body_children(html) {
        let Some(element) = node.as_element() else {
            continue;
        };

        if is_toa_container(element) {
            builder.output.push(SpecialBlock::new_toa(node.to_string()).into());
            continue;
        }

        match SentenceTag::from_tag_name(&element.name.local) {
            Some(tag) => builder.push_element(&node, element, tag),
            None => skipped += 1,
        }
    }

    debug!(
        blocks = builder.output.len(),
        skipped, "parsed document into blocks"
    );
    Document::from_blocks(builder.output)
}
