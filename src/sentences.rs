//! Sentence and citation segmentation.
//!
//! [`SentenceSplitter`] cuts normalized text at terminal punctuation that is
//! followed by a capitalized word, unless the word before the cut is a legal
//! abbreviation or a bare list number. [`CitationSplitter`] then carves known
//! citation strings out of a sentence so each one becomes its own block.

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};

/// Abbreviations that end in a period without ending a sentence. Most of these
/// show up inside case citations ("Liberty Lobby, Inc., 477 U.S. 242").
const LEGAL_ABBREVIATIONS: &[&str] = &[
    "v.", "vs.", "inc.", "corp.", "co.", "ltd.", "u.s.", "n.y.", "cal.", "dr.", "no.", "llc",
    "l.l.c.", "s.", "p.", "pp.", "sec.",
];

pub struct SentenceSplitter {
    abbreviations: HashSet<String>,
}

impl SentenceSplitter {
    pub fn new() -> Self {
        Self {
            abbreviations: LEGAL_ABBREVIATIONS
                .iter()
                .map(|abbrev| abbrev.to_string())
                .collect(),
        }
    }

    /// Adds abbreviations (matched lowercased, including their trailing period).
    pub fn with_abbreviations(mut self, abbreviations: &[&str]) -> Self {
        for abbrev in abbreviations {
            self.abbreviations.insert(abbrev.to_lowercase());
        }
        self
    }

    fn is_abbreviation(&self, word: &str) -> bool {
        self.abbreviations.contains(&word.to_lowercase())
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let normalized = normalize_whitespace(text);
        if normalized.is_empty() {
            return Vec::new();
        }

        let bytes = normalized.as_bytes();
        let mut sentences = Vec::new();
        let mut start = 0;

        for idx in 0..bytes.len() {
            if !matches!(bytes[idx], b'.' | b'!' | b'?') {
                continue;
            }
            // Normalization leaves exactly one space between words.
            let next_is_space = bytes.get(idx + 1) == Some(&b' ');
            let then_upper = bytes
                .get(idx + 2)
                .is_some_and(|byte| byte.is_ascii_uppercase());
            if !next_is_space || !then_upper {
                continue;
            }

            let end = idx + 1;
            let snippet = normalized[start..end].trim();
            if is_list_marker(snippet) {
                continue;
            }
            let last_word = snippet.rsplit(' ').next().unwrap_or(snippet);
            if self.is_abbreviation(last_word) {
                continue;
            }

            if !snippet.is_empty() {
                sentences.push(snippet.to_string());
            }
            start = end;
        }

        let tail = normalized[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail.to_string());
        }

        if sentences.is_empty() {
            vec![normalized]
        } else {
            sentences
        }
    }
}

impl Default for SentenceSplitter {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits text into sentences with the default legal abbreviation set.
pub fn split_into_sentences(text: &str) -> Vec<String> {
    SentenceSplitter::new().split(text)
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// "1.", "12." and the like.
fn is_list_marker(snippet: &str) -> bool {
    match snippet.strip_suffix('.') {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit()),
        None => false,
    }
}

/// Carves a fixed list of citation strings out of sentences.
pub struct CitationSplitter {
    pattern: Option<Regex>,
}

impl CitationSplitter {
    pub fn new<S: AsRef<str>>(citations: &[S]) -> Self {
        let alternatives: Vec<String> = citations
            .iter()
            .map(AsRef::as_ref)
            .filter(|citation| !citation.is_empty())
            .map(regex::escape)
            .collect();

        if alternatives.is_empty() {
            return Self { pattern: None };
        }

        let source = format!("({})([.,;:]?)", alternatives.join("|"));
        let pattern = match RegexBuilder::new(&source).case_insensitive(true).build() {
            Ok(regex) => Some(regex),
            Err(err) => {
                tracing::warn!(%err, "citation pattern rejected; citations will not be split");
                None
            }
        };
        Self { pattern }
    }

    pub fn is_empty(&self) -> bool {
        self.pattern.is_none()
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let Some(pattern) = &self.pattern else {
            return vec![text.to_string()];
        };

        let mut parts = Vec::new();
        let mut last = 0;

        for captures in pattern.captures_iter(text) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            let before = text[last..whole.start()].trim();
            if !before.is_empty() {
                parts.push(before.to_string());
            }

            let citation = captures.get(1).map_or("", |m| m.as_str());
            let punctuation = captures.get(2).map_or("", |m| m.as_str());
            let piece = format!("{citation}{punctuation}");
            let piece = piece.trim();
            if !piece.is_empty() {
                parts.push(piece.to_string());
            }
            last = whole.end();
        }

        let tail = text[last..].trim();
        if !tail.is_empty() {
            parts.push(tail.to_string());
        }

        if parts.is_empty() {
            vec![text.to_string()]
        } else {
            parts
        }
    }
}

/// One-shot form of [`CitationSplitter::split`].
pub fn split_by_citations<S: AsRef<str>>(text: &str, citations: &[S]) -> Vec<String> {
    CitationSplitter::new(citations).split(text)
}
