//! Core of a legal word-processor simulator: documents are sequences of
//! sentence blocks that can be restyled, cited, collected into a Table of
//! Authorities and reviewed as tracked changes, then written back as HTML.

pub mod document;
pub mod editor;
pub mod html;
pub mod level;
pub mod notify;
pub mod render;
pub mod sentences;
pub mod style;
pub mod theme;
