//! Level definitions: the starting document plus the briefing shown to the
//! user. Four levels ship with the crate; more can be loaded from TOML files
//! with the same shape as the files under `levels/`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::document::Document;
use crate::html::{ParseOptions, parse_document};

const BUILTIN_SOURCES: &[(&str, &str)] = &[
    (
        "levels/01-improper-brief.toml",
        include_str!("../levels/01-improper-brief.toml"),
    ),
    (
        "levels/02-citation-nightmare.toml",
        include_str!("../levels/02-citation-nightmare.toml"),
    ),
    (
        "levels/03-redline-review.toml",
        include_str!("../levels/03-redline-review.toml"),
    ),
    (
        "levels/04-filing-desk-check.toml",
        include_str!("../levels/04-filing-desk-check.toml"),
    ),
];

/// Page column used by a Table of Authorities when a level names none.
pub const DEFAULT_PAGE_LABEL: &str = "passim";

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("no built-in level {id} (levels 1-{count} are available)")]
    Unknown { id: u32, count: usize },
    #[error("failed to read level file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed level definition in {origin}")]
    Malformed {
        origin: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Junior,
    Associate,
    Senior,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Junior => "Junior",
            Self::Associate => "Associate",
            Self::Senior => "Senior",
        })
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub hint: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Level {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    pub initial_document: String,
    /// Citations carved out of body sentences so each can be marked alone.
    #[serde(default)]
    pub citation_splits: Vec<String>,
    #[serde(default)]
    pub toa_page_label: Option<String>,
}

impl Level {
    pub fn from_toml(source: &str, origin: &str) -> Result<Self, LevelError> {
        toml::from_str(source).map_err(|source| LevelError::Malformed {
            origin: origin.to_string(),
            source,
        })
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let level = Self::from_toml(&source, &path.display().to_string())?;
        info!(id = level.id, title = %level.title, path = %path.display(), "loaded level file");
        Ok(level)
    }

    /// One of the shipped levels, numbered from 1.
    pub fn builtin(id: u32) -> Result<Self, LevelError> {
        let entry = (id as usize)
            .checked_sub(1)
            .and_then(|index| BUILTIN_SOURCES.get(index));
        let Some((origin, source)) = entry else {
            return Err(LevelError::Unknown {
                id,
                count: BUILTIN_SOURCES.len(),
            });
        };
        Self::from_toml(source, origin)
    }

    pub fn builtin_all() -> Result<Vec<Self>, LevelError> {
        BUILTIN_SOURCES
            .iter()
            .map(|(origin, source)| Self::from_toml(source, origin))
            .collect()
    }

    pub fn page_label(&self) -> &str {
        self.toa_page_label.as_deref().unwrap_or(DEFAULT_PAGE_LABEL)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::default().with_citation_splits(self.citation_splits.iter().cloned())
    }

    /// Parses the starting document into blocks.
    pub fn document(&self) -> Document {
        parse_document(&self.initial_document, &self.parse_options())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ChangeType;

    #[test]
    fn builtin_levels_parse() {
        let levels = Level::builtin_all().unwrap();
        let ids: Vec<u32> = levels.iter().map(|level| level.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(levels.iter().all(|level| !level.tasks.is_empty()));
        assert_eq!(levels[1].difficulty, Difficulty::Associate);
        assert_eq!(levels[1].difficulty.to_string(), "Associate");
    }

    #[test]
    fn page_labels_depend_on_level() {
        let labels: Vec<String> = Level::builtin_all()
            .unwrap()
            .iter()
            .map(|level| level.page_label().to_string())
            .collect();
        assert_eq!(labels, vec!["passim", "1", "passim", "1"]);
    }

    #[test]
    fn unknown_level_is_an_error() {
        assert!(matches!(
            Level::builtin(0),
            Err(LevelError::Unknown { id: 0, count: 4 })
        ));
        assert!(matches!(
            Level::builtin(9),
            Err(LevelError::Unknown { id: 9, .. })
        ));
    }

    #[test]
    fn filing_desk_check_carves_out_citations() {
        let document = Level::builtin(4).unwrap().document();
        let texts: Vec<&str> = document.sentences().map(|s| s.text.as_str()).collect();
        assert!(texts.contains(&"Daubert v. Merrell Dow Pharmaceuticals, Inc., 509 U.S. 579 (1993),"));
        assert!(texts.contains(&"Kumho Tire Co. v. Carmichael, 526 U.S. 137 (1999)."));
        assert!(texts.contains(&"People v. Sanchez, 63 Cal. 4th 665 (2016)."));
    }

    #[test]
    fn redline_review_has_tracked_changes() {
        let document = Level::builtin(3).unwrap().document();
        let changes: Vec<ChangeType> = document.sentences().filter_map(|s| s.change_type).collect();
        assert_eq!(
            changes,
            vec![ChangeType::Insertion, ChangeType::Insertion, ChangeType::Deletion]
        );
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let level = Level::from_toml(
            r#"
id = 7
title = "Scratch"
initial_document = "<p>Hello.</p>"
"#,
            "inline",
        )
        .unwrap();
        assert_eq!(level.difficulty, Difficulty::Junior);
        assert_eq!(level.page_label(), DEFAULT_PAGE_LABEL);
        assert_eq!(level.document().len(), 1);
    }

    #[test]
    fn malformed_toml_names_its_origin() {
        let err = Level::from_toml("id = \"one\"", "custom.toml").unwrap_err();
        assert_eq!(err.to_string(), "malformed level definition in custom.toml");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Level::load_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, LevelError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
