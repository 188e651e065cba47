use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::utils::DEFAULT_TABLE_ID;

/// One recognized metadata row or line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    /// File name as written in the metadata, possibly with a relative subdirectory
    pub source_filename: String,
    /// Raw classification string (a loader node name, or a category key in line-pairs mode)
    pub type_label: String,
}

/// Ordered `filename → type label` mapping.
///
/// Iteration follows first-insertion order. Re-inserting a filename keeps its
/// position and replaces the label, so a later row wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataMapping {
    entries: Vec<MetadataEntry>,
    index: HashMap<String, usize>,
}

impl MetadataMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. Returns `false` when the filename was already present.
    pub fn insert(&mut self, source_filename: impl Into<String>, type_label: impl Into<String>) -> bool {
        let source_filename = source_filename.into();
        let type_label = type_label.into();

        if let Some(&pos) = self.index.get(&source_filename) {
            self.entries[pos].type_label = type_label;
            return false;
        }

        self.index.insert(source_filename.clone(), self.entries.len());
        self.entries.push(MetadataEntry {
            source_filename,
            type_label,
        });
        true
    }

    pub fn get(&self, source_filename: &str) -> Option<&str> {
        self.index
            .get(source_filename)
            .map(|&pos| self.entries[pos].type_label.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetadataEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a MetadataMapping {
    type Item = &'a MetadataEntry;
    type IntoIter = std::slice::Iter<'a, MetadataEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// How a metadata source is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    /// HTML document holding one identified table
    Tabular,
    /// One `filename -> key` mapping per line
    LinePairs,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Tabular => "table",
            ParseMode::LinePairs => "line-pairs",
        }
    }
}

/// Where metadata text is read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetadataInput {
    File(PathBuf),
    /// Text already in memory, e.g. pasted or piped on stdin
    Inline(String),
}

/// A metadata source plus the mode used to read it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSource {
    pub input: MetadataInput,
    pub mode: ParseMode,
    /// Id of the table to read in tabular mode
    pub table_id: String,
}

impl MetadataSource {
    pub fn new(path: impl Into<PathBuf>, mode: ParseMode) -> Self {
        Self {
            input: MetadataInput::File(path.into()),
            mode,
            table_id: DEFAULT_TABLE_ID.to_string(),
        }
    }

    pub fn inline(text: impl Into<String>, mode: ParseMode) -> Self {
        Self {
            input: MetadataInput::Inline(text.into()),
            mode,
            table_id: DEFAULT_TABLE_ID.to_string(),
        }
    }

    pub fn with_table_id(mut self, table_id: impl Into<String>) -> Self {
        self.table_id = table_id.into();
        self
    }

    /// Backing file, if the source is not inline text
    pub fn path(&self) -> Option<&Path> {
        match &self.input {
            MetadataInput::File(path) => Some(path),
            MetadataInput::Inline(_) => None,
        }
    }

    /// Short label for status messages
    pub fn display_name(&self) -> String {
        match &self.input {
            MetadataInput::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            MetadataInput::Inline(_) => "<inline text>".to_string(),
        }
    }
}
