pub mod error;
pub mod export;
pub mod file_handler;
pub mod folder_tree;
pub mod indexer;
pub mod search;
pub mod tree_generator;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub use error::CoreError;
pub use export::{save_document, ClipboardSink, SystemClipboard};
pub use file_handler::{AggregationEngine, FileHandler};
pub use folder_tree::{FolderNode, FolderTree, NodeId};
pub use indexer::{DirectoryIndexer, Enumeration};
pub use search::FilterEngine;
pub use tree_generator::TreeGenerator;

/// Label used for the pass-everything type filter.
pub const ALL_FILES_LABEL: &str = "All Files";

/// A single file discovered while indexing a root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileEntry {
    pub absolute_path: PathBuf,
    pub name: String,
    pub extension: String,
}

impl FileEntry {
    /// Builds an entry from a path. `extension` keeps the leading dot and is
    /// empty when the file name has none.
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        Self {
            absolute_path: path.to_path_buf(),
            name,
            extension,
        }
    }
}

/// Selects files by a case-sensitive suffix of their name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TypeFilter {
    #[default]
    All,
    /// A suffix such as `.txt`, always stored with its leading dot.
    Extension(String),
}

impl TypeFilter {
    /// The filters offered by default.
    pub fn defaults() -> Vec<TypeFilter> {
        vec![
            TypeFilter::All,
            TypeFilter::Extension(".txt".to_string()),
            TypeFilter::Extension(".log".to_string()),
            TypeFilter::Extension(".xml".to_string()),
        ]
    }

    pub fn matches(&self, file_name: &str) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Extension(suffix) => file_name.ends_with(suffix.as_str()),
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeFilter::All => f.write_str(ALL_FILES_LABEL),
            TypeFilter::Extension(suffix) => f.write_str(suffix),
        }
    }
}

impl FromStr for TypeFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(ALL_FILES_LABEL)
            || trimmed.eq_ignore_ascii_case("all")
            || trimmed == "*"
        {
            return Ok(TypeFilter::All);
        }

        // Accept the `*.txt` glob spelling of an extension.
        let bare = trimmed
            .strip_prefix("*.")
            .or_else(|| trimmed.strip_prefix('.'))
            .unwrap_or(trimmed);
        if bare.is_empty()
            || bare.contains(['/', '\\', '*'])
            || bare.chars().any(char::is_whitespace)
        {
            return Err(CoreError::InvalidTypeFilter(s.to_string()));
        }
        Ok(TypeFilter::Extension(format!(".{bare}")))
    }
}

impl From<TypeFilter> for String {
    fn from(filter: TypeFilter) -> Self {
        filter.to_string()
    }
}

impl TryFrom<String> for TypeFilter {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The live search inputs driving visibility. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub folder_term: String,
    pub file_term: String,
    pub type_filter: TypeFilter,
}

/// A per-entry failure recorded by a batch operation that kept going.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadFailure {
    pub path: PathBuf,
    pub message: String,
}

impl ReadFailure {
    pub fn from_error(path: impl Into<PathBuf>, error: &CoreError) -> Self {
        Self {
            path: path.into(),
            message: error.to_string(),
        }
    }
}

/// The outcome of one aggregation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregationResult {
    pub document: String,
    pub errors: Vec<ReadFailure>,
}
