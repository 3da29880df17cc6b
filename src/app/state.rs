//! Defines the state of one interactive session.

use crate::app::filtering;
use crate::config::AppConfig;
use crate::core::file_handler::entry_paths;
use crate::core::{
    AggregationEngine, AggregationResult, CoreError, DirectoryIndexer, FileEntry, FileHandler,
    FilterEngine, FilterState, FolderTree, ReadFailure, TreeGenerator, TypeFilter,
};
use std::collections::HashSet;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Holds everything a caller needs between user actions.
///
/// Owned by a single caller and not meant for concurrent mutation.
pub struct AppState {
    /// The application's configuration settings.
    pub config: AppConfig,
    /// The currently selected root, if any.
    pub root: Option<PathBuf>,
    /// The full enumeration of `root` under the active type filter.
    pub entries: Vec<FileEntry>,
    /// Directories skipped during the last enumeration.
    pub index_warnings: Vec<ReadFailure>,
    /// The live search inputs.
    pub filter: FilterState,
    /// Paths of the explicitly chosen entries. Always a subset of `entries`.
    pub selected: HashSet<PathBuf>,
    /// The folder browsing tree, built on demand.
    pub folder_tree: Option<FolderTree>,
    /// Folders currently shown for `filter.folder_term`.
    pub visible_folders: HashSet<PathBuf>,
    /// The most recent aggregation.
    pub last_result: Option<AggregationResult>,
}

/// Content of a single file prepared for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub path: PathBuf,
    pub content: String,
    /// Byte ranges of the file search term inside `content`.
    pub highlights: Vec<Range<usize>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let filter = FilterState {
            type_filter: config.default_type_filter.clone(),
            ..Default::default()
        };
        Self {
            config,
            root: None,
            entries: Vec::new(),
            index_warnings: Vec::new(),
            filter,
            selected: HashSet::new(),
            folder_tree: None,
            visible_folders: HashSet::new(),
            last_result: None,
        }
    }

    /// Makes `path` the root and re-indexes it.
    ///
    /// Any selection from the previous root is dropped. On an invalid root the
    /// session is left untouched.
    pub fn select_root(&mut self, path: &Path) -> Result<(), CoreError> {
        let root = DirectoryIndexer::validate_root(path)?;
        tracing::info!("Selected root {}", root.display());

        self.selected.clear();
        self.last_result = None;
        self.root = Some(root.clone());
        self.config.last_directory = Some(root);
        self.reindex()
    }

    /// Switches the type filter, re-indexes, and drops selected entries that
    /// no longer pass.
    pub fn set_type_filter(&mut self, type_filter: TypeFilter) -> Result<(), CoreError> {
        if !self.config.offers_type_filter(&type_filter) {
            tracing::warn!("Type filter {} is not in the configured list", type_filter);
        }
        self.filter.type_filter = type_filter;
        if self.root.is_some() {
            self.reindex()?;
        }
        Ok(())
    }

    pub fn set_file_term(&mut self, term: &str) {
        self.filter.file_term = term.to_string();
    }

    /// Updates the folder search and recomputes folder visibility.
    pub fn set_folder_term(&mut self, term: &str) {
        self.filter.folder_term = term.to_string();
        if let Some(tree) = self.folder_tree.as_mut() {
            self.visible_folders = filtering::recompute_folders(&self.filter, tree);
        }
    }

    /// Builds the folder browsing tree below `root`, at most `max_depth`
    /// levels deep, and applies the current folder search to it. Returns the
    /// folders that could not be read.
    pub fn load_folder_tree(
        &mut self,
        root: &Path,
        max_depth: usize,
    ) -> Result<Vec<ReadFailure>, CoreError> {
        let (mut tree, warnings) = FolderTree::build(root, max_depth)?;
        self.visible_folders = filtering::recompute_folders(&self.filter, &mut tree);
        self.folder_tree = Some(tree);
        Ok(warnings)
    }

    /// Entries the file list currently shows.
    pub fn visible_files(&self) -> Vec<&FileEntry> {
        filtering::recompute(&self.filter, &self.entries)
    }

    /// Adds one entry to the selection. Returns whether it is selected.
    ///
    /// Selecting an entry twice keeps it selected. Paths outside the current
    /// enumeration are refused with `false`.
    pub fn select(&mut self, path: &Path) -> bool {
        if !self.is_indexed(path) {
            tracing::warn!("Ignoring selection of unknown entry {}", path.display());
            return false;
        }
        self.selected.insert(path.to_path_buf());
        true
    }

    /// Flips the selection of one entry. Returns whether it is now selected.
    ///
    /// Paths outside the current enumeration are refused with `false`.
    pub fn toggle_selection(&mut self, path: &Path) -> bool {
        if !self.is_indexed(path) {
            tracing::warn!("Ignoring selection of unknown entry {}", path.display());
            return false;
        }
        if self.selected.remove(path) {
            false
        } else {
            self.selected.insert(path.to_path_buf());
            true
        }
    }

    /// Selects every entry the file list currently shows.
    pub fn select_all(&mut self) {
        let visible: Vec<PathBuf> = entry_paths(self.visible_files());
        self.selected.extend(visible);
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    /// The files a parse of the current root reads, in enumeration order.
    ///
    /// An empty selection means every indexed entry, regardless of the file
    /// search term.
    pub fn files_to_parse(&self) -> Vec<PathBuf> {
        if self.selected.is_empty() {
            entry_paths(&self.entries)
        } else {
            entry_paths(
                self.entries
                    .iter()
                    .filter(|e| self.selected.contains(&e.absolute_path)),
            )
        }
    }

    /// Aggregates the selection (or everything) of the current root.
    pub fn parse_selected(&mut self) -> Result<&AggregationResult, CoreError> {
        let root = self.current_root()?;
        DirectoryIndexer::validate_root(&root)?;

        let files = self.files_to_parse();
        tracing::info!("Parsing {} files from {}", files.len(), root.display());
        let result = AggregationEngine::aggregate(&files);
        Ok(self.last_result.insert(result))
    }

    /// The text of the most recent aggregation.
    pub fn document(&self) -> Option<&str> {
        self.last_result.as_ref().map(|r| r.document.as_str())
    }

    /// Tree rendering of the current root.
    pub fn tree_structure(&self) -> Result<String, CoreError> {
        let root = self.current_root()?;
        TreeGenerator::render_tree_structure(&root)
    }

    /// Loads one file for display with the file search term highlighted.
    pub fn preview(&self, path: &Path) -> Result<Preview, CoreError> {
        let content = FileHandler::read_preview(path)?;
        let highlights = FilterEngine::find_matches(&content, &self.filter.file_term);
        Ok(Preview {
            path: path.to_path_buf(),
            content,
            highlights,
        })
    }

    fn is_indexed(&self, path: &Path) -> bool {
        self.entries.iter().any(|e| e.absolute_path == path)
    }

    fn current_root(&self) -> Result<PathBuf, CoreError> {
        self.root
            .clone()
            .ok_or_else(|| CoreError::InvalidRoot(PathBuf::new()))
    }

    fn reindex(&mut self) -> Result<(), CoreError> {
        let root = self.current_root()?;
        let (entries, warnings) = DirectoryIndexer::collect(&root, &self.filter.type_filter)?;

        let known: HashSet<&PathBuf> = entries.iter().map(|e| &e.absolute_path).collect();
        let before = self.selected.len();
        self.selected.retain(|p| known.contains(p));
        if self.selected.len() != before {
            tracing::debug!(
                "Dropped {} selected entries no longer indexed",
                before - self.selected.len()
            );
        }

        self.entries = entries;
        self.index_warnings = warnings;
        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
