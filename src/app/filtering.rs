//! Pure functions that turn the current `FilterState` into visible sets.
//!
//! Callers re-run these on every change to the search inputs. Nothing here
//! mutates the session, which keeps the results idempotent and easy to test.

use crate::core::{FileEntry, FilterEngine, FilterState, FolderTree};
use std::collections::HashSet;
use std::path::PathBuf;

/// Files of the current index that the file list shows.
///
/// The index normally already honours `type_filter`; it is applied again so
/// that a stale index never leaks entries of another type.
pub fn recompute<'a>(state: &FilterState, index: &'a [FileEntry]) -> Vec<&'a FileEntry> {
    FilterEngine::filter_entries(index, &state.file_term)
        .into_iter()
        .filter(|entry| state.type_filter.matches(&entry.name))
        .collect()
}

/// Folders of `tree` that the folder pane shows for `state.folder_term`.
pub fn recompute_folders(state: &FilterState, tree: &mut FolderTree) -> HashSet<PathBuf> {
    tree.recompute_visibility(&state.folder_term)
}
