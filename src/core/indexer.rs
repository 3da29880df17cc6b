//! Recursive, lazy enumeration of the files below a root directory.

use super::{CoreError, FileEntry, ReadFailure, TypeFilter};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Entry point for walking a root.
///
/// This struct is stateless and provides methods as associated functions.
pub struct DirectoryIndexer;

impl DirectoryIndexer {
    /// Validates `root` and returns a lazy, depth-first stream of the files
    /// below it that pass `type_filter`.
    ///
    /// Siblings are visited in file-name order so repeated walks of an
    /// unchanged tree yield the same sequence.
    pub fn enumerate(root: &Path, type_filter: &TypeFilter) -> Result<Enumeration, CoreError> {
        let root = Self::validate_root(root)?;
        tracing::info!(
            "Indexing {} with type filter {}",
            root.display(),
            type_filter
        );

        let walker = WalkDir::new(&root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        Ok(Enumeration {
            walker,
            type_filter: type_filter.clone(),
            warnings: Vec::new(),
            yielded: 0,
        })
    }

    /// Walks the whole tree and collects the result.
    pub fn collect(
        root: &Path,
        type_filter: &TypeFilter,
    ) -> Result<(Vec<FileEntry>, Vec<ReadFailure>), CoreError> {
        let mut enumeration = Self::enumerate(root, type_filter)?;
        let entries: Vec<FileEntry> = enumeration.by_ref().collect();
        tracing::info!(
            "Indexed {} files ({} directories skipped)",
            entries.len(),
            enumeration.warnings().len()
        );
        Ok((entries, enumeration.into_warnings()))
    }

    /// Returns the root unchanged if it is an existing directory that can be
    /// listed.
    pub fn validate_root(root: &Path) -> Result<PathBuf, CoreError> {
        if !root.is_dir() {
            return Err(CoreError::InvalidRoot(root.to_path_buf()));
        }
        if let Err(e) = fs::read_dir(root) {
            tracing::warn!("Root {} cannot be listed: {}", root.display(), e);
            return Err(CoreError::InvalidRoot(root.to_path_buf()));
        }
        Ok(root.to_path_buf())
    }
}

/// A single pass over a root. Not restartable: call
/// [`DirectoryIndexer::enumerate`] again to walk from scratch.
pub struct Enumeration {
    walker: walkdir::IntoIter,
    type_filter: TypeFilter,
    warnings: Vec<ReadFailure>,
    yielded: usize,
}

impl Enumeration {
    /// Directories skipped so far because they could not be read.
    pub fn warnings(&self) -> &[ReadFailure] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<ReadFailure> {
        self.warnings
    }

    fn record_walk_error(&mut self, err: walkdir::Error) {
        let path = err.path().map(Path::to_path_buf).unwrap_or_default();
        let error = CoreError::DirectoryRead {
            path: path.clone(),
            source: err.into(),
        };
        tracing::warn!("Skipping unreadable entry: {}", error);
        self.warnings.push(ReadFailure::from_error(path, &error));
    }
}

impl Iterator for Enumeration {
    type Item = FileEntry;

    fn next(&mut self) -> Option<FileEntry> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    self.record_walk_error(err);
                    continue;
                }
            };

            let file_type = entry.file_type();
            let is_file = file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
            if !is_file {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if !self.type_filter.matches(&name) {
                continue;
            }

            self.yielded += 1;
            tracing::debug!("Indexed #{}: {}", self.yielded, entry.path().display());
            return Some(FileEntry::from_path(entry.path()));
        }
    }
}
