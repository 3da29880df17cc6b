//! Generates an indented text representation of a directory tree.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use super::{CoreError, DirectoryIndexer};

const INDENT: &str = "    ";

/// A utility struct for rendering a folder's structure.
///
/// This struct is stateless and provides methods as associated functions.
pub struct TreeGenerator;

impl TreeGenerator {
    /// Renders `root` and everything below it.
    ///
    /// Each directory is written as `name/`, indented four spaces per level
    /// below `root`, followed by its files one level deeper and then its
    /// subdirectories. Files and subdirectories are each sorted by name.
    /// Subdirectories that cannot be listed are left out entirely.
    pub fn render_tree_structure(root: &Path) -> Result<String, CoreError> {
        let root = DirectoryIndexer::validate_root(root)?;
        let mut lines: Vec<String> = Vec::new();
        // Directory whose heading was pushed last, while it has no children yet.
        let mut open_heading: Option<PathBuf> = None;

        let walker = WalkDir::new(&root)
            .follow_links(false)
            .sort_by(Self::files_first);

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    if open_heading.as_deref() == Some(path.as_path()) {
                        lines.pop();
                    }
                    open_heading = None;
                    let error = CoreError::DirectoryRead {
                        path,
                        source: err.into(),
                    };
                    tracing::warn!("Leaving folder out of tree: {}", error);
                    continue;
                }
            };

            let indent = INDENT.repeat(entry.depth());
            let name = Self::name_of(&entry);
            if entry.file_type().is_dir() {
                lines.push(format!("{indent}{name}/"));
                open_heading = Some(entry.into_path());
            } else {
                lines.push(format!("{indent}{name}"));
                open_heading = None;
            }
        }

        tracing::info!(
            "Rendered tree structure of {} ({} lines)",
            root.display(),
            lines.len()
        );
        Ok(lines.join("\n"))
    }

    /// Files sort before directories, then both by name. Symlinks are not
    /// followed, so a link to a directory sorts and renders as a file.
    fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
        a.file_type()
            .is_dir()
            .cmp(&b.file_type().is_dir())
            .then_with(|| a.file_name().cmp(b.file_name()))
    }

    fn name_of(entry: &DirEntry) -> String {
        entry.file_name().to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_known_fixture_renders_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("R");
        fs::create_dir_all(root.join("S")).unwrap();
        fs::write(root.join("S/f.txt"), "f").unwrap();
        fs::write(root.join("g.txt"), "g").unwrap();

        let tree = TreeGenerator::render_tree_structure(&root).unwrap();
        insta::assert_snapshot!(tree, @r"
        R/
            g.txt
            S/
                f.txt
        ");
        assert!(!tree.ends_with('\n'));
    }

    #[test]
    fn test_files_come_before_subdirectories_and_are_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("proj");
        fs::create_dir_all(root.join("b_dir/inner")).unwrap();
        fs::create_dir_all(root.join("a_dir")).unwrap();
        fs::write(root.join("z.txt"), "").unwrap();
        fs::write(root.join("m.txt"), "").unwrap();
        fs::write(root.join("b_dir/inner/deep.log"), "").unwrap();

        let tree = TreeGenerator::render_tree_structure(&root).unwrap();
        let expected = [
            "proj/",
            "    m.txt",
            "    z.txt",
            "    a_dir/",
            "    b_dir/",
            "        inner/",
            "            deep.log",
        ]
        .join("\n");
        assert_eq!(tree, expected);
    }

    #[test]
    fn test_empty_root_is_single_line() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("empty");
        fs::create_dir(&root).unwrap();
        assert_eq!(TreeGenerator::render_tree_structure(&root).unwrap(), "empty/");
    }

    #[test]
    fn test_invalid_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            TreeGenerator::render_tree_structure(&file),
            Err(CoreError::InvalidRoot(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_is_left_out() {
        use std::os::unix::fs::PermissionsExt;

        if crate::utils::test_helpers::running_as_root() {
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("top");
        let locked = root.join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(root.join("visible.txt"), "").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let tree = TreeGenerator::render_tree_structure(&root);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(tree.unwrap(), "top/\n    visible.txt");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_listed_as_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("top");
        fs::create_dir_all(root.join("real")).unwrap();
        fs::write(root.join("real/x.txt"), "").unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("link")).unwrap();

        let tree = TreeGenerator::render_tree_structure(&root).unwrap();
        assert_eq!(tree, "top/\n    link\n    real/\n        x.txt");
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_root_is_invalid() {
        use std::os::unix::fs::PermissionsExt;

        if crate::utils::test_helpers::running_as_root() {
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("sealed");
        fs::create_dir(&root).unwrap();
        fs::set_permissions(&root, fs::Permissions::from_mode(0o000)).unwrap();

        let tree = TreeGenerator::render_tree_structure(&root);
        fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(tree, Err(CoreError::InvalidRoot(_))));
    }
}
