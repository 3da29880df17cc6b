//! Folder hierarchy for the browsing pane, stored as an arena.
//!
//! Nodes refer to each other by [`NodeId`], so parent links do not create
//! ownership cycles. Index 0 is always the root and every node is pushed after
//! its parent, which lets visibility be decided bottom-up with a single reverse
//! sweep over the arena.

use super::{CoreError, DirectoryIndexer, ReadFailure};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Stable index of a node inside its [`FolderTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct FolderNode {
    pub absolute_path: PathBuf,
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Result of the last filter pass for this node alone.
    pub is_match: bool,
    /// Lowercased `name`, matched against search terms.
    search_name: String,
}

#[derive(Debug, Clone)]
pub struct FolderTree {
    nodes: Vec<FolderNode>,
}

impl FolderTree {
    /// Creates a tree that holds only `root`.
    pub fn new(root: &Path) -> Self {
        let name = Self::display_name(root);
        Self {
            nodes: vec![FolderNode {
                absolute_path: root.to_path_buf(),
                search_name: name.to_lowercase(),
                name,
                parent: None,
                children: Vec::new(),
                is_match: false,
            }],
        }
    }

    /// Builds the directory hierarchy below `root`, descending at most
    /// `max_depth` levels. Unreadable directories are skipped and reported.
    pub fn build(
        root: &Path,
        max_depth: usize,
    ) -> Result<(Self, Vec<ReadFailure>), CoreError> {
        let root = DirectoryIndexer::validate_root(root)?;
        let mut tree = Self::new(&root);
        let mut warnings = Vec::new();
        // Walk order is pre-order, so the most recent directory at each depth
        // is the parent of whatever comes next one level deeper.
        let mut open_dirs: Vec<NodeId> = vec![tree.root()];

        let walker = WalkDir::new(&root)
            .follow_links(false)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_type().is_dir());

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    let error = CoreError::DirectoryRead {
                        path: path.clone(),
                        source: err.into(),
                    };
                    tracing::warn!("Skipping folder: {}", error);
                    warnings.push(ReadFailure::from_error(path, &error));
                    continue;
                }
            };

            open_dirs.truncate(entry.depth());
            let Some(&parent) = open_dirs.last() else {
                continue;
            };
            let id = tree.insert_child(parent, entry.path());
            open_dirs.push(id);
        }

        tracing::info!(
            "Built folder tree for {} with {} folders",
            root.display(),
            tree.len()
        );
        Ok((tree, warnings))
    }

    /// Appends a folder below `parent` and returns its id.
    pub fn insert_child(&mut self, parent: NodeId, path: &Path) -> NodeId {
        let name = Self::display_name(path);
        let search_name = name.to_lowercase();
        let id = NodeId(self.nodes.len());
        self.nodes.push(FolderNode {
            absolute_path: path.to_path_buf(),
            name,
            parent: Some(parent),
            children: Vec::new(),
            is_match: false,
            search_name,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &FolderNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find(&self, path: &Path) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.absolute_path == path)
            .map(NodeId)
    }

    /// Ids of `id`'s ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.nodes[id.0].parent, move |current| {
            self.nodes[current.0].parent
        })
    }

    /// Re-runs the folder filter and returns the paths of every visible node.
    ///
    /// A node matches when its own name contains `term`, ignoring case. A
    /// node is visible when it matches or anything beneath it matches, so
    /// non-matching folders below a match stay hidden. An empty term makes
    /// every node visible.
    pub fn recompute_visibility(&mut self, term: &str) -> HashSet<PathBuf> {
        let term = term.to_lowercase();

        if term.is_empty() {
            for node in &mut self.nodes {
                node.is_match = true;
            }
            return self.nodes.iter().map(|n| n.absolute_path.clone()).collect();
        }

        let mut visible = vec![false; self.nodes.len()];
        for node in &mut self.nodes {
            node.is_match = node.search_name.contains(&term);
        }

        // Children always sit after their parent, so a reverse sweep sees
        // every subtree before the node that owns it.
        for index in (0..self.nodes.len()).rev() {
            let node = &self.nodes[index];
            if node.is_match {
                visible[index] = true;
            }
            if visible[index] {
                if let Some(parent) = node.parent {
                    visible[parent.0] = true;
                }
            }
        }

        let result: HashSet<PathBuf> = self
            .nodes
            .iter()
            .zip(&visible)
            .filter(|(_, is_visible)| **is_visible)
            .map(|(node, _)| node.absolute_path.clone())
            .collect();
        tracing::debug!(
            "Folder filter {:?}: {} of {} folders visible",
            term,
            result.len(),
            self.nodes.len()
        );
        result
    }

    fn display_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;

    /// /home
    ///   ├── alice
    ///   │   ├── projects
    ///   │   │   └── parser
    ///   │   └── music
    ///   └── bob
    ///       └── docs
    fn sample_tree() -> FolderTree {
        let mut tree = FolderTree::new(Path::new("/home"));
        let root = tree.root();
        let alice = tree.insert_child(root, Path::new("/home/alice"));
        let projects = tree.insert_child(alice, Path::new("/home/alice/projects"));
        tree.insert_child(projects, Path::new("/home/alice/projects/parser"));
        tree.insert_child(alice, Path::new("/home/alice/music"));
        let bob = tree.insert_child(root, Path::new("/home/bob"));
        tree.insert_child(bob, Path::new("/home/bob/docs"));
        tree
    }

    fn paths(list: &[&str]) -> HashSet<PathBuf> {
        list.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_match_reveals_all_ancestors() {
        let mut tree = sample_tree();
        let visible = tree.recompute_visibility("PARSER");
        assert_eq!(
            visible,
            paths(&[
                "/home",
                "/home/alice",
                "/home/alice/projects",
                "/home/alice/projects/parser"
            ])
        );
    }

    #[test]
    fn test_matching_folder_hides_non_matching_children() {
        let mut tree = sample_tree();
        let visible = tree.recompute_visibility("bob");
        assert_eq!(visible, paths(&["/home", "/home/bob"]));
        assert!(!tree.node(tree.find(Path::new("/home/bob/docs")).unwrap()).is_match);
    }

    #[test]
    fn test_root_name_match_does_not_reveal_whole_tree() {
        let mut tree = sample_tree();
        let visible = tree.recompute_visibility("home");
        assert_eq!(visible, paths(&["/home"]));
    }

    #[test]
    fn test_no_match_hides_everything() {
        let mut tree = sample_tree();
        assert!(tree.recompute_visibility("zzz").is_empty());
    }

    #[test]
    fn test_empty_term_resets_visibility() {
        let mut tree = sample_tree();
        tree.recompute_visibility("music");
        let visible = tree.recompute_visibility("");
        assert_eq!(visible.len(), tree.len());
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut tree = sample_tree();
        let first = tree.recompute_visibility("o");
        let second = tree.recompute_visibility("o");
        assert_eq!(first, second);
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let tree = sample_tree();
        let parser = tree.find(Path::new("/home/alice/projects/parser")).unwrap();
        let names: Vec<_> = tree
            .ancestors(parser)
            .map(|id| tree.node(id).name.as_str())
            .collect();
        assert_eq!(names, vec!["projects", "alice", "home"]);
    }

    #[test]
    fn test_build_respects_depth_and_ignores_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a/b/c/d")).unwrap();
        fs::create_dir_all(root.join("x")).unwrap();
        fs::write(root.join("a/file.txt"), "not a folder").unwrap();

        let (tree, warnings) = FolderTree::build(root, 2).unwrap();
        assert!(warnings.is_empty());

        let names: HashSet<_> = (0..tree.len())
            .map(|i| tree.node(NodeId(i)).name.clone())
            .collect();
        assert!(names.contains("a"));
        assert!(names.contains("b"));
        assert!(names.contains("x"));
        assert!(!names.contains("c"), "depth limit must stop the walk");
        assert!(!names.contains("file.txt"));

        let b = tree.find(&root.join("a/b")).unwrap();
        let parent = tree.node(b).parent.unwrap();
        assert_eq!(tree.node(parent).absolute_path, root.join("a"));
    }

    #[test]
    fn test_build_rejects_invalid_root() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            FolderTree::build(&dir.path().join("missing"), 2),
            Err(CoreError::InvalidRoot(_))
        ));
    }

    /// Builds a random tree: entry `i` is attached below an earlier node.
    fn arb_tree() -> impl Strategy<Value = FolderTree> {
        prop::collection::vec((any::<prop::sample::Index>(), "[a-e]{1,4}"), 0..30).prop_map(
            |specs| {
                let mut tree = FolderTree::new(Path::new("/r"));
                for (i, (parent_index, name)) in specs.into_iter().enumerate() {
                    let parent = NodeId(parent_index.index(tree.len()));
                    let path = tree.node(parent).absolute_path.join(format!("{name}{i}"));
                    tree.insert_child(parent, &path);
                }
                tree
            },
        )
    }

    proptest! {
        #[test]
        fn prop_every_match_has_visible_ancestors(mut tree in arb_tree(), term in "[a-e]{1,2}") {
            let visible = tree.recompute_visibility(&term);
            for index in 0..tree.len() {
                let id = NodeId(index);
                if tree.node(id).is_match {
                    prop_assert!(visible.contains(&tree.node(id).absolute_path));
                    for ancestor in tree.ancestors(id) {
                        prop_assert!(visible.contains(&tree.node(ancestor).absolute_path));
                    }
                }
            }
        }

        #[test]
        fn prop_visibility_is_idempotent(mut tree in arb_tree(), term in "[a-e]{0,2}") {
            let first = tree.recompute_visibility(&term);
            let second = tree.recompute_visibility(&term);
            prop_assert_eq!(first, second);
        }
    }
}
