//! The dependency tree node model.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// How a node entered the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Pulled in by `require`, `require_directory` or `require_tree` (or the entry
    /// itself). Concatenated at most once per output.
    RequiredModule,
    /// Pulled in by `include`. Concatenated at every reference point.
    IncludedFragment,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequiredModule => write!(f, "require"),
            Self::IncludedFragment => write!(f, "include"),
        }
    }
}

/// One file in a resolved dependency tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// Absolute, symlink-resolved path; the deduplication key
    pub path: PathBuf,
    /// Whether the node was required or included
    pub kind: NodeKind,
    /// Script text to concatenate (template output for `.ejs` / `.hbs` files).
    /// Empty for duplicates, which are never read.
    pub source: String,
    /// Dependencies in declaration order
    pub children: Vec<FileNode>,
    /// Set when an earlier node of the same run already required this path
    pub is_duplicate: bool,
}

impl FileNode {
    /// A node whose file was read and expanded.
    pub fn new(path: PathBuf, kind: NodeKind, source: String, children: Vec<FileNode>) -> Self {
        Self {
            path,
            kind,
            source,
            children,
            is_duplicate: false,
        }
    }

    /// A leaf standing in for a module that an earlier node already required.
    pub fn duplicate(path: PathBuf) -> Self {
        Self {
            path,
            kind: NodeKind::RequiredModule,
            source: String::new(),
            children: Vec::new(),
            is_duplicate: true,
        }
    }

    /// Whether this node's own text appears in the rendered output.
    ///
    /// Only duplicated required modules are suppressed; included fragments
    /// always contribute.
    #[must_use]
    pub fn contributes(&self) -> bool {
        !(self.is_duplicate && self.kind == NodeKind::RequiredModule)
    }

    /// Every distinct path in the tree, in depth-first pre-order of first appearance.
    ///
    /// This is the set of files whose modification times decide whether an
    /// artifact built from this tree is stale.
    #[must_use]
    pub fn visited_paths(&self) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        let mut paths = Vec::new();
        self.collect_paths(&mut seen, &mut paths);
        paths
    }

    fn collect_paths<'a>(&'a self, seen: &mut HashSet<&'a Path>, paths: &mut Vec<PathBuf>) {
        if seen.insert(self.path.as_path()) {
            paths.push(self.path.clone());
        }
        for child in &self.children {
            child.collect_paths(seen, paths);
        }
    }

    /// Total number of nodes, duplicates included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(FileNode::node_count).sum::<usize>()
    }
}
