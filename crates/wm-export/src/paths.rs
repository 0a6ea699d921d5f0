//! Output path assignment and the page ID → path index.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ExportError;
use crate::slug::slugify;
use crate::tree::PageNode;

/// Default content file name inside each page directory.
pub const DEFAULT_INDEX_NAME: &str = "index.md";

/// Directory name of a page: `<slug>__<id>`.
///
/// The ID suffix keeps siblings with identical titles apart.
pub fn directory_name(node: &PageNode) -> String {
    format!("{}__{}", slugify(&node.title), node.id)
}

/// Assign every node in the tree its output file path, in pre-order.
///
/// `root` lands at `output_root/<slug>__<id>/<content_filename>` and each
/// child is nested under its parent's directory.
pub fn assign_paths(
    root: &mut PageNode,
    output_root: &Path,
    content_filename: &str,
) -> Result<(), ExportError> {
    let node_dir = output_root.join(directory_name(root));
    root.assign_path(node_dir.join(content_filename))?;
    for child in &mut root.children {
        assign_paths(child, &node_dir, content_filename)?;
    }
    Ok(())
}

/// Read-only map from page ID to its assigned output file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathIndex {
    paths: HashMap<String, PathBuf>,
}

impl PathIndex {
    /// Build the index from a fully assigned tree.
    ///
    /// Fails if any node is still missing its path, so a successfully built
    /// index always covers the whole tree.
    pub fn from_tree(root: &PageNode) -> Result<Self, ExportError> {
        let paths = root
            .iter()
            .map(|node| {
                node.path()
                    .map(|path| (node.id.clone(), path.to_path_buf()))
                    .ok_or_else(|| ExportError::PathNotAssigned(node.id.clone()))
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { paths })
    }

    /// Output path of a page, if the ID is part of the index.
    pub fn get(&self, id: &str) -> Option<&Path> {
        self.paths.get(id).map(PathBuf::as_path)
    }

    /// Number of indexed pages.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FromIterator<(String, PathBuf)> for PathIndex {
    fn from_iter<I: IntoIterator<Item = (String, PathBuf)>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}
