//! In-memory page tree and its construction from a [`PageSource`].

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ExportError;
use crate::source::{PageSource, paginate};

/// Default number of child pages requested per listing call.
pub const DEFAULT_CHILD_PAGE_SIZE: usize = 50;

/// One wiki page and its subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageNode {
    /// Page ID, unique across the source tree.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Child pages in source order.
    pub children: Vec<PageNode>,
    path: Option<PathBuf>,
}

impl PageNode {
    /// Create a leaf node without an assigned path.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            children: Vec::new(),
            path: None,
        }
    }

    /// Builder-style helper to attach children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<PageNode>) -> Self {
        self.children = children;
        self
    }

    /// Assigned output file path, once path assignment has run.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Output directory of this page (parent of its content file).
    pub fn dir(&self) -> Option<&Path> {
        self.path().and_then(Path::parent)
    }

    /// Set the output path. Fails if a path was already assigned.
    pub(crate) fn assign_path(&mut self, path: PathBuf) -> Result<(), ExportError> {
        if self.path.is_some() {
            return Err(ExportError::PathAlreadyAssigned(self.id.clone()));
        }
        self.path = Some(path);
        Ok(())
    }

    /// Iterate over this node and all descendants in pre-order.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// Total number of nodes in this subtree.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Always false: a tree contains at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Pre-order iterator over a [`PageNode`] subtree.
pub struct PreOrder<'a> {
    stack: Vec<&'a PageNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a PageNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Builds a [`PageNode`] tree by walking a [`PageSource`].
pub struct TreeBuilder<'a, S> {
    source: &'a S,
    page_size: usize,
}

impl<'a, S: PageSource> TreeBuilder<'a, S> {
    /// Create a builder using the default child page size.
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            page_size: DEFAULT_CHILD_PAGE_SIZE,
        }
    }

    /// Override the number of children requested per listing call.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Resolve `root_id` and every descendant.
    ///
    /// Any failure resolving a page or its child listing aborts the walk.
    pub fn build(&self, root_id: &str) -> Result<PageNode, ExportError> {
        let summary = self
            .source
            .page(root_id)
            .map_err(|e| ExportError::source_unavailable(root_id, e))?;
        debug!(id = %summary.id, title = %summary.title, "Resolved page");

        let children = paginate(self.page_size, |offset, limit| {
            self.source.children(root_id, offset, limit)
        })
        .map_err(|e| ExportError::source_unavailable(root_id, e))?;

        let mut node = PageNode::new(summary.id, summary.title);
        for child in children {
            node.children.push(self.build(&child.id)?);
        }
        Ok(node)
    }
}
