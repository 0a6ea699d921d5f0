//! Page tree export: content, attachments and child indexes.

use std::fs;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::ExportError;
use crate::html_export::write_file;
use crate::links::{LinkRewriter, attachment_file_name};
use crate::markdown::to_markdown;
use crate::paths::{DEFAULT_INDEX_NAME, PathIndex, assign_paths};
use crate::relpath::relative_link;
use crate::source::{AttachmentRef, PageSource, paginate};
use crate::tree::{DEFAULT_CHILD_PAGE_SIZE, PageNode, TreeBuilder};

/// Name of the per-page attachment directory.
pub const ATTACHMENTS_DIR: &str = "attachments";

/// Default number of attachments requested per listing call.
pub const DEFAULT_ATTACHMENT_PAGE_SIZE: usize = 100;

/// Default heading of the child index file.
pub const DEFAULT_CHILDREN_TITLE: &str = "Subpages";

/// Name of the child index written next to `index_name`.
///
/// The extension follows the content file, falling back to `md`.
pub fn children_file_name(index_name: &str) -> String {
    let ext = Path::new(index_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("md");
    format!("children.{ext}")
}

/// Export settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Content file name inside each page directory.
    pub index_name: String,
    /// Heading written at the top of `children.<ext>`.
    pub children_title: String,
    /// Child pages requested per listing call.
    pub page_size: usize,
    /// Attachments requested per listing call.
    pub attachment_page_size: usize,
    /// Abort the export on the first attachment failure.
    pub strict_attachments: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            index_name: DEFAULT_INDEX_NAME.to_owned(),
            children_title: DEFAULT_CHILDREN_TITLE.to_owned(),
            page_size: DEFAULT_CHILD_PAGE_SIZE,
            attachment_page_size: DEFAULT_ATTACHMENT_PAGE_SIZE,
            strict_attachments: false,
        }
    }
}

/// Attachment counts for one exported page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageReport {
    /// Attachments fetched during this export.
    pub downloaded: usize,
    /// Attachments already present on disk.
    pub skipped: usize,
    /// Attachments that could not be listed or fetched.
    pub failed: usize,
}

/// Totals for a whole export run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Pages written.
    pub pages: usize,
    /// Attachments fetched.
    pub downloaded: usize,
    /// Attachments already present on disk.
    pub skipped: usize,
    /// Attachments that could not be listed or fetched.
    pub failed: usize,
}

impl ExportSummary {
    fn add(&mut self, report: PageReport) {
        self.pages += 1;
        self.downloaded += report.downloaded;
        self.skipped += report.skipped;
        self.failed += report.failed;
    }
}

enum Fetched {
    Downloaded(u64),
    Skipped,
}

/// Mirrors a page tree from a [`PageSource`] into a Markdown directory tree.
pub struct Exporter<'a, S> {
    source: &'a S,
    options: ExportOptions,
}

impl<'a, S: PageSource> Exporter<'a, S> {
    /// Create an exporter reading from `source`.
    pub fn new(source: &'a S, options: ExportOptions) -> Self {
        Self { source, options }
    }

    /// Export `root_id` and all its descendants under `output_root`.
    ///
    /// The tree is resolved and every path assigned before the first page is
    /// written, so every internal link can be rewritten regardless of order.
    pub fn run(&self, root_id: &str, output_root: &Path) -> Result<ExportSummary, ExportError> {
        let mut root = TreeBuilder::new(self.source)
            .with_page_size(self.options.page_size)
            .build(root_id)?;
        assign_paths(&mut root, output_root, &self.options.index_name)?;
        let index = PathIndex::from_tree(&root)?;
        tracing::info!(root = %root_id, pages = index.len(), "Resolved page tree");

        let mut summary = ExportSummary::default();
        for node in root.iter() {
            summary.add(self.export_page(node, &index)?);
        }
        tracing::info!(
            pages = summary.pages,
            downloaded = summary.downloaded,
            skipped = summary.skipped,
            failed = summary.failed,
            "Export finished"
        );
        Ok(summary)
    }

    /// Export a single node whose path is already assigned.
    pub fn export_page(&self, node: &PageNode, index: &PathIndex) -> Result<PageReport, ExportError> {
        let (Some(path), Some(page_dir)) = (node.path(), node.dir()) else {
            return Err(ExportError::PathNotAssigned(node.id.clone()));
        };

        let content = self
            .source
            .content(&node.id)
            .map_err(|e| ExportError::source_unavailable(&node.id, e))?;

        let attachment_dir = page_dir.join(ATTACHMENTS_DIR);
        fs::create_dir_all(&attachment_dir).map_err(|e| ExportError::io(&attachment_dir, e))?;
        let report = self.fetch_attachments(&node.id, &attachment_dir)?;

        let rewritten = LinkRewriter::new(index).rewrite_page(content.markup(), path, &attachment_dir);
        let markdown = to_markdown(&rewritten);
        write_file(
            path,
            format!("# {}\n\n{}\n", node.title, markdown.trim()).as_bytes(),
        )?;
        tracing::info!(id = %node.id, path = %path.display(), "Exported page");

        if !node.children.is_empty() {
            self.write_children_index(node, page_dir, index)?;
        }
        Ok(report)
    }

    fn write_children_index(
        &self,
        node: &PageNode,
        page_dir: &Path,
        index: &PathIndex,
    ) -> Result<(), ExportError> {
        let index_path = page_dir.join(children_file_name(&self.options.index_name));

        let mut out = format!("# {}\n\n", self.options.children_title);
        for child in &node.children {
            let target = index
                .get(&child.id)
                .ok_or_else(|| ExportError::PathNotAssigned(child.id.clone()))?;
            out.push_str(&format!(
                "- [{}]({})\n",
                child.title,
                relative_link(&index_path, target)
            ));
        }
        write_file(&index_path, out.as_bytes())
    }

    fn fetch_attachments(
        &self,
        page_id: &str,
        attachment_dir: &Path,
    ) -> Result<PageReport, ExportError> {
        let mut report = PageReport::default();

        let listing = paginate(self.options.attachment_page_size.max(1), |offset, limit| {
            self.source.attachments(page_id, offset, limit)
        });
        let attachments = match listing {
            Ok(attachments) => attachments,
            Err(e) => {
                let err = ExportError::AttachmentFetch {
                    page_id: page_id.to_owned(),
                    filename: String::new(),
                    source: Box::new(e),
                };
                self.tolerate(err)?;
                report.failed += 1;
                return Ok(report);
            }
        };

        for attachment in &attachments {
            match self.download(page_id, attachment, attachment_dir) {
                Ok(Fetched::Downloaded(bytes)) => {
                    tracing::info!(page = %page_id, file = %attachment.filename, bytes, "Downloaded attachment");
                    report.downloaded += 1;
                }
                Ok(Fetched::Skipped) => {
                    tracing::debug!(page = %page_id, file = %attachment.filename, "Attachment already present");
                    report.skipped += 1;
                }
                Err(err @ ExportError::AttachmentFetch { .. }) => {
                    self.tolerate(err)?;
                    report.failed += 1;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(report)
    }

    /// Stream one attachment to disk unless its target already exists.
    ///
    /// Data goes to a temporary file in the same directory first, so an
    /// interrupted download never leaves a partial target behind.
    fn download(
        &self,
        page_id: &str,
        attachment: &AttachmentRef,
        attachment_dir: &Path,
    ) -> Result<Fetched, ExportError> {
        let target = attachment_dir.join(attachment_file_name(&attachment.filename));
        if target.exists() {
            return Ok(Fetched::Skipped);
        }

        let mut tmp = NamedTempFile::new_in(attachment_dir)
            .map_err(|e| ExportError::io(attachment_dir, e))?;
        let bytes = self
            .source
            .download(&attachment.download_url, &mut tmp)
            .map_err(|e| ExportError::AttachmentFetch {
                page_id: page_id.to_owned(),
                filename: attachment.filename.clone(),
                source: Box::new(e),
            })?;
        tmp.persist(&target)
            .map_err(|e| ExportError::io(&target, e.error))?;
        Ok(Fetched::Downloaded(bytes))
    }

    /// Return the error in strict mode, otherwise log it and carry on.
    fn tolerate(&self, err: ExportError) -> Result<(), ExportError> {
        if self.options.strict_attachments {
            return Err(err);
        }
        let cause = std::error::Error::source(&err)
            .map(ToString::to_string)
            .unwrap_or_default();
        tracing::warn!(error = %err, cause = %cause, "Skipping attachment");
        Ok(())
    }
}
