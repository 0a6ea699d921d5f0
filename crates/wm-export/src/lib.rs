//! Wiki page tree mirroring for wikimirror.
//!
//! Export runs in two phases:
//!
//! 1. [`TreeBuilder`] resolves the page hierarchy from a [`PageSource`],
//!    [`assign_paths`] gives every node an output file and
//!    [`PathIndex::from_tree`] freezes the page ID → path map.
//! 2. [`Exporter`] writes every page: attachments are downloaded, links are
//!    rewritten by [`LinkRewriter`] against the complete index, and the
//!    markup is converted with [`to_markdown`].
//!
//! [`HtmlExportConverter`] runs the same rewrite and conversion over a
//! static HTML export on disk.
//!
//! ```ignore
//! use std::path::Path;
//! use wm_export::{ExportOptions, Exporter};
//!
//! let summary = Exporter::new(&client, ExportOptions::default())
//!     .run("12345", Path::new("out"))?;
//! println!("{} pages", summary.pages);
//! ```

mod error;
mod exporter;
mod html_export;
mod links;
mod markdown;
mod markup;
mod paths;
mod relpath;
mod slug;
mod source;
mod tree;

#[cfg(test)]
mod testing;

pub use error::{ExportError, SourceFailure};
pub use exporter::{
    ATTACHMENTS_DIR, DEFAULT_ATTACHMENT_PAGE_SIZE, DEFAULT_CHILDREN_TITLE, ExportOptions,
    ExportSummary, Exporter, PageReport, children_file_name,
};
pub use html_export::{
    ConvertSummary, HtmlExportConverter, SourceTree, extract_page_id, main_content,
};
pub use links::{LinkRewriter, attachment_file_name};
pub use markdown::to_markdown;
pub use paths::{DEFAULT_INDEX_NAME, PathIndex, assign_paths, directory_name};
pub use relpath::{encode_link, normalize, relative_link};
pub use slug::{FALLBACK_SLUG, slugify};
pub use source::{AttachmentRef, PageContent, PageSource, PageSummary, paginate};
pub use tree::{DEFAULT_CHILD_PAGE_SIZE, PageNode, PreOrder, TreeBuilder};
