//! Confluence REST API response types.

mod attachment;
mod page;

use serde::Deserialize;

pub use attachment::{Attachment, AttachmentLinks};
pub use page::{Body, BodyValue, Page};

/// Paginated listing response (`child/page`, `child/attachment`).
///
/// Serde ignores unknown fields like `start`, `limit`, `size` and `_links`.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentList<T> {
    /// Items of this page.
    pub results: Vec<T>,
}
