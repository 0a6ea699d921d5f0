//! Confluence attachment types.

use serde::Deserialize;

/// Confluence attachment.
///
/// Only includes fields that are actually used.
/// Serde ignores unknown fields from the API response.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    /// Attachment ID.
    pub id: String,
    /// Attachment title/filename.
    pub title: String,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: AttachmentLinks,
}

/// Attachment links.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttachmentLinks {
    /// Download path relative to the server base URL.
    #[serde(default)]
    pub download: Option<String>,
}
