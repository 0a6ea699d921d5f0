//! Abstract page source consumed by the tree builder and exporter.

use std::io::Write;

/// Page identity as returned by page lookups and child listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    /// Page ID.
    pub id: String,
    /// Page title.
    pub title: String,
}

/// Page markup in the representations a source can provide.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// Page title.
    pub title: String,
    /// Rendered (view) markup.
    pub view: Option<String>,
    /// Raw storage-format markup.
    pub storage: Option<String>,
}

impl PageContent {
    /// Markup to export: the view body, or the storage body when the view is
    /// absent or empty, or an empty string.
    pub fn markup(&self) -> &str {
        [self.view.as_deref(), self.storage.as_deref()]
            .into_iter()
            .flatten()
            .find(|body| !body.is_empty())
            .unwrap_or("")
    }
}

/// Attachment listed for a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    /// Filename within the page's attachment directory.
    pub filename: String,
    /// Absolute download URL.
    pub download_url: String,
}

/// Source of page markup and hierarchy.
///
/// Listing methods are paginated: callers request `limit` items starting at
/// `offset` and stop once a response is shorter than `limit`.
pub trait PageSource {
    /// Error type of the underlying transport.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Resolve a page's ID and title.
    fn page(&self, id: &str) -> Result<PageSummary, Self::Error>;

    /// List one page of child pages.
    fn children(
        &self,
        id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<PageSummary>, Self::Error>;

    /// Fetch page title and markup.
    fn content(&self, id: &str) -> Result<PageContent, Self::Error>;

    /// List one page of attachments.
    fn attachments(
        &self,
        id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<AttachmentRef>, Self::Error>;

    /// Stream the resource at `url` into `sink`, returning the byte count.
    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64, Self::Error>;
}

/// Collect a paginated listing.
///
/// Calls `fetch(offset, limit)` with increasing offsets until a response is
/// shorter than `limit`.
pub fn paginate<T, E, F>(limit: usize, mut fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(usize, usize) -> Result<Vec<T>, E>,
{
    let mut items = Vec::new();
    let mut offset = 0;
    loop {
        let batch = fetch(offset, limit)?;
        let exhausted = batch.len() < limit;
        items.extend(batch);
        if exhausted || limit == 0 {
            return Ok(items);
        }
        offset += limit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_full_then_short_page_stops_after_two_requests() {
        let mut calls = Vec::new();
        let items: Result<Vec<usize>, ()> = paginate(3, |offset, limit| {
            calls.push((offset, limit));
            Ok(match offset {
                0 => vec![1, 2, 3],
                3 => vec![4],
                _ => vec![99],
            })
        });

        assert_eq!(items.unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(calls, vec![(0, 3), (3, 3)]);
    }

    #[test]
    fn test_paginate_exact_multiple_needs_empty_page() {
        let mut calls = 0;
        let items: Result<Vec<usize>, ()> = paginate(2, |offset, _| {
            calls += 1;
            Ok(if offset < 4 {
                vec![offset, offset + 1]
            } else {
                Vec::new()
            })
        });

        assert_eq!(items.unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_paginate_propagates_error() {
        let result: Result<Vec<usize>, &str> = paginate(2, |_, _| Err("boom"));
        assert_eq!(result.unwrap_err(), "boom");
    }

    #[test]
    fn test_markup_prefers_view() {
        let content = PageContent {
            title: "T".to_owned(),
            view: Some("<p>view</p>".to_owned()),
            storage: Some("<p>storage</p>".to_owned()),
        };
        assert_eq!(content.markup(), "<p>view</p>");
    }

    #[test]
    fn test_markup_falls_back_to_storage_when_view_empty() {
        let content = PageContent {
            title: "T".to_owned(),
            view: Some(String::new()),
            storage: Some("<p>storage</p>".to_owned()),
        };
        assert_eq!(content.markup(), "<p>storage</p>");
    }

    #[test]
    fn test_markup_empty_when_no_body() {
        assert_eq!(PageContent::default().markup(), "");
    }
}
