//! [`PageSource`] implementation backed by the REST API.

use std::io::Write;

use wm_export::{AttachmentRef, PageContent, PageSource, PageSummary};

use crate::client::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::Page;

/// Expansions requested when fetching page content.
const CONTENT_EXPAND: &[&str] = &["body.view", "body.storage"];

impl PageSource for ConfluenceClient {
    type Error = ConfluenceError;

    fn page(&self, id: &str) -> Result<PageSummary, ConfluenceError> {
        Ok(summary(self.get_page(id, &[])?))
    }

    fn children(
        &self,
        id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<PageSummary>, ConfluenceError> {
        let list = self.get_child_pages(id, offset, limit)?;
        Ok(list.results.into_iter().map(summary).collect())
    }

    fn content(&self, id: &str) -> Result<PageContent, ConfluenceError> {
        let page = self.get_page(id, CONTENT_EXPAND)?;
        Ok(PageContent {
            view: page.view().map(str::to_owned),
            storage: page.storage().map(str::to_owned),
            title: page.title,
        })
    }

    fn attachments(
        &self,
        id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<AttachmentRef>, ConfluenceError> {
        let list = self.get_attachments(id, offset, limit)?;
        Ok(list
            .results
            .iter()
            .map(|attachment| AttachmentRef {
                filename: attachment.title.clone(),
                download_url: self.download_url(id, attachment),
            })
            .collect())
    }

    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64, ConfluenceError> {
        ConfluenceClient::download(self, url, sink)
    }
}

fn summary(page: Page) -> PageSummary {
    PageSummary {
        id: page.id,
        title: page.title,
    }
}
