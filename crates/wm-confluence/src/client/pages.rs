//! Page operations for Confluence API.

use tracing::debug;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{ContentList, Page};

impl ConfluenceClient {
    /// Get page by ID with optional field expansion.
    pub fn get_page(&self, page_id: &str, expand: &[&str]) -> Result<Page, ConfluenceError> {
        let mut url = format!("{}/content/{}", self.api_url(), page_id);

        if !expand.is_empty() {
            url.push_str("?expand=");
            url.push_str(&expand.join(","));
        }

        debug!("Getting page {}", page_id);

        Ok(self.get(&url, "application/json")?.read_json()?)
    }

    /// List one page of direct child pages.
    pub fn get_child_pages(
        &self,
        page_id: &str,
        start: usize,
        limit: usize,
    ) -> Result<ContentList<Page>, ConfluenceError> {
        let url = self.child_pages_url(page_id, start, limit);

        debug!("Listing children of page {} (start={})", page_id, start);

        Ok(self.get(&url, "application/json")?.read_json()?)
    }

    fn child_pages_url(&self, page_id: &str, start: usize, limit: usize) -> String {
        format!(
            "{}/content/{}/child/page?start={}&limit={}",
            self.api_url(),
            page_id,
            start,
            limit
        )
    }
}
