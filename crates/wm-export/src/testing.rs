//! In-memory [`PageSource`] for tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io::Write;

use crate::source::{AttachmentRef, PageContent, PageSource, PageSummary};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub(crate) struct FakeError(pub String);

#[derive(Default)]
struct FakePage {
    title: String,
    children: Vec<String>,
    view: Option<String>,
    storage: Option<String>,
    attachments: Vec<AttachmentRef>,
}

#[derive(Default)]
pub(crate) struct FakeSource {
    pages: HashMap<String, FakePage>,
    files: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
    failing_listings: HashSet<String>,
    child_requests: RefCell<Vec<(String, usize, usize)>>,
    downloads: RefCell<Vec<String>>,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(mut self, id: &str, title: &str, children: &[&str]) -> Self {
        let page = self.pages.entry(id.to_owned()).or_default();
        page.title = title.to_owned();
        page.children = children.iter().map(|c| (*c).to_owned()).collect();
        self
    }

    pub(crate) fn body(mut self, id: &str, view: Option<&str>, storage: Option<&str>) -> Self {
        let page = self.pages.entry(id.to_owned()).or_default();
        page.view = view.map(str::to_owned);
        page.storage = storage.map(str::to_owned);
        self
    }

    pub(crate) fn attachment(mut self, id: &str, filename: &str, data: &[u8]) -> Self {
        let url = format!("https://wiki.test/download/attachments/{id}/{filename}");
        self.files.insert(url.clone(), data.to_vec());
        self.pages
            .entry(id.to_owned())
            .or_default()
            .attachments
            .push(AttachmentRef {
                filename: filename.to_owned(),
                download_url: url,
            });
        self
    }

    pub(crate) fn failing_download(mut self, id: &str, filename: &str) -> Self {
        self.failing.insert(format!(
            "https://wiki.test/download/attachments/{id}/{filename}"
        ));
        self
    }

    pub(crate) fn failing_listing(mut self, id: &str) -> Self {
        self.failing_listings.insert(id.to_owned());
        self
    }

    pub(crate) fn child_requests(&self, id: &str) -> Vec<(usize, usize)> {
        self.child_requests
            .borrow()
            .iter()
            .filter(|(page, _, _)| page == id)
            .map(|(_, offset, limit)| (*offset, *limit))
            .collect()
    }

    pub(crate) fn downloads(&self) -> Vec<String> {
        self.downloads.borrow().clone()
    }

    fn get(&self, id: &str) -> Result<&FakePage, FakeError> {
        self.pages
            .get(id)
            .ok_or_else(|| FakeError(format!("page {id} not found")))
    }
}

impl PageSource for FakeSource {
    type Error = FakeError;

    fn page(&self, id: &str) -> Result<PageSummary, FakeError> {
        let page = self.get(id)?;
        Ok(PageSummary {
            id: id.to_owned(),
            title: page.title.clone(),
        })
    }

    fn children(
        &self,
        id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<PageSummary>, FakeError> {
        self.child_requests
            .borrow_mut()
            .push((id.to_owned(), offset, limit));
        let page = self.get(id)?;
        Ok(page
            .children
            .iter()
            .skip(offset)
            .take(limit)
            .map(|child| PageSummary {
                id: child.clone(),
                title: self
                    .pages
                    .get(child)
                    .map(|p| p.title.clone())
                    .unwrap_or_default(),
            })
            .collect())
    }

    fn content(&self, id: &str) -> Result<PageContent, FakeError> {
        let page = self.get(id)?;
        Ok(PageContent {
            title: page.title.clone(),
            view: page.view.clone(),
            storage: page.storage.clone(),
        })
    }

    fn attachments(
        &self,
        id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<AttachmentRef>, FakeError> {
        if self.failing_listings.contains(id) {
            return Err(FakeError(format!("503 listing attachments of {id}")));
        }
        let page = self.get(id)?;
        Ok(page
            .attachments
            .iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64, FakeError> {
        self.downloads.borrow_mut().push(url.to_owned());
        if self.failing.contains(url) {
            return Err(FakeError(format!("connection reset fetching {url}")));
        }
        let data = self
            .files
            .get(url)
            .ok_or_else(|| FakeError(format!("404 {url}")))?;
        sink.write_all(data).map_err(|e| FakeError(e.to_string()))?;
        Ok(data.len() as u64)
    }
}
