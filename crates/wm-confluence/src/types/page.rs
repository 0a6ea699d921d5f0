//! Confluence page types.

use serde::Deserialize;

/// Confluence page, as returned by content lookups and child listings.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    /// Page ID.
    pub id: String,
    /// Page title.
    pub title: String,
    /// Page body content (only with `expand=body.*`).
    #[serde(default)]
    pub body: Option<Body>,
}

impl Page {
    /// Rendered body markup, if expanded.
    pub fn view(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.view.as_ref())
            .map(|v| v.value.as_str())
    }

    /// Storage-format body markup, if expanded.
    pub fn storage(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.storage.as_ref())
            .map(|s| s.value.as_str())
    }
}

/// Page body content.
#[derive(Debug, Clone, Deserialize)]
pub struct Body {
    /// Rendered HTML.
    #[serde(default)]
    pub view: Option<BodyValue>,
    /// Confluence storage format.
    #[serde(default)]
    pub storage: Option<BodyValue>,
}

/// One body representation.
#[derive(Debug, Clone, Deserialize)]
pub struct BodyValue {
    /// Markup.
    pub value: String,
}
