//! Hyperlink and media reference rewriting.
//!
//! Every `a[href]` and `img[src]` in a page's markup is classified, in order:
//!
//! 1. Internal page reference (`pageId=<digits>` in the query) whose ID is in
//!    the [`PathIndex`]: relative link to the target page, fragment kept.
//! 2. Attachment download (`/download/attachments/<pageId>/<file>`), page
//!    scope only: relative link into the page's attachment directory.
//! 3. External reference (scheme, protocol-relative or pure fragment): kept.
//! 4. Same-tree file reference, HTML-export scope only: relative link to the
//!    converted Markdown file or to the verbatim copy, fragment kept.
//! 5. Anything else: kept.
//!
//! Rewriting is a pure function of its inputs and never fails.

use std::path::{Component, Path};
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;

use crate::html_export::SourceTree;
use crate::markup::{MarkupWriter, parse_fragment};
use crate::paths::PathIndex;
use crate::relpath::{normalize, relative_link};

static PAGE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]pageId=(\d+)").expect("valid regex"));
static ATTACHMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/download/attachments/(\d+)/([^?]+)").expect("valid regex"));
static EXTERNAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Za-z][A-Za-z0-9+.\-]*:|//|#)").expect("valid regex"));

/// Where the markup being rewritten comes from.
#[derive(Debug, Clone, Copy)]
enum Scope<'s> {
    /// A page exported from the API, with its own attachment directory.
    Page { attachment_dir: &'s Path },
    /// A file of an HTML export being converted in place.
    SourceFile {
        tree: &'s SourceTree,
        source: &'s Path,
    },
}

/// Rewrites page markup links against a [`PathIndex`].
#[derive(Debug, Clone, Copy)]
pub struct LinkRewriter<'a> {
    index: &'a PathIndex,
}

impl<'a> LinkRewriter<'a> {
    /// Create a rewriter over a complete index.
    pub fn new(index: &'a PathIndex) -> Self {
        Self { index }
    }

    /// Rewrite markup of a page exported to `current_path`, whose attachments
    /// live in `attachment_dir`.
    pub fn rewrite_page(&self, markup: &str, current_path: &Path, attachment_dir: &Path) -> String {
        self.rewrite(markup, current_path, Scope::Page { attachment_dir })
    }

    /// Rewrite markup of the HTML-export file `source`, converted to `current_path`.
    pub fn rewrite_source_file(
        &self,
        markup: &str,
        current_path: &Path,
        tree: &SourceTree,
        source: &Path,
    ) -> String {
        self.rewrite(markup, current_path, Scope::SourceFile { tree, source })
    }

    fn rewrite(&self, markup: &str, current_path: &Path, scope: Scope<'_>) -> String {
        let fragment = parse_fragment(markup);
        let mut writer = MarkupWriter::new(|tag: &str, attr: &str, value: &str| {
            match (tag, attr) {
                ("a", "href") | ("img", "src") => self.resolve(value, current_path, scope),
                _ => None,
            }
        });
        writer.write_children(fragment.root_element());
        writer.finish()
    }

    /// New value for a link attribute, or `None` to keep it unchanged.
    fn resolve(&self, url: &str, current_path: &Path, scope: Scope<'_>) -> Option<String> {
        if url.is_empty() {
            return None;
        }
        let (base, fragment) = split_fragment(url);

        if let Some(target) = page_id(base).and_then(|id| self.index.get(id)) {
            return Some(relative_link(current_path, target) + fragment);
        }

        if let Scope::Page { attachment_dir } = scope
            && let Some(filename) = attachment_name(base)
        {
            return Some(relative_link(current_path, &attachment_dir.join(filename)));
        }

        if EXTERNAL.is_match(url) {
            return None;
        }

        match scope {
            Scope::SourceFile { tree, source } => {
                resolve_source_file(base, current_path, tree, source).map(|link| link + fragment)
            }
            Scope::Page { .. } => None,
        }
    }
}

/// Make an attachment name safe as a single path segment.
///
/// Path separators become `_`, and names that would address a directory
/// (`""`, `.`, `..`) are prefixed with `_`.
pub fn attachment_file_name(raw: &str) -> String {
    let name: String = raw
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    if matches!(name.as_str(), "" | "." | "..") {
        format!("_{name}")
    } else {
        name
    }
}

/// Split `url` into the part before `#` and the fragment including `#`.
fn split_fragment(url: &str) -> (&str, &str) {
    match url.find('#') {
        Some(pos) => url.split_at(pos),
        None => (url, ""),
    }
}

fn page_id(url: &str) -> Option<&str> {
    PAGE_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn attachment_name(url: &str) -> Option<String> {
    let caps = ATTACHMENT.captures(url)?;
    let raw = caps.get(2)?.as_str();
    Some(attachment_file_name(&percent_decode_str(raw).decode_utf8_lossy()))
}

fn resolve_source_file(
    base: &str,
    current_path: &Path,
    tree: &SourceTree,
    source: &Path,
) -> Option<String> {
    let path = base.split('?').next().unwrap_or_default();
    if path.is_empty() {
        return None;
    }
    let decoded = percent_decode_str(path).decode_utf8_lossy();

    let source_dir = source.parent().unwrap_or(Path::new(""));
    let resolved = normalize(&source_dir.join(decoded.as_ref()));
    let rel = resolved.strip_prefix(tree.input_dir()).ok()?;

    let rel_key = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(segment) => Some(segment.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");

    let target = match tree.output_for(&rel_key) {
        Some(converted) => converted.to_path_buf(),
        None => tree.output_dir().join(rel),
    };
    Some(relative_link(current_path, &target))
}
