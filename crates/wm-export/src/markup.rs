//! HTML tag-tree serialization with an attribute rewrite hook.
//!
//! Markup is parsed with `scraper` and written back out as a new string; the
//! parsed tree itself is never mutated.

use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Elements without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose text content is written without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// Elements dropped together with their content when extracting page bodies.
pub(crate) const NON_CONTENT_ELEMENTS: &[&str] = &["script", "style"];

/// Parse a markup fragment (no implied `<html>`/`<body>` in the output).
pub(crate) fn parse_fragment(markup: &str) -> Html {
    Html::parse_fragment(markup)
}

/// Writes elements back to markup, letting a hook replace attribute values.
///
/// The hook receives `(element name, attribute name, value)` and returns the
/// replacement value, or `None` to keep the original.
pub(crate) struct MarkupWriter<F> {
    out: String,
    rewrite: F,
    dropped: &'static [&'static str],
}

impl<F> MarkupWriter<F>
where
    F: FnMut(&str, &str, &str) -> Option<String>,
{
    pub(crate) fn new(rewrite: F) -> Self {
        Self {
            out: String::new(),
            rewrite,
            dropped: &[],
        }
    }

    /// Skip the given elements and their content entirely.
    pub(crate) fn dropping(mut self, tags: &'static [&'static str]) -> Self {
        self.dropped = tags;
        self
    }

    /// Write an element including its own start and end tags.
    pub(crate) fn write_element(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();
        if self.dropped.contains(&name) {
            return;
        }

        let mut attrs: Vec<(&str, &str)> = element.value().attrs().collect();
        attrs.sort_unstable_by(|a, b| a.0.cmp(b.0));

        self.out.push('<');
        self.out.push_str(name);
        for (attr, value) in attrs {
            let value = (self.rewrite)(name, attr, value).unwrap_or_else(|| value.to_owned());
            self.out.push(' ');
            self.out.push_str(attr);
            self.out.push_str("=\"");
            escape_into(&mut self.out, &value, true);
            self.out.push('"');
        }
        self.out.push('>');

        if VOID_ELEMENTS.contains(&name) {
            return;
        }
        self.write_children(element);
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    /// Write the content of an element without its own tags.
    pub(crate) fn write_children(&mut self, element: ElementRef<'_>) {
        let raw = RAW_TEXT_ELEMENTS.contains(&element.value().name());
        for child in element.children() {
            if let Some(child_element) = ElementRef::wrap(child) {
                self.write_element(child_element);
                continue;
            }
            match child.value() {
                Node::Text(text) if raw => self.out.push_str(text),
                Node::Text(text) => escape_into(&mut self.out, text, false),
                Node::Comment(comment) => {
                    self.out.push_str("<!--");
                    self.out.push_str(comment);
                    self.out.push_str("-->");
                }
                _ => {}
            }
        }
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }
}

/// Attribute hook that keeps every value unchanged.
pub(crate) fn keep_attrs(_: &str, _: &str, _: &str) -> Option<String> {
    None
}

/// Serialize an element including its own tags, dropping script and style.
pub(crate) fn outer_html(element: ElementRef<'_>) -> String {
    let mut writer = MarkupWriter::new(keep_attrs).dropping(NON_CONTENT_ELEMENTS);
    writer.write_element(element);
    writer.finish()
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
