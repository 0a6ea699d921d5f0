//! HTML fragment to Markdown conversion.
//!
//! Produces CommonMark-flavoured text with link and image markers intact and
//! no line wrapping. Only the structure found in wiki page bodies is
//! handled: headings, paragraphs, emphasis, code, lists, quotes, rules and
//! simple tables. Unknown elements contribute their content.

use scraper::ElementRef;
use scraper::node::Node;

use crate::markup::parse_fragment;

/// Elements that start a new block.
const BLOCKS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "body",
    "center",
    "dd",
    "details",
    "dialog",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "html",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "summary",
    "table",
    "ul",
];

/// Elements dropped together with their content.
const SKIPPED: &[&str] = &[
    "head", "link", "meta", "noscript", "script", "style", "template", "title",
];

/// Hard line break inside a paragraph.
const HARD_BREAK: &str = "  \n";

/// Convert a markup fragment to Markdown.
///
/// ```
/// use wm_export::to_markdown;
///
/// let md = to_markdown(r#"<h2>Setup</h2><p>See <a href="guide__2/index.md">the guide</a>.</p>"#);
/// assert_eq!(md, "## Setup\n\nSee [the guide](guide__2/index.md).");
/// ```
pub fn to_markdown(markup: &str) -> String {
    let fragment = parse_fragment(markup);
    blocks(fragment.root_element()).join("\n\n")
}

/// Render the children of a container element as a list of blocks.
fn blocks(container: ElementRef<'_>) -> Vec<String> {
    let mut out = Vec::new();
    let mut inline = String::new();
    for child in container.children() {
        if let Some(element) = ElementRef::wrap(child) {
            let name = element.value().name();
            if SKIPPED.contains(&name) {
                continue;
            }
            if BLOCKS.contains(&name) {
                push_paragraph(&mut out, &mut inline);
                out.extend(block(element));
            } else {
                inline.push_str(&inline_element(element));
            }
        } else if let Node::Text(text) = child.value() {
            inline.push_str(&collapse(text));
        }
    }
    push_paragraph(&mut out, &mut inline);
    out
}

fn push_paragraph(out: &mut Vec<String>, inline: &mut String) {
    let paragraph = paragraph(&std::mem::take(inline));
    if !paragraph.is_empty() {
        out.push(paragraph);
    }
}

fn block(element: ElementRef<'_>) -> Vec<String> {
    let name = element.value().name();
    let rendered = match name {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => heading(element),
        "p" => paragraph(&inline_children(element)),
        "ul" => list(element, false),
        "ol" => list(element, true),
        "pre" => code_block(element),
        "blockquote" => quote(element),
        "hr" => "---".to_owned(),
        "table" => table(element),
        _ => return blocks(element),
    };
    if rendered.is_empty() {
        Vec::new()
    } else {
        vec![rendered]
    }
}

fn heading(element: ElementRef<'_>) -> String {
    let level = element.value().name()[1..].parse::<usize>().unwrap_or(1);
    let text = finish_inline(&inline_children(element)).replace(HARD_BREAK, " ");
    if text.is_empty() {
        return String::new();
    }
    format!("{} {text}", "#".repeat(level))
}

fn list(element: ElementRef<'_>, ordered: bool) -> String {
    let mut number = element
        .value()
        .attr("start")
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(1);
    let mut items: Vec<String> = Vec::new();
    let mut marker_width = 2;

    for child in element.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "li" => {
                let marker = if ordered {
                    format!("{number}. ")
                } else {
                    "- ".to_owned()
                };
                marker_width = marker.len();
                items.push(list_item(&marker, &blocks(child).join("\n")));
                number = number.saturating_add(1);
            }
            // Lists nested directly in a list belong to the preceding item.
            "ul" | "ol" => {
                let nested = block(child).join("\n");
                match items.last_mut() {
                    Some(last) => {
                        last.push('\n');
                        last.push_str(&indent(&nested, marker_width));
                    }
                    None => items.push(nested),
                }
            }
            _ => {}
        }
    }
    items.join("\n")
}

fn list_item(marker: &str, body: &str) -> String {
    let mut lines = body.lines();
    let Some(first) = lines.next() else {
        return marker.trim_end().to_owned();
    };
    let rest: Vec<&str> = lines.collect();
    let mut out = format!("{marker}{first}");
    if !rest.is_empty() {
        out.push('\n');
        out.push_str(&indent(&rest.join("\n"), marker.len()));
    }
    out
}

fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn code_block(element: ElementRef<'_>) -> String {
    let code: String = element.text().collect();
    let code = code.trim_matches('\n');
    let longest_run = code
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    let fence = "`".repeat((longest_run + 1).max(3));
    format!("{fence}{}\n{code}\n{fence}", code_language(element))
}

/// Language hint from a Confluence `brush:` parameter or a `language-*` class.
fn code_language(pre: ElementRef<'_>) -> String {
    if let Some(params) = pre.value().attr("data-syntaxhighlighter-params")
        && let Some(brush) = params
            .split(';')
            .find_map(|param| param.trim().strip_prefix("brush:"))
    {
        return brush.trim().to_owned();
    }
    let code_child = pre
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == "code");
    pre.value()
        .classes()
        .chain(code_child.iter().flat_map(|code| code.value().classes()))
        .find_map(|class| class.strip_prefix("language-"))
        .map(str::to_owned)
        .unwrap_or_default()
}

fn quote(element: ElementRef<'_>) -> String {
    blocks(element)
        .join("\n\n")
        .lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_owned()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn table(element: ElementRef<'_>) -> String {
    let mut rows = Vec::new();
    collect_rows(element, &mut rows);
    if rows.is_empty() {
        return blocks(element).join("\n\n");
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            row.children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                .map(table_cell)
                .collect()
        })
        .collect();
    let width = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);

    let mut lines = Vec::with_capacity(cells.len() + 1);
    for (i, row) in cells.iter().enumerate() {
        lines.push(table_row(row, width));
        if i == 0 {
            lines.push(format!("|{}", " --- |".repeat(width)));
        }
    }
    lines.join("\n")
}

fn collect_rows<'a>(element: ElementRef<'a>, rows: &mut Vec<ElementRef<'a>>) {
    for child in element.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => collect_rows(child, rows),
            _ => {}
        }
    }
}

fn table_cell(cell: ElementRef<'_>) -> String {
    blocks(cell)
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

fn table_row(cells: &[String], width: usize) -> String {
    let mut line = String::from("|");
    for i in 0..width {
        line.push(' ');
        line.push_str(cells.get(i).map_or("", String::as_str));
        line.push_str(" |");
    }
    line
}

fn inline_children(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            out.push_str(&inline_element(child_element));
        } else if let Node::Text(text) = child.value() {
            out.push_str(&collapse(text));
        }
    }
    out
}

fn inline_element(element: ElementRef<'_>) -> String {
    match element.value().name() {
        name if SKIPPED.contains(&name) => String::new(),
        "br" => "\n".to_owned(),
        "strong" | "b" => wrap(&inline_children(element), "**"),
        "em" | "i" => wrap(&inline_children(element), "_"),
        "del" | "s" | "strike" => wrap(&inline_children(element), "~~"),
        "code" | "tt" | "kbd" | "samp" => code_span(&element.text().collect::<String>()),
        "a" => link(element),
        "img" => image(element),
        name if BLOCKS.contains(&name) => format!(" {} ", inline_children(element)),
        _ => inline_children(element),
    }
}

/// Wrap trimmed content in `marker`, keeping surrounding spaces outside.
fn wrap(content: &str, marker: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return content.to_owned();
    }
    let lead = &content[..content.len() - content.trim_start().len()];
    let trail = &content[content.trim_end().len()..];
    format!("{lead}{marker}{trimmed}{marker}{trail}")
}

fn code_span(text: &str) -> String {
    let text = collapse(text);
    let text = text.trim();
    if text.is_empty() {
        String::new()
    } else if text.contains('`') {
        format!("`` {text} ``")
    } else {
        format!("`{text}`")
    }
}

fn link(element: ElementRef<'_>) -> String {
    let label = finish_inline(&inline_children(element)).replace(HARD_BREAK, " ");
    match element.value().attr("href") {
        Some(href) if !href.is_empty() => {
            let label = if label.is_empty() { href } else { &label };
            format!("[{label}]({})", destination(href))
        }
        _ => label,
    }
}

fn image(element: ElementRef<'_>) -> String {
    let Some(src) = element.value().attr("src").filter(|s| !s.is_empty()) else {
        return String::new();
    };
    let alt = element
        .value()
        .attr("alt")
        .or_else(|| element.value().attr("title"))
        .unwrap_or("");
    let alt = collapse(alt).trim().replace('[', "\\[").replace(']', "\\]");
    format!("![{alt}]({})", destination(src))
}

/// Link destination, wrapped in angle brackets when it contains characters
/// that would end a bare destination.
fn destination(url: &str) -> String {
    if url.contains([' ', '(', ')']) {
        format!("<{}>", url.replace('<', "%3C").replace('>', "%3E"))
    } else {
        url.to_owned()
    }
}

/// Paragraph text whose lines cannot be read as block syntax.
fn paragraph(inline: &str) -> String {
    finish_inline(inline)
        .split('\n')
        .map(escape_line_start)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape a leading `#`, `>`, `-`, `+` or `N.` that would start a heading,
/// quote, list or rule.
fn escape_line_start(line: &str) -> String {
    let bytes = line.as_bytes();
    match bytes.first() {
        Some(b'#' | b'>') => return format!("\\{line}"),
        Some(&c @ (b'-' | b'+'))
            if bytes.get(1).is_none_or(|b| *b == b' ') || bytes.iter().all(|b| *b == c) =>
        {
            return format!("\\{line}");
        }
        _ => {}
    }
    let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    if (1..=9).contains(&digits)
        && matches!(bytes.get(digits), Some(b'.' | b')'))
        && bytes.get(digits + 1).is_none_or(|b| *b == b' ')
    {
        return format!("{}\\{}", &line[..digits], &line[digits..]);
    }
    line.to_owned()
}

/// Trim each line of inline content and rejoin with hard breaks.
fn finish_inline(text: &str) -> String {
    let lines: Vec<String> = text.split('\n').map(|line| collapse(line.trim())).collect();
    let start = lines.iter().position(|l| !l.is_empty());
    let end = lines.iter().rposition(|l| !l.is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join(HARD_BREAK),
        _ => String::new(),
    }
}

/// Collapse runs of ASCII whitespace into single spaces.
fn collapse(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}
