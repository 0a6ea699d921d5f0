//! Conversion of a static HTML export directory into a Markdown tree.
//!
//! Every `*.html`/`*.htm` file is converted to a `.md` file at the same
//! relative location; every other file is copied verbatim. Links between
//! files of the export are rewritten to point at the converted output.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use scraper::{Html, Selector};
use walkdir::WalkDir;

use crate::error::ExportError;
use crate::links::LinkRewriter;
use crate::markdown::to_markdown;
use crate::markup::outer_html;
use crate::paths::PathIndex;
use crate::relpath::normalize;

static PAGE_ID_META: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="ajs-page-id"]"#).expect("valid selector"));
static PAGE_ID_ATTR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-page-id]").expect("valid selector"));
static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid selector"));

/// Containers holding the page body in Confluence HTML exports, most specific first.
static MAIN_CONTENT: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "#main-content",
        "div.wiki-content",
        "div.content",
        "#content",
        "div.pageSection",
    ]
    .iter()
    .map(|s| Selector::parse(s).expect("valid selector"))
    .collect()
});

/// Map from markup files of an export to their Markdown output files.
#[derive(Debug, Clone)]
pub struct SourceTree {
    input_dir: PathBuf,
    output_dir: PathBuf,
    /// Relative `/`-separated source path → Markdown output path.
    outputs: BTreeMap<String, PathBuf>,
}

impl SourceTree {
    /// Build the map from relative `/`-separated markup file paths.
    ///
    /// Each file maps to `output_dir/<rel>` with its extension replaced by `md`.
    pub fn from_files<I, S>(input_dir: &Path, output_dir: &Path, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let outputs = files
            .into_iter()
            .map(|rel| {
                let rel = rel.as_ref();
                (rel.to_owned(), output_dir.join(rel).with_extension("md"))
            })
            .collect();
        Self {
            input_dir: input_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            outputs,
        }
    }

    /// Root of the HTML export.
    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// Root of the Markdown output.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Markdown output of a converted file, by relative `/`-separated path.
    pub fn output_for(&self, rel: &str) -> Option<&Path> {
        self.outputs.get(rel).map(PathBuf::as_path)
    }

    /// Converted files as `(relative key, output path)` in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.outputs
            .iter()
            .map(|(rel, out)| (rel.as_str(), out.as_path()))
    }

    /// Number of markup files.
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// Whether the export contains no markup files.
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

/// Counts reported after a conversion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    /// Markup files converted to Markdown.
    pub converted: usize,
    /// Other files copied verbatim.
    pub copied: usize,
    /// Converted files that carried a page ID.
    pub with_page_id: usize,
}

/// Converts an HTML export directory into a Markdown directory.
#[derive(Debug, Clone)]
pub struct HtmlExportConverter {
    input_dir: PathBuf,
    output_dir: PathBuf,
}

impl HtmlExportConverter {
    /// Create a converter from `input_dir` into `output_dir`.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Convert every markup file and copy every other file.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InputNotFound`] if the input directory does not
    /// exist, and [`ExportError::Io`] on any read or write failure.
    pub fn run(&self) -> Result<ConvertSummary, ExportError> {
        if !self.input_dir.is_dir() {
            return Err(ExportError::InputNotFound(self.input_dir.clone()));
        }
        let input_dir = absolute(&self.input_dir)?;
        let output_dir = absolute(&self.output_dir)?;

        let (markup_files, other_files) = scan(&input_dir)?;
        let tree = SourceTree::from_files(
            &input_dir,
            &output_dir,
            markup_files.iter().map(|rel| posix_key(rel)),
        );

        let mut summary = ConvertSummary::default();
        let mut sources = Vec::with_capacity(tree.len());
        let mut ids = Vec::new();
        for (rel, md_path) in tree.iter() {
            let source = input_dir.join(rel);
            let html = read_lossy(&source)?;
            if let Some(id) = extract_page_id(&html) {
                ids.push((id, md_path.to_path_buf()));
            }
            sources.push((source, md_path, html));
        }
        summary.with_page_id = ids.len();
        let index: PathIndex = ids.into_iter().collect();
        let rewriter = LinkRewriter::new(&index);

        for (source, md_path, html) in &sources {
            let content = main_content(html);
            let rewritten = rewriter.rewrite_source_file(&content, md_path, &tree, source);
            let markdown = to_markdown(&rewritten);
            write_file(md_path, format!("{}\n", markdown.trim()).as_bytes())?;
            tracing::info!(source = %source.display(), output = %md_path.display(), "Converted");
            summary.converted += 1;
        }

        for rel in &other_files {
            let target = output_dir.join(rel);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| ExportError::io(parent, e))?;
            }
            let source = input_dir.join(rel);
            fs::copy(&source, &target).map_err(|e| ExportError::io(&source, e))?;
            tracing::debug!(file = %rel.display(), "Copied");
            summary.copied += 1;
        }

        Ok(summary)
    }
}

/// Page ID from the `ajs-page-id` meta tag, else the first `data-page-id`.
pub fn extract_page_id(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let meta = doc
        .select(&PAGE_ID_META)
        .find_map(|meta| meta.value().attr("content"))
        .map(str::trim)
        .filter(|id| !id.is_empty());
    meta.or_else(|| {
        doc.select(&PAGE_ID_ATTR)
            .find_map(|el| el.value().attr("data-page-id"))
            .map(str::trim)
            .filter(|id| !id.is_empty())
    })
    .map(str::to_owned)
}

/// Markup of the element holding the page body, without scripts and styles.
///
/// Falls back to `<body>`, then to the whole document.
pub fn main_content(html: &str) -> String {
    let doc = Html::parse_document(html);
    let main = MAIN_CONTENT
        .iter()
        .find_map(|selector| doc.select(selector).next())
        .or_else(|| doc.select(&BODY).next())
        .unwrap_or_else(|| doc.root_element());
    outer_html(main)
}

/// Split the export into markup files and other files, as relative paths.
fn scan(input_dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>), ExportError> {
    let mut markup = Vec::new();
    let mut other = Vec::new();
    for entry in WalkDir::new(input_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(input_dir).to_path_buf();
            ExportError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(input_dir) else {
            continue;
        };
        if is_markup(rel) {
            markup.push(rel.to_path_buf());
        } else {
            other.push(rel.to_path_buf());
        }
    }
    Ok((markup, other))
}

fn is_markup(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

/// Relative path as a `/`-separated key.
fn posix_key(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(segment) => Some(segment.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn absolute(path: &Path) -> Result<PathBuf, ExportError> {
    std::path::absolute(path)
        .map(|abs| normalize(&abs))
        .map_err(|e| ExportError::io(path, e))
}

/// Read a file as UTF-8, replacing invalid sequences.
fn read_lossy(path: &Path) -> Result<String, ExportError> {
    let bytes = fs::read(path).map_err(|e| ExportError::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub(crate) fn write_file(path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ExportError::io(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| ExportError::io(path, e))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn page(id_meta: Option<&str>, body: &str) -> String {
        let meta = id_meta
            .map(|id| format!(r#"<meta name="ajs-page-id" content="{id}">"#))
            .unwrap_or_default();
        format!(
            "<html><head><title>T</title>{meta}<script>var x;</script></head>\
             <body><div id=\"header\">Nav</div><div id=\"main-content\">{body}</div></body></html>"
        )
    }

    #[test]
    fn test_extract_page_id_prefers_meta() {
        let html = r#"<html><head><meta name="ajs-page-id" content=" 42 "></head>
            <body><div data-page-id="7"></div></body></html>"#;
        assert_eq!(extract_page_id(html), Some("42".to_owned()));
    }

    #[test]
    fn test_extract_page_id_falls_back_to_data_attribute() {
        let html = r#"<body><span data-page-id="7">x</span></body>"#;
        assert_eq!(extract_page_id(html), Some("7".to_owned()));
    }

    #[test]
    fn test_extract_page_id_missing() {
        assert_eq!(extract_page_id("<p>no id</p>"), None);
    }

    #[test]
    fn test_main_content_prefers_known_containers() {
        let html = r#"<body><div class="content"><p>outer</p></div>
            <div id="main-content"><p>inner</p><script>bad()</script></div></body>"#;
        assert_eq!(
            main_content(html),
            r#"<div id="main-content"><p>inner</p></div>"#
        );
    }

    #[test]
    fn test_main_content_falls_back_to_body() {
        let html = "<html><body><p>plain</p></body></html>";
        assert_eq!(main_content(html), "<body><p>plain</p></body>");
    }

    #[test]
    fn test_source_tree_maps_to_markdown() {
        let tree = SourceTree::from_files(
            Path::new("/in"),
            Path::new("/md"),
            ["Space/Home.html", "legacy.htm"],
        );
        assert_eq!(
            tree.output_for("Space/Home.html"),
            Some(Path::new("/md/Space/Home.md"))
        );
        assert_eq!(tree.output_for("legacy.htm"), Some(Path::new("/md/legacy.md")));
        assert_eq!(tree.output_for("missing.html"), None);
    }

    #[test]
    fn test_run_missing_input_dir() {
        let tmp = TempDir::new().unwrap();
        let converter = HtmlExportConverter::new(tmp.path().join("nope"), tmp.path().join("out"));

        let err = converter.run().unwrap_err();

        assert!(matches!(err, ExportError::InputNotFound(_)));
    }

    #[test]
    fn test_run_converts_and_copies() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("export");
        let output = tmp.path().join("md");
        fs::create_dir_all(input.join("SPACE/attachments/10")).unwrap();
        fs::write(
            input.join("SPACE/index.html"),
            page(
                Some("10"),
                r#"<h1>Home</h1><p>See <a href="Guide_20.html#setup">guide</a>
                   and <a href="/pages/viewpage.action?pageId=20">by id</a>.</p>
                   <p><img alt="Logo" src="attachments/10/logo%20v1.png"></p>
                   <p><a href="https://example.com/x">ext</a></p>"#,
            ),
        )
        .unwrap();
        fs::write(
            input.join("SPACE/Guide_20.html"),
            page(Some("20"), r#"<p>Back to <a href="index.html">home</a></p>"#),
        )
        .unwrap();
        fs::write(input.join("SPACE/attachments/10/logo v1.png"), b"PNG").unwrap();

        let summary = HtmlExportConverter::new(&input, &output).run().unwrap();

        assert_eq!(
            summary,
            ConvertSummary {
                converted: 2,
                copied: 1,
                with_page_id: 2,
            }
        );
        assert_eq!(
            fs::read_to_string(output.join("SPACE/index.md")).unwrap(),
            "# Home\n\nSee [guide](Guide_20.md#setup) and [by id](Guide_20.md).\n\n\
             ![Logo](attachments/10/logo%20v1.png)\n\n[ext](https://example.com/x)\n"
        );
        assert_eq!(
            fs::read_to_string(output.join("SPACE/Guide_20.md")).unwrap(),
            "Back to [home](index.md)\n"
        );
        assert_eq!(
            fs::read(output.join("SPACE/attachments/10/logo v1.png")).unwrap(),
            b"PNG"
        );
    }

    #[test]
    fn test_run_converts_files_without_page_id() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("export");
        fs::create_dir_all(&input).unwrap();
        fs::write(input.join("about.htm"), "<html><body><p>About</p></body></html>").unwrap();

        let summary = HtmlExportConverter::new(&input, tmp.path().join("md"))
            .run()
            .unwrap();

        assert_eq!(summary.converted, 1);
        assert_eq!(summary.with_page_id, 0);
        assert_eq!(
            fs::read_to_string(tmp.path().join("md/about.md")).unwrap(),
            "About\n"
        );
    }
}
