//! Filesystem-safe slugs derived from page titles.

use std::sync::LazyLock;

use regex::Regex;

/// Slug used when nothing of the title survives filtering.
pub const FALLBACK_SLUG: &str = "page";

/// Characters outside Latin and Cyrillic letters, digits, `-`, `_` and space.
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9а-яё\-_ ]+").expect("valid regex"));
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{2,}").expect("valid regex"));

/// Convert a page title into a directory-name slug.
///
/// # Examples
///
/// ```
/// use wm_export::slugify;
///
/// assert_eq!(slugify("Release Notes (2024)"), "release-notes-2024");
/// assert_eq!(slugify("Отчёт по API"), "отчёт-по-api");
/// assert_eq!(slugify("???"), "page");
/// ```
pub fn slugify(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let filtered = DISALLOWED.replace_all(&lowered, "");
    let hyphenated = SPACES.replace_all(&filtered, "-");
    let collapsed = DASHES.replace_all(&hyphenated, "-");
    if collapsed.is_empty() {
        FALLBACK_SLUG.to_owned()
    } else {
        collapsed.into_owned()
    }
}
