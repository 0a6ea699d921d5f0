//! Relative links between files of the exported tree.

use std::path::{Component, Path, PathBuf};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters that would break a Markdown link destination.
const LINK_UNSAFE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`');

/// Lexically normalize a path: drop `.` and fold `..` into its parent.
///
/// Does not touch the filesystem, so symlinks are not resolved.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

/// Compute a forward-slash link from the file `from` to the file `to`.
///
/// The base is the directory containing `from`. Characters unsafe in a
/// Markdown link destination are percent-encoded; non-ASCII text is kept.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use wm_export::relative_link;
///
/// let from = Path::new("/out/a__1/index.md");
/// assert_eq!(relative_link(from, Path::new("/out/a__1/b__2/index.md")), "b__2/index.md");
/// assert_eq!(relative_link(from, Path::new("/out/c__3/index.md")), "../c__3/index.md");
/// assert_eq!(relative_link(from, Path::new("/out/a__1/attachments/my file.png")), "attachments/my%20file.png");
/// ```
pub fn relative_link(from: &Path, to: &Path) -> String {
    let from_dir = normalize(from.parent().unwrap_or(Path::new("")));
    let to = normalize(to);

    let from_segs: Vec<Component<'_>> = from_dir.components().collect();
    let to_segs: Vec<Component<'_>> = to.components().collect();

    let common = from_segs
        .iter()
        .zip(&to_segs)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = vec!["..".to_owned(); from_segs.len() - common];
    parts.extend(
        to_segs[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );

    if parts.is_empty() {
        return ".".to_owned();
    }
    encode_link(&parts.join("/"))
}

/// Percent-encode characters that would break a Markdown link destination.
pub fn encode_link(link: &str) -> String {
    utf8_percent_encode(link, LINK_UNSAFE).to_string()
}
