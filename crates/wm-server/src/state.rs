//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;

/// Application state shared across all handlers.
#[derive(Debug)]
pub(crate) struct AppState {
    /// Directory being served.
    pub(crate) root_dir: PathBuf,
    /// File served for directory requests.
    pub(crate) index_name: String,
}
