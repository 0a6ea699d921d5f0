//! Error types for export and conversion.

use std::path::PathBuf;

/// Boxed error returned by a [`PageSource`](crate::PageSource) implementation.
pub type SourceFailure = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error during tree export or HTML-export conversion.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExportError {
    /// A page could not be resolved from the source (network, auth, missing page).
    #[error("failed to resolve page {id}")]
    SourceUnavailable {
        /// Page ID being resolved.
        id: String,
        /// Underlying source error.
        #[source]
        source: SourceFailure,
    },

    /// An attachment could not be listed or downloaded.
    #[error("failed to fetch attachment '{filename}' of page {page_id}")]
    AttachmentFetch {
        /// Owning page ID.
        page_id: String,
        /// Attachment filename (empty when the listing itself failed).
        filename: String,
        /// Underlying source error.
        #[source]
        source: SourceFailure,
    },

    /// A node reached the index builder without an assigned path.
    #[error("page {0} has no assigned output path")]
    PathNotAssigned(String),

    /// Path assignment ran twice on the same node.
    #[error("page {0} already has an assigned output path")]
    PathAlreadyAssigned(String),

    /// HTML export input directory does not exist.
    #[error("input directory not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Filesystem error at a specific path.
    #[error("I/O error at {}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn source_unavailable<E>(id: &str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::SourceUnavailable {
            id: id.to_owned(),
            source: Box::new(source),
        }
    }
}
