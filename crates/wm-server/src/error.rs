//! Error types for the HTTP server.

use std::path::PathBuf;

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Directory to serve does not exist.
    #[error("Directory to serve not found: {}", .0.display())]
    MissingRoot(PathBuf),

    /// Host and port do not form a socket address.
    #[error("Invalid listen address '{address}'")]
    InvalidAddress {
        /// Address as given.
        address: String,
        /// Parse failure.
        #[source]
        source: std::net::AddrParseError,
    },

    /// I/O error (bind, accept).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
