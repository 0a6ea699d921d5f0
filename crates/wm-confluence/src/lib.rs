//! Confluence integration for wikimirror.
//!
//! - [`ConfluenceClient`]: REST API client with HTTP Basic authentication
//! - [`PageSource`](wm_export::PageSource) implementation, so the client can
//!   drive [`wm_export::Exporter`] directly
//!
//! # API Client
//!
//! ```ignore
//! use std::time::Duration;
//! use wm_confluence::ConfluenceClient;
//!
//! let client = ConfluenceClient::from_config(
//!     "https://confluence.example.com",
//!     "user",
//!     "secret",
//!     true,
//!     Duration::from_secs(60),
//! );
//!
//! let page = client.get_page("123", &["body.view"])?;
//! println!("Page title: {}", page.title);
//! ```

// API client
mod client;
pub use client::{ConfluenceClient, DEFAULT_TIMEOUT_SECS};

// PageSource implementation
mod source;

// Response types
pub mod types;

// Errors
pub mod error;
pub use error::ConfluenceError;
