//! Static HTTP server for exported wiki trees.
//!
//! Serves an export directory as-is. A request for a directory returns its
//! index file (`index.md` by default), so the relative links written by the
//! exporter resolve in a browser the same way they do on disk.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use wm_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         root_dir: PathBuf::from("wiki"),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```

mod app;
mod error;
mod state;
mod static_files;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

pub use error::ServerError;
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory to serve.
    pub root_dir: PathBuf,
    /// File served for directory requests.
    pub index_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8000,
            root_dir: PathBuf::from("wiki"),
            index_name: "index.md".to_owned(),
        }
    }
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns [`ServerError::MissingRoot`] before binding if the directory does
/// not exist, [`ServerError::InvalidAddress`] if host and port do not parse,
/// and [`ServerError::Io`] if the listener fails.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    if !config.root_dir.is_dir() {
        return Err(ServerError::MissingRoot(config.root_dir));
    }

    let address = format!("{}:{}", config.host, config.port);
    let addr: SocketAddr = address
        .parse()
        .map_err(|source| ServerError::InvalidAddress { address, source })?;

    tracing::info!(
        address = %addr,
        root = %config.root_dir.display(),
        "Starting server"
    );
    let state = Arc::new(AppState {
        root_dir: config.root_dir,
        index_name: config.index_name,
    });
    let app = app::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from loaded configuration.
#[must_use]
pub fn server_config_from_config(config: &wm_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        root_dir: config.serve_dir.clone(),
        index_name: config.export_resolved.index_name.clone(),
    }
}
