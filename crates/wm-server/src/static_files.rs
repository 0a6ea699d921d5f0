//! Static file serving with directory index resolution.
//!
//! A request path is mapped onto the served directory segment by segment.
//! Directories resolve to their index file; requests for a directory without
//! a trailing slash are redirected so relative links inside the index work.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use percent_encoding::percent_decode_str;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::state::AppState;

/// Create router serving the export directory.
pub(crate) fn static_router() -> Router<Arc<AppState>> {
    Router::new().fallback(serve_path)
}

/// Where a request path leads.
#[derive(Debug, PartialEq, Eq)]
enum Target {
    File(PathBuf),
    /// Directory requested without trailing slash.
    Redirect(String),
    NotFound,
}

async fn serve_path(State(state): State<Arc<AppState>>, req: Request<Body>) -> Response {
    let path = req.uri().path().to_owned();
    match resolve(&state.root_dir, &path, &state.index_name).await {
        Target::File(file) => match ServeFile::new(file).oneshot(req).await {
            Ok(response) => response.into_response(),
            Err(never) => match never {},
        },
        Target::Redirect(location) => Redirect::permanent(&location).into_response(),
        Target::NotFound => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Map a request path to a file below `root`.
async fn resolve(root: &Path, request_path: &str, index_name: &str) -> Target {
    let Some(relative) = safe_relative_path(request_path) else {
        tracing::debug!(path = %request_path, "Rejected path");
        return Target::NotFound;
    };
    let candidate = root.join(relative);

    let Ok(meta) = tokio::fs::metadata(&candidate).await else {
        return Target::NotFound;
    };
    if meta.is_file() {
        return Target::File(candidate);
    }
    if !request_path.ends_with('/') {
        return Target::Redirect(format!("{request_path}/"));
    }

    let index = candidate.join(index_name);
    match tokio::fs::metadata(&index).await {
        Ok(meta) if meta.is_file() => Target::File(index),
        _ => Target::NotFound,
    }
}

/// Percent-decode a URL path and turn it into a relative filesystem path.
///
/// Returns `None` for paths that are not valid UTF-8 or contain `..` or
/// backslash segments.
fn safe_relative_path(request_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(request_path).decode_utf8().ok()?;
    let mut relative = PathBuf::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            s if s.contains('\\') || s.contains('\0') => return None,
            s => relative.push(s),
        }
    }
    Some(relative)
}
