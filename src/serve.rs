//! Local preview host for a tutorials site.
//!
//! Serves a site directory as static files so the page can be exercised in
//! a browser without deploying it: markdown is served raw (the page renders
//! it client-side), `/` falls back to the embedded page shell, and the
//! highlight stylesheet is generated from a bundled syntect theme.

use std::io;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, StatusCode},
    response::Response,
    Router,
};
use tokio::signal;
use tower_http::compression::CompressionLayer;

use crate::config::ServeConfig;
use crate::highlight;
use crate::web_assets;

pub use crate::error::ServeError;

/// Maximum number of consecutive ports to try before giving up.
const MAX_PORT_ATTEMPTS: u16 = 100;

/// Maximum file size that will be read and served (16 MiB).
pub const MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Shared state passed to the request handler via `Arc<AppState>`.
pub struct AppState {
    /// Canonicalized site root; every served file must resolve inside it.
    pub canonical_root: PathBuf,
    /// Stylesheet for the highlighter's classes.
    pub highlight_css: String,
}

/// Attempt to bind a TCP listener on `bind_addr` starting at `start_port`.
///
/// On `EADDRINUSE` the port is incremented by one and the attempt is retried up
/// to `MAX_PORT_ATTEMPTS` times. Any other OS error fails immediately.
pub fn bind_with_retry(bind_addr: &str, start_port: u16) -> Result<(TcpListener, u16), ServeError> {
    let mut port = start_port;
    log::debug!("[bind] trying port={port}");
    for _ in 0..MAX_PORT_ATTEMPTS {
        let addr = format!("{bind_addr}:{port}");
        match TcpListener::bind(&addr) {
            Ok(listener) => {
                log::debug!("[bind] success port={port}");
                return Ok((listener, port));
            }
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                let next = port.wrapping_add(1);
                log::debug!("[bind] EADDRINUSE, trying {next}");
                port = next;
            }
            Err(source) => return Err(ServeError::Bind { addr, source }),
        }
    }
    Err(ServeError::PortsExhausted {
        attempts: MAX_PORT_ATTEMPTS,
        start: start_port,
    })
}

// ---------------------------------------------------------------------------
// Path resolution helpers
// ---------------------------------------------------------------------------

/// Normalize a decoded URL path, stripping `.` and `..` components.
///
/// Returns `None` if a `..` would escape the root, which signals a
/// path-traversal attempt.
pub fn normalize_path(decoded: &str) -> Option<PathBuf> {
    let mut parts: Vec<&str> = Vec::new();
    for component in decoded.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            name => parts.push(name),
        }
    }
    Some(parts.iter().collect())
}

/// Derive the `Content-Type` value from a file extension (case-insensitive).
///
/// Markdown is served as-is for the page to render; unknown extensions get
/// `application/octet-stream` so browsers never sniff.
pub fn mime_for_ext(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "md" | "markdown" => "text/markdown; charset=utf-8",
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "wasm" => "application/wasm",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

/// Resolve a candidate path to an existing file.
///
/// A file resolves to itself; a directory resolves to its `index.html`.
/// Returns `(resolved_path, branch_name)`, or `None` if nothing matches.
async fn resolve_candidate(candidate: &Path) -> Option<(PathBuf, &'static str)> {
    let meta = tokio::fs::metadata(candidate).await.ok()?;
    if meta.is_file() {
        return Some((candidate.to_path_buf(), "exact"));
    }
    if meta.is_dir() {
        let index = candidate.join("index.html");
        if is_file(&index).await {
            return Some((index, "index"));
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn embedded_response(content_type: &'static str, body: impl Into<Body>) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header("X-Content-Type-Options", "nosniff")
        .body(body.into())
        .expect("embedded response builder is infallible")
}

/// 404 Not Found with mandatory security headers.
fn not_found_response() -> Response {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header("X-Content-Type-Options", "nosniff")
        .body(Body::from("Not Found"))
        .expect("not_found_response builder is infallible")
}

/// 413 Content Too Large with mandatory security headers.
fn too_large_response(norm_path: &str, size: u64) -> Response {
    let body = format!(
        "Content Too Large: {norm_path} ({size} bytes exceeds {MAX_FILE_SIZE} byte limit)"
    );
    Response::builder()
        .status(StatusCode::PAYLOAD_TOO_LARGE)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header("X-Content-Type-Options", "nosniff")
        .body(Body::from(body))
        .expect("too_large_response builder is infallible")
}

// ---------------------------------------------------------------------------
// Axum request handler
// ---------------------------------------------------------------------------

/// Main request handler.
///
/// Steps:
/// 0. `/assets/hub.css` and `/assets/highlight.css` come from memory.
/// 1. Percent-decode the raw request path; reject NUL bytes.
/// 2. Normalise: strip `.`/`..`; reject traversal above root.
/// 3. Resolve: exact file, or `index.html` of a directory. The site root
///    without an `index.html` gets the embedded page shell.
/// 4. Canonicalise the resolved path and re-verify containment (symlinks).
/// 5. Reject files larger than `MAX_FILE_SIZE` with 413.
/// 6. Serve with a MIME type derived from the extension and `Last-Modified`.
///
/// All responses include `X-Content-Type-Options: nosniff`.
async fn serve_handler(State(state): State<Arc<AppState>>, req: Request) -> Response {
    let raw_path = req.uri().path().to_owned();

    // Step 0: embedded assets.
    if raw_path == "/assets/hub.css" {
        log::debug!("[request] path={raw_path} mode=asset");
        return embedded_response("text/css; charset=utf-8", web_assets::CSS);
    }
    if raw_path == "/assets/highlight.css" {
        log::debug!("[request] path={raw_path} mode=asset");
        return embedded_response("text/css; charset=utf-8", state.highlight_css.clone());
    }

    // Step 1: percent-decode.
    let decoded = match urlencoding::decode(&raw_path) {
        Ok(d) => d.into_owned(),
        Err(_) => {
            log::debug!("[resolve] path={raw_path} branch=denied reason=invalid-percent-encoding");
            return not_found_response();
        }
    };
    if decoded.contains('\0') {
        log::debug!("[resolve] path={raw_path} branch=denied reason=null-byte");
        return not_found_response();
    }

    // Step 2: normalise.
    let Some(normalized) = normalize_path(&decoded) else {
        log::debug!("[resolve] path={raw_path} branch=denied reason=path-traversal");
        return not_found_response();
    };
    let norm_display = normalized.display().to_string();

    // Step 3: resolve.
    let candidate = state.canonical_root.join(&normalized);
    let (resolved, branch) = match resolve_candidate(&candidate).await {
        Some(r) => r,
        None if normalized.as_os_str().is_empty() || norm_display == "index.html" => {
            log::debug!("[request] path=/ mode=shell");
            return embedded_response("text/html; charset=utf-8", web_assets::INDEX_HTML);
        }
        None => {
            log::debug!("[resolve] path={norm_display} branch=denied reason=not-found");
            return not_found_response();
        }
    };

    // Step 4: canonicalise and re-verify containment.
    let canonical = match tokio::fs::canonicalize(&resolved).await {
        Ok(c) => c,
        Err(_) => {
            log::debug!("[resolve] path={norm_display} branch=denied reason=canonicalize-failed");
            return not_found_response();
        }
    };
    if !canonical.starts_with(&state.canonical_root) {
        log::debug!(
            "[resolve] path={norm_display} branch=denied reason=outside-root canonical={}",
            canonical.display()
        );
        return not_found_response();
    }

    // Step 5: size guard.
    let meta = match tokio::fs::metadata(&canonical).await {
        Ok(m) => m,
        Err(_) => {
            log::debug!("[resolve] path={norm_display} branch=denied reason=metadata-failed");
            return not_found_response();
        }
    };
    let size = meta.len();
    if size > MAX_FILE_SIZE {
        log::debug!("[resolve] path={norm_display} branch=denied reason=too-large size={size}");
        return too_large_response(&norm_display, size);
    }

    // Step 6: serve.
    let bytes = match tokio::fs::read(&canonical).await {
        Ok(b) => b,
        Err(_) => return not_found_response(),
    };
    let ext = canonical
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    log::info!("[request] path={norm_display} branch={branch} size={size}");

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime_for_ext(ext))
        .header("X-Content-Type-Options", "nosniff");
    if let Ok(modified) = meta.modified() {
        builder = builder.header(header::LAST_MODIFIED, httpdate::fmt_http_date(modified));
    }
    builder
        .body(Body::from(bytes))
        .expect("serve_handler file response builder is infallible")
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Build the router for a site rooted at `state.canonical_root`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(serve_handler)
        .with_state(state)
        .layer(CompressionLayer::new())
}

/// Start the preview host described by `config`.
///
/// Binds starting at `config.port`, retrying on `EADDRINUSE` up to 100
/// times, and shuts down cleanly on SIGINT (Ctrl+C).
pub async fn run_serve(config: ServeConfig) -> Result<(), ServeError> {
    if !config.root.is_dir() {
        return Err(ServeError::NotADirectory(config.root.display().to_string()));
    }
    let canonical_root = std::fs::canonicalize(&config.root)?;
    let highlight_css = highlight::theme_css(web_assets::HIGHLIGHT_THEME).unwrap_or_default();

    let state = Arc::new(AppState {
        canonical_root,
        highlight_css,
    });

    let (std_listener, bound_port) = bind_with_retry(&config.bind, config.port)?;
    std_listener.set_nonblocking(true)?;
    let listener = tokio::net::TcpListener::from_std(std_listener)?;

    log::info!(
        "[serve] listening on http://{}:{}/ root={}",
        config.bind,
        bound_port,
        state.canonical_root.display()
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            signal::ctrl_c()
                .await
                .expect("failed to install SIGINT handler");
            log::info!("[shutdown] complete");
        })
        .await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
