//! Development server for the build output.
//!
//! A lightweight HTTP server built on `tiny_http`:
//!
//! - Static file serving from the build output directory
//! - Redirect of directory URLs to their trailing-slash form
//! - Automatic `index.html` resolution for directories
//! - Directory listing when a directory has no index
//! - `404.html` from the output root for missing paths
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │   Main Thread   │     │  Server Thread   │
//! │ (watch/rebuild) │     │ (HTTP requests)  │
//! └────────┬────────┘     └────────┬─────────┘
//!          │                       │
//!          ▼                       ▼
//!    Detect changes          Handle requests
//!    Trigger rebuild         Serve files
//!          └───────────┬───────────┘
//!                      ▼
//!              config.build.output
//! ```
//!
//! The server reads the output directory while a rebuild may be rewriting
//! it. A request racing a rebuild can see a missing or half-written file;
//! a browser reload after the rebuild finishes fixes it.

use crate::{error::SiteError, log};
use anyhow::{Context, Result, anyhow};
use std::{
    fs,
    io::Cursor,
    net::SocketAddr,
    path::{Component, Path, PathBuf},
    thread::{self, JoinHandle},
};
use tiny_http::{Header, Request, Response, Server, StatusCode};

// ============================================================================
// Constants - HTML Templates
// ============================================================================

/// Directory listing HTML template (embedded at compile time)
const DIRECTORY_TEMPLATE: &str = include_str!("embed/serve/directory.html");

/// Custom not-found page, looked up at the output root.
const NOT_FOUND_PAGE: &str = "404.html";

// ============================================================================
// Server Entry Point
// ============================================================================

/// Bind the listening socket.
///
/// Called on the main thread so that a taken port fails the process instead
/// of a background thread.
pub fn bind(addr: SocketAddr) -> Result<Server, SiteError> {
    Server::http(addr).map_err(|source| SiteError::NetworkBind { addr, source })
}

/// Serve `root` from a detached thread until the process exits.
pub fn spawn(server: Server, root: PathBuf) -> JoinHandle<()> {
    thread::spawn(move || {
        for request in server.incoming_requests() {
            if let Err(e) = handle_request(request, &root) {
                log!("serve"; "request error: {e}");
            }
        }
    })
}

// ============================================================================
// Request Resolution
// ============================================================================

/// What a request path maps to inside the served directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Serve this file
    File(PathBuf),
    /// Directory requested without trailing slash, redirect here (still URL-encoded)
    Redirect(String),
    /// Directory without `index.html`: (directory, request path)
    Listing(PathBuf, String),
    /// Nothing to serve
    NotFound,
}

/// Resolve a raw request URL against `root`.
///
/// Resolution order:
/// 1. Exact file match → file
/// 2. Directory without trailing slash → redirect
/// 3. Directory with index.html → index.html
/// 4. Directory without index.html → listing
/// 5. Nothing found, or a path escaping `root` → not found
pub fn resolve(root: &Path, url: &str) -> Resolution {
    // Strip query string (e.g., ?t=123456) before resolving path
    let (raw_path, query) = match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    };

    // Decode URL-encoded characters (e.g., %20 → space)
    let url_path = urlencoding::decode(raw_path)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();
    let request_path = url_path.trim_matches('/');

    let escapes_root = Path::new(request_path)
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if escapes_root {
        return Resolution::NotFound;
    }

    let local_path = root.join(request_path);

    if local_path.is_file() {
        return Resolution::File(local_path);
    }

    if local_path.is_dir() {
        if !url_path.ends_with('/') {
            let location = match query {
                Some(query) => format!("{raw_path}/?{query}"),
                None => format!("{raw_path}/"),
            };
            return Resolution::Redirect(location);
        }

        let index_path = local_path.join("index.html");
        if index_path.is_file() {
            return Resolution::File(index_path);
        }
        return Resolution::Listing(local_path, request_path.to_owned());
    }

    Resolution::NotFound
}

/// Handle a single HTTP request.
fn handle_request(request: Request, root: &Path) -> Result<()> {
    match resolve(root, request.url()) {
        Resolution::File(path) => serve_file(request, &path),
        Resolution::Redirect(location) => serve_redirect(request, &location),
        Resolution::Listing(dir, request_path) => {
            match generate_directory_listing(&dir, &request_path) {
                Ok(listing) => serve_html(request, listing),
                Err(_) => serve_not_found(request, root),
            }
        }
        Resolution::NotFound => serve_not_found(request, root),
    }
}

// ============================================================================
// Response Helpers
// ============================================================================

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .map_err(|()| anyhow!("invalid `{name}` header value: {value}"))
}

/// Serve a file with appropriate content type.
fn serve_file(request: Request, path: &Path) -> Result<()> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let response = Response::from_data(content)
        .with_header(header("Content-Type", guess_content_type(path))?);

    request.respond(response)?;
    Ok(())
}

/// Serve HTML content.
fn serve_html(request: Request, content: String) -> Result<()> {
    let response = Response::from_string(content)
        .with_header(header("Content-Type", "text/html; charset=utf-8")?);
    request.respond(response)?;
    Ok(())
}

/// Permanent redirect to `location`.
fn serve_redirect(request: Request, location: &str) -> Result<()> {
    let response = Response::empty(StatusCode(301)).with_header(header("Location", location)?);
    request.respond(response)?;
    Ok(())
}

/// Serve 404 Not Found response, using the site's own page when it has one.
fn serve_not_found(request: Request, root: &Path) -> Result<()> {
    let custom = root.join(NOT_FOUND_PAGE);
    if let Ok(content) = fs::read(&custom) {
        let response = Response::from_data(content)
            .with_status_code(StatusCode(404))
            .with_header(header("Content-Type", "text/html; charset=utf-8")?);
        request.respond(response)?;
        return Ok(());
    }

    let response = Response::new(
        StatusCode(404),
        vec![header("Content-Type", "text/plain")?],
        Cursor::new("404 Not Found"),
        Some(13),
        None,
    );
    request.respond(response)?;
    Ok(())
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
pub fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        // Web content
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",
        Some("wasm") => "application/wasm",

        // Images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",

        // Media
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mp3") => "audio/mpeg",

        // Documents
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",

        // Default binary
        _ => "application/octet-stream",
    }
}

// ============================================================================
// Directory Listing
// ============================================================================

/// Generate HTML directory listing for browsing.
///
/// Hidden entries (starting with '.') are left out. Directories come
/// first, then files, each group in name order.
fn generate_directory_listing(dir_path: &Path, request_path: &str) -> std::io::Result<String> {
    let mut entries: Vec<(bool, String)> = fs::read_dir(dir_path)?
        .filter_map(|e| e.ok())
        .map(|entry| {
            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
            (is_dir, entry.file_name().to_string_lossy().into_owned())
        })
        .filter(|(_, name)| !name.starts_with('.'))
        .collect();
    entries.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    let entries: Vec<_> = entries
        .into_iter()
        .map(|(is_dir, name)| {
            let icon = if is_dir { "📁" } else { "📄" };
            let slash = if is_dir { "/" } else { "" };
            let href = if request_path.is_empty() {
                format!("/{name}{slash}")
            } else {
                format!("/{request_path}/{name}{slash}")
            };
            format!(
                r#"<li><span class="icon">{icon}</span><a href="{}">{}</a></li>"#,
                escape_html(&href),
                escape_html(&name)
            )
        })
        .collect();

    // Generate parent link if not at root
    let parent_link = if request_path.is_empty() {
        String::new()
    } else {
        let parent_path = Path::new(request_path)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parent_href = if parent_path.is_empty() {
            "/".to_string()
        } else {
            format!("/{parent_path}/")
        };
        format!(
            r#"<li class="parent"><span class="icon">📂</span><a href="{}">..</a></li>"#,
            escape_html(&parent_href)
        )
    };

    #[allow(clippy::literal_string_with_formatting_args)]
    // These are template placeholders, not format args
    Ok(DIRECTORY_TEMPLATE
        .replace("{path}", &escape_html(request_path))
        .replace("{parent_link}", &parent_link)
        .replace("{entries}", &entries.join("\n            "))
        .replace("{version}", env!("CARGO_PKG_VERSION")))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
