use std::fmt;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use bytes::Bytes;
use http_body_util::{BodyExt, Full, combinators::BoxBody};
use hyper::{Response, StatusCode, header};
use std::convert::Infallible;
use tracing::{debug, error, warn};

use crate::handlers::http::utils::headers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStrategy {
    Short,    // 1 hour
    Explicit, // No cache at all
}

impl CacheStrategy {
    /// Pages are always revalidated; assets may be cached for a while.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("html") | Some("htm") => CacheStrategy::Explicit,
            _ => CacheStrategy::Short,
        }
    }
}

impl fmt::Display for CacheStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheStrategy::Short => write!(f, "Short (1 hour)"),
            CacheStrategy::Explicit => write!(f, "Explicit (no-cache)"),
        }
    }
}

/// Map a request path onto a file below `web_dir`.
///
/// `/` maps to `index.html`. Returns `None` for paths that would leave the
/// web root (`..`, absolute components, drive prefixes).
pub fn resolve_static_path(web_dir: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    let relative = if relative.is_empty() || relative.ends_with('/') {
        format!("{}index.html", relative)
    } else {
        relative.to_string()
    };

    let mut resolved = web_dir.to_path_buf();
    for component in Path::new(&relative).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => {
                warn!("Refusing static path outside web root: {}", request_path);
                return None;
            }
        }
    }

    Some(resolved)
}

/// Deliver a static page from a file path with caching headers
pub async fn deliver_page_with_status<P: AsRef<Path>>(
    file_path: P,
    status: StatusCode,
    cache: CacheStrategy,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    let file_path = file_path.as_ref();

    debug!(
        "Reading static file from: {} (cache: {})",
        file_path.display(),
        cache
    );

    let content: Vec<u8> = tokio::fs::read(file_path)
        .await
        .with_context(|| format!("Failed to read static file: {}", file_path.display()))?;

    let content_bytes: Bytes = Bytes::from(content);
    let mime_type: &str = get_mime_type(file_path);

    debug!(
        "Delivering static page with status: {}, size: {} bytes, mime: {}, cache: {}",
        status,
        content_bytes.len(),
        mime_type,
        cache
    );

    let response: Response<BoxBody<Bytes, Infallible>> = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, mime_type)
        .body(full(content_bytes))
        .map_err(|e| anyhow!("Failed to build response: {}", e))?;

    let response_with_cache = match cache {
        CacheStrategy::Short => headers::add_cache_headers_with_max_age(response, 3600),
        CacheStrategy::Explicit => headers::add_no_cache_headers(response),
    };
    Ok(response_with_cache)
}

/// Helper function to determine MIME type from file extension
fn get_mime_type(path: &Path) -> &'static str {
    match path.extension().and_then(|s| s.to_str()) {
        // Web documents
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json",

        // Images
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",

        Some("txt") => "text/plain; charset=utf-8",

        _ => "application/octet-stream",
    }
}

/// Delivers a plain text response
pub fn deliver_text<T: Into<Bytes>>(text: T) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    let bytes_string: Bytes = text.into();

    debug!(
        "Delivering text response, size: {} bytes",
        bytes_string.len()
    );

    let response: Response<BoxBody<Bytes, Infallible>> = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(full(bytes_string))
        .map_err(|e: http::Error| {
            error!("Failed to build text response: {}", e);
            anyhow!("Failed to build text response: {}", e)
        })?;

    Ok(headers::add_no_cache_headers(response))
}

/// Helper function to create a full body from various types
pub fn full<T: Into<Bytes>>(chunk: T) -> BoxBody<Bytes, Infallible> {
    let bytes: Bytes = chunk.into();
    let full_body: Full<Bytes> = Full::new(bytes);
    full_body.boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_maps_to_index() {
        let root = Path::new("/srv/web");
        assert_eq!(
            resolve_static_path(root, "/"),
            Some(PathBuf::from("/srv/web/index.html"))
        );
        assert_eq!(
            resolve_static_path(root, "/docs/"),
            Some(PathBuf::from("/srv/web/docs/index.html"))
        );
    }

    #[test]
    fn nested_files_resolve_below_root() {
        let root = Path::new("/srv/web");
        assert_eq!(
            resolve_static_path(root, "/css/site.css"),
            Some(PathBuf::from("/srv/web/css/site.css"))
        );
    }

    #[test]
    fn traversal_is_refused() {
        let root = Path::new("/srv/web");
        assert_eq!(resolve_static_path(root, "/../etc/passwd"), None);
        assert_eq!(resolve_static_path(root, "/a/../../b"), None);
    }

    #[test]
    fn mime_types_follow_extension() {
        assert_eq!(get_mime_type(Path::new("a.html")), "text/html; charset=utf-8");
        assert_eq!(get_mime_type(Path::new("a.bin")), "application/octet-stream");
    }

    #[test]
    fn pages_are_never_cached() {
        assert_eq!(CacheStrategy::for_path(Path::new("index.html")), CacheStrategy::Explicit);
        assert_eq!(CacheStrategy::for_path(Path::new("site.css")), CacheStrategy::Short);
    }
}
