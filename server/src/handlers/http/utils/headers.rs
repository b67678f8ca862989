use hyper::header::{HeaderMap, HeaderValue};
use tracing::debug;

/// Extract a header value as a string
pub fn get_header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(|s| {
        debug!("Retrieved header: {}", name);
        s.to_string()
    })
}

/// Check if a header exists and starts with a value (e.g. a media type
/// followed by parameters)
pub fn header_starts_with(headers: &HeaderMap, name: &str, value: &str) -> bool {
    get_header_value(headers, name)
        .map(|v| v.to_ascii_lowercase().starts_with(&value.to_ascii_lowercase()))
        .unwrap_or(false)
}

/// Add no-cache headers for non-static files
pub fn add_no_cache_headers<T>(mut res: hyper::Response<T>) -> hyper::Response<T> {
    let headers = res.headers_mut();

    headers.insert(
        "cache-control",
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert("pragma", HeaderValue::from_static("no-cache"));
    headers.insert("expires", HeaderValue::from_static("0"));
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );

    debug!("Added no-cache headers");
    res
}

/// Add custom cache headers with specified max-age
pub fn add_cache_headers_with_max_age<T>(
    mut res: hyper::Response<T>,
    max_age_seconds: u64,
) -> hyper::Response<T> {
    let headers = res.headers_mut();
    let cache_control = format!("public, max-age={}", max_age_seconds);
    headers.insert(
        "cache-control",
        HeaderValue::from_str(&cache_control)
            .unwrap_or_else(|_| HeaderValue::from_static("public, max-age=3600")),
    );
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );

    debug!("Added cache headers with max-age: {} seconds", max_age_seconds);
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_type_prefix_match_ignores_case_and_parameters() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            HeaderValue::from_static("Application/X-WWW-Form-Urlencoded; charset=UTF-8"),
        );
        assert!(header_starts_with(
            &headers,
            "content-type",
            "application/x-www-form-urlencoded"
        ));
        assert!(!header_starts_with(&headers, "content-type", "application/json"));
        assert!(!header_starts_with(&headers, "accept", "text/html"));
    }
}
