use std::collections::HashMap;

use anyhow::{Result, anyhow};
use bytes::Bytes;
use http_body_util::{BodyExt, Limited};
use hyper::Uri;
use hyper::body::Body;
use tracing::debug;

/// Largest request body any handler will buffer (1 MiB).
pub const MAX_BODY_BYTES: usize = 1 << 20;

/// Buffer a request body, failing once it exceeds [`MAX_BODY_BYTES`].
pub async fn read_body<B>(body: B) -> Result<Bytes>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let bytes = Limited::new(body, MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|e| anyhow!("Failed to read request body: {}", e))?
        .to_bytes();

    debug!("Read request body, size: {} bytes", bytes.len());
    Ok(bytes)
}

/// Decode the query string of `uri` into a map. Later duplicates win.
pub fn query_params(uri: &Uri) -> HashMap<String, String> {
    uri.query()
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;

    #[test]
    fn query_params_are_percent_decoded() {
        let uri: Uri = "/token?username=u0&password=a%20b".parse().unwrap();
        let params = query_params(&uri);
        assert_eq!(params["username"], "u0");
        assert_eq!(params["password"], "a b");
    }

    #[test]
    fn missing_query_is_empty() {
        let uri: Uri = "/token".parse().unwrap();
        assert!(query_params(&uri).is_empty());
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected() {
        let body = Full::new(Bytes::from(vec![b'x'; MAX_BODY_BYTES + 1]));
        assert!(read_body(body).await.is_err());
    }
}
