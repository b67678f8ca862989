use std::convert::Infallible;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use anyhow::Result;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::body::Body;
use hyper::{Method, Request, Response, StatusCode};
use tower::{Layer, Service, ServiceExt};
use tracing::{debug, error, info};

use crate::AppState;
use crate::handlers::http::auth::handle_token;
use crate::handlers::http::posts::{PostsService, ResourcePath};
use crate::handlers::http::utils::{self, CacheStrategy};
use crate::tower_middle::{AuthGateLayer, AuthGateService};

/// Token issuance endpoint.
pub const TOKEN_PATH: &str = "/token";

/// Posts collection. `/api/v1/posts` and `/api/v1/posts/{id}` are both
/// served, behind the auth gate.
pub const POSTS_PATH: &str = "/api/v1/posts";

type HttpResponse = Response<BoxBody<Bytes, Infallible>>;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------
//
//   /token            open, issues session tokens.
//   /api/v1/posts[/]  gated. GET is public, other verbs need a token whose
//                     roles grant the verb.
//   anything else     GET serves the static web root, otherwise 404.

#[derive(Clone)]
pub struct Router {
    state: AppState,
    posts: AuthGateService<PostsService>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("web_dir", &self.state.config.paths.web_dir)
            .finish()
    }
}

impl Router {
    pub fn new(state: AppState) -> Self {
        let posts = AuthGateLayer::new(state.gate())
            .layer(PostsService::new(state.posts.clone()));

        Self { state, posts }
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    pub async fn route<B>(&self, mut req: Request<B>) -> Result<HttpResponse>
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        debug!("{} {}", method, path);

        if path == TOKEN_PATH {
            return match method {
                Method::GET | Method::POST => handle_token(req, self.state.clone()).await,
                _ => method_not_allowed(),
            };
        }

        if let Some(rest) = Self::posts_remainder(&path) {
            req.extensions_mut().insert(ResourcePath(rest.to_string()));
            return match self.posts.clone().oneshot(req).await {
                Ok(response) => Ok(response),
                Err(never) => match never {},
            };
        }

        if method == Method::GET {
            return self.serve_static(&path).await;
        }

        utils::deliver_error_json("NOT_FOUND", "Endpoint not found", StatusCode::NOT_FOUND)
    }

    // ── Path matching ─────────────────────────────────────────────────────────

    /// The part of `path` after the posts prefix, or `None` if `path` is not
    /// a posts path.
    pub fn posts_remainder(path: &str) -> Option<&str> {
        if path == POSTS_PATH {
            return Some("");
        }
        path.strip_prefix(POSTS_PATH)?.strip_prefix('/')
    }

    // ── Static file fallback ──────────────────────────────────────────────────

    async fn serve_static(&self, path: &str) -> Result<HttpResponse> {
        let web_dir = Path::new(&self.state.config.paths.web_dir);

        let Some(file_path) = utils::resolve_static_path(web_dir, path) else {
            return utils::deliver_error_json("NOT_FOUND", "File not found", StatusCode::NOT_FOUND);
        };

        let is_file = tokio::fs::metadata(&file_path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            info!("Static file not found: {}", file_path.display());
            return utils::deliver_error_json("NOT_FOUND", "File not found", StatusCode::NOT_FOUND);
        }

        let cache = CacheStrategy::for_path(&file_path);
        utils::deliver_page_with_status(&file_path, StatusCode::OK, cache).await
    }
}

fn method_not_allowed() -> Result<HttpResponse> {
    utils::deliver_error_json(
        "METHOD_NOT_ALLOWED",
        "method not allowed",
        StatusCode::METHOD_NOT_ALLOWED,
    )
}

impl<B> Service<Request<B>> for Router
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Response = HttpResponse;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let router = self.clone();
        Box::pin(async move {
            Ok(router.route(req).await.unwrap_or_else(|e| {
                error!("Request failed: {:#}", e);
                utils::error_json(
                    "INTERNAL_ERROR",
                    "internal server error",
                    StatusCode::INTERNAL_SERVER_ERROR,
                )
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posts_paths_match_with_and_without_id() {
        assert_eq!(Router::posts_remainder("/api/v1/posts"), Some(""));
        assert_eq!(Router::posts_remainder("/api/v1/posts/"), Some(""));
        assert_eq!(Router::posts_remainder("/api/v1/posts/7"), Some("7"));
        assert_eq!(Router::posts_remainder("/api/v1/postsX"), None);
        assert_eq!(Router::posts_remainder("/api/v1"), None);
    }
}
