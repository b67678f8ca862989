use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use anyhow::Result;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::body::Body;
use hyper::{Method, Request, Response, StatusCode};
use serde_json::json;
use tower::Service;
use tracing::{error, warn};

use shared::types::{Post, PostInput};

use crate::handlers::http::utils;
use crate::store::PostStore;

type HttpResponse = Response<BoxBody<Bytes, Infallible>>;

/// Remainder of the request path after the posts prefix: `""` for the
/// collection, otherwise the post id as text. Set by the router.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourcePath(pub String);

/// The posts API as a tower service, so it can sit behind the auth gate.
#[derive(Debug, Clone)]
pub struct PostsService {
    store: Arc<PostStore>,
}

impl PostsService {
    pub fn new(store: Arc<PostStore>) -> Self {
        Self { store }
    }
}

impl<B> Service<Request<B>> for PostsService
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
        let store = Arc::clone(&self.store);
        Box::pin(async move {
            Ok(handle_posts(req, store).await.unwrap_or_else(|e| {
                error!("Posts handler failed: {:#}", e);
                utils::error_json(
                    "INTERNAL_ERROR",
                    "internal server error",
                    StatusCode::INTERNAL_SERVER_ERROR,
                )
            }))
        })
    }
}

/// Dispatch on the HTTP verb.
pub async fn handle_posts<B>(req: Request<B>, store: Arc<PostStore>) -> Result<HttpResponse>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let path = req
        .extensions()
        .get::<ResourcePath>()
        .cloned()
        .unwrap_or_default();

    match *req.method() {
        Method::GET if path.0.is_empty() => list_posts(&store).await,
        Method::GET => get_post(&path, &store).await,
        Method::POST => new_post(req, &store).await,
        Method::PUT => put_post(&path, req, &store).await,
        Method::DELETE => delete_post(&path, &store).await,
        _ => utils::deliver_error_json(
            "METHOD_NOT_ALLOWED",
            "method not allowed",
            StatusCode::METHOD_NOT_ALLOWED,
        ),
    }
}

async fn list_posts(store: &PostStore) -> Result<HttpResponse> {
    utils::deliver_serialized_json(&store.list().await, StatusCode::OK)
}

async fn get_post(path: &ResourcePath, store: &PostStore) -> Result<HttpResponse> {
    match find_post(path, store).await {
        Ok(post) => utils::deliver_serialized_json(&post, StatusCode::OK),
        Err(response) => Ok(response),
    }
}

async fn new_post<B>(req: Request<B>, store: &PostStore) -> Result<HttpResponse>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let input = match post_from_json(req).await {
        Ok(input) => input,
        Err(response) => return Ok(response),
    };

    let post = store.create(input).await;
    utils::deliver_serialized_json(&post, StatusCode::OK)
}

async fn put_post<B>(path: &ResourcePath, req: Request<B>, store: &PostStore) -> Result<HttpResponse>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let existing = match find_post(path, store).await {
        Ok(post) => post,
        Err(response) => return Ok(response),
    };

    let input = match post_from_json(req).await {
        Ok(input) => input,
        Err(response) => return Ok(response),
    };

    match store.update(existing.id, input).await {
        Some(post) => utils::deliver_serialized_json(&post, StatusCode::OK),
        None => not_found(existing.id),
    }
}

async fn delete_post(path: &ResourcePath, store: &PostStore) -> Result<HttpResponse> {
    let existing = match find_post(path, store).await {
        Ok(post) => post,
        Err(response) => return Ok(response),
    };

    match store.delete(existing.id).await {
        Some(_) => utils::deliver_serialized_json(&json!({}), StatusCode::OK),
        None => not_found(existing.id),
    }
}

/// Parse the id in `path` and load the post. On failure the error response
/// is returned for the caller to send as-is.
async fn find_post(path: &ResourcePath, store: &PostStore) -> std::result::Result<Post, HttpResponse> {
    let id: i64 = path.0.parse().map_err(|_| {
        warn!("Invalid post id: {:?}", path.0);
        utils::error_json(
            "INVALID_ID",
            &format!("invalid post id: {}", path.0),
            StatusCode::BAD_REQUEST,
        )
    })?;

    match store.get(id).await {
        Some(post) => Ok(post),
        None => Err(not_found_response(id)),
    }
}

async fn post_from_json<B>(req: Request<B>) -> std::result::Result<PostInput, HttpResponse>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let invalid = || utils::error_json("INVALID_JSON", "invalid JSON body", StatusCode::BAD_REQUEST);

    let body = utils::read_body(req.into_body()).await.map_err(|e| {
        warn!("{}", e);
        invalid()
    })?;

    serde_json::from_slice(&body).map_err(|e| {
        warn!("Invalid post JSON: {}", e);
        invalid()
    })
}

fn not_found_response(id: i64) -> HttpResponse {
    utils::error_json(
        "NOT_FOUND",
        &format!("post not found: {}", id),
        StatusCode::NOT_FOUND,
    )
}

fn not_found(id: i64) -> Result<HttpResponse> {
    Ok(not_found_response(id))
}
