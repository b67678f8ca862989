use std::collections::HashMap;
use std::convert::Infallible;

use anyhow::Result;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::body::Body;
use hyper::{Request, Response, StatusCode, header};
use tracing::{info, warn};

use crate::AppState;
use crate::handlers::http::utils;

/// Credentials submitted to `/token`.
struct TokenForm {
    username: String,
    password: String,
}

impl std::fmt::Debug for TokenForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenForm")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Issue a session token for `username`/`password`.
///
/// Parameters come from the query string and from a form-encoded body, with
/// the body taking precedence. A missing parameter counts as empty.
pub async fn handle_token<B>(
    req: Request<B>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    info!("Processing token request");

    let form = match parse_token_form(req).await {
        Ok(form) => form,
        Err(e) => {
            warn!("Token request parsing failed: {}", e);
            return utils::deliver_error_json(
                "BAD_REQUEST",
                "could not read request body",
                StatusCode::BAD_REQUEST,
            );
        }
    };

    let ttl = state.config.auth.token_ttl();
    match state.issuer.issue(&form.username, &form.password, ttl) {
        Ok(token) => {
            info!("Issued token for {} (ttl {:?})", form.username, ttl);
            utils::deliver_text(token)
        }
        Err(err) => {
            warn!("Token request for {:?} failed: {}", form, err);
            Ok(utils::auth_error_json(&err))
        }
    }
}

async fn parse_token_form<B>(req: Request<B>) -> Result<TokenForm>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut params: HashMap<String, String> = utils::query_params(req.uri());

    let is_form = utils::header_starts_with(
        req.headers(),
        header::CONTENT_TYPE.as_str(),
        "application/x-www-form-urlencoded",
    );

    if is_form {
        let body = utils::read_body(req.into_body()).await?;
        params.extend(form_urlencoded::parse(body.as_ref()).into_owned());
    }

    Ok(TokenForm {
        username: params.remove("username").unwrap_or_default(),
        password: params.remove("password").unwrap_or_default(),
    })
}
