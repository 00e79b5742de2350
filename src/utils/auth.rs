use std::sync::Arc;

use axum::{
    body::{self, Body, Bytes},
    extract::{FromRequest, Multipart, Request, State},
    http::{header::CONTENT_TYPE, request::Parts, Method},
    middleware::Next,
    response::Response,
    Form, Json, RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tracing::debug;

use crate::{
    dto::request::TokenBody,
    entity::user::{self, Role},
    errors::{ApiError, ApiResult},
    services::auth,
    ServiceState,
};

/// The authenticated caller, placed in request extensions by [`require_admin`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub user::Model);

/// Admits only requests carrying a live admin session token, taken from
/// the `Authorization: Bearer` header or a `token` field in the body.
pub async fn require_admin(
    State(state): State<Arc<ServiceState>>,
    req: Request,
    next: Next,
) -> ApiResult<Response> {
    let (mut parts, body) = req.into_parts();

    let (token, body) = match bearer_token(&mut parts).await {
        Some(token) => (Some(token), body),
        None => {
            let whole_body = body::to_bytes(body, state.config.upload.max_body_bytes)
                .await
                .map_err(|_| {
                    ApiError::InvalidInput("request body is unreadable or too large".to_string())
                })?;
            let token = token_from_body(&parts, whole_body.clone()).await;
            (token, Body::from(whole_body))
        }
    };

    let user = auth::authenticate(&state.db, token.as_deref(), Some(Role::Admin)).await?;
    debug!(user_id = user.id, "Admin authenticated");

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

async fn bearer_token(parts: &mut Parts) -> Option<String> {
    parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .ok()
        .map(|TypedHeader(Authorization(bearer))| bearer.token().to_string())
}

/// Looks for a `token` field in a JSON, urlencoded or multipart body.
async fn token_from_body(parts: &Parts, whole_body: Bytes) -> Option<String> {
    let content_type = parts.headers.get(CONTENT_TYPE)?.to_str().ok()?.to_string();
    if whole_body.is_empty() {
        return None;
    }

    let mut req = Request::builder()
        .method(Method::POST)
        .header(CONTENT_TYPE, &content_type)
        .body(Body::from(whole_body))
        .ok()?;
    // Carries the body limit configured for the router over to the re-parse
    *req.extensions_mut() = parts.extensions.clone();

    if content_type.starts_with("application/json") {
        let Json(body) = Json::<TokenBody>::from_request(req, &()).await.ok()?;
        body.token
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let Form(body) = Form::<TokenBody>::from_request(req, &()).await.ok()?;
        body.token
    } else if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(req, &()).await.ok()?;
        while let Ok(Some(field)) = multipart.next_field().await {
            if field.name() == Some("token") {
                return field.text().await.ok();
            }
        }
        None
    } else {
        None
    }
}
