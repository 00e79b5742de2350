use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Extension, Json,
};
use tracing::info;

use crate::{
    dto::{
        request::LoginRequest,
        response::{LoginResponse, ProtectedResponse},
    },
    errors::{ApiError, ApiResult},
    services::auth::{self, ClientMeta},
    utils::auth::CurrentUser,
    ServiceState,
};

pub async fn login(
    State(state): State<Arc<ServiceState>>,
    client: ClientMeta,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(req) =
        payload.map_err(|e| ApiError::InvalidInput(format!("login body is not valid JSON: {e}")))?;
    let username = req
        .username
        .as_deref()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::InvalidInput("username is required".to_string()))?;
    let password = req
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::InvalidInput("password is required".to_string()))?;

    info!(username, ip = %client.ip_address, "Received 'login' request");

    let outcome = auth::login(&state.db, &state.config.auth, username, password, client).await?;

    info!(username, "Login successful");
    Ok(Json(LoginResponse {
        token: outcome.token,
        expires_at: outcome.expires_at,
        message: "Login successful".to_string(),
    }))
}

pub async fn protected(Extension(CurrentUser(user)): Extension<CurrentUser>) -> impl IntoResponse {
    Json(ProtectedResponse {
        message: "Access granted to protected route!".to_string(),
        user: user.into(),
    })
}
