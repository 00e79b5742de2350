use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

pub const UNAUTHORIZED_MESSAGE: &str = "Invalid credentials or unauthorized access";
pub const INTERNAL_MESSAGE: &str = "Something went wrong";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("no token provided")]
    MissingToken,
    #[error("invalid or unknown session token")]
    InvalidToken,
    #[error("session has expired")]
    SessionExpired,
    #[error("user lacks the required role")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials
            | ApiError::MissingToken
            | ApiError::InvalidToken
            | ApiError::SessionExpired
            | ApiError::Forbidden => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::InvalidInput(reason) => format!("Invalid input: {reason}"),
            ApiError::InvalidCredentials
            | ApiError::MissingToken
            | ApiError::InvalidToken
            | ApiError::SessionExpired
            | ApiError::Forbidden => UNAUTHORIZED_MESSAGE.to_string(),
            ApiError::NotFound(what) => format!("{what} not found"),
            ApiError::Conflict(reason) => reason.clone(),
            ApiError::Internal(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            // Slugs carry the only unique constraint a client can trip
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                warn!(%detail, "Unique constraint violated");
                ApiError::Conflict("Slug must be unique".to_string())
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                warn!(%detail, "Foreign key constraint violated");
                ApiError::InvalidInput("unknown category reference".to_string())
            }
            _ => ApiError::Internal(format!("database error: {err}")),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Internal(detail) => error!("💥 {}", detail),
            ApiError::InvalidCredentials
            | ApiError::MissingToken
            | ApiError::InvalidToken
            | ApiError::SessionExpired
            | ApiError::Forbidden => warn!(reason = %self, "Rejected request"),
            _ => warn!("{}", self),
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_share_one_status_and_message() {
        for err in [
            ApiError::InvalidCredentials,
            ApiError::MissingToken,
            ApiError::InvalidToken,
            ApiError::SessionExpired,
            ApiError::Forbidden,
        ] {
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(err.public_message(), UNAUTHORIZED_MESSAGE);
        }
    }

    #[test]
    fn internal_detail_is_not_exposed() {
        let err = ApiError::Internal("disk on fire at /var/lib".to_string());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), INTERNAL_MESSAGE);
    }

    #[test]
    fn plain_db_errors_become_internal() {
        let err: ApiError = DbErr::Custom("boom".to_string()).into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
