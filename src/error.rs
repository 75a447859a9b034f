//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Reason string for a missing individual record.
pub const USER_NOT_FOUND: &str = "User not found.";
/// Reason string for a list against an entirely empty store.
pub const USERS_NOT_FOUND: &str = "Users not found.";
/// Reason string for an update that lost a concurrent-write race.
pub const USER_CONFLICT: &str = "User was modified concurrently.";

/// SQLSTATE for a missing relation, reported when the persons table
/// does not exist.
const UNDEFINED_TABLE: &str = "42P01";

/// Outcome of a gateway operation, one variant per case callers must
/// handle instead of relying on propagated exceptions.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("person not found")]
    NotFound,
    #[error("person modified or removed concurrently")]
    Conflict,
    #[error("person store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),
    #[error("database: {0}")]
    Db(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err)
            }
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNDEFINED_TABLE) => {
                StoreError::Unavailable(err)
            }
            _ => StoreError::Db(err),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),
    #[error("database: {0}")]
    Db(#[source] sqlx::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound(USER_NOT_FOUND.into()),
            StoreError::Conflict => ApiError::Conflict(USER_CONFLICT.into()),
            StoreError::Unavailable(e) => ApiError::Unavailable(e),
            StoreError::Db(e) => ApiError::Db(e),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg).into_response(),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Unavailable(err) => {
                tracing::error!(error = %err, "person store unavailable");
                let body = ErrorBody {
                    error: ErrorDetail {
                        code: "store_unavailable".to_string(),
                        message: "the person store is currently unavailable".to_string(),
                        details: None,
                    },
                };
                (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
            }
            ApiError::Db(err) => {
                // Log the source, return a generic line.
                tracing::error!(error = %err, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
            }
        }
    }
}
