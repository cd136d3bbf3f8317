// SPDX-License-Identifier: MPL-2.0

pub mod auth;
pub mod chat;
pub mod notifications;
pub mod posts;
pub mod uploads;
pub mod users;

use crate::auth::AuthError;
use crate::clients::ClientError;
use crate::store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

/// Error half of the uniform JSON envelope. Every handler funnels its
/// failures through this type.
#[derive(Debug)]
pub enum ApiError {
    Unauthenticated,
    InvalidCredentials,
    BadRequest(String),
    NotFound(String),
    Upstream { status: StatusCode, message: String },
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "Not authenticated".to_string())
            }
            ApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Upstream { status, message } => (status, message),
            ApiError::Internal(message) => {
                error!("internal error: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };
        let body = Json(json!({ "status": "error", "message": message }));
        (status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::NotAuthenticated | AuthError::InvalidToken(_) | AuthError::Expired => {
                ApiError::Unauthenticated
            }
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::UsernameExhausted(attempts) => ApiError::BadRequest(format!(
                "Unable to generate a unique username after {attempts} attempts"
            )),
            AuthError::Hash(message) => ApiError::Internal(message),
            AuthError::Store(e) => e.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ApiError::NotFound("Not found".to_string()),
            StoreError::UsernameTaken => {
                ApiError::BadRequest("Username is already taken".to_string())
            }
            StoreError::EmailTaken => {
                ApiError::BadRequest("Email is already registered".to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ClientError> for ApiError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Upstream { status, message } => ApiError::Upstream {
                status: StatusCode::from_u16(status)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                message,
            },
            other => ApiError::Internal(other.to_string()),
        }
    }
}
