use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::admin::errors::AdminError;

pub mod health;
pub mod login;
pub mod logout;
pub mod me;
pub mod secret;

pub use health::health;
pub use health::root;
pub use login::login;
pub use logout::logout;
pub use me::me;
pub use secret::secret;

/// Body of the login and logout responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessBody {
    pub success: bool,
}

impl SuccessBody {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, msg),
            ApiError::InternalServerError(detail) => {
                tracing::error!(error = %detail, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::MissingCredentials => ApiError::BadRequest(err.to_string()),
            AdminError::InvalidCredentials
            | AdminError::Unauthenticated
            | AdminError::InvalidSession => ApiError::Unauthorized(err.to_string()),
            AdminError::CredentialStore(_) | AdminError::Password(_) | AdminError::Token(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}
