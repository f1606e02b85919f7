//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;

// Errors

pub enum ApiError {
    /// Deliberate rejection carrying a specific status code
    Status(StatusCode, String),
    /// Anything unexpected, answered with a 500
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn status(code: StatusCode, message: impl Into<String>) -> Self {
        Self::Status(code, message.into())
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Status(code, message) => {
                (code, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Internal(err) => {
                // Always log the error
                tracing::error!("{}", err);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": format!("Something went wrong: {}", err) })),
                )
                    .into_response()
            }
        }
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}

// Re-export public types from each route

pub mod api_keys {
    pub use crate::api::routes::api_keys::public::*;
}

pub mod config {
    pub use crate::api::routes::config::public::*;
}

pub mod inbound {
    pub use crate::api::routes::inbound::public::*;
}

pub mod mailboxes {
    pub use crate::api::routes::mailboxes::public::*;
}

pub mod messages {
    pub use crate::api::routes::messages::public::*;
}

pub mod roles {
    pub use crate::api::routes::roles::public::*;
}

pub mod send {
    pub use crate::api::routes::send::public::*;
}

pub mod users {
    pub use crate::api::routes::users::public::*;
}

pub mod webhook {
    pub use crate::api::routes::webhook::public::*;
}
