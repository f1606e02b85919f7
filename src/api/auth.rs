//! API key authentication

use std::sync::{Arc, RwLock};

use axum::extract::FromRequestParts;
use http::{StatusCode, request::Parts};

use crate::api::public::ApiError;
use crate::api::routes::api_keys::db::find_user_id_by_key;
use crate::api::state::AppState;
use crate::roles::{Permission, RoleName, can, db::find_user_roles};

type SharedState = Arc<RwLock<AppState>>;

/// The caller behind a request, resolved from the `X-Api-Key` header.
/// Carries role membership so handlers can gate without another
/// query.
pub struct AuthUser {
    pub id: String,
    pub roles: Vec<RoleName>,
}

impl AuthUser {
    /// Reject with a 403 unless one of the caller's roles grants the
    /// permission.
    pub fn require(&self, permission: Permission) -> Result<(), ApiError> {
        if can(&self.roles, permission) {
            Ok(())
        } else {
            Err(ApiError::status(
                StatusCode::FORBIDDEN,
                "Permission denied",
            ))
        }
    }
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get("x-api-key")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| ApiError::status(StatusCode::UNAUTHORIZED, "Missing API key"))?;

        let db = state.read().unwrap().db.clone();

        let user_id = find_user_id_by_key(&db, &key)
            .await?
            .ok_or_else(|| ApiError::status(StatusCode::UNAUTHORIZED, "Invalid API key"))?;
        let roles = find_user_roles(&db, &user_id).await?;

        Ok(AuthUser { id: user_id, roles })
    }
}
