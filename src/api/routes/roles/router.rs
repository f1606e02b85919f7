//! Router for the roles API

use std::sync::{Arc, RwLock};

use axum::{Json, Router, extract::State, http::StatusCode};

use super::public;
use crate::api::AuthUser;
use crate::api::public::ApiError;
use crate::api::routes::users::db::{find_user_by_id, find_user_by_search};
use crate::api::state::AppState;
use crate::roles::{Permission, RoleName, strongest};
use crate::roles::db::{find_user_roles, promote_user};

type SharedState = Arc<RwLock<AppState>>;

/// Find a user by email or name for the promote panel
async fn find_user(
    State(state): State<SharedState>,
    user: AuthUser,
    Json(payload): Json<public::FindUserRequest>,
) -> Result<Json<public::FindUserResponse>, ApiError> {
    user.require(Permission::PromoteUser)?;
    let db = state.read().unwrap().db.clone();

    let search = payload.search_text.trim();
    let found = find_user_by_search(&db, search)
        .await?
        .ok_or_else(|| ApiError::status(StatusCode::NOT_FOUND, "User not found"))?;
    let roles = find_user_roles(&db, &found.id).await?;

    Ok(Json(public::FindUserResponse {
        user: public::FoundUser {
            id: found.id,
            name: found.name,
            email: found.email,
            role: strongest(&roles),
        },
    }))
}

/// Replace a user's roles with the given one
async fn promote(
    State(state): State<SharedState>,
    user: AuthUser,
    Json(payload): Json<public::PromoteRequest>,
) -> Result<StatusCode, ApiError> {
    user.require(Permission::PromoteUser)?;
    let db = state.read().unwrap().db.clone();

    if payload.role_name == RoleName::Emperor {
        return Err(ApiError::status(
            StatusCode::BAD_REQUEST,
            "Cannot promote to emperor",
        ));
    }

    find_user_by_id(&db, &payload.user_id)
        .await?
        .ok_or_else(|| ApiError::status(StatusCode::NOT_FOUND, "User not found"))?;

    promote_user(&db, &payload.user_id, payload.role_name).await?;

    Ok(StatusCode::OK)
}

/// Create the roles router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/users", axum::routing::post(find_user))
        .route("/promote", axum::routing::post(promote))
}
