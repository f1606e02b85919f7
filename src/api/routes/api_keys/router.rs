//! Router for the API keys API

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
};

use super::db as api_keys_db;
use super::public;
use crate::api::AuthUser;
use crate::api::public::ApiError;
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

/// List the caller's API keys
async fn list_api_keys(
    State(state): State<SharedState>,
    user: AuthUser,
) -> Result<Json<public::ApiKeysResponse>, ApiError> {
    let db = state.read().unwrap().db.clone();
    let api_keys = api_keys_db::list_api_keys(&db, &user.id).await?;
    Ok(Json(public::ApiKeysResponse { api_keys }))
}

/// Create a named API key and hand back the secret
async fn create_api_key(
    State(state): State<SharedState>,
    user: AuthUser,
    Json(payload): Json<public::CreateApiKeyRequest>,
) -> Result<Json<public::CreateApiKeyResponse>, ApiError> {
    let db = state.read().unwrap().db.clone();

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::status(
            StatusCode::BAD_REQUEST,
            "Key name cannot be empty",
        ));
    }

    let (_, key) = api_keys_db::create_api_key(&db, &user.id, name).await?;
    Ok(Json(public::CreateApiKeyResponse { key }))
}

/// Enable or disable a key
async fn update_api_key(
    State(state): State<SharedState>,
    user: AuthUser,
    Path(key_id): Path<String>,
    Json(payload): Json<public::UpdateApiKeyRequest>,
) -> Result<StatusCode, ApiError> {
    let db = state.read().unwrap().db.clone();

    let updated =
        api_keys_db::set_api_key_enabled(&db, &user.id, &key_id, payload.enabled).await?;
    if !updated {
        return Err(ApiError::status(StatusCode::NOT_FOUND, "API key not found"));
    }

    Ok(StatusCode::OK)
}

/// Delete a key
async fn delete_api_key(
    State(state): State<SharedState>,
    user: AuthUser,
    Path(key_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let db = state.read().unwrap().db.clone();

    let deleted = api_keys_db::delete_api_key(&db, &user.id, &key_id).await?;
    if !deleted {
        return Err(ApiError::status(StatusCode::NOT_FOUND, "API key not found"));
    }

    Ok(StatusCode::OK)
}

/// Create the API keys router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_api_keys).post(create_api_key))
        .route(
            "/{key_id}",
            axum::routing::patch(update_api_key).delete(delete_api_key),
        )
}
