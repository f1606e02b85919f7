//! Router for the users API

use std::sync::{Arc, RwLock};

use axum::{Router, extract::State, http::StatusCode, response::Json, routing::get};
use chrono::Utc;
use regex::Regex;

use super::db as users_db;
use super::public;
use crate::api::AuthUser;
use crate::api::public::ApiError;
use crate::api::routes::api_keys::db::create_api_key;
use crate::api::state::AppState;
use crate::roles::{RoleName, db::assign_role};
use crate::settings;

type SharedState = Arc<RwLock<AppState>>;

/// Register an account and hand back its first API key. The very
/// first account on a fresh database becomes the emperor; everyone
/// after that gets the configured default role.
async fn register(
    State(state): State<SharedState>,
    Json(payload): Json<public::RegisterRequest>,
) -> Result<Json<public::RegisterResponse>, ApiError> {
    let db = state.read().unwrap().db.clone();

    let email = payload.email.trim().to_lowercase();
    let email_re = Regex::new(r"^[^@\s]+@[^@\s]+$")?;
    if !email_re.is_match(&email) {
        return Err(ApiError::status(
            StatusCode::BAD_REQUEST,
            "Invalid email address",
        ));
    }

    if users_db::find_user_by_email(&db, &email).await?.is_some() {
        return Err(ApiError::status(
            StatusCode::CONFLICT,
            "Email already registered",
        ));
    }

    let role = if users_db::count_users(&db).await? == 0 {
        RoleName::Emperor
    } else {
        settings::get_setting(&db, settings::DEFAULT_ROLE)
            .await?
            .and_then(|value| value.parse().ok())
            .unwrap_or(RoleName::Civilian)
    };

    let user = users_db::insert_user(
        &db,
        &email,
        payload.name,
        Utc::now().timestamp_millis(),
    )
    .await?;
    assign_role(&db, &user.id, role).await?;
    let (_, api_key) = create_api_key(&db, &user.id, "default").await?;

    Ok(Json(public::RegisterResponse { user, api_key }))
}

/// The caller's own profile and roles
async fn me(
    State(state): State<SharedState>,
    user: AuthUser,
) -> Result<Json<public::MeResponse>, ApiError> {
    let db = state.read().unwrap().db.clone();

    let profile = users_db::find_user_by_id(&db, &user.id)
        .await?
        .ok_or_else(|| ApiError::status(StatusCode::NOT_FOUND, "User not found"))?;

    Ok(Json(public::MeResponse {
        user: profile,
        roles: user.roles,
    }))
}

/// Create the users router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", axum::routing::post(register))
        .route("/me", get(me))
}
