//! Router for the mailboxes API

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use chrono::Utc;
use regex::Regex;

use super::db as mailboxes_db;
use super::public;
use crate::api::AuthUser;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::core::config::EXPIRY_OPTIONS_MS;
use crate::settings;

type SharedState = Arc<RwLock<AppState>>;

/// List the caller's active mailboxes
async fn list_mailboxes(
    State(state): State<SharedState>,
    user: AuthUser,
) -> Result<Json<public::MailboxesResponse>, ApiError> {
    let db = state.read().unwrap().db.clone();
    let mailboxes =
        mailboxes_db::list_mailboxes(&db, &user.id, Utc::now().timestamp_millis()).await?;
    Ok(Json(public::MailboxesResponse { mailboxes }))
}

/// Create a mailbox under one of the configured domains
async fn create_mailbox(
    State(state): State<SharedState>,
    user: AuthUser,
    Json(payload): Json<public::CreateMailboxRequest>,
) -> Result<Json<public::Mailbox>, ApiError> {
    let db = state.read().unwrap().db.clone();

    let name = payload.name.trim().to_lowercase();
    let name_re = Regex::new(r"^[a-z0-9_.-]+$")?;
    if !name_re.is_match(&name) {
        return Err(ApiError::status(
            StatusCode::BAD_REQUEST,
            "Invalid email name",
        ));
    }

    if !EXPIRY_OPTIONS_MS.contains(&payload.expiry_time) {
        return Err(ApiError::status(
            StatusCode::BAD_REQUEST,
            "Invalid expiry time",
        ));
    }

    let domain = payload.domain.trim().to_lowercase();
    let domains = settings::email_domains(&db).await?;
    if domain.is_empty() || (!domains.is_empty() && !domains.contains(&domain)) {
        return Err(ApiError::status(
            StatusCode::BAD_REQUEST,
            "Invalid email domain",
        ));
    }

    let now = Utc::now().timestamp_millis();
    let max = settings::max_active_mailboxes(&db).await?;
    let active = mailboxes_db::count_active_mailboxes(&db, &user.id, now).await?;
    if active >= max {
        return Err(ApiError::status(
            StatusCode::FORBIDDEN,
            format!("You have reached the maximum of {} active mailboxes", max),
        ));
    }

    let address = format!("{}@{}", name, domain);
    if mailboxes_db::find_mailbox_by_address(&db, &address)
        .await?
        .is_some()
    {
        return Err(ApiError::status(
            StatusCode::CONFLICT,
            "This email address is already taken",
        ));
    }

    let expires_at = (payload.expiry_time > 0).then(|| now + payload.expiry_time);
    let mailbox = mailboxes_db::insert_mailbox(&db, &user.id, &address, now, expires_at).await?;

    Ok(Json(mailbox))
}

/// Delete a mailbox along with all of its messages
async fn delete_mailbox(
    State(state): State<SharedState>,
    user: AuthUser,
    Path(mailbox_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let db = state.read().unwrap().db.clone();

    let deleted = mailboxes_db::delete_mailbox(&db, &mailbox_id, &user.id).await?;
    if !deleted {
        return Err(ApiError::status(StatusCode::NOT_FOUND, "Mailbox not found"));
    }

    Ok(StatusCode::OK)
}

/// Create the mailboxes router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_mailboxes).post(create_mailbox))
        .route("/{mailbox_id}", axum::routing::delete(delete_mailbox))
}
