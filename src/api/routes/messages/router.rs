//! Router for the messages API

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use axum_extra::extract::Query;

use super::db as messages_db;
use super::public;
use crate::api::AuthUser;
use crate::api::public::ApiError;
use crate::api::routes::mailboxes::db::find_owned_mailbox;
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

/// List one page of a mailbox's messages, newest first
async fn list_messages(
    State(state): State<SharedState>,
    user: AuthUser,
    Path(mailbox_id): Path<String>,
    Query(params): Query<public::MessagesQuery>,
) -> Result<Json<public::MessagePage>, ApiError> {
    let db = state.read().unwrap().db.clone();

    find_owned_mailbox(&db, &mailbox_id, &user.id)
        .await?
        .ok_or_else(|| ApiError::status(StatusCode::NOT_FOUND, "Mailbox not found"))?;

    let direction = params.direction.unwrap_or_default();
    let page = messages_db::list_messages(&db, &mailbox_id, direction, params.cursor).await?;

    Ok(Json(page))
}

/// View a single message
async fn view_message(
    State(state): State<SharedState>,
    user: AuthUser,
    Path((mailbox_id, message_id)): Path<(String, String)>,
) -> Result<Json<public::Message>, ApiError> {
    let db = state.read().unwrap().db.clone();

    find_owned_mailbox(&db, &mailbox_id, &user.id)
        .await?
        .ok_or_else(|| ApiError::status(StatusCode::NOT_FOUND, "Mailbox not found"))?;

    let message = messages_db::find_message(&db, &mailbox_id, &message_id)
        .await?
        .ok_or_else(|| ApiError::status(StatusCode::NOT_FOUND, "Message not found"))?;

    Ok(Json(message))
}

/// Delete a single message
async fn delete_message(
    State(state): State<SharedState>,
    user: AuthUser,
    Path((mailbox_id, message_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let db = state.read().unwrap().db.clone();

    find_owned_mailbox(&db, &mailbox_id, &user.id)
        .await?
        .ok_or_else(|| ApiError::status(StatusCode::NOT_FOUND, "Mailbox not found"))?;

    let deleted = messages_db::delete_message(&db, &mailbox_id, &message_id).await?;
    if !deleted {
        return Err(ApiError::status(StatusCode::NOT_FOUND, "Message not found"));
    }

    Ok(StatusCode::OK)
}

/// Create the messages router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_messages))
        .route("/{message_id}", get(view_message).delete(delete_message))
}
