//! Router for inbound mail handoff
//!
//! The receiving mail server POSTs every accepted message here. The
//! route is unauthenticated, deployments keep it reachable only from
//! the mail infrastructure.

use std::sync::{Arc, RwLock};

use axum::{Router, extract::State, http::StatusCode, response::Json};
use chrono::{SecondsFormat, Utc};

use super::public;
use crate::api::public::ApiError;
use crate::api::routes::mailboxes::db::find_mailbox_by_address;
use crate::api::routes::messages::db::{NewMessage, insert_message};
use crate::api::routes::messages::public::Direction;
use crate::api::state::AppState;
use crate::webhook::{WebhookPayload, notify_new_message};

type SharedState = Arc<RwLock<AppState>>;

/// File an inbound message into the matching mailbox
async fn receive_email(
    State(state): State<SharedState>,
    Json(payload): Json<public::InboundEmailRequest>,
) -> Result<Json<public::InboundEmailResponse>, ApiError> {
    let db = state.read().unwrap().db.clone();

    let to = payload.to.trim().to_lowercase();
    let mailbox = find_mailbox_by_address(&db, &to)
        .await?
        .ok_or_else(|| ApiError::status(StatusCode::NOT_FOUND, "Unknown address"))?;

    let received = Utc::now();
    let now = received.timestamp_millis();
    if mailbox.expires_at.is_some_and(|expires_at| expires_at <= now) {
        return Err(ApiError::status(StatusCode::GONE, "Mailbox expired"));
    }

    let message_id = insert_message(
        &db,
        NewMessage {
            mailbox_id: mailbox.id.clone(),
            direction: Direction::Received,
            from_address: Some(payload.from.clone()),
            to_address: Some(to.clone()),
            subject: payload.subject.clone(),
            content: payload.content.clone(),
            html: payload.html.clone(),
            timestamp: now,
        },
    )
    .await?;

    // Fire the owner's webhook without holding up the response
    let webhook_payload = WebhookPayload {
        email_id: mailbox.id,
        message_id: message_id.clone(),
        from_address: payload.from,
        subject: payload.subject,
        content: payload.content.unwrap_or_default(),
        html: payload.html.unwrap_or_default(),
        received_at: received.to_rfc3339_opts(SecondsFormat::Millis, true),
        to_address: to,
    };
    let user_id = mailbox.user_id;
    tokio::spawn(async move {
        notify_new_message(&db, &user_id, webhook_payload).await;
    });

    Ok(Json(public::InboundEmailResponse { message_id }))
}

/// Create the inbound router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", axum::routing::post(receive_email))
}
