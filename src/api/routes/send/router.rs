//! Router for sending mail from a mailbox

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;

use super::public;
use crate::api::AuthUser;
use crate::api::public::ApiError;
use crate::api::routes::mailboxes::db::find_owned_mailbox;
use crate::api::routes::messages::db::{NewMessage, insert_message};
use crate::api::routes::messages::public::Direction;
use crate::api::state::AppState;
use crate::sending::permissions::PERMISSION_CHECK_FAILED_ERROR;
use crate::sending::provider::EmailProvider;
use crate::sending::{DbPolicyStore, SendPermission, check_basic_permission, check_send_permission};
use crate::settings;

type SharedState = Arc<RwLock<AppState>>;

/// Map a denial to the right status code: quota exhaustion is a 429,
/// a failed check a 500, anything else a 403.
fn permission_error(permission: SendPermission) -> ApiError {
    let message = permission
        .error
        .unwrap_or_else(|| "Sending not allowed".to_string());
    let code = if message == PERMISSION_CHECK_FAILED_ERROR {
        StatusCode::INTERNAL_SERVER_ERROR
    } else if permission.remaining_emails == Some(0) {
        StatusCode::TOO_MANY_REQUESTS
    } else {
        StatusCode::FORBIDDEN
    };
    ApiError::status(code, message)
}

/// Send a message from the mailbox, then record it on the sent side
async fn send_message(
    State(state): State<SharedState>,
    user: AuthUser,
    Path(mailbox_id): Path<String>,
    Json(payload): Json<public::SendEmailRequest>,
) -> Result<Json<public::SendEmailResponse>, ApiError> {
    let (db, resend_api_url) = {
        let shared_state = state.read().unwrap();
        (
            shared_state.db.clone(),
            shared_state.config.resend_api_url.clone(),
        )
    };

    let mailbox = find_owned_mailbox(&db, &mailbox_id, &user.id)
        .await?
        .ok_or_else(|| ApiError::status(StatusCode::NOT_FOUND, "Mailbox not found"))?;

    let to = payload.to.trim().to_string();
    let subject = payload.subject.trim().to_string();
    let content = payload.content.trim().to_string();
    if to.is_empty() || subject.is_empty() || content.is_empty() {
        return Err(ApiError::status(
            StatusCode::BAD_REQUEST,
            "Recipient, subject, and content are all required",
        ));
    }

    let permission =
        check_send_permission(&DbPolicyStore::new(db.clone()), &user.id, false).await;
    if !permission.can_send {
        return Err(permission_error(permission));
    }

    let api_key = settings::get_setting(&db, settings::RESEND_API_KEY)
        .await?
        .ok_or_else(|| {
            ApiError::status(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Email service is not configured",
            )
        })?;

    let provider = EmailProvider::new(&resend_api_url, &api_key);
    provider
        .send(&mailbox.address, &to, &subject, &content, None)
        .await?;

    let message_id = insert_message(
        &db,
        NewMessage {
            mailbox_id: mailbox.id,
            direction: Direction::Sent,
            from_address: Some(mailbox.address),
            to_address: Some(to),
            subject,
            content: Some(content),
            html: None,
            timestamp: Utc::now().timestamp_millis(),
        },
    )
    .await?;

    Ok(Json(public::SendEmailResponse { message_id }))
}

/// Check whether the caller may send at all, without touching the
/// daily count
async fn send_permission(
    State(state): State<SharedState>,
    user: AuthUser,
) -> Result<Json<SendPermission>, ApiError> {
    let db = state.read().unwrap().db.clone();
    let permission = check_basic_permission(&DbPolicyStore::new(db), &user.id).await;
    Ok(Json(permission))
}

/// Create the send router, nested under a mailbox path
pub fn router() -> Router<SharedState> {
    Router::new().route("/send", axum::routing::post(send_message))
}

/// Create the standalone permission-check router
pub fn permission_router() -> Router<SharedState> {
    Router::new().route("/permission", axum::routing::get(send_permission))
}
