//! Router for the webhook API

use std::sync::{Arc, RwLock};

use axum::{Json, Router, extract::State, http::StatusCode};
use chrono::{SecondsFormat, Utc};

use super::public;
use crate::api::AuthUser;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::roles::Permission;
use crate::webhook::{WebhookPayload, deliver, find_webhook, upsert_webhook};

type SharedState = Arc<RwLock<AppState>>;

/// Current webhook settings for the caller
async fn get_webhook(
    State(state): State<SharedState>,
    user: AuthUser,
) -> Result<Json<public::WebhookConfigResponse>, ApiError> {
    user.require(Permission::ManageWebhook)?;
    let db = state.read().unwrap().db.clone();

    let webhook = find_webhook(&db, &user.id).await?;
    let response = match webhook {
        Some(webhook) => public::WebhookConfigResponse {
            enabled: webhook.enabled,
            url: webhook.url,
        },
        None => public::WebhookConfigResponse {
            enabled: false,
            url: String::new(),
        },
    };

    Ok(Json(response))
}

/// Save the caller's webhook settings
async fn save_webhook(
    State(state): State<SharedState>,
    user: AuthUser,
    Json(payload): Json<public::SaveWebhookRequest>,
) -> Result<StatusCode, ApiError> {
    user.require(Permission::ManageWebhook)?;
    let db = state.read().unwrap().db.clone();

    let url = payload.url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ApiError::status(
            StatusCode::BAD_REQUEST,
            "Invalid webhook URL",
        ));
    }

    upsert_webhook(&db, &user.id, url, payload.enabled).await?;
    Ok(StatusCode::OK)
}

/// Send a sample notification to the given URL right away
async fn test_webhook(
    user: AuthUser,
    Json(payload): Json<public::TestWebhookRequest>,
) -> Result<StatusCode, ApiError> {
    user.require(Permission::ManageWebhook)?;

    let sample = WebhookPayload {
        email_id: "test-email-id".to_string(),
        message_id: "test-message-id".to_string(),
        from_address: "sender@example.com".to_string(),
        subject: "Test webhook".to_string(),
        content: "This is a test message".to_string(),
        html: "<p>This is a test message</p>".to_string(),
        received_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        to_address: "you@example.com".to_string(),
    };

    deliver(&payload.url, &sample)
        .await
        .map_err(|_| ApiError::status(StatusCode::BAD_GATEWAY, "Webhook test failed"))?;

    Ok(StatusCode::OK)
}

/// Create the webhook router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/",
            axum::routing::get(get_webhook).post(save_webhook),
        )
        .route("/test", axum::routing::post(test_webhook))
}
