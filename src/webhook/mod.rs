//! Webhook notifications for newly received mail

pub mod db;
pub mod models;
pub use db::*;
pub use models::*;

use std::time::Duration;

use anyhow::{Error, Result};
use tokio_rusqlite::Connection;

pub const EVENT_HEADER: &str = "X-Webhook-Event";
pub const NEW_MESSAGE_EVENT: &str = "new_message";

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

/// POST the payload to a webhook URL, tagging the event type.
pub async fn deliver(url: &str, payload: &WebhookPayload) -> Result<(), Error> {
    let client = reqwest::Client::new();
    let res = client
        .post(url)
        .header(EVENT_HEADER, NEW_MESSAGE_EVENT)
        .timeout(DELIVERY_TIMEOUT)
        .json(payload)
        .send()
        .await?;
    let status = res.status();
    if !status.is_success() {
        anyhow::bail!("Webhook delivery failed: {}", status);
    }
    Ok(())
}

/// Notify the mailbox owner's webhook about a received message, if
/// they have one enabled. Failures are logged and swallowed so they
/// never block mail acceptance.
pub async fn notify_new_message(db: &Connection, user_id: &str, payload: WebhookPayload) {
    match find_webhook(db, user_id).await {
        Ok(Some(webhook)) if webhook.enabled => {
            if let Err(err) = deliver(&webhook.url, &payload).await {
                tracing::warn!("Webhook delivery to {} failed: {:?}", webhook.url, err);
            }
        }
        Ok(_) => {}
        Err(err) => tracing::warn!("Webhook lookup failed: {:?}", err),
    }
}
