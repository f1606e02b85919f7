use serde::{Deserialize, Serialize};

/// A user's webhook target. One per user.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Webhook {
    pub url: String,
    pub enabled: bool,
}

/// Body POSTed to a webhook when a mailbox receives a message.
/// `received_at` is ISO 8601.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub email_id: String,
    pub message_id: String,
    pub from_address: String,
    pub subject: String,
    pub content: String,
    pub html: String,
    pub received_at: String,
    pub to_address: String,
}
