//! Public types for the webhook API
use serde::{Deserialize, Serialize};

/// The caller's webhook settings. `url` is empty when none has been
/// saved yet.
#[derive(Serialize, Deserialize)]
pub struct WebhookConfigResponse {
    pub enabled: bool,
    pub url: String,
}

#[derive(Serialize, Deserialize)]
pub struct SaveWebhookRequest {
    pub url: String,
    pub enabled: bool,
}

#[derive(Serialize, Deserialize)]
pub struct TestWebhookRequest {
    pub url: String,
}
