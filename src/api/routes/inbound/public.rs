//! Public types for the inbound mail API
use serde::{Deserialize, Serialize};

/// A message handed over by the mail infrastructure
#[derive(Serialize, Deserialize)]
pub struct InboundEmailRequest {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub content: Option<String>,
    pub html: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundEmailResponse {
    pub message_id: String,
}
