//! Public types for the send API
use serde::{Deserialize, Serialize};

pub use crate::sending::SendPermission;

#[derive(Serialize, Deserialize)]
pub struct SendEmailRequest {
    pub to: String,
    pub subject: String,
    pub content: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    pub message_id: String,
}
