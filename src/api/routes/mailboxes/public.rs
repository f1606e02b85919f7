//! Public types for the mailboxes API
use serde::{Deserialize, Serialize};

/// A temporary mailbox. `expires_at` is epoch milliseconds, None for
/// permanent mailboxes.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Mailbox {
    pub id: String,
    pub address: String,
    pub user_id: String,
    pub created_at: i64,
    pub expires_at: Option<i64>,
}

/// Request to create a mailbox. `expiry_time` is a lifetime in
/// milliseconds and must be one of the offered options; zero means
/// the mailbox never expires.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMailboxRequest {
    pub name: String,
    pub domain: String,
    pub expiry_time: i64,
}

/// Response listing the caller's active mailboxes
#[derive(Serialize, Deserialize)]
pub struct MailboxesResponse {
    pub mailboxes: Vec<Mailbox>,
}
