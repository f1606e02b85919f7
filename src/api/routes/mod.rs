//! API routes module

pub mod api_keys;
pub mod config;
pub mod inbound;
pub mod mailboxes;
pub mod messages;
pub mod roles;
pub mod send;
pub mod users;
pub mod webhook;

use std::sync::{Arc, RwLock};

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<RwLock<AppState>>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Account registration and profile
        .nest("/users", users::router())
        // Mailbox management
        .nest("/mailboxes", mailboxes::router())
        // Messages within a mailbox
        .nest("/mailboxes/{mailbox_id}/messages", messages::router())
        // Sending from a mailbox
        .nest("/mailboxes/{mailbox_id}", send::router())
        // Permission-only send check
        .nest("/send", send::permission_router())
        // Handoff from the receiving mail server
        .nest("/inbound", inbound::router())
        // Site configuration
        .nest("/config", config::router())
        // Webhook settings
        .nest("/webhook", webhook::router())
        // Role lookup and promotion
        .nest("/roles", roles::router())
        // API key management
        .nest("/api-keys", api_keys::router())
}
