//! Router for the site config API

use std::sync::{Arc, RwLock};

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use super::public;
use crate::api::AuthUser;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::core::config::DEFAULT_MAX_ACTIVE_MAILBOXES;
use crate::roles::{Permission, RoleName};
use crate::sending::permissions::RoleLimitOverrides;
use crate::settings;

type SharedState = Arc<RwLock<AppState>>;

/// Site settings every visitor may read
async fn get_config(
    State(state): State<SharedState>,
) -> Result<Json<public::SiteConfigResponse>, ApiError> {
    let db = state.read().unwrap().db.clone();

    let default_role = settings::get_setting(&db, settings::DEFAULT_ROLE)
        .await?
        .unwrap_or_else(|| RoleName::Civilian.as_str().to_string());
    let email_domains = settings::get_setting(&db, settings::EMAIL_DOMAINS)
        .await?
        .unwrap_or_default();
    let admin_contact = settings::get_setting(&db, settings::ADMIN_CONTACT)
        .await?
        .unwrap_or_default();
    let max_emails = settings::get_setting(&db, settings::MAX_EMAILS)
        .await?
        .unwrap_or_else(|| DEFAULT_MAX_ACTIVE_MAILBOXES.to_string());
    let email_domains_array = settings::email_domains(&db).await?;

    Ok(Json(public::SiteConfigResponse {
        default_role,
        email_domains,
        email_domains_array,
        admin_contact,
        max_emails,
    }))
}

/// Save site settings
async fn save_config(
    State(state): State<SharedState>,
    user: AuthUser,
    Json(payload): Json<public::SaveSiteConfigRequest>,
) -> Result<StatusCode, ApiError> {
    user.require(Permission::ManageConfig)?;
    let db = state.read().unwrap().db.clone();

    // The emperor role can only be claimed by the first account
    match payload.default_role.parse::<RoleName>() {
        Ok(RoleName::Duke) | Ok(RoleName::Knight) | Ok(RoleName::Civilian) => {}
        _ => {
            return Err(ApiError::status(
                StatusCode::BAD_REQUEST,
                "Invalid default role",
            ));
        }
    }

    let max_emails: i64 = payload
        .max_emails
        .parse()
        .map_err(|_| ApiError::status(StatusCode::BAD_REQUEST, "Invalid mailbox limit"))?;
    if max_emails < 1 {
        return Err(ApiError::status(
            StatusCode::BAD_REQUEST,
            "Invalid mailbox limit",
        ));
    }

    settings::set_setting(&db, settings::DEFAULT_ROLE, &payload.default_role).await?;
    settings::set_setting(&db, settings::EMAIL_DOMAINS, payload.email_domains.trim()).await?;
    settings::set_setting(&db, settings::ADMIN_CONTACT, payload.admin_contact.trim()).await?;
    settings::set_setting(&db, settings::MAX_EMAILS, &max_emails.to_string()).await?;

    Ok(StatusCode::OK)
}

/// Outbound mail service settings
async fn get_email_service(
    State(state): State<SharedState>,
    user: AuthUser,
) -> Result<Json<public::EmailServiceConfig>, ApiError> {
    user.require(Permission::ManageConfig)?;
    let db = state.read().unwrap().db.clone();

    let enabled = settings::email_sending_enabled(&db).await?;
    let api_key = settings::get_setting(&db, settings::RESEND_API_KEY)
        .await?
        .unwrap_or_default();
    let overrides = match settings::get_setting(&db, settings::EMAIL_ROLE_LIMITS).await? {
        Some(raw) => serde_json::from_str(&raw).unwrap_or_default(),
        None => RoleLimitOverrides::default(),
    };

    Ok(Json(public::EmailServiceConfig {
        enabled,
        api_key,
        role_limits: public::RoleLimits {
            duke: overrides.duke.unwrap_or(-1),
            knight: overrides.knight.unwrap_or(-1),
        },
    }))
}

/// Save outbound mail service settings
async fn save_email_service(
    State(state): State<SharedState>,
    user: AuthUser,
    Json(payload): Json<public::EmailServiceConfig>,
) -> Result<StatusCode, ApiError> {
    user.require(Permission::ManageConfig)?;
    let db = state.read().unwrap().db.clone();

    if payload.role_limits.duke < -1 || payload.role_limits.knight < -1 {
        return Err(ApiError::status(
            StatusCode::BAD_REQUEST,
            "Invalid role limit",
        ));
    }

    let enabled = if payload.enabled { "true" } else { "false" };
    let overrides = serde_json::to_string(&RoleLimitOverrides {
        duke: Some(payload.role_limits.duke),
        knight: Some(payload.role_limits.knight),
    })?;

    settings::set_setting(&db, settings::EMAIL_SERVICE_ENABLED, enabled).await?;
    settings::set_setting(&db, settings::RESEND_API_KEY, payload.api_key.trim()).await?;
    settings::set_setting(&db, settings::EMAIL_ROLE_LIMITS, &overrides).await?;

    Ok(StatusCode::OK)
}

/// Create the config router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(get_config).post(save_config))
        .route(
            "/email-service",
            get(get_email_service).post(save_email_service),
        )
}
