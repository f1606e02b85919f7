//! Public types for the site config API
use serde::{Deserialize, Serialize};

/// Site-wide settings shown to every visitor
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfigResponse {
    pub default_role: String,
    pub email_domains: String,
    pub email_domains_array: Vec<String>,
    pub admin_contact: String,
    pub max_emails: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSiteConfigRequest {
    pub default_role: String,
    pub email_domains: String,
    pub admin_contact: String,
    pub max_emails: String,
}

/// Outbound mail service settings, admin only
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailServiceConfig {
    pub enabled: bool,
    pub api_key: String,
    pub role_limits: RoleLimits,
}

/// Daily limits for the two configurable roles. -1 disables sending,
/// 0 lifts the cap.
#[derive(Serialize, Deserialize)]
pub struct RoleLimits {
    pub duke: i64,
    pub knight: i64,
}
