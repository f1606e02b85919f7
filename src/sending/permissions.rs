//! Send permission checks
//!
//! Every outbound message goes through `check_send_permission` first:
//! a global on/off switch, then the daily limit for the user's role,
//! then a count of what they already sent today. Reads go through the
//! `PolicyStore` trait so checks can run against a fake store in
//! tests. A store failure never propagates to the caller, the check
//! degrades to a denial instead.

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::roles::{RoleName, strongest};

pub const SERVICE_DISABLED_ERROR: &str = "Email sending service is not enabled";
pub const ROLE_FORBIDDEN_ERROR: &str = "Your role does not have permission to send emails.";
pub const PERMISSION_CHECK_FAILED_ERROR: &str = "Permission check failed";

pub fn quota_exceeded_error(limit: i64) -> String {
    format!(
        "You have reached your sending limit for today ({}), please try again tomorrow.",
        limit
    )
}

/// Admin-set daily limits for the two configurable roles, stored as
/// JSON in site settings. A missing key leaves the built-in default
/// in force.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy)]
pub struct RoleLimitOverrides {
    pub duke: Option<i64>,
    pub knight: Option<i64>,
}

/// Outcome of a send permission check.
#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SendPermission {
    pub can_send: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_emails: Option<i64>,
}

/// Reads the send policy rests on: the global switch, role
/// membership, admin limit overrides, and the sent-today count.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    async fn service_enabled(&self) -> Result<bool, Error>;
    async fn role_limit_overrides(&self) -> Result<RoleLimitOverrides, Error>;
    async fn user_roles(&self, user_id: &str) -> Result<Vec<RoleName>, Error>;
    async fn sent_count_since(&self, user_id: &str, since_ms: i64) -> Result<i64, Error>;
}

/// Decide whether the user may send mail right now. Never errors:
/// any failure reading policy data comes back as a denial.
pub async fn check_send_permission(
    store: &impl PolicyStore,
    user_id: &str,
    skip_daily_limit_check: bool,
) -> SendPermission {
    match evaluate(store, user_id, skip_daily_limit_check).await {
        Ok(result) => result,
        Err(err) => {
            warn!("Failed to check send permission: {:?}", err);
            SendPermission {
                can_send: false,
                error: Some(PERMISSION_CHECK_FAILED_ERROR.to_string()),
                remaining_emails: None,
            }
        }
    }
}

/// Permission-only variant used for UI gating. Skips the sent-count
/// query entirely.
pub async fn check_basic_permission(store: &impl PolicyStore, user_id: &str) -> SendPermission {
    check_send_permission(store, user_id, true).await
}

async fn evaluate(
    store: &impl PolicyStore,
    user_id: &str,
    skip_daily_limit_check: bool,
) -> Result<SendPermission, Error> {
    if !store.service_enabled().await? {
        return Ok(SendPermission {
            can_send: false,
            error: Some(SERVICE_DISABLED_ERROR.to_string()),
            remaining_emails: None,
        });
    }

    let limit = user_daily_limit(store, user_id).await?;

    if limit < 0 {
        return Ok(SendPermission {
            can_send: false,
            error: Some(ROLE_FORBIDDEN_ERROR.to_string()),
            remaining_emails: None,
        });
    }

    if skip_daily_limit_check || limit == 0 {
        return Ok(SendPermission {
            can_send: true,
            error: None,
            remaining_emails: None,
        });
    }

    let sent_today = store
        .sent_count_since(user_id, start_of_today_ms()?)
        .await?;
    let remaining = (limit - sent_today).max(0);

    if sent_today >= limit {
        return Ok(SendPermission {
            can_send: false,
            error: Some(quota_exceeded_error(limit)),
            remaining_emails: Some(0),
        });
    }

    Ok(SendPermission {
        can_send: true,
        error: None,
        remaining_emails: Some(remaining),
    })
}

/// Effective daily limit for the strongest role the user holds.
/// Emperor is always unlimited and civilian always forbidden; duke
/// and knight stay forbidden until an admin override enables them.
/// Holding none of the four roles counts as forbidden.
async fn user_daily_limit(store: &impl PolicyStore, user_id: &str) -> Result<i64, Error> {
    let roles = store.user_roles(user_id).await?;
    let overrides = store.role_limit_overrides().await?;

    Ok(match strongest(&roles) {
        Some(RoleName::Emperor) => 0,
        Some(RoleName::Duke) => overrides.duke.unwrap_or(-1),
        Some(RoleName::Knight) => overrides.knight.unwrap_or(-1),
        Some(RoleName::Civilian) | None => -1,
    })
}

/// Milliseconds since the epoch at the most recent local midnight.
fn start_of_today_ms() -> Result<i64, Error> {
    Local::now()
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
        .map(|midnight| midnight.timestamp_millis())
        .ok_or_else(|| anyhow!("Could not resolve local midnight"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Configurable in-memory store. Also counts how often the
    /// sent-count query runs.
    struct FakePolicyStore {
        enabled: bool,
        overrides: Result<RoleLimitOverrides, String>,
        roles: Result<Vec<RoleName>, String>,
        sent_today: i64,
        count_calls: AtomicUsize,
    }

    impl FakePolicyStore {
        fn new(enabled: bool, roles: Vec<RoleName>) -> Self {
            Self {
                enabled,
                overrides: Ok(RoleLimitOverrides::default()),
                roles: Ok(roles),
                sent_today: 0,
                count_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PolicyStore for FakePolicyStore {
        async fn service_enabled(&self) -> Result<bool, Error> {
            Ok(self.enabled)
        }

        async fn role_limit_overrides(&self) -> Result<RoleLimitOverrides, Error> {
            self.overrides.clone().map_err(|e| anyhow!(e))
        }

        async fn user_roles(&self, _user_id: &str) -> Result<Vec<RoleName>, Error> {
            self.roles.clone().map_err(|e| anyhow!(e))
        }

        async fn sent_count_since(&self, _user_id: &str, _since_ms: i64) -> Result<i64, Error> {
            self.count_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.sent_today)
        }
    }

    /// Tests that a disabled service denies everyone, even emperors
    #[tokio::test]
    async fn it_denies_when_service_disabled() {
        let store = FakePolicyStore::new(false, vec![RoleName::Emperor]);
        let result = check_send_permission(&store, "user-1", false).await;
        assert!(!result.can_send);
        assert_eq!(result.error.as_deref(), Some(SERVICE_DISABLED_ERROR));
    }

    /// Tests that a civilian can never send
    #[tokio::test]
    async fn it_denies_forbidden_role() {
        let store = FakePolicyStore::new(true, vec![RoleName::Civilian]);
        let result = check_send_permission(&store, "user-1", false).await;
        assert!(!result.can_send);
        assert_eq!(result.error.as_deref(), Some(ROLE_FORBIDDEN_ERROR));
        assert_eq!(store.count_calls.load(Ordering::SeqCst), 0);
    }

    /// Tests that holding no recognized role counts as forbidden
    #[tokio::test]
    async fn it_denies_user_with_no_roles() {
        let store = FakePolicyStore::new(true, vec![]);
        let result = check_send_permission(&store, "user-1", false).await;
        assert!(!result.can_send);
        assert_eq!(result.error.as_deref(), Some(ROLE_FORBIDDEN_ERROR));
    }

    /// Tests that an emperor sends without any count query
    #[tokio::test]
    async fn it_allows_emperor_unlimited() {
        let store = FakePolicyStore::new(true, vec![RoleName::Emperor]);
        let result = check_send_permission(&store, "user-1", false).await;
        assert!(result.can_send);
        assert_eq!(result.remaining_emails, None);
        assert_eq!(store.count_calls.load(Ordering::SeqCst), 0);
    }

    /// Tests that duke and knight are forbidden until an override
    /// enables them
    #[tokio::test]
    async fn it_denies_duke_without_override() {
        let store = FakePolicyStore::new(true, vec![RoleName::Duke]);
        let result = check_send_permission(&store, "user-1", false).await;
        assert!(!result.can_send);
        assert_eq!(result.error.as_deref(), Some(ROLE_FORBIDDEN_ERROR));
    }

    /// Tests the remaining count under a configured limit
    #[tokio::test]
    async fn it_reports_remaining_under_limit() {
        let mut store = FakePolicyStore::new(true, vec![RoleName::Duke]);
        store.overrides = Ok(RoleLimitOverrides {
            duke: Some(5),
            knight: None,
        });
        store.sent_today = 3;
        let result = check_send_permission(&store, "user-1", false).await;
        assert!(result.can_send);
        assert_eq!(result.remaining_emails, Some(2));
    }

    /// Tests denial at the limit, with the limit in the message
    #[tokio::test]
    async fn it_denies_at_limit() {
        let mut store = FakePolicyStore::new(true, vec![RoleName::Duke]);
        store.overrides = Ok(RoleLimitOverrides {
            duke: Some(5),
            knight: None,
        });
        store.sent_today = 5;
        let result = check_send_permission(&store, "user-1", false).await;
        assert!(!result.can_send);
        assert_eq!(result.remaining_emails, Some(0));
        assert!(result.error.as_deref().is_some_and(|e| e.contains("5")));
    }

    /// Tests that a zero override means unlimited, not zero allowed
    #[tokio::test]
    async fn it_treats_zero_limit_as_unlimited() {
        let mut store = FakePolicyStore::new(true, vec![RoleName::Knight]);
        store.overrides = Ok(RoleLimitOverrides {
            duke: None,
            knight: Some(0),
        });
        store.sent_today = 1000;
        let result = check_send_permission(&store, "user-1", false).await;
        assert!(result.can_send);
        assert_eq!(store.count_calls.load(Ordering::SeqCst), 0);
    }

    /// Tests precedence when a user holds both duke and civilian
    #[tokio::test]
    async fn it_applies_strongest_role_limit() {
        let mut store =
            FakePolicyStore::new(true, vec![RoleName::Civilian, RoleName::Duke]);
        store.overrides = Ok(RoleLimitOverrides {
            duke: Some(5),
            knight: None,
        });
        let result = check_send_permission(&store, "user-1", false).await;
        assert!(result.can_send);
        assert_eq!(result.remaining_emails, Some(5));
    }

    /// Tests that the basic check skips the count query even when the
    /// user is at their limit
    #[tokio::test]
    async fn it_skips_count_query_for_basic_check() {
        let mut store = FakePolicyStore::new(true, vec![RoleName::Knight]);
        store.overrides = Ok(RoleLimitOverrides {
            duke: None,
            knight: Some(2),
        });
        store.sent_today = 2;
        let result = check_basic_permission(&store, "user-1").await;
        assert!(result.can_send);
        assert_eq!(store.count_calls.load(Ordering::SeqCst), 0);
    }

    /// Tests that a failing role lookup denies instead of erroring
    #[tokio::test]
    async fn it_fails_closed_on_role_lookup_error() {
        let mut store = FakePolicyStore::new(true, vec![]);
        store.roles = Err("db unreachable".to_string());
        let result = check_send_permission(&store, "user-1", false).await;
        assert!(!result.can_send);
        assert_eq!(result.error.as_deref(), Some(PERMISSION_CHECK_FAILED_ERROR));
    }

    /// Tests that malformed override data denies instead of erroring
    #[tokio::test]
    async fn it_fails_closed_on_bad_overrides() {
        let mut store = FakePolicyStore::new(true, vec![RoleName::Duke]);
        store.overrides = Err("invalid json".to_string());
        let result = check_send_permission(&store, "user-1", false).await;
        assert!(!result.can_send);
        assert_eq!(result.error.as_deref(), Some(PERMISSION_CHECK_FAILED_ERROR));
    }
}
