//! Admin-managed site settings stored as key/value rows

use anyhow::{Error, Result};
use tokio_rusqlite::Connection;

use crate::core::config::DEFAULT_MAX_ACTIVE_MAILBOXES;

pub const EMAIL_SERVICE_ENABLED: &str = "EMAIL_SERVICE_ENABLED";
pub const EMAIL_ROLE_LIMITS: &str = "EMAIL_ROLE_LIMITS";
pub const RESEND_API_KEY: &str = "RESEND_API_KEY";
pub const EMAIL_DOMAINS: &str = "EMAIL_DOMAINS";
pub const DEFAULT_ROLE: &str = "DEFAULT_ROLE";
pub const ADMIN_CONTACT: &str = "ADMIN_CONTACT";
pub const MAX_EMAILS: &str = "MAX_EMAILS";

pub async fn get_setting(db: &Connection, key: &str) -> Result<Option<String>, Error> {
    let key = key.to_owned();
    let value = db
        .call(move |conn| {
            let mut stmt = conn.prepare("SELECT value FROM site_config WHERE key = ?")?;
            let rows = stmt
                .query_map([key], |i| i.get::<_, String>(0))?
                .filter_map(Result::ok)
                .collect::<Vec<String>>();
            Ok(rows.into_iter().next())
        })
        .await?;
    Ok(value)
}

pub async fn set_setting(db: &Connection, key: &str, value: &str) -> Result<(), Error> {
    let key = key.to_owned();
    let value = value.to_owned();
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO site_config (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}

/// Global switch for outbound mail. Anything other than the literal
/// string "true" (including a missing row) counts as disabled.
pub async fn email_sending_enabled(db: &Connection) -> Result<bool, Error> {
    Ok(get_setting(db, EMAIL_SERVICE_ENABLED).await?.as_deref() == Some("true"))
}

/// How many unexpired mailboxes a single user may hold at once.
pub async fn max_active_mailboxes(db: &Connection) -> Result<i64, Error> {
    let value = get_setting(db, MAX_EMAILS).await?;
    Ok(value
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_ACTIVE_MAILBOXES))
}

/// Domains mailbox addresses may be created under, comma separated in
/// the settings row. Empty when unconfigured, meaning any domain goes.
pub async fn email_domains(db: &Connection) -> Result<Vec<String>, Error> {
    let value = get_setting(db, EMAIL_DOMAINS).await?;
    Ok(value
        .map(|v| {
            v.split(',')
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .collect()
        })
        .unwrap_or_default())
}
