//! Database-backed reads for send permission checks

use anyhow::{Error, Result};
use async_trait::async_trait;
use tokio_rusqlite::Connection;

use super::permissions::{PolicyStore, RoleLimitOverrides};
use crate::roles::{RoleName, db::find_user_roles};
use crate::settings;

pub struct DbPolicyStore {
    db: Connection,
}

impl DbPolicyStore {
    pub fn new(db: Connection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PolicyStore for DbPolicyStore {
    async fn service_enabled(&self) -> Result<bool, Error> {
        settings::email_sending_enabled(&self.db).await
    }

    async fn role_limit_overrides(&self) -> Result<RoleLimitOverrides, Error> {
        match settings::get_setting(&self.db, settings::EMAIL_ROLE_LIMITS).await? {
            // Malformed JSON surfaces as an error here so the check
            // fails closed rather than falling back to defaults
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(RoleLimitOverrides::default()),
        }
    }

    async fn user_roles(&self, user_id: &str) -> Result<Vec<RoleName>, Error> {
        find_user_roles(&self.db, user_id).await
    }

    async fn sent_count_since(&self, user_id: &str, since_ms: i64) -> Result<i64, Error> {
        let user_id = user_id.to_owned();
        let count = self
            .db
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    r"
              SELECT COUNT(*)
              FROM message m
              JOIN mailbox mb ON mb.id = m.mailbox_id
              WHERE mb.user_id = ?
                AND m.direction = 'sent'
                AND m.created_at >= ?
            ",
                    rusqlite::params![user_id, since_ms],
                    |row| row.get(0),
                )?;
                Ok(count)
            })
            .await?;
        Ok(count)
    }
}
