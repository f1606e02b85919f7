//! Database queries for the API keys API
use anyhow::{Error, Result};
use chrono::Utc;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use super::public::ApiKey;

/// Create a key for the user, returning its id and the secret.
pub async fn create_api_key(
    db: &Connection,
    user_id: &str,
    name: &str,
) -> Result<(String, String), Error> {
    let id = Uuid::new_v4().to_string();
    let key = format!("ek_{}", Uuid::new_v4().simple());
    let row = (
        id.clone(),
        user_id.to_owned(),
        name.to_owned(),
        key.clone(),
        Utc::now().timestamp_millis(),
    );
    db.call(move |conn| {
        conn.execute(
            r"
          INSERT INTO api_key (id, user_id, name, key, enabled, created_at)
          VALUES (?, ?, ?, ?, 1, ?)
        ",
            rusqlite::params![row.0, row.1, row.2, row.3, row.4],
        )?;
        Ok(())
    })
    .await?;
    Ok((id, key))
}

/// Resolve an API key to its owner. Disabled and expired keys don't
/// resolve.
pub async fn find_user_id_by_key(db: &Connection, key: &str) -> Result<Option<String>, Error> {
    let key = key.to_owned();
    let now = Utc::now().timestamp_millis();
    let user_id = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r"
          SELECT user_id
          FROM api_key
          WHERE key = ? AND enabled = 1 AND (expires_at IS NULL OR expires_at > ?)
          LIMIT 1
        ",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![key, now], |i| i.get::<_, String>(0))?
                .filter_map(Result::ok)
                .collect::<Vec<String>>();
            Ok(rows.into_iter().next())
        })
        .await?;
    Ok(user_id)
}

pub async fn list_api_keys(db: &Connection, user_id: &str) -> Result<Vec<ApiKey>, Error> {
    let user_id = user_id.to_owned();
    let keys = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r"
          SELECT id, name, key, enabled, created_at, expires_at
          FROM api_key
          WHERE user_id = ?
          ORDER BY created_at DESC
        ",
            )?;
            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(ApiKey {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        key: row.get(2)?,
                        enabled: row.get(3)?,
                        created_at: row.get(4)?,
                        expires_at: row.get(5)?,
                    })
                })?
                .filter_map(Result::ok)
                .collect::<Vec<ApiKey>>();
            Ok(rows)
        })
        .await?;
    Ok(keys)
}

pub async fn set_api_key_enabled(
    db: &Connection,
    user_id: &str,
    key_id: &str,
    enabled: bool,
) -> Result<bool, Error> {
    let user_id = user_id.to_owned();
    let key_id = key_id.to_owned();
    let updated = db
        .call(move |conn| {
            let count = conn.execute(
                "UPDATE api_key SET enabled = ? WHERE id = ? AND user_id = ?",
                rusqlite::params![enabled, key_id, user_id],
            )?;
            Ok(count > 0)
        })
        .await?;
    Ok(updated)
}

pub async fn delete_api_key(db: &Connection, user_id: &str, key_id: &str) -> Result<bool, Error> {
    let user_id = user_id.to_owned();
    let key_id = key_id.to_owned();
    let deleted = db
        .call(move |conn| {
            let count = conn.execute(
                "DELETE FROM api_key WHERE id = ? AND user_id = ?",
                [key_id, user_id],
            )?;
            Ok(count > 0)
        })
        .await?;
    Ok(deleted)
}
