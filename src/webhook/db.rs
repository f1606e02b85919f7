use anyhow::{Error, Result};
use tokio_rusqlite::Connection;

use super::models::Webhook;

pub async fn find_webhook(db: &Connection, user_id: &str) -> Result<Option<Webhook>, Error> {
    let user_id = user_id.to_owned();
    let webhook = db
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT url, enabled FROM webhook WHERE user_id = ? LIMIT 1")?;
            let rows = stmt
                .query_map([user_id], |i| {
                    Ok(Webhook {
                        url: i.get(0)?,
                        enabled: i.get(1)?,
                    })
                })?
                .filter_map(Result::ok)
                .collect::<Vec<Webhook>>();
            Ok(rows.into_iter().next())
        })
        .await?;
    Ok(webhook)
}

pub async fn upsert_webhook(
    db: &Connection,
    user_id: &str,
    url: &str,
    enabled: bool,
) -> Result<(), Error> {
    let user_id = user_id.to_owned();
    let url = url.to_owned();
    db.call(move |conn| {
        conn.execute(
            r"
          INSERT INTO webhook (user_id, url, enabled) VALUES (?, ?, ?)
          ON CONFLICT(user_id) DO UPDATE SET url = excluded.url, enabled = excluded.enabled
        ",
            rusqlite::params![user_id, url, enabled],
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}
