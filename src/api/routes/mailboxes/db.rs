//! Database queries for the mailboxes API
use anyhow::{Error, Result};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use super::public::Mailbox;

fn row_to_mailbox(row: &rusqlite::Row) -> rusqlite::Result<Mailbox> {
    Ok(Mailbox {
        id: row.get(0)?,
        address: row.get(1)?,
        user_id: row.get(2)?,
        created_at: row.get(3)?,
        expires_at: row.get(4)?,
    })
}

/// Look up a mailbox the given user owns. Missing and foreign
/// mailboxes both come back as None.
pub async fn find_owned_mailbox(
    db: &Connection,
    mailbox_id: &str,
    user_id: &str,
) -> Result<Option<Mailbox>, Error> {
    let mailbox_id = mailbox_id.to_owned();
    let user_id = user_id.to_owned();
    let mailbox = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r"
          SELECT id, address, user_id, created_at, expires_at
          FROM mailbox
          WHERE id = ? AND user_id = ?
          LIMIT 1
        ",
            )?;
            let rows = stmt
                .query_map([mailbox_id, user_id], row_to_mailbox)?
                .filter_map(Result::ok)
                .collect::<Vec<Mailbox>>();
            Ok(rows.into_iter().next())
        })
        .await?;
    Ok(mailbox)
}

/// Look up a mailbox by its address, expired or not.
pub async fn find_mailbox_by_address(
    db: &Connection,
    address: &str,
) -> Result<Option<Mailbox>, Error> {
    let address = address.to_owned();
    let mailbox = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r"
          SELECT id, address, user_id, created_at, expires_at
          FROM mailbox
          WHERE address = ?
          LIMIT 1
        ",
            )?;
            let rows = stmt
                .query_map([address], row_to_mailbox)?
                .filter_map(Result::ok)
                .collect::<Vec<Mailbox>>();
            Ok(rows.into_iter().next())
        })
        .await?;
    Ok(mailbox)
}

/// The user's unexpired mailboxes, newest first.
pub async fn list_mailboxes(
    db: &Connection,
    user_id: &str,
    now_ms: i64,
) -> Result<Vec<Mailbox>, Error> {
    let user_id = user_id.to_owned();
    let mailboxes = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r"
          SELECT id, address, user_id, created_at, expires_at
          FROM mailbox
          WHERE user_id = ? AND (expires_at IS NULL OR expires_at > ?)
          ORDER BY created_at DESC
        ",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![user_id, now_ms], row_to_mailbox)?
                .filter_map(Result::ok)
                .collect::<Vec<Mailbox>>();
            Ok(rows)
        })
        .await?;
    Ok(mailboxes)
}

pub async fn count_active_mailboxes(
    db: &Connection,
    user_id: &str,
    now_ms: i64,
) -> Result<i64, Error> {
    let user_id = user_id.to_owned();
    let count = db
        .call(move |conn| {
            let count: i64 = conn.query_row(
                r"
          SELECT COUNT(*)
          FROM mailbox
          WHERE user_id = ? AND (expires_at IS NULL OR expires_at > ?)
        ",
                rusqlite::params![user_id, now_ms],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await?;
    Ok(count)
}

pub async fn insert_mailbox(
    db: &Connection,
    user_id: &str,
    address: &str,
    created_at: i64,
    expires_at: Option<i64>,
) -> Result<Mailbox, Error> {
    let mailbox = Mailbox {
        id: Uuid::new_v4().to_string(),
        address: address.to_owned(),
        user_id: user_id.to_owned(),
        created_at,
        expires_at,
    };
    let row = mailbox.clone();
    db.call(move |conn| {
        conn.execute(
            r"
          INSERT INTO mailbox (id, address, user_id, created_at, expires_at)
          VALUES (?, ?, ?, ?, ?)
        ",
            rusqlite::params![row.id, row.address, row.user_id, row.created_at, row.expires_at],
        )?;
        Ok(())
    })
    .await?;
    Ok(mailbox)
}

/// Delete a mailbox and everything in it. Both deletes succeed or
/// neither does.
pub async fn delete_mailbox(
    db: &Connection,
    mailbox_id: &str,
    user_id: &str,
) -> Result<bool, Error> {
    let mailbox_id = mailbox_id.to_owned();
    let user_id = user_id.to_owned();
    let deleted = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                r"
              DELETE FROM message
              WHERE mailbox_id IN (SELECT id FROM mailbox WHERE id = ? AND user_id = ?)
            ",
                [&mailbox_id, &user_id],
            )?;
            let count = tx.execute(
                "DELETE FROM mailbox WHERE id = ? AND user_id = ?",
                [&mailbox_id, &user_id],
            )?;
            tx.commit()?;
            Ok(count > 0)
        })
        .await?;
    Ok(deleted)
}
