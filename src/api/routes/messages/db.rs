//! Database queries for the messages API
use anyhow::{Error, Result};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use super::public::{Direction, Message, MessagePage, decode_cursor, encode_cursor};

/// Fixed page size for mailbox listings.
pub const PAGE_SIZE: i64 = 20;

/// A message about to be stored.
pub struct NewMessage {
    pub mailbox_id: String,
    pub direction: Direction,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub subject: String,
    pub content: Option<String>,
    pub html: Option<String>,
    pub timestamp: i64,
}

fn row_to_message(row: &rusqlite::Row) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        direction: row.get(1)?,
        from_address: row.get(2)?,
        to_address: row.get(3)?,
        subject: row.get(4)?,
        content: row.get(5)?,
        html: row.get(6)?,
        timestamp: row.get(7)?,
    })
}

pub async fn insert_message(db: &Connection, message: NewMessage) -> Result<String, Error> {
    let id = Uuid::new_v4().to_string();
    let message_id = id.clone();
    db.call(move |conn| {
        conn.execute(
            r"
          INSERT INTO message
            (id, mailbox_id, direction, from_address, to_address, subject, content, html, created_at)
          VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        ",
            rusqlite::params![
                message_id,
                message.mailbox_id,
                message.direction,
                message.from_address,
                message.to_address,
                message.subject,
                message.content,
                message.html,
                message.timestamp,
            ],
        )?;
        Ok(())
    })
    .await?;
    Ok(id)
}

/// One page of a mailbox's messages, newest first. Keyset pagination:
/// the cursor carries the sort key of the previous page's last row,
/// so pages stay stable while new messages arrive at the head. One
/// row past the page is probed to decide whether older messages
/// remain.
pub async fn list_messages(
    db: &Connection,
    mailbox_id: &str,
    direction: Direction,
    cursor: Option<String>,
) -> Result<MessagePage, Error> {
    let mailbox_id = mailbox_id.to_owned();
    let after = cursor.as_deref().map(decode_cursor).transpose()?;

    let page = db
        .call(move |conn| {
            let total: i64 = conn.query_row(
                "SELECT COUNT(*) FROM message WHERE mailbox_id = ? AND direction = ?",
                rusqlite::params![&mailbox_id, direction],
                |row| row.get(0),
            )?;

            let mut messages = match &after {
                Some((timestamp, id)) => {
                    let mut stmt = conn.prepare(
                        r"
                  SELECT id, direction, from_address, to_address, subject, content, html, created_at
                  FROM message
                  WHERE mailbox_id = ? AND direction = ?
                    AND (created_at < ? OR (created_at = ? AND id < ?))
                  ORDER BY created_at DESC, id DESC
                  LIMIT ?
                ",
                    )?;
                    stmt.query_map(
                        rusqlite::params![
                            &mailbox_id,
                            direction,
                            timestamp,
                            timestamp,
                            id,
                            PAGE_SIZE + 1
                        ],
                        row_to_message,
                    )?
                    .filter_map(Result::ok)
                    .collect::<Vec<Message>>()
                }
                None => {
                    let mut stmt = conn.prepare(
                        r"
                  SELECT id, direction, from_address, to_address, subject, content, html, created_at
                  FROM message
                  WHERE mailbox_id = ? AND direction = ?
                  ORDER BY created_at DESC, id DESC
                  LIMIT ?
                ",
                    )?;
                    stmt.query_map(
                        rusqlite::params![&mailbox_id, direction, PAGE_SIZE + 1],
                        row_to_message,
                    )?
                    .filter_map(Result::ok)
                    .collect::<Vec<Message>>()
                }
            };

            let next_cursor = if messages.len() as i64 > PAGE_SIZE {
                messages.truncate(PAGE_SIZE as usize);
                messages
                    .last()
                    .map(|last| encode_cursor(last.timestamp, &last.id))
            } else {
                None
            };

            Ok(MessagePage {
                messages,
                next_cursor,
                total,
            })
        })
        .await?;
    Ok(page)
}

pub async fn find_message(
    db: &Connection,
    mailbox_id: &str,
    message_id: &str,
) -> Result<Option<Message>, Error> {
    let mailbox_id = mailbox_id.to_owned();
    let message_id = message_id.to_owned();
    let message = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r"
          SELECT id, direction, from_address, to_address, subject, content, html, created_at
          FROM message
          WHERE mailbox_id = ? AND id = ?
          LIMIT 1
        ",
            )?;
            let rows = stmt
                .query_map([mailbox_id, message_id], row_to_message)?
                .filter_map(Result::ok)
                .collect::<Vec<Message>>();
            Ok(rows.into_iter().next())
        })
        .await?;
    Ok(message)
}

/// Delete a message, reporting whether a row was actually removed.
pub async fn delete_message(
    db: &Connection,
    mailbox_id: &str,
    message_id: &str,
) -> Result<bool, Error> {
    let mailbox_id = mailbox_id.to_owned();
    let message_id = message_id.to_owned();
    let deleted = db
        .call(move |conn| {
            let count = conn.execute(
                "DELETE FROM message WHERE mailbox_id = ? AND id = ?",
                [mailbox_id, message_id],
            )?;
            Ok(count > 0)
        })
        .await?;
    Ok(deleted)
}
