//! Public types for the messages API
use base64::{Engine as _, engine::general_purpose::URL_SAFE};
use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};

/// Which side of the mailbox a message sits on.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Received,
    Sent,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Received => "received",
            Direction::Sent => "sent",
        }
    }
}

impl ToSql for Direction {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Direction {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        serde_json::from_str(&format!("\"{}\"", value.as_str()?))
            .map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// A single message. `timestamp` is when it arrived for received
/// messages and when it was sent for sent ones, in epoch
/// milliseconds. Listings order by it descending.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_address: Option<String>,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    pub timestamp: i64,
}

/// One page of a mailbox listing, newest first. `next_cursor` is None
/// once no older messages remain.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    pub messages: Vec<Message>,
    pub next_cursor: Option<String>,
    pub total: i64,
}

/// Query parameters for listing messages
#[derive(Deserialize, Default)]
pub struct MessagesQuery {
    pub cursor: Option<String>,
    #[serde(rename = "type")]
    pub direction: Option<Direction>,
}

// Cursors encode the sort key of the last row on a page so the next
// query resumes strictly below it. Stable under inserts at the head.

pub fn encode_cursor(timestamp: i64, id: &str) -> String {
    URL_SAFE.encode(format!("{}:{}", timestamp, id))
}

pub fn decode_cursor(cursor: &str) -> Result<(i64, String), anyhow::Error> {
    let raw = URL_SAFE.decode(cursor)?;
    let raw = String::from_utf8(raw)?;
    let (timestamp, id) = raw
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("Malformed cursor"))?;
    Ok((timestamp.parse()?, id.to_string()))
}
