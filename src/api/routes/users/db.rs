//! Database queries for the users API
use anyhow::{Error, Result};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use super::public::User;

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        created_at: row.get(3)?,
    })
}

pub async fn insert_user(
    db: &Connection,
    email: &str,
    name: Option<String>,
    created_at: i64,
) -> Result<User, Error> {
    let user = User {
        id: Uuid::new_v4().to_string(),
        email: email.to_owned(),
        name,
        created_at,
    };
    let row = user.clone();
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO user (id, email, name, created_at) VALUES (?, ?, ?, ?)",
            rusqlite::params![row.id, row.email, row.name, row.created_at],
        )?;
        Ok(())
    })
    .await?;
    Ok(user)
}

pub async fn find_user_by_id(db: &Connection, user_id: &str) -> Result<Option<User>, Error> {
    let user_id = user_id.to_owned();
    let user = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, email, name, created_at FROM user WHERE id = ? LIMIT 1",
            )?;
            let rows = stmt
                .query_map([user_id], row_to_user)?
                .filter_map(Result::ok)
                .collect::<Vec<User>>();
            Ok(rows.into_iter().next())
        })
        .await?;
    Ok(user)
}

pub async fn find_user_by_email(db: &Connection, email: &str) -> Result<Option<User>, Error> {
    let email = email.to_owned();
    let user = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, email, name, created_at FROM user WHERE email = ? LIMIT 1",
            )?;
            let rows = stmt
                .query_map([email], row_to_user)?
                .filter_map(Result::ok)
                .collect::<Vec<User>>();
            Ok(rows.into_iter().next())
        })
        .await?;
    Ok(user)
}

/// Find a user by exact email or name match, for the promote panel.
pub async fn find_user_by_search(db: &Connection, search: &str) -> Result<Option<User>, Error> {
    let search = search.to_owned();
    let user = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r"
          SELECT id, email, name, created_at
          FROM user
          WHERE email = ? OR name = ?
          LIMIT 1
        ",
            )?;
            let rows = stmt
                .query_map([&search, &search], row_to_user)?
                .filter_map(Result::ok)
                .collect::<Vec<User>>();
            Ok(rows.into_iter().next())
        })
        .await?;
    Ok(user)
}

pub async fn count_users(db: &Connection) -> Result<i64, Error> {
    let count = db
        .call(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM user", [], |row| row.get(0))?;
            Ok(count)
        })
        .await?;
    Ok(count)
}
