//! Sqlite connection setup and schema management
use anyhow::Result;
use tokio_rusqlite::Connection;
use uuid::Uuid;

/// Schema DDL, safe to re-run on an existing database.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS user (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    name TEXT,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS role (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS user_role (
    user_id TEXT NOT NULL REFERENCES user(id),
    role_id TEXT NOT NULL REFERENCES role(id),
    PRIMARY KEY (user_id, role_id)
);

CREATE TABLE IF NOT EXISTS api_key (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES user(id),
    name TEXT NOT NULL,
    key TEXT NOT NULL UNIQUE,
    enabled INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    expires_at INTEGER
);

CREATE TABLE IF NOT EXISTS mailbox (
    id TEXT PRIMARY KEY,
    address TEXT NOT NULL UNIQUE,
    user_id TEXT NOT NULL REFERENCES user(id),
    created_at INTEGER NOT NULL,
    expires_at INTEGER
);

CREATE TABLE IF NOT EXISTS message (
    id TEXT PRIMARY KEY,
    mailbox_id TEXT NOT NULL REFERENCES mailbox(id),
    direction TEXT NOT NULL,
    from_address TEXT,
    to_address TEXT,
    subject TEXT NOT NULL,
    content TEXT,
    html TEXT,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS site_config (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS webhook (
    user_id TEXT PRIMARY KEY REFERENCES user(id),
    url TEXT NOT NULL,
    enabled INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_message_mailbox
    ON message(mailbox_id, direction, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_mailbox_user ON mailbox(user_id);
CREATE INDEX IF NOT EXISTS idx_api_key_user ON api_key(user_id);
";

/// Open the sqlite database stored under the given directory.
pub async fn async_db(path: &str) -> Result<Connection> {
    let db_file = format!("{}/ephemail.db", path);
    let conn = Connection::open(db_file).await?;
    conn.call(|conn| {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    })
    .await?;
    Ok(conn)
}

/// Create all tables and seed the fixed role set.
pub fn initialize_db(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)?;

    for name in ["emperor", "duke", "knight", "civilian"] {
        conn.execute(
            "INSERT OR IGNORE INTO role (id, name) VALUES (?, ?)",
            rusqlite::params![Uuid::new_v4().to_string(), name],
        )?;
    }

    Ok(())
}

/// Bring an existing database up to the current schema. The DDL only
/// uses IF NOT EXISTS so this is the same as initializing.
pub fn migrate_db(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    initialize_db(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Tests that initializing twice neither fails nor duplicates the
    /// seeded roles
    #[tokio::test]
    async fn it_initializes_the_schema_with_seeded_roles() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let db = async_db(temp_dir.path().to_str().unwrap()).await?;

        db.call(|conn| {
            initialize_db(conn)?;
            migrate_db(conn)?;
            Ok(())
        })
        .await?;

        let roles: i64 = db
            .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM role", [], |row| row.get(0))?))
            .await?;
        assert_eq!(roles, 4);
        Ok(())
    }
}
