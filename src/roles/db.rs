//! Database queries for role membership

use anyhow::{Error, Result};
use tokio_rusqlite::Connection;

use super::RoleName;

/// All roles held by a user.
pub async fn find_user_roles(db: &Connection, user_id: &str) -> Result<Vec<RoleName>, Error> {
    let user_id = user_id.to_owned();
    let roles = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r"
          SELECT r.name
          FROM role r
          JOIN user_role ur ON ur.role_id = r.id
          WHERE ur.user_id = ?
        ",
            )?;
            let rows = stmt
                .query_map([user_id], |i| i.get::<_, RoleName>(0))?
                .filter_map(Result::ok)
                .collect::<Vec<RoleName>>();
            Ok(rows)
        })
        .await?;
    Ok(roles)
}

/// Add a role to a user, keeping any roles they already hold.
pub async fn assign_role(db: &Connection, user_id: &str, role: RoleName) -> Result<(), Error> {
    let user_id = user_id.to_owned();
    db.call(move |conn| {
        let role_id: String =
            conn.query_row("SELECT id FROM role WHERE name = ?", [role], |row| {
                row.get(0)
            })?;
        conn.execute(
            "INSERT OR IGNORE INTO user_role (user_id, role_id) VALUES (?, ?)",
            [user_id, role_id],
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}

/// Replace a user's roles with the single given role. Removing the
/// old memberships and inserting the new one either all succeeds or
/// rolls back.
pub async fn promote_user(db: &Connection, user_id: &str, role: RoleName) -> Result<(), Error> {
    let user_id = user_id.to_owned();
    db.call(move |conn| {
        let tx = conn.transaction()?;

        // Errors with QueryReturnedNoRows when the user doesn't exist
        tx.query_row("SELECT id FROM user WHERE id = ?", [&user_id], |row| {
            row.get::<_, String>(0)
        })?;

        let role_id: String =
            tx.query_row("SELECT id FROM role WHERE name = ?", [role], |row| {
                row.get(0)
            })?;

        tx.execute("DELETE FROM user_role WHERE user_id = ?", [&user_id])?;
        tx.execute(
            "INSERT INTO user_role (user_id, role_id) VALUES (?, ?)",
            [&user_id, &role_id],
        )?;

        tx.commit()?;
        Ok(())
    })
    .await?;
    Ok(())
}
