use crate::core::db::{async_db, migrate_db};
use anyhow::Result;

pub async fn run(db: bool, db_path: &str) -> Result<()> {
    // Run the DB migration script
    if db {
        println!("Migrating db...");
        let db = async_db(db_path).await.expect("Failed to connect to db");
        db.call(|conn| {
            migrate_db(conn).unwrap_or_else(|err| eprintln!("DB migration failed {}", err));
            Ok(())
        })
        .await?;
        println!("Finished migrating db");
    }

    Ok(())
}
