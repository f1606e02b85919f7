use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tokio_rusqlite::Connection;

use super::PeriodicJob;
use crate::core::AppConfig;

/// Sweeps expired mailboxes and their messages out of the database.
/// Inbound mail for an expired address is already refused at the API,
/// so the sweep only reclaims storage.
#[derive(Debug)]
pub struct ExpireMailboxes;

#[async_trait]
impl PeriodicJob for ExpireMailboxes {
    fn interval(&self) -> Duration {
        // Run hourly
        Duration::from_secs(60 * 60)
    }

    async fn run_job(&self, _config: &AppConfig, db: &Connection) {
        let now = Utc::now().timestamp_millis();
        let swept = db
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    "DELETE FROM message
                     WHERE mailbox_id IN (
                         SELECT id FROM mailbox
                         WHERE expires_at IS NOT NULL AND expires_at <= ?1
                     )",
                    [now],
                )?;
                let mailboxes = tx.execute(
                    "DELETE FROM mailbox
                     WHERE expires_at IS NOT NULL AND expires_at <= ?1",
                    [now],
                )?;
                tx.commit()?;
                Ok(mailboxes)
            })
            .await;

        match swept {
            Ok(0) => {}
            Ok(n) => tracing::info!("Expired {} mailboxes", n),
            Err(e) => tracing::error!("Failed to expire mailboxes: {}", e),
        }
    }
}
