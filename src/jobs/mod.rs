//! Background jobs that run on a fixed schedule for the lifetime of
//! the server, or once through the `job` CLI subcommand.
use async_trait::async_trait;
use std::time::Duration;
use tokio_rusqlite::Connection;

use crate::core::AppConfig;

pub mod expire_mailboxes;

pub use expire_mailboxes::ExpireMailboxes;

#[async_trait]
pub trait PeriodicJob: Send + Sync {
    /// Time between runs.
    fn interval(&self) -> Duration;

    /// One run of the job. Failures are logged inside the job so one
    /// bad run never stops the schedule.
    async fn run_job(&self, config: &AppConfig, db: &Connection);
}

/// Run `job` forever on its interval in its own tokio task. The first
/// run happens immediately.
pub fn spawn_periodic_job<J>(config: AppConfig, db: Connection, job: J)
where
    J: PeriodicJob + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(job.interval());
        loop {
            ticker.tick().await;
            job.run_job(&config, &db).await;
        }
    });
}
