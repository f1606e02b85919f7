use std::env;
use std::time::Duration;

/// How many non-expired mailboxes a user may hold at once, unless an
/// admin overrides it through the `MAX_EMAILS` site setting.
pub const DEFAULT_MAX_ACTIVE_MAILBOXES: i64 = 30;

/// Interval between inbox head refreshes while a mailbox is selected.
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Allowed mailbox lifetimes in milliseconds. Zero means the mailbox
/// never expires.
pub const EXPIRY_OPTIONS_MS: [i64; 4] = [
    1000 * 60 * 60,
    1000 * 60 * 60 * 24,
    1000 * 60 * 60 * 24 * 3,
    0,
];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    pub resend_api_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("EPHEMAIL_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/db", storage_path);
        let resend_api_url = env::var("EPHEMAIL_RESEND_API_URL")
            .unwrap_or_else(|_| "https://api.resend.com".to_string());

        Self {
            storage_path,
            db_path,
            resend_api_url,
        }
    }
}
