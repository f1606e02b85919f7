//! HTTP access to a mailbox's messages for the poller.
use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

use crate::api::public::messages::{Direction, MessagePage};

/// The message store the poller fetches from and deletes against.
#[async_trait]
pub trait MailboxClient: Send + Sync + 'static {
    /// Fetch one page, newest first. No cursor means the head page.
    async fn fetch_page(
        &self,
        mailbox_id: &str,
        direction: Direction,
        cursor: Option<&str>,
    ) -> Result<MessagePage>;

    async fn delete_message(&self, mailbox_id: &str, message_id: &str) -> Result<()>;
}

/// `MailboxClient` over the service's REST API, authenticated with an
/// API key.
pub struct HttpMailboxClient {
    api_base_url: String,
    api_key: String,
    client: Client,
}

impl HttpMailboxClient {
    pub fn new(api_base_url: &str, api_key: &str) -> Self {
        Self {
            api_base_url: api_base_url.to_string(),
            api_key: api_key.to_string(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl MailboxClient for HttpMailboxClient {
    async fn fetch_page(
        &self,
        mailbox_id: &str,
        direction: Direction,
        cursor: Option<&str>,
    ) -> Result<MessagePage> {
        let mut url = reqwest::Url::parse(&format!(
            "{}/api/mailboxes/{}/messages",
            self.api_base_url, mailbox_id
        ))?;
        if direction == Direction::Sent {
            url.query_pairs_mut().append_pair("type", "sent");
        }
        if let Some(cursor) = cursor {
            url.query_pairs_mut().append_pair("cursor", cursor);
        }

        let res = self
            .client
            .get(url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;
        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("Failed to fetch messages: {} ({})", status, text);
        }
        let page: MessagePage = serde_json::from_str(&text)?;
        Ok(page)
    }

    async fn delete_message(&self, mailbox_id: &str, message_id: &str) -> Result<()> {
        let url = format!(
            "{}/api/mailboxes/{}/messages/{}",
            self.api_base_url, mailbox_id, message_id
        );
        let res = self
            .client
            .delete(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            anyhow::bail!("Failed to delete message: {} ({})", status, text);
        }
        Ok(())
    }
}
