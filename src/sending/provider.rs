//! Outbound delivery through the Resend HTTP API

use anyhow::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub struct EmailProvider {
    api_url: String,
    api_key: String,
    client: Client,
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    html: Option<&'a str>,
}

#[derive(Deserialize)]
struct SendEmailResponse {
    id: String,
}

impl EmailProvider {
    pub fn new(api_url: &str, api_key: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            client: Client::new(),
        }
    }

    /// Deliver one message, returning the provider's id for it.
    pub async fn send(
        &self,
        from: &str,
        to: &str,
        subject: &str,
        text: &str,
        html: Option<&str>,
    ) -> Result<String, Error> {
        let url = format!("{}/emails", self.api_url);
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&SendEmailRequest {
                from,
                to: [to],
                subject,
                text,
                html,
            })
            .send()
            .await?;
        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("Send failed: {} ({})", status, text);
        }
        let sent: SendEmailResponse = serde_json::from_str(&text)?;
        Ok(sent.id)
    }
}
