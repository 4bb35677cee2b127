//! Notification channel backed by the webhook.site relay.
//!
//! The relay is the only asynchronous path from providers back to a run:
//! [`ChannelClient::provision`] obtains a fresh inbox, providers push
//! completion callbacks into it, and [`ChannelClient::poll`] re-reads the
//! full delivery history on every call — there is no cursor and no
//! acknowledgment, so callers must tolerate duplicates and arbitrary order.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

const RELAY_BASE_URL: &str = "https://webhook.site";

/// Errors from the notification relay.
///
/// Provision failures are fatal to a run (no notification path exists
/// without an inbox); fetch failures are transient and swallowed per cycle.
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("relay refused to provision an inbox (status {status})")]
    Provision { status: u16 },

    #[error("inbox fetch failed (status {status})")]
    Fetch { status: u16 },

    #[error("malformed relay response: {0}")]
    Malformed(String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// A provisioned inbox: the relay token plus the public URL providers
/// use as their callback target.
#[derive(Debug, Clone)]
pub struct Inbox {
    pub token: String,
    pub url: String,
}

/// One notification as delivered to the inbox. `content` is the raw
/// request body the provider pushed, if any.
#[derive(Debug, Clone, Deserialize)]
pub struct InboxItem {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    uuid: String,
}

#[derive(Debug, Deserialize)]
struct RequestsPage {
    #[serde(default)]
    data: Vec<InboxItem>,
}

/// Client for provisioning and polling webhook.site inboxes.
pub struct ChannelClient {
    client: Client,
    base_url: String,
}

impl ChannelClient {
    pub fn new() -> Self {
        Self::with_base_url(RELAY_BASE_URL.to_string())
    }

    /// Create a client pointing at a custom relay URL (useful for testing).
    pub fn with_base_url(base_url: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("failed to build HTTP client");
        Self { client, base_url }
    }

    /// Request a fresh inbox from the relay.
    ///
    /// The relay answers 200 or 201 depending on deployment; both count
    /// as success.
    pub async fn provision(&self) -> Result<Inbox, ChannelError> {
        let response = self
            .client
            .post(format!("{}/token", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Provision {
                status: status.as_u16(),
            });
        }

        let body = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| ChannelError::Malformed(e.to_string()))?;

        let url = format!("{}/{}", self.base_url, body.uuid);
        Ok(Inbox {
            token: body.uuid,
            url,
        })
    }

    /// Fetch every notification delivered to the inbox so far.
    pub async fn poll(&self, inbox: &Inbox) -> Result<Vec<InboxItem>, ChannelError> {
        let response = self
            .client
            .get(format!("{}/token/{}/requests", self.base_url, inbox.token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Fetch {
                status: status.as_u16(),
            });
        }

        let page = response
            .json::<RequestsPage>()
            .await
            .map_err(|e| ChannelError::Malformed(e.to_string()))?;
        Ok(page.data)
    }
}

impl Default for ChannelClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_page_tolerates_missing_data() {
        let page: RequestsPage = serde_json::from_str("{}").unwrap();
        assert!(page.data.is_empty());
    }

    #[test]
    fn inbox_item_tolerates_null_content() {
        let item: InboxItem = serde_json::from_str(r#"{"content": null}"#).unwrap();
        assert!(item.content.is_none());

        let item: InboxItem =
            serde_json::from_str(r#"{"content": "{\"data\":{}}", "method": "POST"}"#).unwrap();
        assert_eq!(item.content.as_deref(), Some("{\"data\":{}}"));
    }

    #[test]
    fn token_response_parses_uuid() {
        let resp: TokenResponse =
            serde_json::from_str(r#"{"uuid": "00aa-11bb", "default_status": 200}"#).unwrap();
        assert_eq!(resp.uuid, "00aa-11bb");
    }
}
