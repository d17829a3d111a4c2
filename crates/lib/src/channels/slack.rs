//! Slack channel: conversations.replies and chat.postMessage via the Web API.

use crate::channels::client::{ChannelClient, ChannelError, ReplyPayload, ThreadMessage};
use async_trait::async_trait;
use serde::Deserialize;

const SLACK_API_BASE: &str = "https://slack.com/api";

#[derive(Debug, Deserialize)]
struct RepliesResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    messages: Vec<SlackMessage>,
}

#[derive(Debug, Deserialize)]
struct SlackMessage {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    bot_id: Option<String>,
}

impl From<SlackMessage> for ThreadMessage {
    fn from(m: SlackMessage) -> Self {
        Self {
            text: m.text.unwrap_or_default(),
            ts: m.ts.unwrap_or_default(),
            is_bot_origin: m.bot_id.is_some_and(|id| !id.is_empty()),
        }
    }
}

/// Slack Web API client. Cheap to build; the gateway creates one per delivery.
pub struct SlackClient {
    api_base: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl SlackClient {
    pub fn new(api_base: Option<String>, token: Option<String>) -> Self {
        let api_base = api_base
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| SLACK_API_BASE.to_string());
        Self {
            api_base,
            token,
            client: reqwest::Client::new(),
        }
    }

    fn token(&self) -> Result<&str, ChannelError> {
        self.token.as_deref().ok_or(ChannelError::NotConfigured)
    }
}

/// Slack reports most failures as HTTP 200 with `ok: false`; surface both kinds as `Api`.
fn api_error(method: &str, error: Option<&str>) -> ChannelError {
    ChannelError::Api(format!("{} failed: {}", method, error.unwrap_or("unknown")))
}

#[async_trait]
impl ChannelClient for SlackClient {
    async fn fetch_thread(
        &self,
        channel: &str,
        thread_anchor: &str,
    ) -> Result<Vec<ThreadMessage>, ChannelError> {
        let token = self.token()?;
        let url = format!("{}/conversations.replies", self.api_base);
        let res = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("channel", channel), ("ts", thread_anchor)])
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ChannelError::Api(format!(
                "conversations.replies failed: {} {}",
                status, body
            )));
        }
        let data: RepliesResponse = res.json().await?;
        if !data.ok {
            return Err(api_error("conversations.replies", data.error.as_deref()));
        }
        Ok(data.messages.into_iter().map(ThreadMessage::from).collect())
    }

    async fn post(&self, reply: &ReplyPayload) -> Result<serde_json::Value, ChannelError> {
        let token = self.token()?;
        let url = format!("{}/chat.postMessage", self.api_base);
        let res = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(reply)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ChannelError::Api(format!(
                "chat.postMessage failed: {} {}",
                status, body
            )));
        }
        let receipt: serde_json::Value = res.json().await?;
        if !receipt.get("ok").and_then(|v| v.as_bool()).unwrap_or(false) {
            return Err(api_error(
                "chat.postMessage",
                receipt.get("error").and_then(|v| v.as_str()),
            ));
        }
        Ok(receipt)
    }
}
