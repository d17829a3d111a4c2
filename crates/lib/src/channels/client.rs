//! Channel client trait and the message shapes it exchanges with the bridge.

use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("slack request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("slack api error: {0}")]
    Api(String),
    #[error("slack bot token not configured")]
    NotConfigured,
}

/// One message of a thread as reported by the platform, in platform order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMessage {
    pub text: String,
    pub ts: String,
    pub is_bot_origin: bool,
}

/// Outbound message: plain text plus an optional layout rendering hint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyPayload {
    pub channel: String,
    #[serde(rename = "thread_ts", skip_serializing_if = "Option::is_none")]
    pub thread_anchor: Option<String>,
    pub text: String,
    #[serde(rename = "blocks", skip_serializing_if = "Option::is_none")]
    pub rich_layout: Option<Vec<serde_json::Value>>,
}

/// Handle to a channel for one request: read thread context and post replies.
#[async_trait]
pub trait ChannelClient: Send + Sync {
    /// Messages of the thread rooted at `thread_anchor`, including the root.
    async fn fetch_thread(
        &self,
        channel: &str,
        thread_anchor: &str,
    ) -> Result<Vec<ThreadMessage>, ChannelError>;

    /// Post a message; returns the platform's delivery receipt as JSON.
    async fn post(&self, reply: &ReplyPayload) -> Result<serde_json::Value, ChannelError>;
}
